// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Command-line entry point for the animals REST service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use animals_rest::db::postgres::{PostgresDb, PostgresOptions};
use animals_rest::db::{self, Db};
use animals_rest::serve;
use std::env;
use std::net::Ipv4Addr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    let port: u16 = match env::var("PORT") {
        Ok(value) => value.parse().expect("PORT must be a number"),
        Err(_) => 3000,
    };
    let addr = (Ipv4Addr::LOCALHOST, port);

    let opts = PostgresOptions::from_env("DEFAULT").unwrap();
    let db: Arc<dyn Db + Send + Sync> = Arc::from(PostgresDb::connect(opts));
    db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();

    serve(addr, db).await.unwrap()
}
