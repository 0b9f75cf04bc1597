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

//! API to get all existing animals.

use crate::driver::Driver;
use crate::model::OrderBy;
use crate::rest::{EmptyBody, RestResult};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

/// Query parameters for the API.
#[derive(Deserialize)]
pub(crate) struct GetAnimalsQuery {
    /// Sort key for the returned collection.  Validated against the allow-list before any
    /// query runs.
    #[serde(rename = "orderBy")]
    order_by: Option<String>,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<GetAnimalsQuery>,
    _: EmptyBody,
) -> RestResult<impl IntoResponse> {
    let order_by = match query.order_by.as_deref() {
        Some(raw) => OrderBy::try_from(raw)?,
        None => OrderBy::default(),
    };
    let animals = driver.list_animals(order_by).await?;
    Ok(Json(animals))
}
