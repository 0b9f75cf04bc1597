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

//! Operations on the collection of animals.

use crate::db;
use crate::driver::{Driver, DriverResult};
use crate::model::{Animal, OrderBy};

impl Driver {
    /// Gets all animals sorted ascending by the column that `order_by` selects.
    pub(crate) async fn list_animals(self, order_by: OrderBy) -> DriverResult<Vec<Animal>> {
        let animals = db::list_animals(&mut self.db.ex().await?, order_by).await?;
        Ok(animals)
    }
}
