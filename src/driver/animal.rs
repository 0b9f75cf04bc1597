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

//! Operations on one animal.

use crate::db;
use crate::driver::{Driver, DriverResult};
use crate::model::{Animal, AnimalDetails, AnimalId};

impl Driver {
    /// Gets the animal identified by `id`.
    pub(crate) async fn get_animal(self, id: AnimalId) -> DriverResult<Animal> {
        let animal = db::get_animal(&mut self.db.ex().await?, id).await?;
        Ok(animal)
    }

    /// Creates a new animal described by `details` and returns it, including the identifier the
    /// store assigned to it.
    pub(crate) async fn create_animal(self, details: AnimalDetails) -> DriverResult<Animal> {
        let id = db::create_animal(&mut self.db.ex().await?, &details).await?;
        Ok(Animal::new(id, details))
    }

    /// Replaces all four mutable fields of the animal identified by `id` with `details`.
    pub(crate) async fn update_animal(self, id: AnimalId, details: AnimalDetails) -> DriverResult<()> {
        db::update_animal(&mut self.db.ex().await?, id, &details).await?;
        Ok(())
    }

    /// Deletes the animal identified by `id`.
    pub(crate) async fn delete_animal(self, id: AnimalId) -> DriverResult<()> {
        db::delete_animal(&mut self.db.ex().await?, id).await?;
        Ok(())
    }
}
