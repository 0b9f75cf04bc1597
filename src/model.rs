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

//! High-level data types.

use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Maximum length of every textual animal field as specified in the schema.
pub(crate) const ANIMALS_MAX_FIELD_LENGTH: usize = 200;

/// Model errors.  Raised when untrusted input cannot be converted into a domain type.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub(crate) struct ModelError(pub(crate) String);

/// Result type for this module.
pub(crate) type ModelResult<T> = Result<T, ModelError>;

/// Newtype pattern for the identifier of an animal, which the store assigns at creation time.
#[derive(Clone, Copy, Constructor, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug))]
#[serde(transparent)]
pub(crate) struct AnimalId(i32);

impl AnimalId {
    /// Returns the identifier as an `i32`.
    pub(crate) fn as_i32(&self) -> i32 {
        self.0
    }
}

/// The four caller-supplied fields of an animal, all validated at construction time.
#[derive(Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct AnimalDetails {
    /// Common name of the animal.
    name: String,

    /// Free-form description, which the store may lack.
    description: Option<String>,

    /// Category the animal belongs to.
    category: String,

    /// Geographical area the animal inhabits.
    area: String,
}

/// Validates one textual `field` named `name`, pushing any problem onto `problems`.
fn check_field(problems: &mut Vec<String>, name: &str, field: &str, required: bool) {
    if required && field.is_empty() {
        problems.push(format!("{} cannot be empty", name));
    } else if field.chars().count() > ANIMALS_MAX_FIELD_LENGTH {
        problems.push(format!("{} exceeds {} characters", name, ANIMALS_MAX_FIELD_LENGTH));
    }
}

impl AnimalDetails {
    /// Creates a new set of details from untrusted data, making sure every field is valid.
    ///
    /// All fields are checked before returning so that the error enumerates every offending
    /// field, not just the first one.
    pub(crate) fn new(
        name: String,
        description: Option<String>,
        category: String,
        area: String,
    ) -> ModelResult<Self> {
        let mut problems = vec![];
        check_field(&mut problems, "name", &name, true);
        if let Some(description) = description.as_deref() {
            check_field(&mut problems, "description", description, false);
        }
        check_field(&mut problems, "category", &category, true);
        check_field(&mut problems, "area", &area, true);

        if !problems.is_empty() {
            return Err(ModelError(format!("Invalid animal: {}", problems.join(", "))));
        }
        Ok(Self { name, description, category, area })
    }
}

/// A fully-specified animal, as stored in the database.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Animal {
    /// Store-assigned identifier of the animal.
    id: AnimalId,

    /// The four caller-supplied fields.
    #[serde(flatten)]
    details: AnimalDetails,
}

/// Allowed sort columns for animal listings.
///
/// Caller input never reaches the query text: untrusted sort keys are parsed into this enum and
/// only `column` supplies the identifier that is interpolated into SQL.
#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(test, derive(Debug))]
pub(crate) enum OrderBy {
    /// Sort by the animal's name.  This is the default.
    #[default]
    Name,

    /// Sort by the animal's description.
    Description,

    /// Sort by the animal's category.
    Category,

    /// Sort by the animal's area.
    Area,
}

impl OrderBy {
    /// Returns the safe SQL identifier of the column to sort by.
    pub(crate) fn column(&self) -> &'static str {
        match self {
            OrderBy::Name => "name",
            OrderBy::Description => "description",
            OrderBy::Category => "category",
            OrderBy::Area => "area",
        }
    }
}

impl TryFrom<&str> for OrderBy {
    type Error = ModelError;

    /// Parses an untrusted, case-insensitive sort key against the allow-list.
    fn try_from(s: &str) -> ModelResult<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(OrderBy::Name),
            "description" => Ok(OrderBy::Description),
            "category" => Ok(OrderBy::Category),
            "area" => Ok(OrderBy::Area),
            _ => Err(ModelError(format!(
                "Invalid orderBy value '{}'; available values: name, description, category, area",
                s
            ))),
        }
    }
}
