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

//! Entry point to the REST server.
//!
//! Every API is put in its own `.rs` file, using a name like `<entity>_<method>.rs`.  This may
//! seem overkill, but putting every API in its own file makes it easy to ensure all the
//! integration tests for the given API truly belong to that API.

use crate::driver::{Driver, DriverError};
use crate::model::{AnimalDetails, ModelError, ModelResult};
use async_trait::async_trait;
use axum::body::HttpBody;
use axum::extract::{FromRequest, Request};
use axum::response::IntoResponse;
use axum::{Json, Router};
use log::error;
use serde::{Deserialize, Serialize};

mod animal_delete;
mod animal_get;
mod animal_put;
mod animals_get;
mod animals_post;
#[cfg(test)]
pub(crate) mod testutils;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum RestError {
    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::InvalidInput(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::NotFound(_) => RestError::NotFound(e.to_string()),
        }
    }
}

impl From<ModelError> for RestError {
    fn from(e: ModelError) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            RestError::InternalError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
        };

        // Store-level details are not echoed back to the caller: they stay in the log.
        let message = match self {
            RestError::InternalError(msg) => {
                error!("Internal error during request processing: {}", msg);
                "Internal error".to_owned()
            }
            e => e.to_string(),
        };

        let response = ErrorResponse { message };

        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub(crate) type RestResult<T> = Result<T, RestError>;

/// Representation of the details of an error response.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Textual representation of the error message.
    pub(crate) message: String,
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data that we
/// don't care about.  This future-proofs the service.
pub(crate) struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// Wire representation of the caller-supplied fields of an animal.
///
/// All fields are optional at the serde level so that an absent field reaches validation (and is
/// reported as such) instead of being rejected during deserialization.
#[derive(Deserialize)]
pub(crate) struct AnimalRequest {
    /// Common name of the animal.
    name: Option<String>,

    /// Free-form description of the animal.
    description: Option<String>,

    /// Category the animal belongs to.
    category: Option<String>,

    /// Geographical area the animal inhabits.
    area: Option<String>,
}

impl AnimalRequest {
    /// Validates the request and converts it into domain-level animal details.
    pub(crate) fn into_details(self) -> ModelResult<AnimalDetails> {
        AnimalDetails::new(
            self.name.unwrap_or_default(),
            self.description,
            self.category.unwrap_or_default(),
            self.area.unwrap_or_default(),
        )
    }
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/controller-animal", get(animals_get::handler).post(animals_post::handler))
        .route(
            "/controller-animal/:id",
            get(animal_get::handler).put(animal_put::handler).delete(animal_delete::handler),
        )
        .with_state(driver)
}
