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

//! Test utilities for the REST API.

use crate::db::{self, Db};
use crate::driver::Driver;
use crate::model::{Animal, AnimalDetails, AnimalId, OrderBy};
use crate::rest::{app, ErrorResponse};
use axum::extract::Request;
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Maximum body size for testing purposes.
const MAX_BODY_SIZE: usize = 1024;

/// State of a running test server backed by an in-memory database.
pub(crate) struct TestContext {
    /// The database the app is backed by, for direct data manipulation.
    db: Arc<dyn Db + Send + Sync>,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app against an empty in-memory database.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::from(crate::db::sqlite::testutils::setup().await);
        let driver = Driver::new(db.clone());
        let app = app(driver);
        Self { db, app }
    }

    /// Returns a clone of the app under test.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the app under test.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Inserts an animal into the database, bypassing the REST API.
    pub(crate) async fn insert_animal(&self, details: &AnimalDetails) -> AnimalId {
        db::create_animal(&mut self.db.ex().await.unwrap(), details).await.unwrap()
    }

    /// Gets an animal straight from the database.
    pub(crate) async fn get_animal(&self, id: AnimalId) -> Animal {
        db::get_animal(&mut self.db.ex().await.unwrap(), id).await.unwrap()
    }

    /// Checks if an animal exists in the database.
    pub(crate) async fn has_animal(&self, id: AnimalId) -> bool {
        match db::get_animal(&mut self.db.ex().await.unwrap(), id).await {
            Ok(_) => true,
            Err(db::DbError::NotFound) => false,
            Err(e) => panic!("Unexpected database error: {:?}", e),
        }
    }

    /// Gets all animals straight from the database, sorted by name.
    pub(crate) async fn all_animals(&self) -> Vec<Animal> {
        db::list_animals(&mut self.db.ex().await.unwrap(), OrderBy::Name).await.unwrap()
    }
}

/// Builder for a single request to the API server.
#[must_use]
pub(crate) struct OneShotBuilder {
    /// The router for the app being tested.
    app: Router,

    /// Builder for the request that will be sent to the app.
    builder: axum::http::request::Builder,
}

impl OneShotBuilder {
    /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
    pub(crate) fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
        let builder = Request::builder().method(method).uri(uri.as_ref());
        Self { app, builder }
    }

    /// Extends the URI in the request with a `query`.
    pub(crate) fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
        let uri = self.builder.uri_ref().unwrap().to_string();
        assert!(!uri.contains('?'), "URI already contains a query: {}", uri);
        self.builder =
            self.builder.uri(format!("{}?{}", uri, serde_urlencoded::to_string(query).unwrap()));
        self
    }

    /// Finishes building the request and sends it with an empty payload.
    pub(crate) async fn send_empty(self) -> ResponseChecker {
        let request = self.builder.body(axum::body::Body::empty()).unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a text payload.
    pub(crate) async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
            .body(axum::body::Body::from(text.into()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a JSON payload.
    pub(crate) async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(axum::body::Body::from(serde_json::to_vec(&request).unwrap()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }
}

/// Validator for the outcome of a request sent by a `OneShotBuilder`.
#[must_use]
pub(crate) struct ResponseChecker {
    /// Actual response that we received from the app.
    response: axum::response::Response,

    /// Expected HTTP status code in the response above.
    exp_status: http::StatusCode,
}

impl From<axum::response::Response> for ResponseChecker {
    fn from(response: axum::response::Response) -> Self {
        Self { response, exp_status: http::StatusCode::OK }
    }
}

impl ResponseChecker {
    /// Sets the expected exit HTTP status to `status`.
    pub(crate) fn expect_status(mut self, status: http::StatusCode) -> Self {
        self.exp_status = status;
        self
    }

    /// Performs common validation operations on the response.
    fn verify(&self) {
        assert_eq!(self.exp_status, self.response.status());
    }

    /// Finishes checking the response and expects it to contain an empty body.
    pub(crate) async fn expect_empty(self) {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.is_empty(), "Body not empty; got {}", body);
    }

    /// Finishes checking the response and expects its body to be an `ErrorResponse` whose message
    /// matches `exp_re`.
    pub(crate) async fn expect_error(self, exp_re: &str) {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        let response: ErrorResponse = match serde_json::from_slice(&body) {
            Ok(response) => response,
            Err(e) => {
                let body = String::from_utf8(body.to_vec()).unwrap();
                panic!("Invalid error response due to {}; content was {}", e, body);
            }
        };
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(
            re.is_match(&response.message),
            "Response content '{:?}' does not match re '{}'",
            response,
            exp_re
        );
    }

    /// Finishes checking the response and expects it to contain a valid JSON object of type `T`.
    pub(crate) async fn expect_json<T: DeserializeOwned>(self) -> T {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        serde_json::from_slice::<T>(&body).unwrap()
    }

    /// Finishes checking the response and expects its body to be valid UTF-8 and to match
    /// `exp_re`.
    pub(crate) async fn expect_text(self, exp_re: &str) {
        assert!(!exp_re.is_empty(), "Use expect_empty to validate empty responses");

        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(re.is_match(&body), "Body content '{}' does not match re '{}'", body, exp_re);
    }

    /// Finishes checking the response and returns the response itself for out of band validation
    /// of properties not supported by the `ResponseChecker`.
    pub(crate) async fn take_response(self) -> axum::response::Response {
        self.verify();

        self.response
    }
}

/// Generates a test to verify that an API that does not expect a payload fails as necessary.
macro_rules! test_payload_must_be_empty {
    ( $app:expr, $route:expr ) => {
        #[tokio::test]
        async fn test_payload_must_be_empty() {
            $crate::rest::testutils::OneShotBuilder::new($app, $route)
                .send_text("should not be here")
                .await
                .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                .expect_error("should be empty")
                .await;
        }
    };
}

pub(crate) use test_payload_must_be_empty;

/// Generates a test to verify that an API that expects JSON fails when it gets something else.
macro_rules! test_payload_must_be_json {
    ( $app:expr, $route:expr ) => {
        #[tokio::test]
        async fn test_payload_must_be_json() {
            // These checks would better use expect_error instead of expect_text, but JSON
            // deserialization errors are not funneled through RestError.

            $crate::rest::testutils::OneShotBuilder::new($app, $route)
                .send_text("this is not json")
                .await
                .expect_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE)
                .expect_text("Content-Type")
                .await;
        }
    };
}

pub(crate) use test_payload_must_be_json;
