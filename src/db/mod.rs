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

//! Database abstraction in terms of the operations needed by the server.
//!
//! The free functions in this module express every query the service issues.  Each one takes an
//! `Executor` handed out by the `Db` trait and dispatches to the backend that the executor is
//! connected to: PostgreSQL in production and SQLite in tests.

use crate::model::{Animal, AnimalDetails, AnimalId, ModelError, OrderBy};
use async_trait::async_trait;

pub mod postgres;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DbError {
    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because of too many active concurrent
    /// connections).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A database executor that can talk to multiple database implementations.
///
/// Every executor wraps a connection checked out of the backing pool, so callers get a fresh
/// connection per request and release it by dropping the executor.
pub enum Executor {
    /// An executor backed by a PostgreSQL connection.
    Postgres(sqlx::pool::PoolConnection<sqlx::Postgres>),

    /// An executor backed by a SQLite connection.
    #[cfg(test)]
    Sqlite(sqlx::pool::PoolConnection<sqlx::Sqlite>),
}

/// Abstraction over the database connection.
#[async_trait]
pub trait Db {
    /// Obtains an executor backed by a connection from the pool.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Closes the pool, terminating all open connections.
    async fn close(&self);
}

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Postgres(conn) => postgres::init_schema(conn).await,

        #[cfg(test)]
        Executor::Sqlite(conn) => sqlite::init_schema(conn).await,
    }
}

/// Gets all animals sorted ascending by the column that `order_by` selects.
pub(crate) async fn list_animals(ex: &mut Executor, order_by: OrderBy) -> DbResult<Vec<Animal>> {
    match ex {
        Executor::Postgres(conn) => postgres::list_animals(conn, order_by).await,

        #[cfg(test)]
        Executor::Sqlite(conn) => sqlite::list_animals(conn, order_by).await,
    }
}

/// Gets the animal identified by `id`.
pub(crate) async fn get_animal(ex: &mut Executor, id: AnimalId) -> DbResult<Animal> {
    match ex {
        Executor::Postgres(conn) => postgres::get_animal(conn, id).await,

        #[cfg(test)]
        Executor::Sqlite(conn) => sqlite::get_animal(conn, id).await,
    }
}

/// Inserts a new animal described by `details` and returns its store-assigned identifier.
pub(crate) async fn create_animal(ex: &mut Executor, details: &AnimalDetails) -> DbResult<AnimalId> {
    match ex {
        Executor::Postgres(conn) => postgres::create_animal(conn, details).await,

        #[cfg(test)]
        Executor::Sqlite(conn) => sqlite::create_animal(conn, details).await,
    }
}

/// Replaces all four mutable fields of the animal identified by `id` with `details`.
pub(crate) async fn update_animal(
    ex: &mut Executor,
    id: AnimalId,
    details: &AnimalDetails,
) -> DbResult<()> {
    match ex {
        Executor::Postgres(conn) => postgres::update_animal(conn, id, details).await,

        #[cfg(test)]
        Executor::Sqlite(conn) => sqlite::update_animal(conn, id, details).await,
    }
}

/// Deletes the animal identified by `id`.
pub(crate) async fn delete_animal(ex: &mut Executor, id: AnimalId) -> DbResult<()> {
    match ex {
        Executor::Postgres(conn) => postgres::delete_animal(conn, id).await,

        #[cfg(test)]
        Executor::Sqlite(conn) => sqlite::delete_animal(conn, id).await,
    }
}
