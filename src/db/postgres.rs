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

//! Implementation of the database abstraction using PostgreSQL.

use crate::db::{Db, DbError, DbResult, Executor};
use crate::env::{get_optional_var, get_required_var};
use crate::model::{Animal, AnimalDetails, AnimalId, OrderBy};
use async_trait::async_trait;
use derivative::Derivative;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgDatabaseError, PgPool, PgPoolOptions, Postgres};
use sqlx::Row;

/// Schema to use to initialize the production database.
const SCHEMA: &str = include_str!("postgres.sql");

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) => match e.downcast_ref::<PgDatabaseError>().code() {
            "53300" /* too_many_connections */ => DbError::Unavailable,
            number => DbError::BackendError(format!("pgsql error {}: {}", number, e)),
        },
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to establish a connection to a PostgreSQL database.
#[derive(Derivative)]
#[derivative(Debug, Default)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct PostgresOptions {
    /// Host to connect to.
    pub host: String,

    /// Port to connect to (typically 5432).
    pub port: u16,

    /// Database name to connect to.
    pub database: String,

    /// Username to establish the connection with.
    pub username: String,

    /// Password to establish the connection with.
    #[derivative(Debug = "ignore")]
    pub password: String,

    /// Minimum number of connections to keep open against the database.
    pub min_connections: Option<u32>,

    /// Maximum number of connections to allow against the database.
    pub max_connections: Option<u32>,
}

impl PostgresOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_HOST`, `<prefix>_PORT`, `<prefix>_DATABASE`,
    /// `<prefix>_USERNAME`, `<prefix>_PASSWORD`, `<prefix>_MIN_CONNECTIONS` and
    /// `<prefix>_MAX_CONNECTIONS`.
    pub fn from_env(prefix: &str) -> Result<PostgresOptions, String> {
        Ok(PostgresOptions {
            host: get_required_var::<String>(prefix, "HOST")?,
            port: get_required_var::<u16>(prefix, "PORT")?,
            database: get_required_var::<String>(prefix, "DATABASE")?,
            username: get_required_var::<String>(prefix, "USERNAME")?,
            password: get_required_var::<String>(prefix, "PASSWORD")?,
            min_connections: get_optional_var::<u32>(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?,
        })
    }
}

/// A database instance backed by a PostgreSQL database.
pub struct PostgresDb {
    /// Shared PostgreSQL connection pool.  This is a cloneable type that all concurrent
    /// requests can use concurrently.
    pool: PgPool,
}

impl PostgresDb {
    /// Creates a new connection with a specific set of pool options.
    ///
    /// Note that this does *not* establish the connection: the pool opens connections on first
    /// use.
    fn connect_lazy_with_pool_options(opts: PostgresOptions, pool_options: PgPoolOptions) -> Self {
        let options = PgConnectOptions::new()
            .host(&opts.host)
            .port(opts.port)
            .database(&opts.database)
            .username(&opts.username)
            .password(&opts.password);

        let mut pool_options = pool_options;
        if let Some(min_connections) = opts.min_connections {
            pool_options = pool_options.min_connections(min_connections);
        }
        if let Some(max_connections) = opts.max_connections {
            pool_options = pool_options.max_connections(max_connections);
        }

        Self { pool: pool_options.connect_lazy_with(options) }
    }

    /// Creates a new connection based on a dynamic pool.
    pub fn connect(opts: PostgresOptions) -> Self {
        PostgresDb::connect_lazy_with_pool_options(opts, PgPoolOptions::new())
    }
}

impl Drop for PostgresDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

#[async_trait]
impl Db for PostgresDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::Postgres(conn))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Initializes the database schema.
pub(super) async fn init_schema(conn: &mut PoolConnection<Postgres>) -> DbResult<()> {
    sqlx::raw_sql(SCHEMA).execute(&mut **conn).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// Converts one `row` of the animals table to an `Animal`.
fn animal_from_row(row: &sqlx::postgres::PgRow) -> DbResult<Animal> {
    let id: i32 = row.try_get("id_animal").map_err(map_sqlx_error)?;
    let name: String = row.try_get("name").map_err(map_sqlx_error)?;
    let description: Option<String> = row.try_get("description").map_err(map_sqlx_error)?;
    let category: String = row.try_get("category").map_err(map_sqlx_error)?;
    let area: String = row.try_get("area").map_err(map_sqlx_error)?;

    let details = AnimalDetails::new(name, description, category, area)?;
    Ok(Animal::new(AnimalId::new(id), details))
}

/// Gets all animals sorted ascending by the column that `order_by` selects.
pub(super) async fn list_animals(
    conn: &mut PoolConnection<Postgres>,
    order_by: OrderBy,
) -> DbResult<Vec<Animal>> {
    // The sort column comes from the `OrderBy` allow-list, never from caller input.
    let query_str = format!(
        "SELECT id_animal, name, description, category, area FROM animals ORDER BY {} ASC",
        order_by.column()
    );
    let rows = sqlx::query(&query_str).fetch_all(&mut **conn).await.map_err(map_sqlx_error)?;

    let mut animals = Vec::with_capacity(rows.len());
    for row in rows {
        animals.push(animal_from_row(&row)?);
    }
    Ok(animals)
}

/// Gets the animal identified by `id`.
pub(super) async fn get_animal(
    conn: &mut PoolConnection<Postgres>,
    id: AnimalId,
) -> DbResult<Animal> {
    let query_str =
        "SELECT id_animal, name, description, category, area FROM animals WHERE id_animal = $1";
    let row = sqlx::query(query_str)
        .bind(id.as_i32())
        .fetch_one(&mut **conn)
        .await
        .map_err(map_sqlx_error)?;
    animal_from_row(&row)
}

/// Inserts a new animal described by `details` and returns its store-assigned identifier.
pub(super) async fn create_animal(
    conn: &mut PoolConnection<Postgres>,
    details: &AnimalDetails,
) -> DbResult<AnimalId> {
    let query_str = "
        INSERT INTO animals (name, description, category, area)
        VALUES ($1, $2, $3, $4)
        RETURNING id_animal
    ";
    let row = sqlx::query(query_str)
        .bind(details.name())
        .bind(details.description())
        .bind(details.category())
        .bind(details.area())
        .fetch_one(&mut **conn)
        .await
        .map_err(map_sqlx_error)?;
    let id: i32 = row.try_get("id_animal").map_err(map_sqlx_error)?;
    Ok(AnimalId::new(id))
}

/// Replaces all four mutable fields of the animal identified by `id` with `details`.
pub(super) async fn update_animal(
    conn: &mut PoolConnection<Postgres>,
    id: AnimalId,
    details: &AnimalDetails,
) -> DbResult<()> {
    let query_str = "
        UPDATE animals SET name = $1, description = $2, category = $3, area = $4
        WHERE id_animal = $5
    ";
    let done = sqlx::query(query_str)
        .bind(details.name())
        .bind(details.description())
        .bind(details.category())
        .bind(details.area())
        .bind(id.as_i32())
        .execute(&mut **conn)
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() == 0 {
        return Err(DbError::NotFound);
    } else if done.rows_affected() != 1 {
        return Err(DbError::BackendError("Update affected more than one row".to_owned()));
    }
    Ok(())
}

/// Deletes the animal identified by `id`.
pub(super) async fn delete_animal(
    conn: &mut PoolConnection<Postgres>,
    id: AnimalId,
) -> DbResult<()> {
    let query_str = "DELETE FROM animals WHERE id_animal = $1";
    let done = sqlx::query(query_str)
        .bind(id.as_i32())
        .execute(&mut **conn)
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() == 0 {
        return Err(DbError::NotFound);
    } else if done.rows_affected() != 1 {
        return Err(DbError::BackendError("Deletion affected more than one row".to_owned()));
    }
    Ok(())
}
