//! Database connection pool and helpers for JSON-returning stored functions.

use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::QueryScalar;
use sqlx::{PgPool, Postgres};

use crate::errors::AppError;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Create a pool that connects on first use.
pub fn create_lazy_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(database_url)
}

/// A stored function call whose result is read back as JSON text.
pub type JsonCall<'q> = QueryScalar<'q, Postgres, Option<String>, PgArguments>;

/// Prepare a call such as `SELECT get_todo_data($1)::text`.
pub fn json_call(sql: &str) -> JsonCall<'_> {
    sqlx::query_scalar(sql)
}

/// Run a prepared call and decode its JSON result.
pub async fn fetch_json(
    pool: &PgPool,
    call: JsonCall<'_>,
    fallback: JsonFallback,
) -> Result<Value, AppError> {
    let data = call.fetch_one(pool).await?;
    decode_json(data, fallback)
}

/// What a stored function's SQL NULL result stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonFallback {
    /// A list endpoint: NULL means no rows.
    EmptyArray,
    /// A single-object endpoint: NULL means no data.
    EmptyObject,
}

impl JsonFallback {
    fn value(self) -> Value {
        match self {
            Self::EmptyArray => Value::Array(Vec::new()),
            Self::EmptyObject => Value::Object(serde_json::Map::new()),
        }
    }
}

/// Decode the text form of a stored function's JSON result.
pub fn decode_json(data: Option<String>, fallback: JsonFallback) -> Result<Value, AppError> {
    match data {
        None => Ok(fallback.value()),
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| AppError::Internal(format!("Stored function returned invalid JSON: {e}"))),
    }
}
