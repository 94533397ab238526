//! PostgreSQL query session
//!
//! Wraps one pooled connection for the lifetime of a run. Dropping the session
//! returns the connection to the pool.
//!
//! Rows are decoded into typed [`Value`]s. Columns whose type has no native
//! mapping (NUMERIC, INTERVAL, BYTEA, arrays, enums, ...) are selected through
//! their PostgreSQL text representation instead, so NUMERIC keeps its exact
//! digits and every table can be exported.

use super::sql;
use crate::adapters::database::traits::QuerySession;
use crate::domain::{EntitySpec, QueryError, Record, Value};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::Row;
use uuid::Uuid;

/// A query session on a pooled PostgreSQL connection
pub struct PostgresSession {
    client: deadpool_postgres::Object,
}

impl PostgresSession {
    pub(crate) fn new(client: deadpool_postgres::Object) -> Self {
        Self { client }
    }

    async fn scalar_count(&self, statement: &str) -> Result<u64, QueryError> {
        let row = self.client.query_one(statement, &[]).await.map_err(map_error)?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| QueryError::Failed(format!("Unexpected count result: {e}")))?;
        u64::try_from(count).map_err(|_| QueryError::Failed(format!("Negative row count {count}")))
    }
}

#[async_trait]
impl QuerySession for PostgresSession {
    async fn count(&self, entity: &EntitySpec) -> Result<u64, QueryError> {
        let statement = sql::count_sql(entity);
        tracing::debug!(entity = %entity.name, sql = %statement, "Counting rows");
        self.scalar_count(&statement).await
    }

    async fn count_where_any_null(
        &self,
        entity: &EntitySpec,
        required_columns: &[&str],
    ) -> Result<u64, QueryError> {
        let Some(statement) = sql::count_any_null_sql(entity, required_columns) else {
            return Ok(0);
        };
        tracing::debug!(entity = %entity.name, sql = %statement, "Counting null rows");
        self.scalar_count(&statement).await
    }

    async fn fetch_rows(
        &self,
        entity: &EntitySpec,
        columns: &[&str],
        key_column: &str,
    ) -> Result<Vec<Record>, QueryError> {
        let statement = sql::fetch_sql(entity, columns, key_column);
        let mut prepared = self.client.prepare(&statement).await.map_err(map_error)?;

        let as_text: Vec<&str> = prepared
            .columns()
            .iter()
            .zip(columns)
            .filter(|(column, _)| !decodes_natively(column.type_()))
            .map(|(_, name)| *name)
            .collect();

        if !as_text.is_empty() {
            tracing::debug!(
                entity = %entity.name,
                columns = ?as_text,
                "Selecting columns as text"
            );
            let statement = sql::fetch_sql_casting(entity, columns, key_column, &as_text);
            prepared = self.client.prepare(&statement).await.map_err(map_error)?;
        }

        tracing::debug!(entity = %entity.name, "Fetching rows");
        let rows = self.client.query(&prepared, &[]).await.map_err(map_error)?;
        rows.iter().map(row_to_record).collect()
    }
}

/// Whether values of `ty` are decoded straight into a [`Value`]
fn decodes_natively(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::TEXT
            | Type::VARCHAR
            | Type::BPCHAR
            | Type::NAME
            | Type::UUID
            | Type::JSON
            | Type::JSONB
            | Type::DATE
            | Type::TIMESTAMP
            | Type::TIMESTAMPTZ
    )
}

/// Converts a driver row into a typed record, column by column
fn row_to_record(row: &Row) -> Result<Record, QueryError> {
    (0..row.len()).map(|idx| cell_value(row, idx)).collect()
}

fn cell_value(row: &Row, idx: usize) -> Result<Value, QueryError> {
    let column = &row.columns()[idx];
    let ty = column.type_();

    let value = match *ty {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, idx)?.map(|v| Value::Integer(v.into())),
        Type::INT4 => get::<i32>(row, idx)?.map(|v| Value::Integer(v.into())),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::Integer),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|v| Value::Float(v.into())),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Value::Float),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx)?.map(Value::Text)
        }
        Type::UUID => get::<Uuid>(row, idx)?.map(|v| Value::Text(v.to_string())),
        Type::JSON | Type::JSONB => {
            get::<serde_json::Value>(row, idx)?.map(|v| Value::Text(v.to_string()))
        }
        Type::DATE => get::<NaiveDate>(row, idx)?.map(Value::Date),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?.map(Value::Timestamp),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(Value::TimestampTz),
        _ => {
            return Err(QueryError::UnsupportedType {
                column: column.name().to_string(),
                type_name: ty.name().to_string(),
            })
        }
    };

    Ok(value.unwrap_or(Value::Null))
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<Option<T>, QueryError> {
    row.try_get::<_, Option<T>>(idx).map_err(|e| {
        QueryError::Failed(format!(
            "Failed to decode column '{}': {e}",
            row.columns()[idx].name()
        ))
    })
}

/// Maps a driver error onto the query error taxonomy
///
/// Server-side errors leave the connection usable; anything else means the
/// connection is gone.
pub(crate) fn map_error(e: tokio_postgres::Error) -> QueryError {
    if e.is_closed() {
        return QueryError::ConnectionLost(e.to_string());
    }
    match e.as_db_error() {
        Some(db) => QueryError::Failed(format!("{} ({})", db.message(), db.code().code())),
        None => QueryError::ConnectionLost(e.to_string()),
    }
}
