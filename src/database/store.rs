use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::table::Table;
use crate::filter::{FilterData, FilterError};

/// A stored row as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} not found", .0.label())]
    NotFound(Table),

    #[error("unique constraint violated on {table}")]
    UniqueViolation { table: Table, constraint: Option<String> },

    #[error("foreign key constraint violated on {table}")]
    ForeignKeyViolation { table: Table, constraint: Option<String> },

    #[error("Invalid query: {0}")]
    Query(#[from] FilterError),

    #[error("Failed to decode {table} row: {source}")]
    Decode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },

    #[error("value too long for a column of {table}")]
    ValueTooLong { table: Table },

    #[error("Invalid values for {table}: {message}")]
    Encode { table: Table, message: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Row-level persistence used by every repository.
///
/// Implementations must honour the unique keys and cascading foreign keys
/// described by [`Table`], reporting conflicts as [`StoreError::UniqueViolation`].
/// Inserted rows receive `id`, `created_at` and `updated_at`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, table: Table, filter: &FilterData) -> Result<Vec<Row>, StoreError>;

    async fn count(&self, table: Table, filter: &FilterData) -> Result<i64, StoreError>;

    async fn insert(&self, table: Table, values: Row) -> Result<Row, StoreError>;

    /// Applies `values` to the row with `id` and refreshes `updated_at`.
    async fn update(&self, table: Table, id: i64, values: Row) -> Result<Option<Row>, StoreError>;

    async fn delete(&self, table: Table, filter: &FilterData) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
