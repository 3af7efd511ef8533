use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::database::store::{Row, Store, StoreError};
use crate::database::table::Table;
use crate::filter::FilterData;

/// Typed access to one table through a [`Store`].
pub struct Repository<T> {
    table: Table,
    store: Arc<dyn Store>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: DeserializeOwned + Send,
{
    pub fn new(table: Table, store: Arc<dyn Store>) -> Self {
        Self {
            table,
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn select_any(&self, filter: FilterData) -> Result<Vec<T>, StoreError> {
        let rows = self.store.select(self.table, &filter).await?;
        rows.into_iter().map(|row| self.decode(row)).collect()
    }

    pub async fn select_one(&self, mut filter: FilterData) -> Result<Option<T>, StoreError> {
        filter.limit = Some(1);
        filter.offset = None;
        let rows = self.store.select(self.table, &filter).await?;
        rows.into_iter().next().map(|row| self.decode(row)).transpose()
    }

    pub async fn select_404(&self, filter: FilterData) -> Result<T, StoreError> {
        self.select_one(filter).await?.ok_or(StoreError::NotFound(self.table))
    }

    pub async fn select_id(&self, id: i64) -> Result<T, StoreError> {
        self.select_404(FilterData::matching(json!({ "id": id }))).await
    }

    /// Rows whose `column` is one of `ids`, in id order.
    pub async fn select_in(&self, column: &str, ids: &[i64]) -> Result<Vec<T>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut where_clause = serde_json::Map::new();
        where_clause.insert(column.to_string(), json!({ "$in": ids }));
        self.select_any(FilterData::matching(Value::Object(where_clause)).order_by("id asc"))
            .await
    }

    pub async fn exists(&self, where_clause: Value) -> Result<bool, StoreError> {
        Ok(self.select_one(FilterData::matching(where_clause)).await?.is_some())
    }

    pub async fn count(&self, filter: FilterData) -> Result<i64, StoreError> {
        self.store.count(self.table, &filter).await
    }

    /// Inserts a JSON object of column values and returns the stored row.
    pub async fn insert(&self, values: Value) -> Result<T, StoreError> {
        let row = self.store.insert(self.table, self.object(values)?).await?;
        self.decode(row)
    }

    pub async fn update(&self, id: i64, values: Value) -> Result<T, StoreError> {
        let row = self
            .store
            .update(self.table, id, self.object(values)?)
            .await?
            .ok_or(StoreError::NotFound(self.table))?;
        self.decode(row)
    }

    pub async fn delete(&self, where_clause: Value) -> Result<u64, StoreError> {
        self.store.delete(self.table, &FilterData::matching(where_clause)).await
    }

    /// Deletes matching rows, failing with `NotFound` when none matched.
    pub async fn delete_404(&self, where_clause: Value) -> Result<(), StoreError> {
        match self.delete(where_clause).await? {
            0 => Err(StoreError::NotFound(self.table)),
            _ => Ok(()),
        }
    }

    fn decode(&self, row: Row) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(row)).map_err(|source| StoreError::Decode {
            table: self.table,
            source,
        })
    }

    fn object(&self, values: Value) -> Result<Row, StoreError> {
        match values {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Encode {
                table: self.table,
                message: format!("expected object, got {}", other),
            }),
        }
    }
}
