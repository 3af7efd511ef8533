use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row as _};

use crate::database::store::{Row, Store, StoreError};
use crate::database::table::Table;
use crate::filter::{Filter, FilterData};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

/// [`Store`] backed by PostgreSQL. Rows travel as `row_to_json` objects.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn filter(table: Table, data: &FilterData) -> Result<Filter, StoreError> {
        let mut filter = Filter::new(table.name())?;
        filter.assign(data)?;
        Ok(filter)
    }

    /// Quoted column list for an insert or update payload.
    fn columns(table: Table, values: &Row) -> Result<Vec<String>, StoreError> {
        if values.is_empty() {
            return Err(StoreError::Encode { table, message: "no columns given".to_string() });
        }
        values
            .keys()
            .map(|k| {
                if crate::filter::types::is_identifier(k) {
                    Ok(format!("\"{}\"", k))
                } else {
                    Err(StoreError::Encode { table, message: format!("invalid column {}", k) })
                }
            })
            .collect()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(&self, table: Table, data: &FilterData) -> Result<Vec<Row>, StoreError> {
        let sql = Self::filter(table, data)?.to_sql()?;
        let query = format!("SELECT row_to_json(t) AS row FROM ({}) t", sql.query);

        let rows = bind_params(sqlx::query(&query), &sql.params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        rows.iter().map(|row| decode_row(table, row)).collect()
    }

    async fn count(&self, table: Table, data: &FilterData) -> Result<i64, StoreError> {
        let sql = Self::filter(table, data)?.to_count_sql()?;
        let row = bind_params(sqlx::query(&sql.query), &sql.params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;
        Ok(row.try_get("count")?)
    }

    async fn insert(&self, table: Table, values: Row) -> Result<Row, StoreError> {
        let columns = Self::columns(table, &values)?.join(", ");
        // jsonb_populate_record lets Postgres coerce each value to its column type
        let query = format!(
            "WITH inserted AS (\
                INSERT INTO \"{table}\" ({columns}) \
                SELECT {columns} FROM jsonb_populate_record(NULL::\"{table}\", $1) \
                RETURNING *\
            ) SELECT row_to_json(inserted) AS row FROM inserted",
            table = table.name(),
            columns = columns,
        );

        let row = sqlx::query(&query)
            .bind(Value::Object(values))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        decode_row(table, &row)
    }

    async fn update(&self, table: Table, id: i64, values: Row) -> Result<Option<Row>, StoreError> {
        let assignments = Self::columns(table, &values)?
            .into_iter()
            .map(|c| format!("{c} = r.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "WITH updated AS (\
                UPDATE \"{table}\" SET {assignments}, \"updated_at\" = now() \
                FROM jsonb_populate_record(NULL::\"{table}\", $1) AS r \
                WHERE \"{table}\".\"id\" = $2 \
                RETURNING \"{table}\".*\
            ) SELECT row_to_json(updated) AS row FROM updated",
            table = table.name(),
            assignments = assignments,
        );

        let row = sqlx::query(&query)
            .bind(Value::Object(values))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;

        row.map(|row| decode_row(table, &row)).transpose()
    }

    async fn delete(&self, table: Table, data: &FilterData) -> Result<u64, StoreError> {
        let sql = Self::filter(table, data)?.to_delete_sql()?;
        let result = bind_params(sqlx::query(&sql.query), &sql.params)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn decode_row(table: Table, row: &sqlx::postgres::PgRow) -> Result<Row, StoreError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Encode {
            table,
            message: format!("expected object row, got {}", other),
        }),
    }
}

fn map_sqlx_error(table: Table, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().map(str::to_string);
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation { table, constraint },
            Some(FOREIGN_KEY_VIOLATION) => return StoreError::ForeignKeyViolation { table, constraint },
            Some(STRING_DATA_RIGHT_TRUNCATION) => return StoreError::ValueTooLong { table },
            _ => {}
        }
    }
    StoreError::Sqlx(err)
}

fn bind_params<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    params: &'q [Value],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    for v in params {
        q = match v {
            Value::Null => q.bind(Option::<String>::None),
            Value::Bool(b) => q.bind(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    q.bind(i)
                } else if let Some(f) = n.as_f64() {
                    q.bind(f)
                } else {
                    q.bind(n.to_string())
                }
            }
            Value::String(s) => q.bind(s.as_str()),
            // FilterWhere only emits scalar parameters
            Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
        };
    }
    q
}
