use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::database::{Row, Store, StoreError, Table};
use crate::filter::filter_order::FilterOrder;
use crate::filter::{FilterData, FilterError, FilterOp, SortDirection};

/// In-memory [`Store`] evaluating the same JSON filters the SQL compiler accepts.
///
/// Unique keys and foreign keys come from [`Table`]; deletes cascade the way
/// the schema's `ON DELETE CASCADE` does.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<Table, Vec<Row>>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored in `table`.
    pub fn len(&self, table: Table) -> usize {
        self.lock().tables.get(&table).map(Vec::len).unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, table: Table, filter: &FilterData) -> Result<Vec<Row>, StoreError> {
        let inner = self.lock();
        let mut rows = inner.matching(table, filter.where_clause.as_ref())?;

        if let Some(order) = &filter.order {
            let infos = FilterOrder::validate_and_parse(order)?;
            rows.sort_by(|a, b| {
                for info in &infos {
                    let ordering = compare(cell(a, &info.column), cell(b, &info.column));
                    let ordering = match info.sort {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, table: Table, filter: &FilterData) -> Result<i64, StoreError> {
        let inner = self.lock();
        Ok(inner.matching(table, filter.where_clause.as_ref())?.len() as i64)
    }

    async fn insert(&self, table: Table, values: Row) -> Result<Row, StoreError> {
        let mut inner = self.lock();
        inner.check_references(table, &values)?;
        inner.check_unique(table, &values, None)?;

        inner.next_id += 1;
        let now = json!(Utc::now().to_rfc3339());
        let mut row = values;
        row.insert("id".to_string(), json!(inner.next_id));
        row.insert("created_at".to_string(), now.clone());
        row.insert("updated_at".to_string(), now);

        inner.tables.entry(table).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: i64, values: Row) -> Result<Option<Row>, StoreError> {
        let mut inner = self.lock();
        let Some(existing) = inner.find(table, id).cloned() else {
            return Ok(None);
        };

        let mut row = existing;
        for (column, value) in values {
            row.insert(column, value);
        }
        row.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        inner.check_references(table, &row)?;
        inner.check_unique(table, &row, Some(id))?;

        let rows = inner.tables.entry(table).or_default();
        if let Some(slot) = rows.iter_mut().find(|r| id_of(r) == Some(id)) {
            *slot = row.clone();
        }
        Ok(Some(row))
    }

    async fn delete(&self, table: Table, filter: &FilterData) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let ids: Vec<i64> = inner
            .matching(table, filter.where_clause.as_ref())?
            .iter()
            .filter_map(id_of)
            .collect();
        inner.remove_cascading(table, &ids);
        Ok(ids.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl Inner {
    fn matching(&self, table: Table, where_clause: Option<&Value>) -> Result<Vec<Row>, StoreError> {
        let mut out = Vec::new();
        for row in self.tables.get(&table).into_iter().flatten() {
            if matches(row, where_clause.unwrap_or(&Value::Null))? {
                out.push(row.clone());
            }
        }
        Ok(out)
    }

    fn find(&self, table: Table, id: i64) -> Option<&Row> {
        self.tables.get(&table)?.iter().find(|r| id_of(r) == Some(id))
    }

    fn check_references(&self, table: Table, row: &Row) -> Result<(), StoreError> {
        for (column, target) in table.references() {
            if let Some(id) = row.get(*column).and_then(Value::as_i64) {
                if self.find(*target, id).is_none() {
                    return Err(StoreError::ForeignKeyViolation {
                        table,
                        constraint: Some(format!("{}_{}_fkey", table.name(), column)),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_unique(&self, table: Table, row: &Row, skip_id: Option<i64>) -> Result<(), StoreError> {
        for columns in table.unique_keys() {
            let clash = self.tables.get(&table).into_iter().flatten().any(|other| {
                skip_id.map_or(true, |id| id_of(other) != Some(id))
                    && columns.iter().all(|c| {
                        let value = cell(row, c);
                        !value.is_null() && values_equal(value, cell(other, c))
                    })
            });
            if clash {
                return Err(StoreError::UniqueViolation {
                    table,
                    constraint: Some(format!("{}_{}_key", table.name(), columns.join("_"))),
                });
            }
        }
        Ok(())
    }

    fn remove_cascading(&mut self, table: Table, ids: &[i64]) {
        if ids.is_empty() {
            return;
        }
        if let Some(rows) = self.tables.get_mut(&table) {
            rows.retain(|r| !id_of(r).is_some_and(|id| ids.contains(&id)));
        }

        let dependents: Vec<(Table, &'static str)> = self
            .tables
            .keys()
            .copied()
            .flat_map(|child| {
                child
                    .references()
                    .iter()
                    .filter(move |(_, target)| *target == table)
                    .map(move |(column, _)| (child, *column))
            })
            .collect();

        for (child, column) in dependents {
            let child_ids: Vec<i64> = self
                .tables
                .get(&child)
                .into_iter()
                .flatten()
                .filter(|r| r.get(column).and_then(Value::as_i64).is_some_and(|v| ids.contains(&v)))
                .filter_map(id_of)
                .collect();
            self.remove_cascading(child, &child_ids);
        }
    }
}

fn id_of(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

fn cell<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn matches(row: &Row, where_clause: &Value) -> Result<bool, StoreError> {
    let obj = match where_clause {
        Value::Null => return Ok(true),
        Value::Object(obj) => obj,
        _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string()).into()),
    };

    for (key, value) in obj {
        let ok = match key.as_str() {
            "$and" => all_of(row, value)?,
            "$or" => any_of(row, value)?,
            "$not" => !matches(row, value)?,
            op if op.starts_with('$') => return Err(FilterError::UnsupportedOperator(op.to_string()).into()),
            column => field_matches(cell(row, column), value)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn all_of(row: &Row, value: &Value) -> Result<bool, StoreError> {
    for clause in clauses(value)? {
        if !matches(row, clause)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_of(row: &Row, value: &Value) -> Result<bool, StoreError> {
    for clause in clauses(value)? {
        if matches(row, clause)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn clauses(value: &Value) -> Result<&Vec<Value>, StoreError> {
    value
        .as_array()
        .ok_or_else(|| FilterError::InvalidOperatorData("$and/$or require an array".to_string()).into())
}

fn field_matches(actual: &Value, condition: &Value) -> Result<bool, StoreError> {
    match condition {
        Value::Object(ops) => {
            for (op_key, operand) in ops {
                let op = FilterOp::parse(op_key)
                    .ok_or_else(|| StoreError::from(FilterError::UnsupportedOperator(op_key.clone())))?;
                if !operator_matches(actual, op, operand)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        other => operator_matches(actual, FilterOp::Eq, other),
    }
}

fn operator_matches(actual: &Value, op: FilterOp, operand: &Value) -> Result<bool, StoreError> {
    // SQL semantics: comparisons against NULL are never true.
    if operand.is_null() {
        return Ok(match op {
            FilterOp::Eq => actual.is_null(),
            FilterOp::Ne => !actual.is_null(),
            _ => false,
        });
    }
    if actual.is_null() {
        return Ok(false);
    }

    Ok(match op {
        FilterOp::Eq => values_equal(actual, operand),
        FilterOp::Ne => !values_equal(actual, operand),
        FilterOp::Gt => compare(actual, operand) == Ordering::Greater,
        FilterOp::Gte => compare(actual, operand) != Ordering::Less,
        FilterOp::Lt => compare(actual, operand) == Ordering::Less,
        FilterOp::Lte => compare(actual, operand) != Ordering::Greater,
        FilterOp::Like => like(text(actual), text(operand)),
        FilterOp::ILike => like(&text(actual).to_lowercase(), &text(operand).to_lowercase()),
        FilterOp::In | FilterOp::NIn => {
            let values = operand.as_array().ok_or_else(|| {
                StoreError::from(FilterError::InvalidOperatorData("$in/$nin require an array".to_string()))
            })?;
            let found = values.iter().any(|v| values_equal(actual, v));
            if op == FilterOp::In {
                found
            } else {
                !found
            }
        }
    })
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        // NULLS LAST
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// SQL `LIKE` with `%`, `_` and backslash escapes.
fn like(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_from(&value, &pattern)
}

fn like_from(value: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => value.is_empty(),
        Some(('%', rest)) => (0..=value.len()).any(|skip| like_from(&value[skip..], rest)),
        Some(('_', rest)) => !value.is_empty() && like_from(&value[1..], rest),
        Some(('\\', rest)) if !rest.is_empty() => {
            value.first() == Some(&rest[0]) && like_from(&value[1..], &rest[1..])
        }
        Some((c, rest)) => value.first() == Some(c) && like_from(&value[1..], rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn unique_keys_are_enforced() {
        let store = MemoryStore::new();
        store
            .insert(Table::Users, row(json!({ "name": "A", "username": "alice", "password": "x" })))
            .await
            .unwrap();
        let err = store
            .insert(Table::Users, row(json!({ "name": "B", "username": "alice", "password": "y" })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { table: Table::Users, .. }));
    }

    #[tokio::test]
    async fn deletes_cascade_through_references() {
        let store = MemoryStore::new();
        let user = store
            .insert(Table::Users, row(json!({ "name": "A", "username": "alice", "password": "x" })))
            .await
            .unwrap();
        let user_id = user["id"].as_i64().unwrap();
        store
            .insert(Table::UserPositions, row(json!({ "user_id": user_id, "title": "Dev", "is_active": true })))
            .await
            .unwrap();

        let deleted = store
            .delete(Table::Users, &FilterData::matching(json!({ "id": user_id })))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.len(Table::UserPositions), 0);
    }

    #[tokio::test]
    async fn missing_references_are_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert(Table::UserPositions, row(json!({ "user_id": 42, "title": "Dev", "is_active": true })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));
    }

    #[test]
    fn filters_follow_sql_semantics() {
        let r = row(json!({ "id": 3, "name": "Alice_1", "month_end": null }));
        assert!(matches(&r, &json!({ "month_end": null })).unwrap());
        assert!(!matches(&r, &json!({ "month_end": { "$ne": null } })).unwrap());
        assert!(matches(&r, &json!({ "$or": [{ "id": 1 }, { "id": 3 }] })).unwrap());
        assert!(!matches(&r, &json!({ "$or": [] })).unwrap());
        assert!(matches(&r, &json!({ "id": { "$in": [2, 3] } })).unwrap());
        assert!(matches(&r, &json!({ "name": { "$ilike": "%ALICE\\_%" } })).unwrap());
        assert!(!matches(&r, &json!({ "name": { "$like": "alice%" } })).unwrap());
        assert!(matches(&r, &json!({ "$not": { "id": 4 } })).unwrap());
    }
}
