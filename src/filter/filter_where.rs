use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{is_identifier, FilterOp};

/// Compiles a JSON where clause into a parameterised SQL predicate.
pub struct FilterWhere {
    param_values: Vec<Value>,
}

impl FilterWhere {
    pub fn generate(where_data: &Value) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self { param_values: vec![] };
        let sql = filter_where.clause(where_data)?;
        Ok((sql, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn clause(&mut self, where_data: &Value) -> Result<String, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok("1=1".to_string()),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        let mut parts = Vec::new();
        for (key, value) in obj {
            if key.starts_with('$') {
                parts.push(self.logical(key, value)?);
            } else {
                parts.extend(self.field(key, value)?);
            }
        }

        Ok(if parts.is_empty() { "1=1".to_string() } else { parts.join(" AND ") })
    }

    fn logical(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                if arr.is_empty() {
                    return Ok(if op == "$and" { "1=1" } else { "1=0" }.to_string());
                }
                let mut sql_parts = Vec::with_capacity(arr.len());
                for v in arr {
                    sql_parts.push(format!("({})", self.clause(v)?));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                Ok(format!("({})", sql_parts.join(joiner)))
            }
            "$not" => Ok(format!("NOT ({})", self.clause(value)?)),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn field(&mut self, column: &str, value: &Value) -> Result<Vec<String>, FilterError> {
        if !is_identifier(column) {
            return Err(FilterError::InvalidColumn(column.to_string()));
        }
        let quoted_column = format!("\"{}\"", column);

        match value {
            Value::Object(ops) => self.operators(&quoted_column, ops),
            // Implicit equality: { field: value }
            other => Ok(vec![self.condition(&quoted_column, FilterOp::Eq, other)?]),
        }
    }

    fn operators(&mut self, quoted_column: &str, ops: &Map<String, Value>) -> Result<Vec<String>, FilterError> {
        let mut out = Vec::with_capacity(ops.len());
        for (op_key, op_val) in ops {
            let operator = FilterOp::parse(op_key)
                .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
            out.push(self.condition(quoted_column, operator, op_val)?);
        }
        Ok(out)
    }

    fn condition(&mut self, quoted_column: &str, operator: FilterOp, data: &Value) -> Result<String, FilterError> {
        Ok(match operator {
            FilterOp::Eq if data.is_null() => format!("{} IS NULL", quoted_column),
            FilterOp::Ne if data.is_null() => format!("{} IS NOT NULL", quoted_column),
            FilterOp::Eq => format!("{} = {}", quoted_column, self.param(data)?),
            FilterOp::Ne => format!("{} <> {}", quoted_column, self.param(data)?),
            FilterOp::Gt => format!("{} > {}", quoted_column, self.param(data)?),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.param(data)?),
            FilterOp::Lt => format!("{} < {}", quoted_column, self.param(data)?),
            FilterOp::Lte => format!("{} <= {}", quoted_column, self.param(data)?),
            FilterOp::Like => format!("{} LIKE {}", quoted_column, self.param(data)?),
            FilterOp::ILike => format!("{} ILIKE {}", quoted_column, self.param(data)?),
            FilterOp::In | FilterOp::NIn => {
                let values = data.as_array().ok_or_else(|| {
                    FilterError::InvalidOperatorData("$in/$nin require an array".to_string())
                })?;
                if values.is_empty() {
                    return Ok(if operator == FilterOp::In { "1=0" } else { "1=1" }.to_string());
                }
                let params = values.iter().map(|v| self.param(v)).collect::<Result<Vec<_>, _>>()?;
                let keyword = if operator == FilterOp::In { "IN" } else { "NOT IN" };
                format!("{} {} ({})", quoted_column, keyword, params.join(", "))
            }
        })
    }

    fn param(&mut self, value: &Value) -> Result<String, FilterError> {
        if matches!(value, Value::Array(_) | Value::Object(_)) {
            return Err(FilterError::InvalidOperatorData(format!("expected scalar, got {}", value)));
        }
        self.param_values.push(value.clone());
        Ok(format!("${}", self.param_values.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn implicit_equality_and_null() {
        let (sql, params) = FilterWhere::generate(&json!({ "user_id": 7, "month_end": null })).unwrap();
        // serde_json maps iterate in key order
        assert_eq!(sql, "\"month_end\" IS NULL AND \"user_id\" = $1");
        assert_eq!(params, vec![json!(7)]);
    }

    #[test]
    fn or_group_numbers_params_in_order() {
        let where_data = json!({
            "$or": [{ "name": "Go" }, { "code": "GO" }],
            "id": { "$ne": 3 }
        });
        let (sql, params) = FilterWhere::generate(&where_data).unwrap();
        assert_eq!(sql, "((\"name\" = $1) OR (\"code\" = $2)) AND \"id\" <> $3");
        assert_eq!(params, vec![json!("Go"), json!("GO"), json!(3)]);
    }

    #[test]
    fn in_with_empty_list_matches_nothing() {
        let (sql, params) = FilterWhere::generate(&json!({ "id": { "$in": [] } })).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_unsafe_columns_and_unknown_operators() {
        assert!(matches!(
            FilterWhere::generate(&json!({ "id; drop": 1 })),
            Err(FilterError::InvalidColumn(_))
        ));
        assert!(matches!(
            FilterWhere::generate(&json!({ "id": { "$regex": "x" } })),
            Err(FilterError::UnsupportedOperator(_))
        ));
    }
}
