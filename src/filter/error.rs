use thiserror::Error;

/// Rejections raised while turning a JSON filter into SQL or evaluating it in memory.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid where clause: {0}")]
    InvalidWhereClause(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid data for operator: {0}")]
    InvalidOperatorData(String),

    #[error("Invalid page window: {0}")]
    InvalidWindow(String),
}
