pub mod manager;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;
pub mod table;

pub use manager::DatabaseError;
pub use postgres::PgStore;
pub use repository::Repository;
pub use store::{Row, Store, StoreError};
pub use table::Table;
