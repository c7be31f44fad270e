//! # migrate-mysql: MySQL driver for schema migrations
//!
//! Translates abstract schema operations (tables, columns, indexes, foreign
//! keys, databases) into MySQL DDL and runs them over a single connection
//! handed over by the migration runner. Ordering of migrations, CLI handling
//! and subscriber setup belong to the runner.
//!
//! ```no_run
//! use migrate_mysql::{ColumnSpec, Columns, ConnectionConfig, DataType, DriverConfig, MysqlDriver};
//!
//! # async fn run() -> migrate_mysql::DriverResult<()> {
//! let config = ConnectionConfig::from_url("mysql://root@localhost/app")?;
//! let mut driver = MysqlDriver::connect(&config, DriverConfig::default()).await?;
//!
//! driver.start_migration().await?;
//! driver
//!     .create_table(
//!         "event",
//!         Columns::new()
//!             .column("id", ColumnSpec::new(DataType::Integer).primary_key().auto_increment())
//!             .column("title", DataType::String),
//!     )
//!     .await?;
//! driver.add_migration_record("/20240101-add-event").await?;
//! driver.end_migration().await?;
//! driver.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod callback;
pub mod config;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod schema;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export core traits and types
pub use backends::{
    ConnectionConfig, DatabaseConnection, DatabaseValue, MysqlConnection, QueryResult, Row,
    StatementKind,
};
pub use callback::complete_with;
pub use config::*;
pub use dialect::*;
pub use driver::MysqlDriver;
pub use error::*;
pub use schema::*;
pub use types::*;
