//! Database Backend Abstractions
//!
//! The driver talks to MySQL through the `DatabaseConnection` trait so that
//! statement generation can be exercised without a live server.

pub mod core;
pub mod mysql;

// Re-export core traits and types
pub use core::*;
pub use mysql::{ConnectionConfig, MysqlConnection};
