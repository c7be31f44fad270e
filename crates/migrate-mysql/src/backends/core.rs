//! Core Connection Traits
//!
//! The driver never talks to a socket itself. The host hands it something
//! implementing [`DatabaseConnection`]; the bundled [`MysqlConnection`]
//! covers the common case of a plain sqlx connection.
//!
//! [`MysqlConnection`]: super::mysql::MysqlConnection

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::DriverResult;

/// Query-executing connection owned by the driver
#[async_trait]
pub trait DatabaseConnection: Send {
    /// Execute a statement and report what it changed
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<QueryResult>;

    /// Execute a statement and return the result rows
    async fn fetch_all(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<Vec<Row>>;

    /// Terminate the connection
    async fn close(&mut self) -> DriverResult<()>;
}

#[async_trait]
impl<C> DatabaseConnection for Box<C>
where
    C: DatabaseConnection + ?Sized,
{
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<QueryResult> {
        (**self).execute(sql, params).await
    }

    async fn fetch_all(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<Vec<Row>> {
        (**self).fetch_all(sql, params).await
    }

    async fn close(&mut self) -> DriverResult<()> {
        (**self).close().await
    }
}

/// Uniform outcome of a statement: rows for reads, counters for writes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

impl QueryResult {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }
}

/// A result row with its column order preserved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<DatabaseValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style)
    pub fn with(mut self, column: impl Into<String>, value: impl Into<DatabaseValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<DatabaseValue>) {
        self.columns.push(column.into());
        self.values.push(value.into());
    }

    /// Get a column value by name; MySQL column names compare case-insensitively
    pub fn get(&self, column: &str) -> Option<&DatabaseValue> {
        self.columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
            .map(|index| &self.values[index])
    }

    /// Get a column as text, decoding byte strings as UTF-8
    pub fn get_string(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            DatabaseValue::String(s) => Some(s.clone()),
            DatabaseValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            DatabaseValue::Null => None,
            other => Some(other.to_json().to_string()),
        }
    }
}

/// Database value enumeration for parameter binding and row decoding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    DateTime(chrono::NaiveDateTime),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    Json(JsonValue),
}

impl DatabaseValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatabaseValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DatabaseValue::Int64(i) => Some(*i),
            DatabaseValue::UInt64(u) => i64::try_from(*u).ok(),
            DatabaseValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int64(i) => JsonValue::from(*i),
            DatabaseValue::UInt64(u) => JsonValue::from(*u),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::String(String::from_utf8_lossy(b).into_owned()),
            DatabaseValue::DateTime(dt) => JsonValue::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            DatabaseValue::Date(d) => JsonValue::String(d.to_string()),
            DatabaseValue::Time(t) => JsonValue::String(t.to_string()),
            DatabaseValue::Json(j) => j.clone(),
        }
    }
}

impl std::fmt::Display for DatabaseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseValue::Null => f.write_str("NULL"),
            DatabaseValue::String(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Int64(i64::from(value))
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<u32> for DatabaseValue {
    fn from(value: u32) -> Self {
        DatabaseValue::UInt64(u64::from(value))
    }
}

impl From<u64> for DatabaseValue {
    fn from(value: u64) -> Self {
        DatabaseValue::UInt64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(value: Vec<u8>) -> Self {
        DatabaseValue::Bytes(value)
    }
}

impl From<chrono::NaiveDateTime> for DatabaseValue {
    fn from(value: chrono::NaiveDateTime) -> Self {
        DatabaseValue::DateTime(value)
    }
}

impl From<chrono::NaiveDate> for DatabaseValue {
    fn from(value: chrono::NaiveDate) -> Self {
        DatabaseValue::Date(value)
    }
}

impl From<chrono::NaiveTime> for DatabaseValue {
    fn from(value: chrono::NaiveTime) -> Self {
        DatabaseValue::Time(value)
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::Json(value)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// Build a parameter list from heterogeneous values.
///
/// `params![1, "title"]` is the Rust spelling of passing bind values either
/// spread out or as one array.
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::DatabaseValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::DatabaseValue::from($value)),+]
    };
}

/// How a statement's result comes back from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Produces a result set
    Query,
    /// Produces an affected-rows count
    Command,
}

impl StatementKind {
    /// Classify a statement by its leading keyword
    pub fn of(sql: &str) -> Self {
        let keyword = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();

        match keyword.as_str() {
            "SELECT" | "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" | "WITH" => StatementKind::Query,
            _ => StatementKind::Command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_kind_classification() {
        assert_eq!(StatementKind::of("SELECT 1"), StatementKind::Query);
        assert_eq!(StatementKind::of("  select * from event"), StatementKind::Query);
        assert_eq!(StatementKind::of("(SELECT 1) UNION (SELECT 2)"), StatementKind::Query);
        assert_eq!(StatementKind::of("SHOW INDEX FROM `event`"), StatementKind::Query);
        assert_eq!(StatementKind::of("describe event"), StatementKind::Query);
        assert_eq!(StatementKind::of("ALTER TABLE `event` DROP COLUMN `x`"), StatementKind::Command);
        assert_eq!(StatementKind::of("SET AUTOCOMMIT=0;"), StatementKind::Command);
        assert_eq!(StatementKind::of(""), StatementKind::Command);
    }

    #[test]
    fn test_params_macro_converts_values() {
        let params = params![1, "title", None::<i64>, true];
        assert_eq!(
            params,
            vec![
                DatabaseValue::Int64(1),
                DatabaseValue::String("title".to_string()),
                DatabaseValue::Null,
                DatabaseValue::Bool(true),
            ]
        );
        assert!(params![].is_empty());
    }

    #[test]
    fn test_row_lookup_is_case_insensitive() {
        let row = Row::new()
            .with("COLUMN_TYPE", "varchar(255)")
            .with("n", 3i64);
        assert_eq!(row.get_string("column_type").as_deref(), Some("varchar(255)"));
        assert_eq!(row.get("N").and_then(DatabaseValue::as_i64), Some(3));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_row_bytes_decode_as_text() {
        let row = Row::new().with("COLUMN_TYPE", b"int(11)".to_vec());
        assert_eq!(row.get_string("COLUMN_TYPE").as_deref(), Some("int(11)"));
    }

    #[test]
    fn test_database_value_json_and_display() {
        assert_eq!(DatabaseValue::Int64(7).to_json(), serde_json::json!(7));
        assert_eq!(DatabaseValue::Null.to_string(), "NULL");
        assert_eq!(DatabaseValue::from("a").to_string(), "'a'");
    }
}
