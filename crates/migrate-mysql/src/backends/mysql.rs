//! MySQL Connection Implementation
//!
//! A single sqlx `MySqlConnection` behind the [`DatabaseConnection`] trait,
//! plus the connection settings it is opened with.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, ConnectOptions, Connection, Executor, MySql, Row as SqlxRow, TypeInfo, ValueRef};
use tracing::info;

use super::core::*;
use crate::error::{DriverError, DriverResult};

const DEFAULT_PORT: u16 = 3306;

/// Connection settings, parsed from a `mysql://` URL or built directly
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            database: None,
            username: None,
            password: None,
            params: HashMap::new(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Parse connection parameters from a database URL
    pub fn from_url(url: &str) -> DriverResult<Self> {
        let parsed = url::Url::parse(url)
            .map_err(|e| DriverError::Connection(format!("Invalid database URL: {}", e)))?;

        if parsed.scheme() != "mysql" && parsed.scheme() != "mariadb" {
            return Err(DriverError::Connection(format!(
                "Invalid MySQL URL scheme: {}",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| DriverError::Connection("Missing host in database URL".to_string()))?
            .to_string();

        let database = Some(parsed.path().trim_start_matches('/'))
            .filter(|db| !db.is_empty())
            .map(str::to_string);

        let username = if parsed.username().is_empty() {
            None
        } else {
            Some(decode(parsed.username()))
        };

        let params = parsed
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        Ok(Self {
            host,
            port: parsed.port().unwrap_or(DEFAULT_PORT),
            database,
            username,
            password: parsed.password().map(decode),
            params,
        })
    }

    /// Read the URL from `DATABASE_URL`
    pub fn from_env() -> DriverResult<Self> {
        let url = std::env::var("DATABASE_URL").map_err(|_| DriverError::Configuration {
            field: "DATABASE_URL".to_string(),
            message: "environment variable is not set".to_string(),
        })?;
        Self::from_url(&url)
    }

    /// Rebuild a URL; the password is left out so the result is safe to log
    pub fn redacted_url(&self) -> String {
        let user = self
            .username
            .as_deref()
            .map(|u| format!("{}@", u))
            .unwrap_or_default();
        let database = self.database.as_deref().unwrap_or("");
        format!("mysql://{}{}:{}/{}", user, self.host, self.port, database)
    }

    fn connect_options(&self) -> DriverResult<MySqlConnectOptions> {
        let mut options = MySqlConnectOptions::new().host(&self.host).port(self.port);

        if let Some(username) = &self.username {
            options = options.username(username);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        if let Some(charset) = self.params.get("charset") {
            options = options.charset(charset);
        }
        if let Some(collation) = self.params.get("collation") {
            options = options.collation(collation);
        }
        if let Some(ssl_mode) = self.params.get("ssl-mode").or_else(|| self.params.get("sslmode")) {
            let mode = sqlx::mysql::MySqlSslMode::from_str(ssl_mode).map_err(|e| DriverError::Configuration {
                field: "ssl-mode".to_string(),
                message: e.to_string(),
            })?;
            options = options.ssl_mode(mode);
        }

        // Statements are logged by the driver on the `sql` target already.
        Ok(options.disable_statement_logging())
    }
}

fn decode(component: &str) -> String {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| component.to_string())
}

/// MySQL connection implementation
pub struct MysqlConnection {
    conn: Option<sqlx::MySqlConnection>,
}

impl MysqlConnection {
    /// Open a single connection
    pub async fn connect(config: &ConnectionConfig) -> DriverResult<Self> {
        let conn = config.connect_options()?.connect().await?;
        info!("Connected to {}", config.redacted_url());
        Ok(Self::from_sqlx(conn))
    }

    /// Wrap a connection the host already opened
    pub fn from_sqlx(conn: sqlx::MySqlConnection) -> Self {
        Self { conn: Some(conn) }
    }

    fn conn(&mut self) -> DriverResult<&mut sqlx::MySqlConnection> {
        self.conn.as_mut().ok_or(DriverError::ConnectionClosed)
    }
}

#[async_trait]
impl DatabaseConnection for MysqlConnection {
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<QueryResult> {
        let conn = self.conn()?;

        // Parameterless statements go over the text protocol; MySQL refuses
        // to prepare some of them (USE, for one).
        let result = if params.is_empty() {
            conn.execute(sql).await?
        } else {
            bind_all(sqlx::query(sql), params).execute(&mut *conn).await?
        };

        Ok(QueryResult {
            rows: Vec::new(),
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    async fn fetch_all(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<Vec<Row>> {
        let conn = self.conn()?;

        let rows = if params.is_empty() {
            conn.fetch_all(sql).await?
        } else {
            bind_all(sqlx::query(sql), params).fetch_all(&mut *conn).await?
        };

        rows.iter().map(convert_row).collect()
    }

    async fn close(&mut self) -> DriverResult<()> {
        let conn = self.conn.take().ok_or(DriverError::ConnectionClosed)?;
        conn.close().await?;
        info!("MySQL connection closed");
        Ok(())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[DatabaseValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = bind_database_value(query, param);
    }
    query
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &DatabaseValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::UInt64(u) => query.bind(*u),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Date(d) => query.bind(*d),
        DatabaseValue::Time(t) => query.bind(*t),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

fn convert_row(row: &MySqlRow) -> DriverResult<Row> {
    let mut converted = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        converted.push(column.name(), mysql_value_to_database_value(row, index)?);
    }
    Ok(converted)
}

/// Convert a MySQL column value to DatabaseValue
fn mysql_value_to_database_value(row: &MySqlRow, index: usize) -> DriverResult<DatabaseValue> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let type_name = row.columns()[index].type_info().name();

    let value = match type_name {
        "BOOLEAN" => DatabaseValue::Bool(row.try_get(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            DatabaseValue::Int64(row.try_get(index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => DatabaseValue::UInt64(row.try_get(index)?),
        "FLOAT" => DatabaseValue::Float64(f64::from(row.try_get::<f32, _>(index)?)),
        "DOUBLE" => DatabaseValue::Float64(row.try_get(index)?),
        "DATETIME" | "TIMESTAMP" => DatabaseValue::DateTime(row.try_get(index)?),
        "DATE" => DatabaseValue::Date(row.try_get(index)?),
        "TIME" => DatabaseValue::Time(row.try_get(index)?),
        "JSON" => DatabaseValue::Json(row.try_get(index)?),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            DatabaseValue::Bytes(row.try_get(index)?)
        }
        // DECIMAL and text-like columns arrive as text on both protocols.
        _ => match row.try_get_unchecked::<String, _>(index) {
            Ok(s) => DatabaseValue::String(s),
            Err(_) => DatabaseValue::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        },
    };

    Ok(value)
}
