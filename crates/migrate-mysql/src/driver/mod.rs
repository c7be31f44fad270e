//! The MySQL migration driver
//!
//! `MysqlDriver` owns one connection and exposes one async method per schema
//! primitive. Every statement goes through [`MysqlDriver::run_sql`], which
//! logs it on the `sql` target and honours dry-run mode. Reads issued through
//! [`MysqlDriver::all`] always reach the server.

mod columns;
mod databases;
mod indexes;
mod tables;

use chrono::Local;

use crate::backends::{
    ConnectionConfig, DatabaseConnection, DatabaseValue, MysqlConnection, QueryResult, Row,
    StatementKind,
};
use crate::config::DriverConfig;
use crate::dialect::MysqlDialect;
use crate::error::{DriverError, DriverResult};
use crate::schema::{TableOptions, TableSpec};

const RUN_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// DDL translator and executor over a single MySQL connection
pub struct MysqlDriver<C = MysqlConnection> {
    conn: C,
    config: DriverConfig,
    dialect: MysqlDialect,
}

impl MysqlDriver<MysqlConnection> {
    /// Open a connection and wrap it in a driver
    pub async fn connect(config: &ConnectionConfig, driver_config: DriverConfig) -> DriverResult<Self> {
        driver_config.validate()?;
        let conn = MysqlConnection::connect(config).await?;
        Ok(Self::new(conn, driver_config))
    }
}

impl<C: DatabaseConnection> MysqlDriver<C> {
    /// Wrap a connection the host already holds
    pub fn new(conn: C, config: DriverConfig) -> Self {
        Self {
            conn,
            config,
            dialect: MysqlDialect::new(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn dialect(&self) -> &MysqlDialect {
        &self.dialect
    }

    /// Give the connection back to the host
    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Execute a statement with bound parameters.
    ///
    /// In dry-run mode the statement is logged only and an empty result is
    /// returned.
    pub async fn run_sql(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<QueryResult> {
        tracing::debug!(target: "sql", "{} {:?}", sql, params);

        if self.config.dry_run {
            tracing::debug!("Dry run, statement not executed");
            return Ok(QueryResult::default());
        }

        match StatementKind::of(sql) {
            StatementKind::Query => Ok(QueryResult::from_rows(self.conn.fetch_all(sql, params).await?)),
            StatementKind::Command => self.conn.execute(sql, params).await,
        }
    }

    /// Run a read and return its rows; not affected by dry-run mode
    pub async fn all(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<Vec<Row>> {
        tracing::debug!(target: "sql", "{} {:?}", sql, params);
        self.conn.fetch_all(sql, params).await
    }

    /// Terminate the connection
    pub async fn close(&mut self) -> DriverResult<()> {
        self.conn.close().await?;
        tracing::info!("MySQL migration driver closed");
        Ok(())
    }

    /// Open the transaction a migration runs in
    pub async fn start_migration(&mut self) -> DriverResult<()> {
        if self.config.no_transactions {
            tracing::debug!("Transactions disabled, not starting one");
            return Ok(());
        }
        self.run_sql("SET AUTOCOMMIT=0;", &[]).await?;
        self.run_sql("START TRANSACTION;", &[]).await?;
        Ok(())
    }

    /// Commit the transaction opened by `start_migration`
    pub async fn end_migration(&mut self) -> DriverResult<()> {
        if self.config.no_transactions {
            tracing::debug!("Transactions disabled, nothing to commit");
            return Ok(());
        }
        self.run_sql("COMMIT;", &[]).await?;
        Ok(())
    }

    /// Insert one row with bound values
    pub async fn insert(
        &mut self,
        table: &str,
        columns: &[&str],
        values: &[DatabaseValue],
    ) -> DriverResult<QueryResult> {
        if columns.is_empty() || columns.len() != values.len() {
            return Err(DriverError::invalid_arguments(format!(
                "Column count ({}) does not match value count ({})",
                columns.len(),
                values.len()
            )));
        }
        let sql = self.dialect.insert(table, columns);
        self.run_sql(&sql, values).await
    }

    pub async fn create_migrations_table(&mut self) -> DriverResult<()> {
        let table = self.config.migration_table.clone();
        self.create_bookkeeping_table(&table).await
    }

    pub async fn create_seeds_table(&mut self) -> DriverResult<()> {
        let table = self.config.seed_table.clone();
        self.create_bookkeeping_table(&table).await
    }

    async fn create_bookkeeping_table(&mut self, table: &str) -> DriverResult<()> {
        let spec = TableOptions::new(self.dialect.bookkeeping_columns()).if_not_exists();
        self.create_table(table, TableSpec::from(spec)).await
    }

    /// Record a migration as run now
    pub async fn add_migration_record(&mut self, name: &str) -> DriverResult<QueryResult> {
        let table = self.config.migration_table.clone();
        self.add_record(&table, name).await
    }

    /// Record a seed as run now
    pub async fn add_seed_record(&mut self, name: &str) -> DriverResult<QueryResult> {
        let table = self.config.seed_table.clone();
        self.add_record(&table, name).await
    }

    async fn add_record(&mut self, table: &str, name: &str) -> DriverResult<QueryResult> {
        let run_on = Local::now().format(RUN_ON_FORMAT).to_string();
        self.insert(table, &["name", "run_on"], &crate::params![name, run_on])
            .await
    }
}
