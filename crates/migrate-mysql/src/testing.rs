//! In-memory connection used by the unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::backends::{DatabaseConnection, DatabaseValue, QueryResult, Row};
use crate::error::{DriverError, DriverResult};

#[derive(Debug, Default)]
struct Recorded {
    statements: Vec<(String, Vec<DatabaseValue>)>,
    rows: VecDeque<Vec<Row>>,
    fail_on: Option<String>,
    closed: bool,
}

/// Records every statement and answers reads from scripted rows.
///
/// Clones share state so a test can keep a handle after moving one into a driver.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingConnection {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next read
    pub(crate) fn push_rows(&self, rows: Vec<Row>) {
        self.inner.lock().unwrap().rows.push_back(rows);
    }

    /// Fail the statement whose text is exactly `statement`
    pub(crate) fn fail_on(&self, statement: &str) {
        self.inner.lock().unwrap().fail_on = Some(statement.to_string());
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .statements
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    pub(crate) fn params(&self, index: usize) -> Vec<DatabaseValue> {
        self.inner.lock().unwrap().statements[index].1.clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    fn record(&self, sql: &str, params: &[DatabaseValue]) -> DriverResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(DriverError::ConnectionClosed);
        }
        inner.statements.push((sql.to_string(), params.to_vec()));
        match &inner.fail_on {
            Some(statement) if sql.trim() == statement.trim() => Err(DriverError::Database(
                sqlx::Error::Protocol(format!("scripted failure for: {}", sql)),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DatabaseConnection for RecordingConnection {
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<QueryResult> {
        self.record(sql, params)?;
        Ok(QueryResult {
            rows_affected: 1,
            ..Default::default()
        })
    }

    async fn fetch_all(&mut self, sql: &str, params: &[DatabaseValue]) -> DriverResult<Vec<Row>> {
        self.record(sql, params)?;
        Ok(self.inner.lock().unwrap().rows.pop_front().unwrap_or_default())
    }

    async fn close(&mut self) -> DriverResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(DriverError::ConnectionClosed);
        }
        inner.closed = true;
        Ok(())
    }
}
