//! Driver configuration
//!
//! Everything the host runner decides for a run: whether statements are
//! bracketed in transactions, whether they are executed at all, and where
//! bookkeeping rows go.

use std::env;

use serde::Deserialize;

use crate::error::{DriverError, DriverResult};

/// Flags and table names passed to the driver at construction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverConfig {
    /// Skip `START TRANSACTION` / `COMMIT` around a migration
    #[serde(alias = "notransactions")]
    pub no_transactions: bool,
    /// Log statements instead of executing them
    pub dry_run: bool,
    pub migration_table: String,
    pub seed_table: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            no_transactions: false,
            dry_run: false,
            migration_table: "migrations".to_string(),
            seed_table: "seeds".to_string(),
        }
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_transactions(mut self, no_transactions: bool) -> Self {
        self.no_transactions = no_transactions;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn migration_table(mut self, table: impl Into<String>) -> Self {
        self.migration_table = table.into();
        self
    }

    pub fn seed_table(mut self, table: impl Into<String>) -> Self {
        self.seed_table = table.into();
        self
    }

    /// Load overrides from `MIGRATE_*` environment variables on top of the defaults
    pub fn from_env() -> DriverResult<Self> {
        let mut config = Self::default();

        if let Some(value) = read_flag("MIGRATE_NO_TRANSACTIONS")? {
            config.no_transactions = value;
        }
        if let Some(value) = read_flag("MIGRATE_DRY_RUN")? {
            config.dry_run = value;
        }
        if let Ok(table) = env::var("MIGRATE_MIGRATION_TABLE") {
            config.migration_table = table;
        }
        if let Ok(table) = env::var("MIGRATE_SEED_TABLE") {
            config.seed_table = table;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> DriverResult<()> {
        validate_table_name("migration_table", &self.migration_table)?;
        validate_table_name("seed_table", &self.seed_table)?;
        Ok(())
    }
}

fn read_flag(name: &str) -> DriverResult<Option<bool>> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };

    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        _ => Err(DriverError::Configuration {
            field: name.to_string(),
            message: format!("expected a boolean, got '{}'", raw),
        }),
    }
}

fn validate_table_name(field: &str, name: &str) -> DriverResult<()> {
    if name.trim().is_empty() {
        return Err(DriverError::Configuration {
            field: field.to_string(),
            message: "table name cannot be empty".to_string(),
        });
    }
    if name.len() > 64 {
        return Err(DriverError::Configuration {
            field: field.to_string(),
            message: format!("'{}' exceeds MySQL's 64 character identifier limit", name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "MIGRATE_NO_TRANSACTIONS",
            "MIGRATE_DRY_RUN",
            "MIGRATE_MIGRATION_TABLE",
            "MIGRATE_SEED_TABLE",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert!(!config.no_transactions);
        assert!(!config.dry_run);
        assert_eq!(config.migration_table, "migrations");
        assert_eq!(config.seed_table, "seeds");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_host_names() {
        let config: DriverConfig =
            serde_json::from_str(r#"{"notransactions": true, "dryRun": true, "migrationTable": "runs"}"#)
                .unwrap();
        assert!(config.no_transactions);
        assert!(config.dry_run);
        assert_eq!(config.migration_table, "runs");
        assert_eq!(config.seed_table, "seeds");
    }

    #[test]
    fn test_validate_rejects_empty_and_long_names() {
        assert!(DriverConfig::new().migration_table("  ").validate().is_err());
        assert!(DriverConfig::new().seed_table("s".repeat(65)).validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("MIGRATE_DRY_RUN", "true");
        env::set_var("MIGRATE_NO_TRANSACTIONS", "0");
        env::set_var("MIGRATE_SEED_TABLE", "seed_runs");

        let config = DriverConfig::from_env().unwrap();
        assert!(config.dry_run);
        assert!(!config.no_transactions);
        assert_eq!(config.migration_table, "migrations");
        assert_eq!(config.seed_table, "seed_runs");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_flag() {
        clear_env();
        env::set_var("MIGRATE_DRY_RUN", "maybe");

        let err = DriverConfig::from_env().unwrap_err();
        assert!(matches!(err, DriverError::Configuration { field, .. } if field == "MIGRATE_DRY_RUN"));
        clear_env();
    }
}
