use super::MysqlDriver;
use crate::backends::DatabaseConnection;
use crate::error::{DriverError, DriverResult};
use crate::schema::{ForeignKeyMapping, ForeignKeyRules, IndexColumn, RemoveForeignKeyOptions};

const REMOVE_INDEX_USAGE: &str = r#"Illegal arguments, must provide "tableName" and "indexName""#;
const INVALID_COLUMNS: &str = "Invalid column specification";

impl<C: DatabaseConnection> MysqlDriver<C> {
    pub async fn add_index<I>(&mut self, table: &str, index: &str, columns: I, unique: bool) -> DriverResult<()>
    where
        I: IntoIterator,
        I::Item: Into<IndexColumn>,
    {
        let columns: Vec<IndexColumn> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() || columns.iter().any(|column| column.name().is_empty()) {
            return Err(DriverError::invalid_arguments(INVALID_COLUMNS));
        }

        let sql = self.dialect.add_index(table, index, &columns, unique);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    /// Drop an index; fails before touching the database when a name is missing
    pub async fn remove_index(&mut self, table: Option<&str>, index: &str) -> DriverResult<()> {
        let table = match table {
            Some(table) if !table.is_empty() && !index.is_empty() => table,
            _ => return Err(DriverError::invalid_arguments(REMOVE_INDEX_USAGE)),
        };

        let sql = self.dialect.remove_index(table, index);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    /// Add a named foreign key.
    ///
    /// A single-column mapping references a column of the same name.
    pub async fn add_foreign_key(
        &mut self,
        table: &str,
        referenced_table: &str,
        key: &str,
        mapping: impl Into<ForeignKeyMapping>,
        rules: ForeignKeyRules,
    ) -> DriverResult<()> {
        let mapping: ForeignKeyMapping = mapping.into();
        let pairs = match mapping {
            ForeignKeyMapping::Column(column) => vec![(column.clone(), column)],
            ForeignKeyMapping::Columns(pairs) => pairs,
        };
        if pairs.is_empty() {
            return Err(DriverError::invalid_arguments(
                "Foreign key mapping must name at least one column",
            ));
        }

        let sql = self
            .dialect
            .add_foreign_key(table, referenced_table, key, &pairs, &rules);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    pub async fn remove_foreign_key(
        &mut self,
        table: &str,
        key: &str,
        options: RemoveForeignKeyOptions,
    ) -> DriverResult<()> {
        let sql = self.dialect.remove_foreign_key(table, key);
        self.run_sql(&sql, &[]).await?;

        if options.drop_index {
            let sql = self.dialect.drop_key_index(table, key);
            self.run_sql(&sql, &[]).await?;
        }
        Ok(())
    }
}
