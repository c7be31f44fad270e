use super::MysqlDriver;
use crate::backends::DatabaseConnection;
use crate::error::{DriverError, DriverResult};
use crate::params;
use crate::schema::ColumnSpec;

impl<C: DatabaseConnection> MysqlDriver<C> {
    pub async fn add_column(
        &mut self,
        table: &str,
        column: &str,
        spec: impl Into<ColumnSpec>,
    ) -> DriverResult<()> {
        let definition = self.dialect.add_column(table, column, &spec.into());
        self.run_sql(&definition.sql, &[]).await?;
        self.apply_foreign_keys(&definition.foreign_key).await
    }

    pub async fn remove_column(&mut self, table: &str, column: &str) -> DriverResult<()> {
        let sql = self.dialect.remove_column(table, column);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    /// Rename a column, keeping its current full type.
    ///
    /// The type is read from `INFORMATION_SCHEMA` even in dry-run mode.
    pub async fn rename_column(&mut self, table: &str, old_name: &str, new_name: &str) -> DriverResult<()> {
        let query = self.dialect.column_type_query();
        let rows = self.all(query, &params![table, old_name]).await?;

        let column_type = rows
            .first()
            .and_then(|row| row.get_string("COLUMN_TYPE"))
            .ok_or_else(|| DriverError::ColumnNotFound {
                table: table.to_string(),
                column: old_name.to_string(),
            })?;

        let sql = self.dialect.rename_column(table, old_name, new_name, &column_type);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    /// Redefine a column.
    ///
    /// `unique: Some(false)` drops the index named after the column first.
    pub async fn change_column(
        &mut self,
        table: &str,
        column: &str,
        spec: impl Into<ColumnSpec>,
    ) -> DriverResult<()> {
        let spec = spec.into();
        if spec.unique == Some(false) {
            self.remove_index(Some(table), column).await?;
        }

        let definition = self.dialect.change_column(table, column, &spec);
        self.run_sql(&definition.sql, &[]).await?;
        self.apply_foreign_keys(&definition.foreign_key).await
    }
}
