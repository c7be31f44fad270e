use super::MysqlDriver;
use crate::backends::DatabaseConnection;
use crate::dialect::ForeignKeyBinding;
use crate::error::DriverResult;
use crate::schema::{DropTableOptions, TableSpec};

impl<C: DatabaseConnection> MysqlDriver<C> {
    /// Create a table, then apply the foreign keys declared on its columns
    pub async fn create_table(&mut self, table: &str, spec: impl Into<TableSpec>) -> DriverResult<()> {
        let create = self.dialect.create_table(table, &spec.into());
        self.run_sql(&create.sql, &[]).await?;
        self.apply_foreign_keys(&create.foreign_keys).await
    }

    pub async fn drop_table(&mut self, table: &str, options: DropTableOptions) -> DriverResult<()> {
        let sql = self.dialect.drop_table(table, options.if_exists);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    pub async fn rename_table(&mut self, table: &str, new_name: &str) -> DriverResult<()> {
        let sql = self.dialect.rename_table(table, new_name);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    pub(super) async fn apply_foreign_keys<'a>(
        &mut self,
        bindings: impl IntoIterator<Item = &'a ForeignKeyBinding>,
    ) -> DriverResult<()> {
        for binding in bindings {
            let sql = self.dialect.foreign_key_binding(binding);
            self.run_sql(&sql, &[]).await?;
        }
        Ok(())
    }
}
