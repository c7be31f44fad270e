use super::MysqlDriver;
use crate::backends::DatabaseConnection;
use crate::error::DriverResult;
use crate::schema::{CreateDatabaseOptions, DropDatabaseOptions};

impl<C: DatabaseConnection> MysqlDriver<C> {
    pub async fn create_database(&mut self, name: &str, options: CreateDatabaseOptions) -> DriverResult<()> {
        let sql = self.dialect.create_database(name, options.if_not_exists);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    pub async fn drop_database(&mut self, name: &str, options: DropDatabaseOptions) -> DriverResult<()> {
        let sql = self.dialect.drop_database(name, options.if_exists);
        self.run_sql(&sql, &[]).await?;
        Ok(())
    }

    /// Select the default schema; runs even in dry-run mode since later reads depend on it
    pub async fn switch_database(&mut self, name: &str) -> DriverResult<()> {
        let sql = self.dialect.switch_database(name);
        self.all(&sql, &[]).await?;
        Ok(())
    }
}
