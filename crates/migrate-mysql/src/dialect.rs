//! MySQL dialect - type mapping, column clauses and DDL statement text
//!
//! Everything here is pure string building. The driver decides when and in
//! which order the statements run.

use crate::schema::{
    ColumnSpec, Columns, ForeignKeyRules, ForeignKeySpec, IndexColumn, TableOptions, TableSpec,
};
use crate::types::{DataType, DefaultValue};

/// Text and blob subtypes are picked by this length when none is given
pub const DEFAULT_TEXT_LENGTH: u32 = 1000;

const TINY_LIMIT: u32 = 256;
const REGULAR_LIMIT: u32 = 65_536;
const MEDIUM_LIMIT: u32 = 16_777_216;

/// Quoting and type mapping shared by every SQL dialect
pub trait GenericDialect {
    /// Quote an identifier with backticks, doubling embedded backticks
    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    /// Quote a string literal, doubling embedded single quotes
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Map a column's abstract type to dialect type syntax, without length
    fn map_data_type(&self, spec: &ColumnSpec) -> String;
}

/// Dialect-neutral mapping of the shared type tags
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseDialect;

impl GenericDialect for BaseDialect {
    fn map_data_type(&self, spec: &ColumnSpec) -> String {
        match &spec.data_type {
            DataType::Char => "CHAR".to_string(),
            DataType::String => "VARCHAR".to_string(),
            DataType::Text => "TEXT".to_string(),
            DataType::SmallInt => "SMALLINT".to_string(),
            DataType::BigInt => "BIGINT".to_string(),
            DataType::Integer => "INTEGER".to_string(),
            DataType::Real => "REAL".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::DateTime => "DATETIME".to_string(),
            DataType::Time => "TIME".to_string(),
            DataType::Blob => "BLOB".to_string(),
            DataType::Timestamp => "TIMESTAMP".to_string(),
            DataType::Binary => "BINARY".to_string(),
            DataType::Boolean => "BOOLEAN".to_string(),
            DataType::Decimal => "DECIMAL".to_string(),
            DataType::Json => "JSON".to_string(),
            DataType::Custom(tag) => tag.to_uppercase(),
        }
    }
}

/// A foreign key to apply once its column exists
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyBinding {
    pub table: String,
    pub column: String,
    pub spec: ForeignKeySpec,
}

impl ForeignKeyBinding {
    /// Local to referenced column pairs for this binding
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.spec.mapping.resolve(&self.column)
    }
}

/// A rendered column clause and the foreign key it asks for, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub sql: String,
    pub foreign_key: Option<ForeignKeyBinding>,
}

/// A rendered `CREATE TABLE` and the foreign keys to apply afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub sql: String,
    pub foreign_keys: Vec<ForeignKeyBinding>,
}

/// MySQL statement generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect {
    base: BaseDialect,
}

impl GenericDialect for MysqlDialect {
    fn map_data_type(&self, spec: &ColumnSpec) -> String {
        let length = match spec.length {
            Some(length) if length > 0 => length,
            _ => DEFAULT_TEXT_LENGTH,
        };

        match spec.data_type {
            DataType::Text => sized_type("TEXT", length),
            DataType::Blob => sized_type("BLOB", length),
            DataType::DateTime => "DATETIME".to_string(),
            DataType::Boolean => "TINYINT(1)".to_string(),
            DataType::Json => "JSON".to_string(),
            _ => self.base.map_data_type(spec),
        }
    }
}

fn sized_type(base: &str, length: u32) -> String {
    let prefix = if length > MEDIUM_LIMIT {
        "LONG"
    } else if length > REGULAR_LIMIT {
        "MEDIUM"
    } else if length > TINY_LIMIT {
        ""
    } else {
        "TINY"
    };
    format!("{}{}", prefix, base)
}

impl MysqlDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one column clause.
    ///
    /// `emit_primary_key` is false while a composite key is being built so
    /// that the key can be declared once at table level.
    pub fn column_definition(
        &self,
        table: &str,
        name: &str,
        spec: &ColumnSpec,
        emit_primary_key: bool,
    ) -> ColumnDefinition {
        let mut parts = vec![self.quote_ident(name), self.type_with_length(spec)];

        if spec.unsigned {
            parts.push("UNSIGNED".to_string());
        }
        if spec.primary_key && emit_primary_key {
            parts.push("PRIMARY KEY".to_string());
        }
        if spec.auto_increment {
            parts.push("AUTO_INCREMENT".to_string());
        }
        if spec.not_null == Some(true) {
            parts.push("NOT NULL".to_string());
        }
        if spec.unique == Some(true) {
            parts.push("UNIQUE".to_string());
        }
        if let Some(expression) = spec.on_update.as_deref() {
            if is_current_timestamp(expression) {
                parts.push(format!("ON UPDATE {}", expression));
            }
        }
        if spec.null == Some(true) || spec.not_null == Some(false) {
            parts.push("NULL".to_string());
        }
        if let Some(default) = &spec.default_value {
            parts.push(format!("DEFAULT {}", self.default_value_sql(default)));
        }
        if let Some(comment) = spec.comment.as_deref().filter(|c| !c.is_empty()) {
            parts.push(format!("COMMENT {}", self.quote_string(comment)));
        }

        ColumnDefinition {
            sql: parts.join(" "),
            foreign_key: spec.foreign_key.clone().map(|spec| ForeignKeyBinding {
                table: table.to_string(),
                column: name.to_string(),
                spec,
            }),
        }
    }

    fn type_with_length(&self, spec: &ColumnSpec) -> String {
        let data_type = self.map_data_type(spec);

        let length = match spec.data_type {
            // A scale of 0 is still emitted.
            DataType::Decimal => match (spec.precision, spec.scale) {
                (Some(precision), Some(scale)) => format!("({},{})", precision, scale),
                _ => String::new(),
            },
            DataType::Text | DataType::Blob => String::new(),
            _ => match spec.length {
                Some(length) if length > 0 => format!("({})", length),
                _ if data_type == "VARCHAR" => "(255)".to_string(),
                _ => String::new(),
            },
        };

        format!("{}{}", data_type, length)
    }

    /// Render a default value; only `CURRENT_TIMESTAMP` expressions stay unquoted
    pub fn default_value_sql(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Str(s) if is_current_timestamp(s) => s.clone(),
            DefaultValue::Str(s) => self.quote_string(s),
            DefaultValue::Number(n) => n.to_string(),
            DefaultValue::Bool(b) => b.to_string(),
            DefaultValue::Null => "NULL".to_string(),
        }
    }

    /// Render the trailing table options in MySQL's accepted order
    pub fn table_options_sql(&self, options: &TableOptions) -> String {
        let mut parts = Vec::new();
        if let Some(engine) = &options.engine {
            parts.push(format!("ENGINE {}", engine));
        }
        if let Some(row_format) = &options.row_format {
            parts.push(format!("ROW_FORMAT {}", row_format));
        }
        if let Some(collate) = &options.collate {
            parts.push(format!("COLLATE {}", self.quote_string(collate)));
        }
        if let Some(charset) = &options.charset {
            parts.push(format!("CHARACTER SET {}", charset));
        }
        parts.join(" ")
    }

    pub fn create_table(&self, table: &str, spec: &TableSpec) -> CreateTable {
        let columns = spec.columns();
        let primary_keys = columns.primary_key_columns();
        let composite = primary_keys.len() > 1;

        let mut definitions = Vec::with_capacity(columns.len());
        let mut foreign_keys = Vec::new();
        for (name, column) in columns.iter() {
            let definition = self.column_definition(table, name, column, !composite);
            definitions.push(definition.sql);
            foreign_keys.extend(definition.foreign_key);
        }
        if composite {
            definitions.push(format!("PRIMARY KEY ({})", self.ident_list(primary_keys)));
        }

        let mut sql = format!(
            "CREATE TABLE {}{} ({})",
            if spec.if_not_exists() { "IF NOT EXISTS " } else { "" },
            self.quote_ident(table),
            definitions.join(", ")
        );
        if let Some(options) = spec.options() {
            let options = self.table_options_sql(options);
            if !options.is_empty() {
                sql.push(' ');
                sql.push_str(&options);
            }
        }

        CreateTable { sql, foreign_keys }
    }

    pub fn drop_table(&self, table: &str, if_exists: bool) -> String {
        format!(
            "DROP TABLE {}{}",
            if if_exists { "IF EXISTS " } else { "" },
            self.quote_ident(table)
        )
    }

    pub fn rename_table(&self, table: &str, new_name: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.quote_ident(table),
            self.quote_ident(new_name)
        )
    }

    pub fn add_column(&self, table: &str, column: &str, spec: &ColumnSpec) -> ColumnDefinition {
        let definition = self.column_definition(table, column, spec, true);
        ColumnDefinition {
            sql: format!("ALTER TABLE {} ADD COLUMN {}", self.quote_ident(table), definition.sql),
            foreign_key: definition.foreign_key,
        }
    }

    pub fn remove_column(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_ident(table),
            self.quote_ident(column)
        )
    }

    /// Lookup of a column's full type, bound as (table, column)
    pub fn column_type_query(&self) -> &'static str {
        "SELECT COLUMN_TYPE FROM INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?"
    }

    pub fn rename_column(&self, table: &str, old_name: &str, new_name: &str, column_type: &str) -> String {
        format!(
            "ALTER TABLE {} CHANGE {} {} {}",
            self.quote_ident(table),
            self.quote_ident(old_name),
            self.quote_ident(new_name),
            column_type
        )
    }

    pub fn change_column(&self, table: &str, column: &str, spec: &ColumnSpec) -> ColumnDefinition {
        let definition = self.column_definition(table, column, spec, true);
        ColumnDefinition {
            sql: format!(
                "ALTER TABLE {} CHANGE COLUMN {} {}",
                self.quote_ident(table),
                self.quote_ident(column),
                definition.sql
            ),
            foreign_key: definition.foreign_key,
        }
    }

    pub fn add_index(&self, table: &str, index: &str, columns: &[IndexColumn], unique: bool) -> String {
        let columns = columns
            .iter()
            .map(|column| match column.length() {
                Some(length) => format!("{}({})", self.quote_ident(column.name()), length),
                None => self.quote_ident(column.name()),
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "ALTER TABLE {} ADD {}INDEX {} ({})",
            self.quote_ident(table),
            if unique { "UNIQUE " } else { "" },
            self.quote_ident(index),
            columns
        )
    }

    pub fn remove_index(&self, table: &str, index: &str) -> String {
        format!("DROP INDEX {} ON {}", self.quote_ident(index), self.quote_ident(table))
    }

    pub fn add_foreign_key(
        &self,
        table: &str,
        referenced_table: &str,
        key: &str,
        pairs: &[(String, String)],
        rules: &ForeignKeyRules,
    ) -> String {
        let (local, referenced): (Vec<&str>, Vec<&str>) = pairs
            .iter()
            .map(|(local, referenced)| (local.as_str(), referenced.as_str()))
            .unzip();

        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
            self.quote_ident(table),
            self.quote_ident(key),
            self.ident_list(local),
            self.quote_ident(referenced_table),
            self.ident_list(referenced),
            rules.on_delete.as_sql(),
            rules.on_update.as_sql()
        )
    }

    /// Statement for a binding produced by a column definition
    pub fn foreign_key_binding(&self, binding: &ForeignKeyBinding) -> String {
        self.add_foreign_key(
            &binding.table,
            &binding.spec.table,
            &binding.spec.name,
            &binding.pairs(),
            &binding.spec.rules,
        )
    }

    pub fn remove_foreign_key(&self, table: &str, key: &str) -> String {
        format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.quote_ident(table),
            self.quote_ident(key)
        )
    }

    /// Index MySQL created implicitly for a foreign key
    pub fn drop_key_index(&self, table: &str, key: &str) -> String {
        format!(
            "ALTER TABLE {} DROP INDEX {}",
            self.quote_ident(table),
            self.quote_ident(key)
        )
    }

    pub fn create_database(&self, name: &str, if_not_exists: bool) -> String {
        format!(
            "CREATE DATABASE {}{}",
            if if_not_exists { "IF NOT EXISTS " } else { "" },
            self.quote_ident(name)
        )
    }

    pub fn drop_database(&self, name: &str, if_exists: bool) -> String {
        format!(
            "DROP DATABASE {}{}",
            if if_exists { "IF EXISTS " } else { "" },
            self.quote_ident(name)
        )
    }

    pub fn switch_database(&self, name: &str) -> String {
        format!("USE {}", self.quote_ident(name))
    }

    /// Schema of the migrations and seeds bookkeeping tables
    pub fn bookkeeping_columns(&self) -> Columns {
        Columns::new()
            .column(
                "id",
                ColumnSpec::new(DataType::Integer)
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .column("name", ColumnSpec::new(DataType::String).length(255).not_null())
            .column("run_on", ColumnSpec::new(DataType::DateTime).not_null())
    }

    pub fn insert(&self, table: &str, columns: &[&str]) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quote_ident(table),
            self.ident_list(columns.iter().copied()),
            vec!["?"; columns.len()].join(", ")
        )
    }

    fn ident_list<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> String {
        names
            .into_iter()
            .map(|name| self.quote_ident(name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn is_current_timestamp(expression: &str) -> bool {
    expression
        .get(..17)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("CURRENT_TIMESTAMP"))
}
