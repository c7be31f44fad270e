//! Schema descriptions handed to the driver
//!
//! These are the abstract inputs of every DDL operation: column specs, table
//! specs (bare column maps or maps with table options), foreign keys and
//! index columns. All of them deserialize from the JSON shapes migration
//! files use, and all of them can be built in code.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::types::{deserialize_present_default, DataType, DefaultValue, ReferentialAction};

/// Abstract column specification
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub not_null: Option<bool>,
    pub null: Option<bool>,
    /// `Some(false)` asks `change_column` to drop an existing unique index
    pub unique: Option<bool>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default, deserialize_with = "deserialize_present_default")]
    pub default_value: Option<DefaultValue>,
    pub on_update: Option<String>,
    pub comment: Option<String>,
    pub foreign_key: Option<ForeignKeySpec>,
}

impl ColumnSpec {
    pub fn new(data_type: impl Into<DataType>) -> Self {
        Self {
            data_type: data_type.into(),
            length: None,
            precision: None,
            scale: None,
            not_null: None,
            null: None,
            unique: None,
            primary_key: false,
            auto_increment: false,
            unsigned: false,
            default_value: None,
            on_update: None,
            comment: None,
            foreign_key: None,
        }
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn precision_scale(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = Some(true);
        self
    }

    /// Explicitly nullable (`notNull: false`)
    pub fn nullable(mut self) -> Self {
        self.not_null = Some(false);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    /// Marks the column as no longer unique (`unique: false`)
    pub fn not_unique(mut self) -> Self {
        self.unique = Some(false);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn on_update(mut self, expression: impl Into<String>) -> Self {
        self.on_update = Some(expression.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKeySpec) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }
}

impl From<DataType> for ColumnSpec {
    fn from(data_type: DataType) -> Self {
        ColumnSpec::new(data_type)
    }
}

impl From<&str> for ColumnSpec {
    fn from(tag: &str) -> Self {
        ColumnSpec::new(tag)
    }
}

/// A column given either as a bare type tag or as a full spec
#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnInput {
    Tag(DataType),
    Spec(ColumnSpec),
}

impl From<ColumnInput> for ColumnSpec {
    fn from(input: ColumnInput) -> Self {
        match input {
            ColumnInput::Tag(data_type) => ColumnSpec::new(data_type),
            ColumnInput::Spec(spec) => spec,
        }
    }
}

/// Ordered column map; declaration order is the order of the table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    entries: Vec<(String, ColumnSpec)>,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style)
    pub fn column(mut self, name: impl Into<String>, spec: impl Into<ColumnSpec>) -> Self {
        self.push(name, spec);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, spec: impl Into<ColumnSpec>) {
        self.entries.push((name.into(), spec.into()));
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.entries
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the columns flagged as primary key, in declaration order
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, spec)| spec.primary_key)
            .map(|(name, _)| name)
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Columns
where
    K: Into<String>,
    V: Into<ColumnSpec>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut columns = Columns::new();
        for (name, spec) in iter {
            columns.push(name, spec);
        }
        columns
    }
}

impl<'de> Deserialize<'de> for Columns {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = Columns;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column names to column specs")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut columns = Columns::new();
                while let Some((name, input)) = map.next_entry::<String, ColumnInput>()? {
                    columns.push(name, ColumnSpec::from(input));
                }
                Ok(columns)
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}

/// Columns plus MySQL table options
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOptions {
    pub columns: Columns,
    pub engine: Option<String>,
    pub row_format: Option<String>,
    pub collate: Option<String>,
    pub charset: Option<String>,
    #[serde(default)]
    pub if_not_exists: bool,
}

impl TableOptions {
    pub fn new(columns: Columns) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn row_format(mut self, row_format: impl Into<String>) -> Self {
        self.row_format = Some(row_format.into());
        self
    }

    pub fn collate(mut self, collate: impl Into<String>) -> Self {
        self.collate = Some(collate.into());
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

/// What `create_table` receives: a bare column map or a map with options.
///
/// A JSON object carrying a `columns` key is read as options; any other
/// object is a bare column map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TableSpec {
    Options(TableOptions),
    Columns(Columns),
}

impl TableSpec {
    pub fn columns(&self) -> &Columns {
        match self {
            TableSpec::Options(options) => &options.columns,
            TableSpec::Columns(columns) => columns,
        }
    }

    pub fn options(&self) -> Option<&TableOptions> {
        match self {
            TableSpec::Options(options) => Some(options),
            TableSpec::Columns(_) => None,
        }
    }

    pub fn if_not_exists(&self) -> bool {
        self.options().map_or(false, |options| options.if_not_exists)
    }
}

impl From<Columns> for TableSpec {
    fn from(columns: Columns) -> Self {
        TableSpec::Columns(columns)
    }
}

impl From<TableOptions> for TableSpec {
    fn from(options: TableOptions) -> Self {
        TableSpec::Options(options)
    }
}

/// Foreign key reference attached to a column or added explicitly
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForeignKeySpec {
    pub name: String,
    pub table: String,
    pub mapping: ForeignKeyMapping,
    #[serde(default)]
    pub rules: ForeignKeyRules,
}

impl ForeignKeySpec {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        mapping: impl Into<ForeignKeyMapping>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            mapping: mapping.into(),
            rules: ForeignKeyRules::default(),
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.rules.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.rules.on_update = action;
        self
    }
}

/// Local to referenced column mapping
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignKeyMapping {
    /// The owning column references this column
    Column(String),
    /// Explicit local → referenced pairs, in order
    Columns(Vec<(String, String)>),
}

impl ForeignKeyMapping {
    /// Resolve into explicit pairs, using `column` as the local side of a
    /// single-column mapping
    pub fn resolve(&self, column: &str) -> Vec<(String, String)> {
        match self {
            ForeignKeyMapping::Column(referenced) => vec![(column.to_string(), referenced.clone())],
            ForeignKeyMapping::Columns(pairs) => pairs.clone(),
        }
    }
}

impl From<&str> for ForeignKeyMapping {
    fn from(referenced: &str) -> Self {
        ForeignKeyMapping::Column(referenced.to_string())
    }
}

impl From<String> for ForeignKeyMapping {
    fn from(referenced: String) -> Self {
        ForeignKeyMapping::Column(referenced)
    }
}

impl<K, V> From<Vec<(K, V)>> for ForeignKeyMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        ForeignKeyMapping::Columns(
            pairs
                .into_iter()
                .map(|(local, referenced)| (local.into(), referenced.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ForeignKeyMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = ForeignKeyMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a referenced column name or a map of local to referenced columns")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ForeignKeyMapping::Column(value.to_string()))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::new();
                while let Some(pair) = map.next_entry::<String, String>()? {
                    pairs.push(pair);
                }
                Ok(ForeignKeyMapping::Columns(pairs))
            }
        }

        deserializer.deserialize_any(MappingVisitor)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyRules {
    #[serde(default)]
    pub on_delete: ReferentialAction,
    #[serde(default)]
    pub on_update: ReferentialAction,
}

/// A column taking part in an index, optionally with a prefix length
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IndexColumn {
    Name(String),
    Prefix { name: String, length: Option<u32> },
}

impl IndexColumn {
    pub fn prefix(name: impl Into<String>, length: u32) -> Self {
        IndexColumn::Prefix {
            name: name.into(),
            length: Some(length),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            IndexColumn::Name(name) | IndexColumn::Prefix { name, .. } => name,
        }
    }

    pub fn length(&self) -> Option<u32> {
        match self {
            IndexColumn::Name(_) => None,
            IndexColumn::Prefix { length, .. } => *length,
        }
    }
}

impl From<&str> for IndexColumn {
    fn from(name: &str) -> Self {
        IndexColumn::Name(name.to_string())
    }
}

impl From<String> for IndexColumn {
    fn from(name: String) -> Self {
        IndexColumn::Name(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTableOptions {
    #[serde(default)]
    pub if_exists: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseOptions {
    #[serde(default)]
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropDatabaseOptions {
    #[serde(default)]
    pub if_exists: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveForeignKeyOptions {
    /// Also drop the index MySQL created for the key
    #[serde(default)]
    pub drop_index: bool,
}
