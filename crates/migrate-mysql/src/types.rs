//! Shared column type tags, default values and referential actions
//!
//! The tags mirror the lower-case names used by migration files
//! (`"string"`, `"int"`, `"datetime"`, ...). Anything unrecognised is kept
//! as a custom tag and handed to the generic mapper untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use crate::error::DriverError;

/// Abstract column type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum DataType {
    Char,
    String,
    Text,
    SmallInt,
    BigInt,
    Integer,
    Real,
    Date,
    DateTime,
    Time,
    Blob,
    Timestamp,
    Binary,
    Boolean,
    Decimal,
    Json,
    /// Any tag the driver has no dedicated handling for
    Custom(String),
}

impl DataType {
    /// The tag as it appears in migration files
    pub fn tag(&self) -> &str {
        match self {
            DataType::Char => "char",
            DataType::String => "string",
            DataType::Text => "text",
            DataType::SmallInt => "smallint",
            DataType::BigInt => "bigint",
            DataType::Integer => "int",
            DataType::Real => "real",
            DataType::Date => "date",
            DataType::DateTime => "datetime",
            DataType::Time => "time",
            DataType::Blob => "blob",
            DataType::Timestamp => "timestamp",
            DataType::Binary => "binary",
            DataType::Boolean => "boolean",
            DataType::Decimal => "decimal",
            DataType::Json => "json",
            DataType::Custom(tag) => tag,
        }
    }
}

impl From<&str> for DataType {
    fn from(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "char" => DataType::Char,
            "string" => DataType::String,
            "text" => DataType::Text,
            "smallint" => DataType::SmallInt,
            "bigint" => DataType::BigInt,
            "int" | "integer" => DataType::Integer,
            "real" => DataType::Real,
            "date" => DataType::Date,
            "datetime" => DataType::DateTime,
            "time" => DataType::Time,
            "blob" => DataType::Blob,
            "timestamp" => DataType::Timestamp,
            "binary" => DataType::Binary,
            "boolean" => DataType::Boolean,
            "decimal" => DataType::Decimal,
            "json" => DataType::Json,
            _ => DataType::Custom(tag.to_string()),
        }
    }
}

impl From<String> for DataType {
    fn from(tag: String) -> Self {
        DataType::from(tag.as_str())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Column default value; the variant decides how it is rendered
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Quoted, unless it starts with `CURRENT_TIMESTAMP`
    Str(String),
    Number(serde_json::Number),
    Bool(bool),
    /// Explicit `DEFAULT NULL`
    Null,
}

impl DefaultValue {
    /// Whether this is an explicit SQL NULL default
    pub fn is_null(&self) -> bool {
        matches!(self, DefaultValue::Null)
    }
}

impl<'de> Deserialize<'de> for DefaultValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(DefaultValue::Null),
            JsonValue::Bool(b) => Ok(DefaultValue::Bool(b)),
            JsonValue::Number(n) => Ok(DefaultValue::Number(n)),
            JsonValue::String(s) => Ok(DefaultValue::Str(s)),
            other => Err(serde::de::Error::custom(format!(
                "unsupported default value: {}",
                other
            ))),
        }
    }
}

/// Keeps an explicit `null` apart from an absent field.
pub(crate) fn deserialize_present_default<'de, D>(
    deserializer: D,
) -> Result<Option<DefaultValue>, D::Error>
where
    D: Deserializer<'de>,
{
    DefaultValue::deserialize(deserializer).map(Some)
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Str(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::Str(value)
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Bool(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Number(value.into())
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Number(value.into())
    }
}

impl From<u64> for DefaultValue {
    fn from(value: u64) -> Self {
        DefaultValue::Number(value.into())
    }
}

impl From<serde_json::Number> for DefaultValue {
    fn from(value: serde_json::Number) -> Self {
        DefaultValue::Number(value)
    }
}

impl<T> From<Option<T>> for DefaultValue
where
    T: Into<DefaultValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DefaultValue::Null,
        }
    }
}

/// Foreign key `ON DELETE` / `ON UPDATE` action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ReferentialAction {
    Cascade,
    Restrict,
    SetNull,
    SetDefault,
    #[default]
    NoAction,
}

impl ReferentialAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

impl FromStr for ReferentialAction {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('_', " ");
        match normalized.as_str() {
            "CASCADE" => Ok(ReferentialAction::Cascade),
            "RESTRICT" => Ok(ReferentialAction::Restrict),
            "SET NULL" => Ok(ReferentialAction::SetNull),
            "SET DEFAULT" => Ok(ReferentialAction::SetDefault),
            "NO ACTION" => Ok(ReferentialAction::NoAction),
            _ => Err(DriverError::invalid_arguments(format!(
                "Unsupported referential action: {}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for ReferentialAction {
    type Error = DriverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
