use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declared data type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnType {
    /// Base type name as the source database spells it (e.g. `varchar`).
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i32>,
}

impl ColumnType {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            length: None,
            precision: None,
            scale: None,
        }
    }

    pub fn with_length(mut self, length: i32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: i32, scale: Option<i32>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data_type)?;
        match (self.length, self.precision, self.scale) {
            (Some(length), _, _) => write!(f, "({length})"),
            (None, Some(precision), Some(scale)) => write!(f, "({precision},{scale})"),
            (None, Some(precision), None) => write!(f, "({precision})"),
            (None, None, _) => Ok(()),
        }
    }
}
