//! Metadata domain.
//!
//! Owns the `key: value` micro-format found in folder sidecar files and in the
//! leading comment block of documents.

pub mod extract;

pub use extract::{parse_line, parse_lines, MetadataExtractor};

use crate::types::OrderedMap;
use serde::{Deserialize, Serialize};

/// Extracted metadata, in file order.
pub type Metadata = OrderedMap<MetaValue>;

/// A metadata value: a single string, or a list when the raw value held commas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    /// Interpret a raw value. Commas split it into a trimmed list.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.contains(',') {
            MetaValue::List(raw.split(',').map(|part| part.trim().to_string()).collect())
        } else {
            MetaValue::Text(raw.to_string())
        }
    }

    /// Single-string form: lists are joined with `,`.
    pub fn joined(&self) -> String {
        match self {
            MetaValue::Text(text) => text.clone(),
            MetaValue::List(items) => items.join(","),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}
