/*!
 * Report data model.
 *
 * A report is an incident record identified by its `report_number` with an open
 * set of named fields. Only `text` and `title` are translated; every other field
 * is carried through untouched.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Fields sent to the translation backend, in batch order
pub const TRANSLATABLE_FIELDS: [&str; 2] = ["text", "title"];

/// Externally assigned report identifier
///
/// Source corpora use both numeric and string identifiers. Two identifiers are
/// the same report when their canonical keys match, so `1` and `"1"` join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportNumber {
    /// Numeric identifier
    Number(i64),
    /// String identifier
    Text(String),
}

impl ReportNumber {
    /// Canonical string form used for storage and comparison
    pub fn key(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Whether the identifier was given as a string
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Infer an identifier from a bare key
    ///
    /// Keys that print back as the same integer become numbers, so a string id
    /// such as `"7"` comes back as `7`. Use [`ReportNumber::from_stored`] when the
    /// original type was recorded.
    pub fn from_key(key: &str) -> Self {
        match key.parse::<i64>() {
            Ok(n) if n.to_string() == key => Self::Number(n),
            _ => Self::Text(key.to_string()),
        }
    }

    /// Rebuild an identifier from its key and recorded type
    pub fn from_stored(key: &str, is_text: bool) -> Self {
        if is_text {
            Self::Text(key.to_string())
        } else {
            Self::from_key(key)
        }
    }
}

impl fmt::Display for ReportNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ReportNumber {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ReportNumber {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ReportNumber {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A source-language incident report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Stable identifier
    pub report_number: ReportNumber,

    /// All other fields of the document
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Report {
    /// Create a report with no fields
    pub fn new(report_number: impl Into<ReportNumber>) -> Self {
        Self {
            report_number: report_number.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field as text, if it is a string
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Text sent to the backend for a translatable field
    ///
    /// Absent fields translate as empty strings so the stored copy is always
    /// complete. Non-string values are sent in their JSON rendering.
    pub fn translatable_value(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// A report copy whose translatable fields hold target-language text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedReport {
    /// Identifier of the source report
    pub report_number: ReportNumber,

    /// Target language code
    pub language: String,

    /// Fields of the copy, translated and passed-through alike
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TranslatedReport {
    /// Start a translated copy from a deep clone of the source report
    pub fn from_source(report: &Report, language: impl Into<String>) -> Self {
        Self {
            report_number: report.report_number.clone(),
            language: language.into(),
            fields: report.fields.clone(),
        }
    }

    /// Get a field as text, if it is a string
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Translated body text
    pub fn text(&self) -> Option<&str> {
        self.field_str("text")
    }

    /// Translated title
    pub fn title(&self) -> Option<&str> {
        self.field_str("title")
    }
}
