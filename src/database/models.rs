/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database rows and to the arguments and
 * results of the store operations.
 */

use serde::{Deserialize, Serialize};

use crate::report::{ReportNumber, TranslatedReport};

/// Selection of source reports
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ReportFilter {
    /// The whole corpus
    #[default]
    All,
    /// Only the listed reports
    Numbers(Vec<ReportNumber>),
}

/// Result of a bulk write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertResult {
    /// Number of records actually written
    pub inserted_count: usize,
    /// Records the store refused
    pub rejected_count: usize,
}

impl InsertResult {
    /// Every submitted record was written
    pub fn is_complete(&self) -> bool {
        self.rejected_count == 0
    }
}

/// Row of the `translated_reports` table
///
/// Only the translatable fields and the join key are persisted; passthrough
/// fields stay in the source corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedReportRecord {
    /// Database ID
    pub id: Option<i64>,
    /// Partition key
    pub language: String,
    /// Canonical report number key
    pub report_number: String,
    /// The source identifier was a string
    pub report_number_is_text: bool,
    /// Translated body text
    pub text: Option<String>,
    /// Translated title
    pub title: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl TranslatedReportRecord {
    /// Project a translated report onto its persisted columns
    pub fn from_translated(report: &TranslatedReport, language: &str) -> Self {
        let column = |name: &str| match report.fields.get(name) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self {
            id: None,
            language: language.to_string(),
            report_number: report.report_number.key(),
            report_number_is_text: report.report_number.is_text(),
            text: column("text"),
            title: column("title"),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Whether every translatable column holds a value
    pub fn is_complete(&self) -> bool {
        self.text.is_some() && self.title.is_some()
    }

    /// Convert back into a translated report
    pub fn into_translated(self) -> TranslatedReport {
        let mut fields = serde_json::Map::new();
        if let Some(text) = self.text {
            fields.insert("text".to_string(), text.into());
        }
        if let Some(title) = self.title {
            fields.insert("title".to_string(), title.into());
        }

        TranslatedReport {
            report_number: ReportNumber::from_stored(&self.report_number, self.report_number_is_text),
            language: self.language,
            fields,
        }
    }
}
