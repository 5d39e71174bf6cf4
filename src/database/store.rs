/*!
 * Store interfaces used by the translation pipeline.
 *
 * The pipeline only reads the source corpus and only appends to the
 * per-language translation partitions. Keeping these seams as traits lets the
 * pipeline run against SQLite in production and against fault-injecting stores
 * in tests.
 */

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::report::{Report, ReportNumber, TranslatedReport};

use super::models::{InsertResult, ReportFilter};

/// Read access to the canonical report corpus
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Load every report matching the filter
    async fn find_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError>;
}

/// Per-language persistent collections of translated reports
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Report numbers among `ids` whose stored record in the `language`
    /// partition has a value for every field in `required_fields`
    async fn find_translated(
        &self,
        language: &str,
        ids: &[ReportNumber],
        required_fields: &[&str],
    ) -> Result<Vec<ReportNumber>, StoreError>;

    /// Bulk write into the `language` partition
    async fn insert_translated(
        &self,
        language: &str,
        reports: &[TranslatedReport],
    ) -> Result<InsertResult, StoreError>;

    /// Number of records in the `language` partition
    async fn count_translated(&self, language: &str) -> Result<usize, StoreError>;
}
