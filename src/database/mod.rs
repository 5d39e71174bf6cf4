/*!
 * Database module for persistent storage of reports and their translations.
 *
 * This module provides SQLite-based persistence for:
 * - The source report corpus, stored as JSON documents
 * - Per-language translation partitions with existence lookups and bulk writes
 * - Store traits the pipeline is written against
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;
pub mod store;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{InsertResult, ReportFilter, TranslatedReportRecord};
pub use repository::Repository;
pub use store::{ReportStore, TranslationStore};
