/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API over the report corpus and the
 * translation partitions, abstracting away the SQL details. It implements the
 * `ReportStore` and `TranslationStore` seams used by the pipeline.
 */

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{debug, warn};
use rusqlite::{params, params_from_iter};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::StoreError;
use crate::report::{Report, ReportNumber, TranslatedReport};

use super::connection::DatabaseConnection;
use super::models::{InsertResult, ReportFilter, TranslatedReportRecord};
use super::store::{ReportStore, TranslationStore};

/// Upper bound on bound parameters per `IN (...)` query
const MAX_IN_PARAMS: usize = 500;

/// Repository for database operations
#[derive(Clone, Debug)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a repository backed by the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection handle
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Map a translatable field name to its column
    fn column_for(field: &str) -> Result<&'static str> {
        match field {
            "text" => Ok("text"),
            "title" => Ok("title"),
            other => Err(anyhow!("Field '{}' is not stored in translation partitions", other)),
        }
    }

    /// Build `?,?,?` for an `IN` clause
    fn placeholders(count: usize) -> String {
        vec!["?"; count].join(",")
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Insert or replace source reports (used for seeding, never by a run)
    pub async fn insert_reports(&self, reports: Vec<Report>) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .transaction_async(move |tx| {
                let mut written = 0;
                for report in reports {
                    let document = serde_json::to_string(&report)
                        .with_context(|| format!("Failed to encode report {}", report.report_number))?;
                    written += tx.execute(
                        r#"
                        INSERT INTO reports (report_number, document, created_at, updated_at)
                        VALUES (?1, ?2, ?3, ?3)
                        ON CONFLICT(report_number) DO UPDATE SET
                            document = excluded.document,
                            updated_at = excluded.updated_at
                        "#,
                        params![report.report_number.key(), document, now],
                    )?;
                }
                Ok(written)
            })
            .await
    }

    /// Load reports matching the filter, in insertion order
    pub async fn get_reports(&self, filter: ReportFilter) -> Result<Vec<Report>> {
        self.db
            .execute_async(move |conn| {
                let documents: Vec<String> = match filter {
                    ReportFilter::All => {
                        let mut stmt = conn.prepare("SELECT document FROM reports ORDER BY rowid")?;
                        let rows = stmt.query_map([], |row| row.get(0))?;
                        rows.collect::<rusqlite::Result<Vec<String>>>()?
                    }
                    ReportFilter::Numbers(numbers) => {
                        let keys: Vec<String> = numbers.iter().map(ReportNumber::key).collect();
                        let mut documents = Vec::with_capacity(keys.len());
                        for chunk in keys.chunks(MAX_IN_PARAMS) {
                            let sql = format!(
                                "SELECT document FROM reports WHERE report_number IN ({}) ORDER BY rowid",
                                Self::placeholders(chunk.len())
                            );
                            let mut stmt = conn.prepare(&sql)?;
                            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| row.get(0))?;
                            documents.extend(rows.collect::<rusqlite::Result<Vec<String>>>()?);
                        }
                        documents
                    }
                };

                documents
                    .iter()
                    .map(|document| {
                        serde_json::from_str::<Report>(document)
                            .with_context(|| format!("Failed to decode stored report: {}", document))
                    })
                    .collect()
            })
            .await
    }

    // =========================================================================
    // Translation Partition Operations
    // =========================================================================

    /// Keys among `keys` whose `language` record has every required column set
    pub async fn get_translated_keys(
        &self,
        language: &str,
        keys: Vec<String>,
        required_fields: &[&str],
    ) -> Result<Vec<String>> {
        let language = language.to_string();
        let conditions = required_fields
            .iter()
            .map(|field| Self::column_for(field).map(|column| format!(" AND {} IS NOT NULL", column)))
            .collect::<Result<String>>()?;

        self.db
            .execute_async(move |conn| {
                let mut found = Vec::new();
                for chunk in keys.chunks(MAX_IN_PARAMS) {
                    let sql = format!(
                        "SELECT DISTINCT report_number FROM translated_reports WHERE language = ? AND report_number IN ({}){}",
                        Self::placeholders(chunk.len()),
                        conditions
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let params = std::iter::once(&language).chain(chunk.iter());
                    let rows = stmt.query_map(params_from_iter(params), |row| row.get::<_, String>(0))?;
                    found.extend(rows.collect::<rusqlite::Result<Vec<String>>>()?);
                }
                Ok(found)
            })
            .await
    }

    /// Append records to their partitions
    ///
    /// Rows are written independently: a row that fails is logged and skipped,
    /// and the returned count covers only the rows actually written.
    pub async fn insert_translated_records(&self, records: Vec<TranslatedReportRecord>) -> Result<usize> {
        self.db
            .transaction_async(move |tx| {
                let mut stmt = tx.prepare(
                    r#"
                    INSERT INTO translated_reports
                        (language, report_number, report_number_is_text, text, title, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )?;

                let mut inserted = 0;
                for record in &records {
                    match stmt.execute(params![
                        record.language,
                        record.report_number,
                        record.report_number_is_text,
                        record.text,
                        record.title,
                        record.created_at,
                    ]) {
                        Ok(count) => inserted += count,
                        Err(e) => warn!(
                            "Skipping translated report {} for [{}]: {}",
                            record.report_number, record.language, e
                        ),
                    }
                }
                Ok(inserted)
            })
            .await
    }

    /// All records of one partition, oldest first
    pub async fn get_translated_records(&self, language: &str) -> Result<Vec<TranslatedReportRecord>> {
        let language = language.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, language, report_number, report_number_is_text, text, title, created_at
                    FROM translated_reports
                    WHERE language = ?1
                    ORDER BY id
                    "#,
                )?;

                let rows = stmt.query_map([&language], |row| {
                    Ok(TranslatedReportRecord {
                        id: row.get(0)?,
                        language: row.get(1)?,
                        report_number: row.get(2)?,
                        report_number_is_text: row.get(3)?,
                        text: row.get(4)?,
                        title: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?;

                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }

    /// Number of records in one partition
    pub async fn get_translated_count(&self, language: &str) -> Result<usize> {
        let language = language.to_string();

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM translated_reports WHERE language = ?1",
                    [&language],
                    |row| row.get(0),
                )?;
                Ok(count as usize)
            })
            .await
    }
}

#[async_trait]
impl ReportStore for Repository {
    async fn find_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        self.get_reports(filter.clone())
            .await
            .map_err(|e| StoreError::Query(format!("{:#}", e)))
    }
}

#[async_trait]
impl TranslationStore for Repository {
    async fn find_translated(
        &self,
        language: &str,
        ids: &[ReportNumber],
        required_fields: &[&str],
    ) -> Result<Vec<ReportNumber>, StoreError> {
        let keys = ids.iter().map(ReportNumber::key).collect();
        let found = self
            .get_translated_keys(language, keys, required_fields)
            .await
            .map_err(|e| StoreError::Query(format!("{:#}", e)))?;

        debug!("Found {} complete translations for [{}]", found.len(), language);
        let found: HashSet<String> = found.into_iter().collect();
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| {
                let key = id.key();
                found.contains(&key) && seen.insert(key)
            })
            .cloned()
            .collect())
    }

    async fn insert_translated(
        &self,
        language: &str,
        reports: &[TranslatedReport],
    ) -> Result<InsertResult, StoreError> {
        let records: Vec<TranslatedReportRecord> = reports
            .iter()
            .map(|report| TranslatedReportRecord::from_translated(report, language))
            .collect();
        let submitted = records.len();

        let inserted_count = self
            .insert_translated_records(records)
            .await
            .map_err(|e| StoreError::Write(format!("{:#}", e)))?;

        Ok(InsertResult {
            inserted_count,
            rejected_count: submitted.saturating_sub(inserted_count),
        })
    }

    async fn count_translated(&self, language: &str) -> Result<usize, StoreError> {
        self.get_translated_count(language)
            .await
            .map_err(|e| StoreError::Query(format!("{:#}", e)))
    }
}
