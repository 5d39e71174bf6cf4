/*!
 * Pipeline orchestrator.
 *
 * A run opens the storage connection, loads the whole report corpus once and
 * fans out one task per target language into a bounded pool. Each language
 * task translates its delta and bulk-persists the new records into its own
 * partition. A failure in one language never stops the others; every
 * language's result ends up in the returned `RunSummary`.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::app_config::{Config, Language};
use crate::database::models::ReportFilter;
use crate::database::{DatabaseConnection, ReportStore, Repository, TranslationStore};
use crate::errors::StoreError;
use crate::report::Report;
use crate::reporter::{LogReporter, Reporter};

use super::adapter::TranslationAdapter;
use super::batch::{JobFailure, LanguageBatchTranslator};
use super::concurrency::PipelineOptions;
use super::report::ReportTranslator;

/// Where a run gets its storage connection from
#[derive(Debug, Clone)]
pub enum StorageTarget {
    /// Open the SQLite file at this path for the duration of the run
    Path(PathBuf),
    /// Share an already open connection
    Connection(DatabaseConnection),
}

impl StorageTarget {
    /// Acquire the connection for one run
    pub async fn open(&self) -> Result<StorageSession, StoreError> {
        let db = match self {
            Self::Path(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || DatabaseConnection::new(path))
                    .await
                    .map_err(|e| StoreError::Connection(e.to_string()))?
                    .map_err(|e| StoreError::Connection(format!("{:#}", e)))?
            }
            Self::Connection(db) => db.clone(),
        };

        debug!("Acquired storage connection {:?}", db.path());
        Ok(StorageSession {
            repository: Repository::new(db),
        })
    }
}

/// Storage held for the duration of one run; released when dropped
pub struct StorageSession {
    repository: Repository,
}

impl StorageSession {
    /// Repository over the session's connection
    pub fn repository(&self) -> &Repository {
        &self.repository
    }
}

impl Drop for StorageSession {
    fn drop(&mut self) {
        debug!("Released storage connection {:?}", self.repository.connection().path());
    }
}

/// Everything a run needs, fixed at construction
#[derive(Clone)]
pub struct PipelineContext {
    /// Backend adapter; also decides dry-run
    pub adapter: Arc<TranslationAdapter>,
    /// Storage connection source
    pub storage: StorageTarget,
    /// Configured target languages, in order
    pub languages: Vec<Language>,
    /// Progress sink
    pub reporter: Arc<dyn Reporter>,
    /// Pool ceilings and job timeout
    pub options: PipelineOptions,
}

impl PipelineContext {
    /// Context with default languages, options and a log reporter
    pub fn new(adapter: TranslationAdapter, storage: StorageTarget) -> Self {
        Self {
            adapter: Arc::new(adapter),
            storage,
            languages: Config::default().languages,
            reporter: Arc::new(LogReporter),
            options: PipelineOptions::default(),
        }
    }

    /// Build the context described by a configuration
    ///
    /// `dry_run` must already be resolved by the caller.
    pub fn from_config(config: &Config, dry_run: bool) -> anyhow::Result<Self> {
        let adapter = TranslationAdapter::from_config(dry_run, &config.backend)
            .with_short_batch_policy(config.pipeline.short_batch_policy);

        Ok(Self::new(adapter, StorageTarget::Path(config.database_path()?))
            .with_languages(config.languages.clone())
            .with_options(PipelineOptions::from_config(&config.pipeline)))
    }

    /// Replace the target languages
    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.languages = languages;
        self
    }

    /// Replace the progress sink
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replace the pool options
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options.effective();
        self
    }

    /// Whether the adapter fabricates translations
    pub fn dry_run(&self) -> bool {
        self.adapter.is_dry_run()
    }
}

/// What happened to one language during a run
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageOutcome {
    /// Language code
    pub language: String,
    /// Reports that needed no translation
    pub skipped: usize,
    /// Reports newly translated
    pub translated: usize,
    /// Records written to the partition
    pub stored: usize,
    /// Jobs that failed
    pub failures: Vec<JobFailure>,
    /// Language-level failure (existence query, bulk write or aborted task)
    pub error: Option<String>,
}

impl LanguageOutcome {
    fn failed(language: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            skipped: 0,
            translated: 0,
            stored: 0,
            failures: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// No language-level error and no failed job
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.failures.is_empty()
    }
}

/// Result of a whole run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Identifier of the run, repeated in progress lines
    pub run_id: Uuid,
    /// Whether translations were fabricated
    pub dry_run: bool,
    /// Size of the loaded corpus
    pub report_count: usize,
    /// One entry per language, in the order they were requested
    pub languages: Vec<LanguageOutcome>,
}

impl RunSummary {
    /// Reports translated across all languages
    pub fn total_translated(&self) -> usize {
        self.languages.iter().map(|l| l.translated).sum()
    }

    /// Records stored across all languages
    pub fn total_stored(&self) -> usize {
        self.languages.iter().map(|l| l.stored).sum()
    }

    /// Languages that hit a language-level error
    pub fn failed_languages(&self) -> Vec<&str> {
        self.languages
            .iter()
            .filter(|l| l.error.is_some())
            .map(|l| l.language.as_str())
            .collect()
    }

    /// Outcome of one language
    pub fn language(&self, code: &str) -> Option<&LanguageOutcome> {
        self.languages.iter().find(|l| l.language == code)
    }

    /// Every language and every job succeeded
    pub fn is_success(&self) -> bool {
        self.languages.iter().all(LanguageOutcome::is_success)
    }
}

/// Top-level driver of a translation run
#[derive(Clone)]
pub struct Pipeline {
    context: PipelineContext,
}

impl Pipeline {
    /// Create a pipeline
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    /// The pipeline's context
    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run for the configured languages
    pub async fn run_all(&self) -> Result<RunSummary, StoreError> {
        self.run(&self.context.languages).await
    }

    /// Translate the corpus into `languages` and persist the new records
    ///
    /// Fails only when the storage connection cannot be opened or the corpus
    /// cannot be read; both happen before any translation work.
    pub async fn run(&self, languages: &[Language]) -> Result<RunSummary, StoreError> {
        let run_id = Uuid::new_v4();
        let start_time = Instant::now();
        let options = self.context.options.effective();

        let session = self.context.storage.open().await?;
        let repository = session.repository().clone();

        let corpus: Arc<Vec<Report>> = Arc::new(repository.find_reports(&ReportFilter::All).await?);
        info!(
            "Run {}: {} reports, {} languages, dry-run: {}",
            run_id,
            corpus.len(),
            languages.len(),
            self.context.dry_run()
        );

        let store: Arc<dyn TranslationStore> = Arc::new(repository);
        let batch = LanguageBatchTranslator::new(
            ReportTranslator::new(self.context.adapter.clone()),
            store.clone(),
            options.into(),
        );

        let mut outcomes = stream::iter(languages.iter().cloned().enumerate())
            .map(|(index, language)| {
                let batch = batch.clone();
                let store = store.clone();
                let reporter = self.context.reporter.clone();
                let corpus = corpus.clone();

                async move {
                    let code = language.code.clone();
                    let handle = tokio::spawn(Self::translate_language(
                        batch,
                        store,
                        reporter.clone(),
                        corpus,
                        language,
                    ));

                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!("Language task for [{}] aborted: {}", code, e);
                            reporter.log(&format!("Translation to [{}] aborted: {}", code, e));
                            LanguageOutcome::failed(code, format!("language task aborted: {}", e))
                        }
                    };
                    (index, outcome)
                }
            })
            .buffer_unordered(options.language_concurrency)
            .collect::<Vec<_>>()
            .await;

        outcomes.sort_by_key(|(index, _)| *index);

        let summary = RunSummary {
            run_id,
            dry_run: self.context.dry_run(),
            report_count: corpus.len(),
            languages: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
        };

        let failed = summary.failed_languages();
        self.context.reporter.log(&format!(
            "Run {} finished in {:.1}s: stored {} new reports across {} languages ({} failed)",
            run_id,
            start_time.elapsed().as_secs_f64(),
            summary.total_stored(),
            summary.languages.len(),
            failed.len()
        ));

        drop(session);
        Ok(summary)
    }

    async fn translate_language(
        batch: LanguageBatchTranslator,
        store: Arc<dyn TranslationStore>,
        reporter: Arc<dyn Reporter>,
        corpus: Arc<Vec<Report>>,
        language: Language,
    ) -> LanguageOutcome {
        let code = language.code.as_str();
        reporter.log(&format!(
            "Translating incident reports for {} [{}]",
            language.display_name(),
            code
        ));

        let outcome = match batch.translate_incident_collection(&corpus, code).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Could not determine pending reports for [{}]: {}", code, e);
                reporter.log(&format!("Failed to translate incident reports to [{}]: {}", code, e));
                return LanguageOutcome::failed(code, e.to_string());
            }
        };

        if !outcome.failures.is_empty() {
            reporter.log(&format!(
                "{} reports failed to translate to [{}]",
                outcome.failures.len(),
                code
            ));
        }

        let mut result = LanguageOutcome {
            language: code.to_string(),
            skipped: outcome.skipped,
            translated: outcome.translated.len(),
            stored: 0,
            failures: outcome.failures,
            error: None,
        };

        if outcome.translated.is_empty() {
            reporter.log(&format!("No new incident reports need translation to [{}]", code));
            return result;
        }

        reporter.log(&format!("Translated {} new reports to [{}]", result.translated, code));

        match store.insert_translated(code, &outcome.translated).await {
            Ok(inserted) => {
                result.stored = inserted.inserted_count;
                reporter.log(&format!("Stored {} new reports to [{}]", result.stored, code));
                if !inserted.is_complete() {
                    error!(
                        "{} of {} translations were rejected by the store for [{}]",
                        inserted.rejected_count, result.translated, code
                    );
                    reporter.log(&format!(
                        "Failed to store {} new reports to [{}]",
                        inserted.rejected_count, code
                    ));
                    result.error = Some(format!(
                        "{} of {} translated reports could not be stored",
                        inserted.rejected_count, result.translated
                    ));
                }
            }
            Err(e) => {
                error!("Failed to store translations for [{}]: {}", code, e);
                reporter.log(&format!("Failed to store new reports to [{}]: {}", code, e));
                result.error = Some(e.to_string());
            }
        }

        result
    }
}
