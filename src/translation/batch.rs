/*!
 * Per-language batch translation.
 *
 * For one target language this module works out which reports still need a
 * translation, runs one job per pending report in a bounded pool and collects
 * the results. Every job runs in its own task behind a result-capturing
 * boundary, so a failing, stalled or panicking job is recorded and its
 * siblings carry on. The call returns only once every job has finished.
 */

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::database::TranslationStore;
use crate::errors::{JobError, StoreError};
use crate::report::{Report, ReportNumber, TranslatedReport, TRANSLATABLE_FIELDS};

use super::concurrency::PipelineOptions;
use super::report::ReportTranslator;

/// Inner pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Report jobs in flight at once
    pub concurrency: usize,
    /// Deadline for one job
    pub job_timeout: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(PipelineOptions::default())
    }
}

impl From<PipelineOptions> for BatchOptions {
    fn from(options: PipelineOptions) -> Self {
        Self {
            concurrency: options.report_concurrency.max(1),
            job_timeout: options.job_timeout,
        }
    }
}

/// A job that did not produce a translation
#[derive(Debug, Clone, PartialEq)]
pub struct JobFailure {
    /// Report the job was translating
    pub report_number: ReportNumber,
    /// Target language of the job
    pub language: String,
    /// Cause
    pub error: JobError,
}

/// Result of translating one language's delta
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Target language
    pub language: String,
    /// Reports passed in
    pub requested: usize,
    /// Reports not submitted: already translated, or a repeated report number
    pub skipped: usize,
    /// Newly translated reports, in completion order
    pub translated: Vec<TranslatedReport>,
    /// Jobs that failed
    pub failures: Vec<JobFailure>,
}

impl BatchOutcome {
    /// Number of jobs submitted to the pool
    pub fn submitted(&self) -> usize {
        self.translated.len() + self.failures.len()
    }

    /// Whether every submitted job succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Translates the not-yet-translated part of a corpus into one language
#[derive(Clone)]
pub struct LanguageBatchTranslator {
    translator: ReportTranslator,
    store: Arc<dyn TranslationStore>,
    options: BatchOptions,
}

impl LanguageBatchTranslator {
    /// Create a batch translator
    pub fn new(translator: ReportTranslator, store: Arc<dyn TranslationStore>, options: BatchOptions) -> Self {
        Self {
            translator,
            store,
            options,
        }
    }

    /// Inner pool settings
    pub fn options(&self) -> BatchOptions {
        self.options
    }

    /// Translate every report of `reports` that has no complete translation
    /// in the `language` partition yet
    ///
    /// Only the existence query can fail the call; job failures are returned
    /// in `BatchOutcome::failures`. Nothing is persisted here.
    pub async fn translate_incident_collection(
        &self,
        reports: &[Report],
        language: &str,
    ) -> Result<BatchOutcome, StoreError> {
        let ids: Vec<ReportNumber> = reports.iter().map(|r| r.report_number.clone()).collect();

        let done: HashSet<String> = self
            .store
            .find_translated(language, &ids, &TRANSLATABLE_FIELDS)
            .await?
            .iter()
            .map(ReportNumber::key)
            .collect();

        let mut queued = HashSet::new();
        let pending: Vec<Report> = reports
            .iter()
            .filter(|report| {
                let key = report.report_number.key();
                !done.contains(&key) && queued.insert(key)
            })
            .cloned()
            .collect();

        let skipped = reports.len() - pending.len();
        debug!(
            "[{}] {} reports pending, {} skipped, concurrency {}",
            language,
            pending.len(),
            skipped,
            self.options.concurrency
        );

        let start_time = Instant::now();
        let results = stream::iter(pending)
            .map(|report| {
                let translator = self.translator.clone();
                let language = language.to_string();
                let job_timeout = self.options.job_timeout;

                async move {
                    let report_number = report.report_number.clone();
                    let handle = tokio::spawn(async move {
                        Self::run_job(&translator, &report, &language, job_timeout).await
                    });

                    let result = match handle.await {
                        Ok(result) => result,
                        Err(e) => Err(JobError::Aborted(e.to_string())),
                    };
                    (report_number, result)
                }
            })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let mut translated = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (report_number, result) in results {
            match result {
                Ok(report) => translated.push(report),
                Err(error) => {
                    warn!("Failed to translate report {} to [{}]: {}", report_number, language, error);
                    failures.push(JobFailure {
                        report_number,
                        language: language.to_string(),
                        error,
                    });
                }
            }
        }

        debug!(
            "[{}] {} translated, {} failed in {:?}",
            language,
            translated.len(),
            failures.len(),
            start_time.elapsed()
        );

        Ok(BatchOutcome {
            language: language.to_string(),
            requested: reports.len(),
            skipped,
            translated,
            failures,
        })
    }

    async fn run_job(
        translator: &ReportTranslator,
        report: &Report,
        language: &str,
        job_timeout: Option<Duration>,
    ) -> Result<TranslatedReport, JobError> {
        let job = translator.translate_report(report, language);

        match job_timeout {
            Some(limit) => match tokio::time::timeout(limit, job).await {
                Ok(result) => result.map_err(JobError::from),
                Err(_) => Err(JobError::Timeout(limit)),
            },
            None => job.await.map_err(JobError::from),
        }
    }
}
