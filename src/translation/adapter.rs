/*!
 * Translation backend adapter.
 *
 * The adapter is the single entry point the pipeline translates through. It
 * selects between the production backend and the offline dry-run backend once,
 * at construction, and enforces the batch-length contract on every response:
 *
 * - `ShortBatchPolicy::Reject`: any response whose length differs from the
 *   request fails with `BackendError::BatchLengthMismatch`.
 * - `ShortBatchPolicy::KeepSource`: the response is passed on as-is (extra
 *   entries dropped); callers overwrite only the fields that came back.
 */

use log::{debug, warn};
use std::sync::Arc;

use crate::app_config::{BackendConfig, ShortBatchPolicy};
use crate::errors::BackendError;
use crate::providers::dry_run::DryRunBackend;
use crate::providers::google::GoogleTranslate;
use crate::providers::TranslationBackend;

/// Order-preserving batch translation with an explicit length policy
#[derive(Debug, Clone)]
pub struct TranslationAdapter {
    /// Backend every call is delegated to
    backend: Arc<dyn TranslationBackend>,
    /// Whether the backend is the offline fabricator
    dry_run: bool,
    /// Handling of length mismatches
    short_batch_policy: ShortBatchPolicy,
}

impl TranslationAdapter {
    /// Adapter fabricating `translated-<lang>-<text>` without network access
    pub fn dry_run() -> Self {
        Self {
            backend: Arc::new(DryRunBackend),
            dry_run: true,
            short_batch_policy: ShortBatchPolicy::default(),
        }
    }

    /// Adapter delegating to a real backend
    pub fn production(backend: Arc<dyn TranslationBackend>) -> Self {
        Self {
            backend,
            dry_run: false,
            short_batch_policy: ShortBatchPolicy::default(),
        }
    }

    /// Build the adapter for a resolved dry-run flag
    pub fn from_config(dry_run: bool, backend: &BackendConfig) -> Self {
        if dry_run {
            Self::dry_run()
        } else {
            Self::production(Arc::new(GoogleTranslate::from_config(backend)))
        }
    }

    /// Set the length-mismatch policy
    pub fn with_short_batch_policy(mut self, policy: ShortBatchPolicy) -> Self {
        self.short_batch_policy = policy;
        self
    }

    /// Whether translations are fabricated
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Active length-mismatch policy
    pub fn short_batch_policy(&self) -> ShortBatchPolicy {
        self.short_batch_policy
    }

    /// Name of the backend in use
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Translate `payload` into `target_language`, preserving order
    pub async fn translate(
        &self,
        payload: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        if payload.is_empty() {
            return Ok(Vec::new());
        }

        let mut translations = self.backend.translate(payload, target_language).await?;
        debug!(
            "{} returned {} of {} strings for [{}]",
            self.backend.name(),
            translations.len(),
            payload.len(),
            target_language
        );

        if translations.len() == payload.len() {
            return Ok(translations);
        }

        match self.short_batch_policy {
            ShortBatchPolicy::Reject => Err(BackendError::BatchLengthMismatch {
                language: target_language.to_string(),
                expected: payload.len(),
                actual: translations.len(),
            }),
            ShortBatchPolicy::KeepSource => {
                warn!(
                    "{} returned {} strings for [{}], expected {}; keeping source text for the rest",
                    self.backend.name(),
                    translations.len(),
                    target_language,
                    payload.len()
                );
                translations.truncate(payload.len());
                Ok(translations)
            }
        }
    }
}
