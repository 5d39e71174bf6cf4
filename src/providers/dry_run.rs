use async_trait::async_trait;

use crate::errors::BackendError;
use crate::providers::TranslationBackend;

/// Backend that fabricates translations without any network access
///
/// Every input `s` becomes `translated-<lang>-<s>`, which makes runs
/// reproducible and easy to assert on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunBackend;

impl DryRunBackend {
    /// The fabricated translation of one string
    pub fn fabricate(text: &str, target_language: &str) -> String {
        format!("translated-{}-{}", target_language, text)
    }
}

#[async_trait]
impl TranslationBackend for DryRunBackend {
    async fn translate(
        &self,
        payload: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        Ok(payload
            .iter()
            .map(|text| Self::fabricate(text, target_language))
            .collect())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
