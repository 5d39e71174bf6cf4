use std::sync::Arc;

use crate::errors::BackendError;
use crate::report::{Report, TranslatedReport, TRANSLATABLE_FIELDS};

use super::adapter::TranslationAdapter;

/// Translates the translatable fields of one report in a single backend call
#[derive(Debug, Clone)]
pub struct ReportTranslator {
    adapter: Arc<TranslationAdapter>,
}

impl ReportTranslator {
    /// Create a translator over a shared adapter
    pub fn new(adapter: Arc<TranslationAdapter>) -> Self {
        Self { adapter }
    }

    /// The adapter in use
    pub fn adapter(&self) -> &TranslationAdapter {
        &self.adapter
    }

    /// Translate `report` into `target_language`
    ///
    /// The source report is never modified. Field values are batched in
    /// `TRANSLATABLE_FIELDS` order and written back positionally; when the
    /// adapter keeps a short response, the fields past its end keep their
    /// source text.
    pub async fn translate_report(
        &self,
        report: &Report,
        target_language: &str,
    ) -> Result<TranslatedReport, BackendError> {
        let mut translated = TranslatedReport::from_source(report, target_language);

        let payload: Vec<String> = TRANSLATABLE_FIELDS
            .iter()
            .map(|field| report.translatable_value(field))
            .collect();

        let translations = self.adapter.translate(&payload, target_language).await?;

        for (field, value) in TRANSLATABLE_FIELDS.iter().zip(translations) {
            translated.fields.insert((*field).to_string(), value.into());
        }

        Ok(translated)
    }
}
