/*!
 * Translation backend implementations.
 *
 * This module contains the clients the pipeline can translate through:
 * - Google: Google Cloud Translation v2 REST API
 * - DryRun: deterministic offline fabrication for tests and staging
 * - Mock: scriptable failures for exercising the pipeline's error paths
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::BackendError;

/// Common trait for all translation backends
///
/// Implementations translate an ordered batch of strings into one target
/// language. The output is expected to have the same length and order as the
/// input; the adapter enforces that contract according to its policy.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate every string of `payload` into `target_language`
    ///
    /// # Arguments
    /// * `payload` - Ordered strings to translate
    /// * `target_language` - Target language code
    ///
    /// # Returns
    /// * `Result<Vec<String>, BackendError>` - Translations in input order, or an error
    async fn translate(
        &self,
        payload: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, BackendError>;

    /// Short backend identifier for logs
    fn name(&self) -> &'static str;
}

pub mod google;
pub mod dry_run;
pub mod mock;
