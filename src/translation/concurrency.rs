/*!
 * Worker pool tuning.
 *
 * The pipeline runs two nested bounded pools: languages in the outer pool and
 * report jobs of one language in the inner pool. Excess work waits for a free
 * slot, so at most `language_concurrency * report_concurrency` backend calls
 * are in flight at once.
 */

use std::time::Duration;

use crate::app_config::PipelineConfig;

/// Admission-control limits for the two pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Languages translated at the same time
    pub language_concurrency: usize,
    /// Report jobs in flight per language
    pub report_concurrency: usize,
    /// Deadline for one report job; `None` waits indefinitely
    pub job_timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            language_concurrency: 10,
            report_concurrency: 100,
            job_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl PipelineOptions {
    /// Options from the `pipeline` configuration section
    pub fn from_config(config: &PipelineConfig) -> Self {
        config.options()
    }

    /// Ceilings clamped to at least one slot
    pub fn effective(self) -> Self {
        Self {
            language_concurrency: self.language_concurrency.max(1),
            report_concurrency: self.report_concurrency.max(1),
            job_timeout: self.job_timeout,
        }
    }

    /// Upper bound on concurrent backend calls across the whole run
    pub fn max_in_flight(&self) -> usize {
        self.language_concurrency.saturating_mul(self.report_concurrency)
    }
}
