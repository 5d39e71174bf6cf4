/*!
 * Mock backend implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockBackend::working()` - Always succeeds with tagged text
 * - `MockBackend::failing_for("de")` - Fails only for one target language
 * - `MockBackend::short(1)` - Returns fewer strings than requested
 * - `MockBackend::slow(ms)` - Delays every call
 *
 * Every mock counts calls and tracks the peak number of concurrent calls, so
 * tests can assert on redundant work and on pool ceilings.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::BackendError;
use crate::providers::TranslationBackend;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, returning `[lang] text`
    Working,
    /// Always fails with a server error
    Failing,
    /// Fails with a quota error for one language, works for the others
    FailingFor(&'static str),
    /// Fails every Nth call
    Intermittent { fail_every: usize },
    /// Returns only the first `keep` translations
    Short { keep: usize },
    /// Sleeps before answering
    Slow { delay_ms: u64 },
    /// Panics inside the call
    Panicking,
}

/// Shared call statistics
#[derive(Debug, Default)]
struct CallStats {
    total: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    per_language: Mutex<HashMap<String, usize>>,
}

/// Mock backend for testing pipeline behavior
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Call statistics, shared between clones
    stats: Arc<CallStats>,
}

/// Decrements the in-flight counter when a call finishes, even by panic
struct InFlightGuard<'a>(&'a CallStats);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            stats: Arc::new(CallStats::default()),
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock backend that errors for one language only
    pub fn failing_for(language: &'static str) -> Self {
        Self::new(MockBehavior::FailingFor(language))
    }

    /// Create an intermittently failing mock backend
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock backend that drops trailing translations
    pub fn short(keep: usize) -> Self {
        Self::new(MockBehavior::Short { keep })
    }

    /// Create a mock backend that delays every call
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock backend that panics
    pub fn panicking() -> Self {
        Self::new(MockBehavior::Panicking)
    }

    /// The mock translation of one string
    pub fn tag(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    /// Total number of calls so far
    pub fn call_count(&self) -> usize {
        self.stats.total.load(Ordering::SeqCst)
    }

    /// Number of calls made for one language
    pub fn calls_for(&self, language: &str) -> usize {
        self.stats.per_language.lock().get(language).copied().unwrap_or(0)
    }

    /// Highest number of calls that were in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }

    fn translate_all(payload: &[String], target_language: &str) -> Vec<String> {
        payload.iter().map(|text| Self::tag(text, target_language)).collect()
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate(
        &self,
        payload: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        let count = self.stats.total.fetch_add(1, Ordering::SeqCst);
        *self
            .stats
            .per_language
            .lock()
            .entry(target_language.to_string())
            .or_insert(0) += 1;

        let current = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.stats);

        // Yield once so concurrent callers overlap even without a delay
        tokio::task::yield_now().await;

        match self.behavior {
            MockBehavior::Working => Ok(Self::translate_all(payload, target_language)),

            MockBehavior::Failing => Err(BackendError::ApiError {
                language: target_language.to_string(),
                status_code: 500,
                message: "Simulated backend failure".to_string(),
            }),

            MockBehavior::FailingFor(language) => {
                if language == target_language {
                    Err(BackendError::ApiError {
                        language: target_language.to_string(),
                        status_code: 403,
                        message: "Simulated quota exceeded".to_string(),
                    })
                } else {
                    Ok(Self::translate_all(payload, target_language))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(BackendError::RequestFailed {
                        language: target_language.to_string(),
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::translate_all(payload, target_language))
                }
            }

            MockBehavior::Short { keep } => {
                let mut result = Self::translate_all(payload, target_language);
                result.truncate(keep);
                Ok(result)
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::translate_all(payload, target_language))
            }

            MockBehavior::Panicking => panic!("Simulated backend panic for [{}]", target_language),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
