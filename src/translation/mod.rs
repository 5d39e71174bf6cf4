/*!
 * Translation pipeline for incident reports.
 *
 * The pipeline is split into several submodules, leaves first:
 *
 * - `adapter`: Backend selection (production or dry-run) and the batch-length policy
 * - `report`: Translation of one report's translatable fields in a single call
 * - `batch`: Delta detection and the bounded per-language job pool
 * - `concurrency`: Pool ceilings and job timeout
 * - `pipeline`: The orchestrator fanning out over target languages
 */

// Re-export main types for easier usage
pub use self::adapter::TranslationAdapter;
pub use self::batch::{BatchOptions, BatchOutcome, JobFailure, LanguageBatchTranslator};
pub use self::concurrency::PipelineOptions;
pub use self::pipeline::{LanguageOutcome, Pipeline, PipelineContext, RunSummary, StorageTarget};
pub use self::report::ReportTranslator;

// Submodules
pub mod adapter;
pub mod batch;
pub mod concurrency;
pub mod pipeline;
pub mod report;
