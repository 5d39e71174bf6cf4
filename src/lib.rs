/*!
 * # report-translator - Incident report translation pipeline
 *
 * A Rust library that produces machine-translated copies of an incident report
 * corpus in a set of target languages, storing the results durably and skipping
 * reports that already have a complete translation.
 *
 * ## Features
 *
 * - Incremental, idempotent runs: only missing or incomplete translations are redone
 * - Two nested bounded worker pools (languages, then reports per language)
 * - Per-job failure capture with timeouts, so one bad report or language never
 *   blocks the rest
 * - Dry-run backend fabricating `translated-<lang>-<text>` for offline runs
 * - Google Cloud Translation backend with retries for production
 * - SQLite persistence partitioned by language
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and dry-run resolution
 * - `report`: Report and translated report data model
 * - `translation`: The pipeline itself:
 *   - `translation::adapter`: Backend adapter and batch-length policy
 *   - `translation::report`: Single report translation
 *   - `translation::batch`: Per-language delta translation
 *   - `translation::pipeline`: Run orchestration across languages
 * - `providers`: Translation backends (Google, dry-run, mock)
 * - `database`: SQLite report store and translation partitions
 * - `reporter`: Progress line sinks
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod report;
pub mod reporter;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, Language};
pub use report::{Report, ReportNumber, TranslatedReport};
pub use translation::{Pipeline, PipelineContext, RunSummary, StorageTarget, TranslationAdapter};
pub use language_utils::{language_codes_match, get_language_name};
pub use errors::{AppError, BackendError, ConfigError, JobError, StoreError};
