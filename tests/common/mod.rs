/*!
 * Common test utilities for the report-translator test suite
 */

use std::sync::{Arc, Once};

use report_translator::app_config::Language;
use report_translator::database::{DatabaseConnection, Repository};
use report_translator::providers::mock::MockBackend;
use report_translator::report::Report;
use report_translator::reporter::MemoryReporter;
use report_translator::translation::{
    Pipeline, PipelineContext, PipelineOptions, StorageTarget, TranslationAdapter,
};

static LOGGER: Once = Once::new();

/// Route library logs to the test output (`RUST_LOG=debug cargo test`)
pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A report with both translatable fields and one passthrough field
pub fn report(number: i64, text: &str, title: &str) -> Report {
    Report::new(number)
        .with_field("text", text)
        .with_field("title", title)
        .with_field("date_published", "2021-03-04")
}

/// `count` reports numbered from 1
pub fn sample_reports(count: i64) -> Vec<Report> {
    (1..=count)
        .map(|n| report(n, &format!("Incident body {}", n), &format!("Incident {}", n)))
        .collect()
}

/// Languages from codes
pub fn languages(codes: &[&str]) -> Vec<Language> {
    codes.iter().map(|code| Language::new(*code)).collect()
}

/// In-memory database holding `reports` in the report store
pub async fn seeded_connection(reports: Vec<Report>) -> DatabaseConnection {
    init_logger();
    let db = DatabaseConnection::new_in_memory().unwrap();
    Repository::new(db.clone()).insert_reports(reports).await.unwrap();
    db
}

/// Pipeline over `db` with a memory reporter
pub fn pipeline_with(
    adapter: TranslationAdapter,
    db: &DatabaseConnection,
    codes: &[&str],
    options: PipelineOptions,
) -> (Pipeline, Arc<MemoryReporter>) {
    let reporter = Arc::new(MemoryReporter::new());
    let context = PipelineContext::new(adapter, StorageTarget::Connection(db.clone()))
        .with_languages(languages(codes))
        .with_reporter(reporter.clone())
        .with_options(options);

    (Pipeline::new(context), reporter)
}

/// Dry-run pipeline over `db`
pub fn dry_run_pipeline(db: &DatabaseConnection, codes: &[&str]) -> (Pipeline, Arc<MemoryReporter>) {
    pipeline_with(TranslationAdapter::dry_run(), db, codes, PipelineOptions::default())
}

/// Pipeline translating through `mock`
pub fn mock_pipeline(
    mock: &MockBackend,
    db: &DatabaseConnection,
    codes: &[&str],
) -> (Pipeline, Arc<MemoryReporter>) {
    pipeline_with(
        TranslationAdapter::production(Arc::new(mock.clone())),
        db,
        codes,
        PipelineOptions::default(),
    )
}
