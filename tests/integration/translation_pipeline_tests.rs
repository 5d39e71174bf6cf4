/*!
 * Integration tests for full pipeline runs.
 *
 * Every test seeds an in-memory report store, runs the pipeline and inspects
 * the translation partitions afterwards.
 */

use std::collections::HashSet;

use report_translator::database::{DatabaseConnection, Repository, TranslatedReportRecord, TranslationStore};
use report_translator::providers::mock::MockBackend;
use report_translator::report::{Report, TranslatedReport};

use crate::common::{self, dry_run_pipeline, mock_pipeline, report, sample_reports, seeded_connection};

async fn partition(db: &DatabaseConnection, language: &str) -> Vec<TranslatedReportRecord> {
    let mut records = Repository::new(db.clone()).get_translated_records(language).await.unwrap();
    records.sort_by(|a, b| a.report_number.cmp(&b.report_number));
    records
}

#[tokio::test]
async fn test_run_withTwoReportsInDryRun_shouldStoreTwoSpanishRecords() {
    let db = seeded_connection(vec![report(1, "a", "b"), report(2, "c", "d")]).await;
    let (pipeline, reporter) = dry_run_pipeline(&db, &["es"]);

    let summary = pipeline.run_all().await.unwrap();

    let records = partition(&db, "es").await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].report_number, "1");
    assert_eq!(records[0].text.as_deref(), Some("translated-es-a"));
    assert_eq!(records[0].title.as_deref(), Some("translated-es-b"));
    assert_eq!(records[1].report_number, "2");
    assert_eq!(records[1].text.as_deref(), Some("translated-es-c"));
    assert_eq!(records[1].title.as_deref(), Some("translated-es-d"));

    assert_eq!(summary.total_stored(), 2);
    assert!(reporter.contains("Translating incident reports for Spanish [es]"));
    assert!(reporter.contains("Translated 2 new reports to [es]"));
    assert!(reporter.contains("Stored 2 new reports to [es]"));
}

#[tokio::test]
async fn test_run_withHelloWorld_shouldKeepFieldOrder() {
    let db = seeded_connection(vec![report(42, "Hello", "World")]).await;
    let (pipeline, _) = dry_run_pipeline(&db, &["es"]);

    pipeline.run_all().await.unwrap();

    let records = partition(&db, "es").await;
    assert_eq!(records[0].text.as_deref(), Some("translated-es-Hello"));
    assert_eq!(records[0].title.as_deref(), Some("translated-es-World"));
}

#[tokio::test]
async fn test_run_twice_shouldBeIdempotent() {
    let db = seeded_connection(sample_reports(25)).await;
    let mock = MockBackend::working();
    let (pipeline, reporter) = mock_pipeline(&mock, &db, &["es", "fr"]);

    let first = pipeline.run_all().await.unwrap();
    let calls_after_first = mock.call_count();
    let second = pipeline.run_all().await.unwrap();

    assert_eq!(first.total_stored(), 50);
    assert_eq!(second.total_stored(), 0);
    assert_eq!(second.total_translated(), 0);
    assert_eq!(mock.call_count(), calls_after_first);
    assert_eq!(partition(&db, "es").await.len(), 25);
    assert_eq!(partition(&db, "fr").await.len(), 25);
    assert!(reporter.contains("No new incident reports need translation to [fr]"));
}

#[tokio::test]
async fn test_run_withExistingCompleteRecord_shouldNotResubmitIt() {
    let reports = sample_reports(3);
    let db = seeded_connection(reports.clone()).await;
    let repo = Repository::new(db.clone());
    repo.insert_translated("es", &[TranslatedReport::from_source(&reports[0], "es")])
        .await
        .unwrap();

    let mock = MockBackend::working();
    let (pipeline, _) = mock_pipeline(&mock, &db, &["es"]);
    let summary = pipeline.run_all().await.unwrap();

    assert_eq!(mock.calls_for("es"), 2);
    let outcome = summary.language("es").unwrap();
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.stored, 2);
}

#[tokio::test]
async fn test_run_withRecordMissingTitle_shouldRetranslate() {
    let reports = vec![report(9, "Hello", "World")];
    let db = seeded_connection(reports.clone()).await;
    let repo = Repository::new(db.clone());
    let mut untitled = TranslatedReport::from_source(&reports[0], "es");
    untitled.fields.remove("title");
    repo.insert_translated("es", &[untitled]).await.unwrap();

    let mock = MockBackend::working();
    let (pipeline, _) = mock_pipeline(&mock, &db, &["es"]);
    let summary = pipeline.run_all().await.unwrap();

    assert_eq!(mock.calls_for("es"), 1);
    assert_eq!(summary.total_stored(), 1);

    // The incomplete record stays; the new complete one is added next to it
    let records = partition(&db, "es").await;
    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().filter(|r| r.is_complete()).count(), 1);
}

#[tokio::test]
async fn test_run_countConservation_shouldStoreExactlyTheDelta() {
    let reports = sample_reports(40);
    let db = seeded_connection(reports.clone()).await;
    let repo = Repository::new(db.clone());
    let existing: Vec<TranslatedReport> = reports
        .iter()
        .filter(|r| r.report_number.key().ends_with('0'))
        .map(|r| TranslatedReport::from_source(r, "ja"))
        .collect();
    repo.insert_translated("ja", &existing).await.unwrap();

    let (pipeline, _) = dry_run_pipeline(&db, &["ja"]);
    let summary = pipeline.run_all().await.unwrap();

    let outcome = summary.language("ja").unwrap();
    assert_eq!(outcome.skipped, existing.len());
    assert_eq!(outcome.translated, reports.len() - existing.len());
    assert_eq!(outcome.stored, outcome.translated);
    assert_eq!(repo.count_translated("ja").await.unwrap(), reports.len());
}

#[tokio::test]
async fn test_run_shouldOnlyWriteToRequestedPartitions() {
    let db = seeded_connection(sample_reports(5)).await;
    let (pipeline, _) = dry_run_pipeline(&db, &["es"]);

    pipeline.run_all().await.unwrap();

    let repo = Repository::new(db.clone());
    assert_eq!(repo.count_translated("es").await.unwrap(), 5);
    assert_eq!(repo.count_translated("fr").await.unwrap(), 0);
    assert!(partition(&db, "es")
        .await
        .iter()
        .all(|r| r.text.as_deref().is_some_and(|t| t.starts_with("translated-es-"))));
}

#[tokio::test]
async fn test_run_withOneFailingLanguage_shouldPersistTheOthers() {
    let db = seeded_connection(sample_reports(10)).await;
    let mock = MockBackend::failing_for("de");
    let (pipeline, reporter) = mock_pipeline(&mock, &db, &["es", "de", "fr"]);

    let summary = pipeline.run_all().await.unwrap();

    let repo = Repository::new(db.clone());
    assert_eq!(repo.count_translated("es").await.unwrap(), 10);
    assert_eq!(repo.count_translated("fr").await.unwrap(), 10);
    assert_eq!(repo.count_translated("de").await.unwrap(), 0);

    let german = summary.language("de").unwrap();
    assert_eq!(german.failures.len(), 10);
    assert!(german.failures.iter().all(|f| f.language == "de"));
    assert!(!summary.is_success());
    assert!(summary.language("es").unwrap().is_success());
    assert!(reporter.contains("10 reports failed to translate to [de]"));
}

#[tokio::test]
async fn test_run_afterFailedLanguage_shouldCatchUpOnNextRun() {
    let db = seeded_connection(sample_reports(4)).await;
    let failing = MockBackend::failing_for("de");
    let (first, _) = mock_pipeline(&failing, &db, &["es", "de"]);
    first.run_all().await.unwrap();

    let working = MockBackend::working();
    let (second, _) = mock_pipeline(&working, &db, &["es", "de"]);
    let summary = second.run_all().await.unwrap();

    assert_eq!(working.calls_for("es"), 0);
    assert_eq!(working.calls_for("de"), 4);
    assert_eq!(summary.language("de").unwrap().stored, 4);
}

#[tokio::test]
async fn test_run_withRejectedWritesForOneLanguage_shouldStoreTheOthers() {
    let db = seeded_connection(sample_reports(3)).await;
    db.execute(|conn| {
        conn.execute_batch(
            r#"
            CREATE TRIGGER reject_german BEFORE INSERT ON translated_reports
            WHEN NEW.language = 'de'
            BEGIN
                SELECT RAISE(ABORT, 'german partition is read-only');
            END;
            "#,
        )?;
        Ok(())
    })
    .unwrap();

    let (pipeline, reporter) = dry_run_pipeline(&db, &["de", "es"]);
    let summary = pipeline.run_all().await.unwrap();

    let german = summary.language("de").unwrap();
    assert_eq!(german.translated, 3);
    assert_eq!(german.stored, 0);
    assert!(german.error.is_some());
    assert!(!german.is_success());
    assert_eq!(summary.language("es").unwrap().stored, 3);
    assert!(summary.language("es").unwrap().is_success());

    assert!(!summary.is_success());
    assert_eq!(summary.failed_languages(), vec!["de"]);
    assert!(reporter.contains("Failed to store 3 new reports to [de]"));
    assert!(reporter.contains("across 2 languages (1 failed)"));
}

#[tokio::test]
async fn test_run_withMixedIdentifierTypes_shouldJoinOnCanonicalKey() {
    let db = seeded_connection(vec![
        Report::new(1i64).with_field("text", "numeric").with_field("title", "one"),
        Report::new("INC-7").with_field("text", "textual").with_field("title", "seven"),
    ])
    .await;
    let (pipeline, _) = dry_run_pipeline(&db, &["fr"]);

    pipeline.run_all().await.unwrap();
    let second = pipeline.run_all().await.unwrap();

    let keys: HashSet<String> = partition(&db, "fr").await.into_iter().map(|r| r.report_number).collect();
    assert_eq!(keys, HashSet::from(["1".to_string(), "INC-7".to_string()]));
    assert_eq!(second.total_translated(), 0);
}

#[tokio::test]
async fn test_run_withEmptyCorpus_shouldReportNothingToDo() {
    let db = seeded_connection(Vec::new()).await;
    let (pipeline, reporter) = dry_run_pipeline(&db, &["es", "fr"]);

    let summary = pipeline.run_all().await.unwrap();

    assert_eq!(summary.report_count, 0);
    assert!(summary.is_success());
    assert!(reporter.contains("No new incident reports need translation to [es]"));
    assert!(reporter.contains("No new incident reports need translation to [fr]"));
}

#[tokio::test]
async fn test_run_withExplicitLanguages_shouldIgnoreConfiguredOnes() {
    let db = seeded_connection(sample_reports(2)).await;
    let (pipeline, _) = dry_run_pipeline(&db, &["es", "fr"]);

    let summary = pipeline.run(&common::languages(&["ja"])).await.unwrap();

    assert_eq!(summary.languages.len(), 1);
    assert_eq!(summary.languages[0].language, "ja");
    assert_eq!(Repository::new(db.clone()).count_translated("es").await.unwrap(), 0);
}
