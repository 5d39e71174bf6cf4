/*!
 * Full application lifecycle tests: configuration file, on-disk database,
 * seeding and consecutive runs.
 */

use anyhow::Result;
use tempfile::TempDir;

use report_translator::app_config::{Config, Language, ShortBatchPolicy};
use report_translator::database::{DatabaseConnection, Repository, TranslationStore};
use report_translator::report::Report;
use report_translator::translation::{Pipeline, PipelineContext};

use crate::common;

const REPORTS_JSON: &str = r#"[
    {"report_number": 1, "text": "A car hit a pedestrian.", "title": "Collision", "source_domain": "example.com"},
    {"report_number": 2, "text": "The chatbot leaked data.", "title": "Data leak"},
    {"report_number": "2021-77", "text": "Drone lost control.", "title": "Drone crash"}
]"#;

fn config_in(dir: &TempDir, codes: &[&str]) -> Config {
    let mut config = Config::default();
    config.languages = codes.iter().map(|code| Language::new(*code)).collect();
    config.dry_run = Some(true);
    config.database_path = Some(dir.path().join("data").join("reports.db").to_string_lossy().into_owned());
    config
}

#[tokio::test]
async fn test_lifecycle_importThenRunFromConfigFile_shouldPersistTranslations() -> Result<()> {
    common::init_logger();
    let dir = TempDir::new()?;
    let config_path = dir.path().join("conf.json");
    config_in(&dir, &["es", "fr"]).save(&config_path)?;

    let config = Config::load_or_create(&config_path)?;
    let dry_run = config.resolved_dry_run(Some("false"));
    assert!(dry_run, "explicit config value must win over the environment");
    config.validate(dry_run)?;

    let reports: Vec<Report> = serde_json::from_str(REPORTS_JSON)?;
    let repository = Repository::open(config.database_path()?)?;
    assert_eq!(repository.insert_reports(reports).await?, 3);

    let summary = Pipeline::new(PipelineContext::from_config(&config, dry_run)?)
        .run_all()
        .await?;

    assert!(summary.is_success());
    assert!(summary.dry_run);
    assert_eq!(summary.report_count, 3);
    assert_eq!(summary.total_stored(), 6);

    let stats = DatabaseConnection::new(config.database_path()?)?.stats()?;
    assert_eq!(stats.report_count, 3);
    assert_eq!(stats.translated_count, 6);
    assert!(stats.languages.contains(&("es".to_string(), 3)));
    Ok(())
}

#[tokio::test]
async fn test_lifecycle_secondRunAfterAddingReports_shouldOnlyTranslateNewOnes() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config_in(&dir, &["ja"]);
    let repository = Repository::open(config.database_path()?)?;
    repository.insert_reports(common::sample_reports(3)).await?;

    let pipeline = Pipeline::new(PipelineContext::from_config(&config, true)?);
    pipeline.run_all().await?;

    repository
        .insert_reports(vec![common::report(4, "Late body", "Late title")])
        .await?;
    let second = pipeline.run_all().await?;

    assert_eq!(second.total_translated(), 1);
    assert_eq!(second.language("ja").map(|l| l.skipped), Some(3));
    assert_eq!(repository.count_translated("ja").await?, 4);
    Ok(())
}

#[tokio::test]
async fn test_lifecycle_reimportingReports_shouldUpsertWithoutDuplicates() -> Result<()> {
    let dir = TempDir::new()?;
    let repository = Repository::open(dir.path().join("reports.db"))?;
    let reports: Vec<Report> = serde_json::from_str(REPORTS_JSON)?;

    repository.insert_reports(reports.clone()).await?;
    repository.insert_reports(reports).await?;

    let stored = repository.get_reports(Default::default()).await?;
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].field_str("source_domain"), Some("example.com"));
    Ok(())
}

#[test]
fn test_lifecycle_productionWithoutKey_shouldFailValidation() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, &["es"]);

    assert!(config.validate(false).is_err());
    assert!(config.validate(true).is_ok());
}

#[test]
fn test_lifecycle_fromConfig_shouldCarryPolicyAndOptions() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, &["es"]);
    config.pipeline.short_batch_policy = ShortBatchPolicy::KeepSource;
    config.pipeline.report_concurrency = 7;

    let context = PipelineContext::from_config(&config, true).unwrap();

    assert!(context.dry_run());
    assert_eq!(context.adapter.short_batch_policy(), ShortBatchPolicy::KeepSource);
    assert_eq!(context.options.report_concurrency, 7);
    assert_eq!(context.languages, vec![Language::new("es")]);
}
