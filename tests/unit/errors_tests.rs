/*!
 * Tests for error types
 */

use std::time::Duration;

use report_translator::errors::{AppError, BackendError, ConfigError, JobError, StoreError};

/// Test that every backend error names its language
#[test]
fn test_backend_error_display_shouldIncludeLanguage() {
    let errors = vec![
        BackendError::RequestFailed { language: "es".to_string(), message: "timeout".to_string() },
        BackendError::ApiError { language: "es".to_string(), status_code: 429, message: "quota".to_string() },
        BackendError::ParseError { language: "es".to_string(), message: "eof".to_string() },
        BackendError::BatchLengthMismatch { language: "es".to_string(), expected: 2, actual: 0 },
    ];

    for error in errors {
        assert_eq!(error.language(), "es");
        assert!(error.to_string().contains("[es]"), "{}", error);
    }
}

/// Test job error conversions
#[test]
fn test_job_error_conversions_shouldKeepCause() {
    let timeout = JobError::Timeout(Duration::from_secs(3));
    assert!(timeout.to_string().contains("3s"));

    let backend = BackendError::ApiError { language: "fr".to_string(), status_code: 500, message: "down".to_string() };
    assert_eq!(JobError::from(backend.clone()), JobError::Backend(backend));
}

/// Test conversions into the application error
#[test]
fn test_app_error_conversions_shouldWrapSources() {
    let store: AppError = StoreError::Connection("refused".to_string()).into();
    assert!(matches!(store, AppError::Store(_)));
    assert!(store.to_string().contains("refused"));

    let config: AppError = ConfigError::MissingApiKey.into();
    assert!(matches!(config, AppError::Config(ConfigError::MissingApiKey)));

    let io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "reports.json").into();
    assert!(matches!(io, AppError::File(ref m) if m.contains("reports.json")));
}

/// Test that SQLite errors become store query errors
#[test]
fn test_store_error_fromRusqlite_shouldBeQueryError() {
    let error: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(error, StoreError::Query(_)));
}
