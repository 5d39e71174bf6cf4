/*!
 * Tests for the report data model
 */

use serde_json::json;

use report_translator::report::{Report, ReportNumber, TranslatedReport, TRANSLATABLE_FIELDS};

/// Test that documents keep unknown fields through a round trip
#[test]
fn test_report_deserialize_withExtraFields_shouldPassThemThrough() {
    let report: Report = serde_json::from_value(json!({
        "report_number": 12,
        "text": "Body",
        "title": "Title",
        "authors": ["A. Author"],
        "epoch_date_modified": 1614000000
    }))
    .unwrap();

    assert_eq!(report.report_number, ReportNumber::Number(12));
    assert_eq!(report.fields["authors"], json!(["A. Author"]));

    let translated = TranslatedReport::from_source(&report, "fr");
    assert_eq!(translated.fields["epoch_date_modified"], json!(1614000000));
    assert_eq!(translated.language, "fr");
}

/// Test identifier canonicalization
#[test]
fn test_report_number_key_withNumericAndTextIds_shouldJoin() {
    assert_eq!(ReportNumber::from(5i64).key(), ReportNumber::from("5").key());
    assert_eq!(ReportNumber::from_key("5"), ReportNumber::Number(5));
    assert_eq!(ReportNumber::from_key("05"), ReportNumber::Text("05".to_string()));
    assert_eq!(ReportNumber::from_key("INC-1"), ReportNumber::Text("INC-1".to_string()));
}

/// Test the values sent for translation
#[test]
fn test_translatable_value_withOddValues_shouldRenderText() {
    let report = Report::new(1i64)
        .with_field("text", serde_json::Value::Null)
        .with_field("title", 42);

    assert_eq!(TRANSLATABLE_FIELDS, ["text", "title"]);
    assert_eq!(report.translatable_value("text"), "");
    assert_eq!(report.translatable_value("title"), "42");
    assert_eq!(report.translatable_value("missing"), "");
}
