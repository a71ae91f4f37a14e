use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use culturefmt::{
    BuiltinCatalog, IssueType, LocalizationValidator, ManualClock, Severity, ValidatorRules,
};
use indoc::indoc;

fn validator_with_clock(rules: ValidatorRules) -> (LocalizationValidator, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
    let validator = LocalizationValidator::new(rules, &BuiltinCatalog, Arc::new(clock.clone()));
    (validator, clock)
}

fn translations(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn over_long_label_yields_single_warning() {
    let rules = ValidatorRules::builder()
        .with_max_length("tab.dashboard", 20)
        .build();
    let (validator, _) = validator_with_clock(rules);
    let result = validator.validate(
        &translations(&[("tab.dashboard", "This dashboard tab label is far too long to fit")]),
        "en-IN",
    );

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].issue_type, IssueType::LengthExceeded);
    assert_eq!(result.issues[0].severity, Severity::Warning);
    assert!(result.is_valid());
    assert!(result.statistics.overall_score < 100.0);
    assert!(result.statistics.overall_score > 0.0);

    assert_eq!(
        result.to_text(),
        indoc! {"
            Localization report for en-IN
            Generated: 2024-01-15T09:00:00+00:00
            Score: 98.0/100 (valid)
            Keys: 1 total, 1 valid, 0 invalid
            Issues: 0 errors, 1 warnings, 0 info

            [warning] tab.dashboard (length-exceeded): Translation is 47 characters, limit is 20
              suggestion: Shorten to at most 20 characters
        "}
    );
}

#[test]
fn validation_is_deterministic_apart_from_timestamp() {
    let (validator, clock) = validator_with_clock(ValidatorRules::standard());
    let input = translations(&[
        ("budget.exceeded", "Over budget by {amount}"),
        ("statement.date", "Due dd/MM/yyyy"),
        ("tab.dashboard", "Dashboard"),
        ("common.ok", ""),
    ]);

    let first = validator.validate(&input, "en-IN");
    clock.advance(Duration::minutes(5));
    let second = validator.validate(&input, "en-IN");

    assert_ne!(first.timestamp, second.timestamp);
    assert_eq!(first.issues, second.issues);
    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first.to_json().unwrap().len(), second.to_json().unwrap().len());
}

#[test]
fn missing_critical_key_is_an_error() {
    let (validator, _) = validator_with_clock(ValidatorRules::standard());
    let result = validator.validate(&translations(&[("tab.dashboard", "Dashboard")]), "en-IN");

    assert!(!result.is_valid());
    assert!(
        result
            .issues_with_severity(Severity::Error)
            .any(|i| i.issue_type == IssueType::MissingKey && i.key == "app.name")
    );
    assert_eq!(result.statistics.critical_issues, 7);
    assert_eq!(result.statistics.overall_score, 0.0);
}

#[test]
fn reports_render_in_every_format() {
    let (validator, _) = validator_with_clock(
        ValidatorRules::builder()
            .with_required_parameters("greeting.user", ["name"])
            .build(),
    );
    let result = validator.validate(
        &translations(&[("greeting.user", "Hello | friend"), ("tab.home", "Home")]),
        "en-GB",
    );

    let csv = result.to_csv().unwrap();
    assert_eq!(
        csv,
        indoc! {"
            severity,key,type,message,suggestion
            error,greeting.user,missing-parameter,Required parameter `name` is missing,Include {name} in the translation
        "}
    );

    let markdown = result.to_markdown();
    assert!(markdown.contains("| Errors | 1 |"));
    assert!(markdown.contains(
        "| error | `greeting.user` | missing-parameter | Required parameter `name` is missing | Include {name} in the translation |"
    ));

    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["locale"], "en-GB");
    assert_eq!(json["issues"][0]["type"], "missing-parameter");
    assert_eq!(json["statistics"]["invalid_keys"], 1);
}

#[test]
fn nested_document_with_duplicates() {
    let (validator, _) = validator_with_clock(ValidatorRules::empty());
    let result = validator
        .validate_document(
            indoc! {r#"
                {
                  "account": { "balance": "Balance: {value}" },
                  "tab": { "home": "Home" },
                  "tab.home": "Start"
                }
            "#},
            "en-SG",
        )
        .unwrap();

    let kinds: Vec<_> = result.issues.iter().map(|i| (i.key.as_str(), i.issue_type)).collect();
    assert_eq!(
        kinds,
        vec![
            ("account.balance", IssueType::InvalidFormat),
            ("tab.home", IssueType::DuplicateKey),
        ]
    );
    assert_eq!(result.statistics.total_keys, 2);
}
