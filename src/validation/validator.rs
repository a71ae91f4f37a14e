use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    catalog::LocaleCatalog,
    clock::SharedClock,
    error::Error,
    loader::load_translations,
    placeholder::{extract_placeholders, mentions_parameter, signature},
    validation::{
        IssueType, Severity, ValidationIssue, ValidationResult, ValidationStatistics,
        ValidatorRules,
    },
};

lazy_static! {
    static ref NESTED_BRACE: Regex = Regex::new(r"\{[^{}]+\{").unwrap();
    static ref DATE_TOKEN: Regex = Regex::new(r"\b(dd|MM|yyyy|yy|HH|mm)\b").unwrap();
}

const CURRENCY_KEY_HINTS: [&str; 4] = ["currency", "amount", "price", "balance"];
const DATE_KEY_HINTS: [&str; 2] = ["date", "time"];

/// Checks key→translation maps and scores them.
#[derive(Debug, Clone)]
pub struct LocalizationValidator {
    rules: ValidatorRules,
    currency_symbols: Vec<String>,
    clock: SharedClock,
}

impl LocalizationValidator {
    pub fn new(rules: ValidatorRules, catalog: &dyn LocaleCatalog, clock: SharedClock) -> Self {
        Self {
            rules,
            currency_symbols: catalog
                .currency_symbols()
                .into_iter()
                .map(str::to_string)
                .collect(),
            clock,
        }
    }

    pub fn rules(&self) -> &ValidatorRules {
        &self.rules
    }

    pub fn validate(&self, translations: &BTreeMap<String, String>, locale: &str) -> ValidationResult {
        let mut issues = Vec::new();

        let mut critical_missing = 0;
        for key in self.rules.critical_keys() {
            if !translations.contains_key(key) {
                critical_missing += 1;
                issues.push(
                    ValidationIssue::new(
                        key,
                        IssueType::MissingKey,
                        Severity::Error,
                        format!("Critical key `{}` is missing", key),
                    )
                    .with_suggestion("Add a translation for this key"),
                );
            }
        }

        for (key, value) in translations {
            self.check_entry(key, value, &mut issues);
        }

        self.finish(locale, translations.keys().map(String::as_str), issues, critical_missing)
    }

    /// Loads a nested JSON document, validates it and reports keys the
    /// document defines more than once.
    pub fn validate_document(&self, json: &str, locale: &str) -> Result<ValidationResult, Error> {
        let loaded = load_translations(json)?;
        let mut result = self.validate(&loaded.entries, locale);
        let duplicates = find_duplicate_keys(loaded.keys_in_order.iter().map(String::as_str));
        if !duplicates.is_empty() {
            result.issues.extend(duplicates);
            result.statistics = ValidationStatistics::compute(
                loaded.entries.keys().map(String::as_str),
                &result.issues,
                result.statistics.critical_issues,
            );
        }
        Ok(result)
    }

    /// Flags keys sharing a last segment whose translations differ. Within a
    /// group the alphabetically first key is the reference.
    pub fn validate_consistency(&self, translations: &BTreeMap<String, String>) -> Vec<ValidationIssue> {
        let mut groups: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for (key, value) in translations {
            let segment = key.rsplit('.').next().unwrap_or(key);
            groups
                .entry(segment)
                .or_default()
                .push((key.as_str(), value.as_str()));
        }

        let mut issues = Vec::new();
        for (segment, members) in groups {
            let Some(((ref_key, ref_value), rest)) = members.split_first() else {
                continue;
            };
            for (key, value) in rest {
                if value.trim() != ref_value.trim() {
                    issues.push(
                        ValidationIssue::new(
                            *key,
                            IssueType::InconsistentTerminology,
                            Severity::Warning,
                            format!(
                                "\"{}\" differs from \"{}\" used for `{}`",
                                value, ref_value, segment
                            ),
                        )
                        .with_suggestion(format!("Use \"{}\" as in `{}`", ref_value, ref_key)),
                    );
                }
            }
        }
        issues
    }

    /// Compares a translation with its reference (usually the development
    /// language): missing keys, extra keys and placeholder mismatches.
    pub fn validate_against_reference(
        &self,
        reference: &BTreeMap<String, String>,
        translations: &BTreeMap<String, String>,
        locale: &str,
    ) -> ValidationResult {
        let mut issues = Vec::new();
        for (key, ref_value) in reference {
            match translations.get(key) {
                None => issues.push(
                    ValidationIssue::new(
                        key,
                        IssueType::MissingTranslation,
                        Severity::Warning,
                        format!("No {} translation for `{}`", locale, key),
                    )
                    .with_suggestion(format!("Translate \"{}\"", ref_value)),
                ),
                Some(value) => {
                    let expected = signature(ref_value);
                    let found = signature(value);
                    if expected != found {
                        issues.push(ValidationIssue::new(
                            key,
                            IssueType::InconsistentFormatting,
                            Severity::Error,
                            format!(
                                "Placeholders [{}] do not match reference [{}]",
                                found.join(", "),
                                expected.join(", ")
                            ),
                        ));
                    }
                }
            }
        }
        for key in translations.keys().filter(|k| !reference.contains_key(*k)) {
            issues.push(
                ValidationIssue::new(
                    key,
                    IssueType::UnusedKey,
                    Severity::Info,
                    format!("`{}` is not present in the reference", key),
                )
                .with_suggestion("Remove the key or add it to the reference"),
            );
        }

        let keys: BTreeSet<&str> = reference
            .keys()
            .chain(translations.keys())
            .map(String::as_str)
            .collect();
        self.finish(locale, keys, issues, 0)
    }

    fn finish<'a>(
        &self,
        locale: &str,
        keys: impl IntoIterator<Item = &'a str>,
        issues: Vec<ValidationIssue>,
        critical_missing: usize,
    ) -> ValidationResult {
        let statistics = ValidationStatistics::compute(keys, &issues, critical_missing);
        debug!(
            locale,
            errors = statistics.errors,
            warnings = statistics.warnings,
            score = statistics.overall_score,
            "validated translations"
        );
        ValidationResult {
            locale: locale.to_string(),
            issues,
            statistics,
            timestamp: self.clock.now(),
        }
    }

    fn check_entry(&self, key: &str, value: &str, issues: &mut Vec<ValidationIssue>) {
        if value.trim().is_empty() {
            issues.push(
                ValidationIssue::new(key, IssueType::EmptyTranslation, Severity::Error, "Translation is empty")
                    .with_suggestion("Provide a non-empty translation"),
            );
            return;
        }

        for param in self.rules.required_parameters(key) {
            if !mentions_parameter(value, param) {
                issues.push(
                    ValidationIssue::new(
                        key,
                        IssueType::MissingParameter,
                        Severity::Error,
                        format!("Required parameter `{}` is missing", param),
                    )
                    .with_suggestion(format!("Include {{{}}} in the translation", param)),
                );
            }
        }

        if let Some(limit) = self.rules.max_length(key) {
            let length = value.chars().count();
            if length > limit {
                issues.push(
                    ValidationIssue::new(
                        key,
                        IssueType::LengthExceeded,
                        Severity::Warning,
                        format!("Translation is {} characters, limit is {}", length, limit),
                    )
                    .with_suggestion(format!("Shorten to at most {} characters", limit)),
                );
            }
        }

        let opening = value.matches('{').count();
        let closing = value.matches('}').count();
        if opening != closing {
            issues.push(ValidationIssue::new(
                key,
                IssueType::InvalidPlaceholder,
                Severity::Error,
                format!("Unbalanced braces: {} opening, {} closing", opening, closing),
            ));
        } else if NESTED_BRACE.is_match(value) {
            issues.push(ValidationIssue::new(
                key,
                IssueType::InvalidPlaceholder,
                Severity::Warning,
                "Placeholder opens inside another placeholder",
            ));
        }

        let lowered = key.to_lowercase();
        if CURRENCY_KEY_HINTS.iter().any(|hint| lowered.contains(hint))
            && !extract_placeholders(value).is_empty()
            && !self.currency_symbols.iter().any(|s| value.contains(s.as_str()))
        {
            issues.push(
                ValidationIssue::new(
                    key,
                    IssueType::InvalidFormat,
                    Severity::Info,
                    "Amount placeholder has no currency symbol",
                )
                .with_suggestion("Pass a value rendered by the currency formatter"),
            );
        }

        if DATE_KEY_HINTS.iter().any(|hint| lowered.contains(hint)) && DATE_TOKEN.is_match(value) {
            issues.push(
                ValidationIssue::new(
                    key,
                    IssueType::InvalidFormat,
                    Severity::Info,
                    "Translation contains a raw date pattern",
                )
                .with_suggestion("Format the date with the date formatter instead"),
            );
        }
    }
}

/// One `duplicate-key` warning per key appearing more than once.
pub fn find_duplicate_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<ValidationIssue> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(key, n)| {
            ValidationIssue::new(
                key,
                IssueType::DuplicateKey,
                Severity::Warning,
                format!("`{}` is defined {} times", key, n),
            )
            .with_suggestion("Keep a single definition")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{catalog::BuiltinCatalog, clock::ManualClock};

    fn validator(rules: ValidatorRules) -> LocalizationValidator {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
        LocalizationValidator::new(rules, &BuiltinCatalog, Arc::new(clock))
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn types(result: &ValidationResult) -> Vec<(IssueType, Severity)> {
        result.issues.iter().map(|i| (i.issue_type, i.severity)).collect()
    }

    #[test]
    fn test_missing_critical_key() {
        let rules = ValidatorRules::builder().with_critical_key("app.name").build();
        let result = validator(rules).validate(&map(&[("tab.home", "Home")]), "en-IN");
        assert!(!result.is_valid());
        assert_eq!(types(&result), vec![(IssueType::MissingKey, Severity::Error)]);
        assert_eq!(result.statistics.critical_issues, 1);
        assert_eq!(result.statistics.overall_score, 85.0);
    }

    #[test]
    fn test_empty_and_missing_parameter() {
        let rules = ValidatorRules::builder()
            .with_required_parameters("budget.exceeded", ["amount", "category"])
            .build();
        let result = validator(rules).validate(
            &map(&[("budget.exceeded", "Over by %{amount}"), ("tab.home", "  ")]),
            "en-IN",
        );
        assert_eq!(
            types(&result),
            vec![
                (IssueType::MissingParameter, Severity::Error),
                (IssueType::EmptyTranslation, Severity::Error),
            ]
        );
        assert!(result.issues[0].message.contains("category"));
        assert_eq!(result.statistics.invalid_keys, 2);
    }

    #[test]
    fn test_brace_checks() {
        let v = validator(ValidatorRules::empty());
        let unbalanced = v.validate(&map(&[("a", "Hello {name")]), "en");
        assert_eq!(types(&unbalanced), vec![(IssueType::InvalidPlaceholder, Severity::Error)]);

        let nested = v.validate(&map(&[("a", "Hello {na{me}}")]), "en");
        assert_eq!(types(&nested), vec![(IssueType::InvalidPlaceholder, Severity::Warning)]);

        let double = v.validate(&map(&[("a", "Hello {{name}}")]), "en");
        assert!(double.issues.is_empty());
    }

    #[test]
    fn test_cultural_notes() {
        let v = validator(ValidatorRules::empty());
        let result = v.validate(
            &map(&[
                ("account.balance", "Balance: {value}"),
                ("account.balance_symbol", "Balance: ₹{value}"),
                ("statement.date", "Issued on dd/MM/yyyy"),
            ]),
            "en-IN",
        );
        let keys: Vec<_> = result.issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["account.balance", "statement.date"]);
        assert!(result.issues.iter().all(|i| i.severity == Severity::Info));
        assert!(result.is_valid());
    }

    #[test]
    fn test_consistency_uses_first_key_as_reference() {
        let v = validator(ValidatorRules::empty());
        let issues = v.validate_consistency(&map(&[
            ("alert.cancel", "Cancel"),
            ("common.cancel", "Cancel"),
            ("dialog.cancel", "Dismiss"),
            ("tab.home", "Home"),
        ]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "dialog.cancel");
        assert_eq!(issues[0].issue_type, IssueType::InconsistentTerminology);
        assert_eq!(issues[0].suggestion.as_deref(), Some("Use \"Cancel\" as in `alert.cancel`"));
    }

    #[test]
    fn test_against_reference() {
        let v = validator(ValidatorRules::empty());
        let reference = map(&[
            ("greeting", "Hello %1$@, you have %2$d alerts"),
            ("budget.left", "{amount} left"),
            ("tab.home", "Home"),
        ]);
        let hindi = map(&[
            ("greeting", "नमस्ते %1$s, %2$d अलर्ट"),
            ("budget.left", "बचे हुए"),
            ("legacy.key", "पुराना"),
        ]);
        let result = v.validate_against_reference(&reference, &hindi, "hi-IN");
        let found: BTreeSet<_> = result
            .issues
            .iter()
            .map(|i| (i.key.as_str(), i.issue_type))
            .collect();
        assert_eq!(
            found,
            BTreeSet::from([
                ("budget.left", IssueType::InconsistentFormatting),
                ("tab.home", IssueType::MissingTranslation),
                ("legacy.key", IssueType::UnusedKey),
            ])
        );
        assert_eq!(result.statistics.total_keys, 4);
    }

    #[test]
    fn test_document_duplicates() {
        let v = validator(ValidatorRules::empty());
        let result = v
            .validate_document(r#"{"tab": {"home": "Home"}, "tab.home": "Start"}"#, "en")
            .unwrap();
        assert_eq!(types(&result), vec![(IssueType::DuplicateKey, Severity::Warning)]);
        assert_eq!(result.statistics.warnings, 1);
    }

    #[test]
    fn test_find_duplicate_keys() {
        let issues = find_duplicate_keys(["a", "b", "a", "c", "a"]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "`a` is defined 3 times");
    }
}
