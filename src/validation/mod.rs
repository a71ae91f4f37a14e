//! Translation validation: issues as data, a scored result, and report
//! renderers.

mod report;
mod rules;
mod validator;

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use rules::{ValidatorRules, ValidatorRulesBuilder};
pub use validator::{LocalizationValidator, find_duplicate_keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    MissingTranslation,
    EmptyTranslation,
    MissingKey,
    MissingParameter,
    LengthExceeded,
    /// Unbalanced or nested braces.
    InvalidPlaceholder,
    /// A value hard-codes a currency or date format.
    InvalidFormat,
    InconsistentTerminology,
    InconsistentFormatting,
    DuplicateKey,
    UnusedKey,
}

impl IssueType {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::MissingTranslation => "missing-translation",
            IssueType::EmptyTranslation => "empty-translation",
            IssueType::MissingKey => "missing-key",
            IssueType::MissingParameter => "missing-parameter",
            IssueType::LengthExceeded => "length-exceeded",
            IssueType::InvalidPlaceholder => "invalid-placeholder",
            IssueType::InvalidFormat => "invalid-format",
            IssueType::InconsistentTerminology => "inconsistent-terminology",
            IssueType::InconsistentFormatting => "inconsistent-formatting",
            IssueType::DuplicateKey => "duplicate-key",
            IssueType::UnusedKey => "unused-key",
        }
    }
}

impl Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub key: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        key: impl Into<String>,
        issue_type: IssueType,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            issue_type,
            severity,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub total_keys: usize,
    pub valid_keys: usize,
    pub invalid_keys: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    /// Critical keys absent from the translations.
    pub critical_issues: usize,
    /// 0 to 100.
    pub overall_score: f64,
}

impl ValidationStatistics {
    /// A key is invalid when it carries at least one error. The score starts
    /// from the valid ratio (1.0 for an empty map) and subtracts penalties.
    pub fn compute<'a>(
        keys: impl IntoIterator<Item = &'a str>,
        issues: &[ValidationIssue],
        critical_issues: usize,
    ) -> Self {
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        let (errors, warnings, infos) = (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        );

        let mut total_keys = 0;
        let mut invalid_keys = 0;
        for key in keys {
            total_keys += 1;
            if issues
                .iter()
                .any(|i| i.key == key && i.severity == Severity::Error)
            {
                invalid_keys += 1;
            }
        }
        let valid_keys = total_keys - invalid_keys;
        let valid_ratio = if total_keys == 0 {
            1.0
        } else {
            valid_keys as f64 / total_keys as f64
        };
        let overall_score = (valid_ratio * 100.0
            - errors as f64 * 5.0
            - warnings as f64 * 2.0
            - critical_issues as f64 * 10.0)
            .clamp(0.0, 100.0);

        Self {
            total_keys,
            valid_keys,
            invalid_keys,
            errors,
            warnings,
            infos,
            critical_issues,
            overall_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub locale: String,
    pub issues: Vec<ValidationIssue>,
    pub statistics: ValidationStatistics,
    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    /// No issue has error severity.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn issues_with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }
}
