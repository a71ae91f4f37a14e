//! Renderers for [`ValidationResult`]. Each output depends on the result
//! alone, so the same result always renders the same text.

use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    error::Error,
    validation::{ValidationIssue, ValidationResult},
};

#[derive(Serialize)]
struct CsvIssueRow<'a> {
    severity: &'a str,
    key: &'a str,
    #[serde(rename = "type")]
    issue_type: &'a str,
    message: &'a str,
    suggestion: &'a str,
}

impl<'a> From<&'a ValidationIssue> for CsvIssueRow<'a> {
    fn from(issue: &'a ValidationIssue) -> Self {
        Self {
            severity: issue.severity.as_str(),
            key: &issue.key,
            issue_type: issue.issue_type.as_str(),
            message: &issue.message,
            suggestion: issue.suggestion.as_deref().unwrap_or(""),
        }
    }
}

impl ValidationResult {
    pub fn to_text(&self) -> String {
        let stats = &self.statistics;
        let mut out = String::new();
        let _ = writeln!(out, "Localization report for {}", self.locale);
        let _ = writeln!(out, "Generated: {}", self.timestamp.to_rfc3339());
        let _ = writeln!(
            out,
            "Score: {:.1}/100 ({})",
            stats.overall_score,
            if self.is_valid() { "valid" } else { "invalid" }
        );
        let _ = writeln!(
            out,
            "Keys: {} total, {} valid, {} invalid",
            stats.total_keys, stats.valid_keys, stats.invalid_keys
        );
        let _ = writeln!(
            out,
            "Issues: {} errors, {} warnings, {} info",
            stats.errors, stats.warnings, stats.infos
        );

        for issue in &self.issues {
            let _ = write!(
                out,
                "\n[{}] {} ({}): {}",
                issue.severity, issue.key, issue.issue_type, issue.message
            );
            if let Some(suggestion) = &issue.suggestion {
                let _ = write!(out, "\n  suggestion: {}", suggestion);
            }
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One row per issue under a `severity,key,type,message,suggestion` header.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        if self.issues.is_empty() {
            wtr.write_record(["severity", "key", "type", "message", "suggestion"])?;
        }
        for issue in &self.issues {
            wtr.serialize(CsvIssueRow::from(issue))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn to_markdown(&self) -> String {
        let stats = &self.statistics;
        let mut out = String::new();
        let _ = writeln!(out, "# Localization report: {}\n", self.locale);
        let _ = writeln!(out, "Generated {}\n", self.timestamp.to_rfc3339());
        out.push_str("| Metric | Value |\n|---|---|\n");
        let _ = writeln!(out, "| Score | {:.1} |", stats.overall_score);
        let _ = writeln!(out, "| Valid | {} |", if self.is_valid() { "yes" } else { "no" });
        let _ = writeln!(out, "| Keys | {} |", stats.total_keys);
        let _ = writeln!(out, "| Errors | {} |", stats.errors);
        let _ = writeln!(out, "| Warnings | {} |", stats.warnings);
        let _ = writeln!(out, "| Info | {} |", stats.infos);

        out.push_str("\n## Issues\n\n");
        if self.issues.is_empty() {
            out.push_str("No issues found.\n");
            return out;
        }
        out.push_str("| Severity | Key | Type | Message | Suggestion |\n|---|---|---|---|---|\n");
        for issue in &self.issues {
            let _ = writeln!(
                out,
                "| {} | `{}` | {} | {} | {} |",
                issue.severity,
                issue.key,
                issue.issue_type,
                escape_cell(&issue.message),
                escape_cell(issue.suggestion.as_deref().unwrap_or("")),
            );
        }
        out
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
