//! History of context/preference changes.

use std::{collections::VecDeque, fmt::Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of changes kept by [`AuditTrail`].
pub const DEFAULT_AUDIT_LIMIT: usize = 200;

/// A setting value with its type preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    /// One member of a closed set, e.g. `kind = "audience"`, `value = "indian"`.
    Choice { kind: String, value: String },
}

impl SettingValue {
    pub fn choice(kind: impl Into<String>, value: impl Into<String>) -> Self {
        SettingValue::Choice {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Integer(i) => write!(f, "{}", i),
            SettingValue::Text(s) => f.write_str(s),
            SettingValue::Choice { kind, value } => write!(f, "{}:{}", kind, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingChange {
    pub setting: String,
    /// `None` for the first value a setting ever takes.
    pub old: Option<SettingValue>,
    pub new: SettingValue,
    pub changed_at: DateTime<Utc>,
}

/// Bounded, oldest-first change log.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    changes: VecDeque<SettingChange>,
    limit: usize,
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_LIMIT)
    }
}

impl AuditTrail {
    pub fn new(limit: usize) -> Self {
        Self {
            changes: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn record(&mut self, change: SettingChange) {
        if self.changes.len() == self.limit {
            self.changes.pop_front();
        }
        self.changes.push_back(change);
    }

    pub fn changes(&self) -> impl Iterator<Item = &SettingChange> {
        self.changes.iter()
    }

    /// Most recent change of `setting`.
    pub fn last_change(&self, setting: &str) -> Option<&SettingChange> {
        self.changes.iter().rev().find(|c| c.setting == setting)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn to_json(&self) -> Result<String, crate::Error> {
        let changes: Vec<&SettingChange> = self.changes.iter().collect();
        Ok(serde_json::to_string_pretty(&changes)?)
    }
}
