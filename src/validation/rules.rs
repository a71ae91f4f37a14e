use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_CRITICAL_KEYS: Vec<&'static str> = vec![
        "app.name",
        "common.cancel",
        "common.ok",
        "error.generic",
        "tab.accounts",
        "tab.budgets",
        "tab.dashboard",
        "tab.settings",
    ];
    static ref DEFAULT_REQUIRED_PARAMETERS: Vec<(&'static str, &'static [&'static str])> = vec![
        ("budget.remaining", &["amount"][..]),
        ("budget.exceeded", &["amount", "category"][..]),
        ("transaction.added", &["amount"][..]),
        ("goal.progress", &["percent", "goal"][..]),
        ("greeting.user", &["name"][..]),
    ];
    static ref DEFAULT_MAX_LENGTHS: Vec<(&'static str, usize)> = vec![
        ("tab.accounts", 20),
        ("tab.budgets", 20),
        ("tab.dashboard", 20),
        ("tab.settings", 20),
        ("common.cancel", 15),
        ("common.ok", 15),
    ];
}

/// What the validator checks beyond the structural rules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatorRules {
    critical_keys: BTreeSet<String>,
    required_parameters: BTreeMap<String, Vec<String>>,
    max_lengths: BTreeMap<String, usize>,
}

impl ValidatorRules {
    /// No critical keys, parameters or length limits.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> ValidatorRulesBuilder {
        ValidatorRulesBuilder {
            rules: Self::empty(),
        }
    }

    /// The rules shipped for the finance app's string catalog.
    pub fn standard() -> Self {
        let mut builder = Self::builder();
        for key in DEFAULT_CRITICAL_KEYS.iter() {
            builder = builder.with_critical_key(*key);
        }
        for (key, params) in DEFAULT_REQUIRED_PARAMETERS.iter() {
            builder = builder.with_required_parameters(*key, params.iter().copied());
        }
        for (key, limit) in DEFAULT_MAX_LENGTHS.iter() {
            builder = builder.with_max_length(*key, *limit);
        }
        builder.build()
    }

    pub fn critical_keys(&self) -> impl Iterator<Item = &str> {
        self.critical_keys.iter().map(String::as_str)
    }

    pub fn required_parameters(&self, key: &str) -> &[String] {
        self.required_parameters
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn max_length(&self, key: &str) -> Option<usize> {
        self.max_lengths.get(key).copied()
    }
}

#[derive(Debug, Clone)]
pub struct ValidatorRulesBuilder {
    rules: ValidatorRules,
}

impl ValidatorRulesBuilder {
    pub fn with_critical_key(mut self, key: impl Into<String>) -> Self {
        self.rules.critical_keys.insert(key.into());
        self
    }

    pub fn with_required_parameters<I, S>(mut self, key: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .required_parameters
            .insert(key.into(), params.into_iter().map(Into::into).collect());
        self
    }

    /// Limit in characters, not bytes.
    pub fn with_max_length(mut self, key: impl Into<String>, limit: usize) -> Self {
        self.rules.max_lengths.insert(key.into(), limit);
        self
    }

    pub fn build(self) -> ValidatorRules {
        self.rules
    }
}
