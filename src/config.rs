//! Immutable number-formatting configuration and its builder.
//!
//! A configuration is validated once, at `build()` time, and never mutated
//! afterwards: formatters key their caches by [`FormatterConfiguration::config_hash`],
//! so switching context always means building a new value.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    numbering::{NumberingSystem, Separators, separators},
};

/// Largest scale a `Decimal` can carry.
pub const MAX_FRACTION_DIGITS: u32 = 28;

/// Rounding applied when a value has more fraction digits than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    Ceiling,
    Floor,
    TowardZero,
    AwayFromZero,
    #[default]
    HalfToEven,
    HalfTowardZero,
    HalfAwayFromZero,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
            RoundingMode::TowardZero => RoundingStrategy::ToZero,
            RoundingMode::AwayFromZero => RoundingStrategy::AwayFromZero,
            RoundingMode::HalfToEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfTowardZero => RoundingStrategy::MidpointTowardZero,
            RoundingMode::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "ceiling" => Ok(RoundingMode::Ceiling),
            "floor" => Ok(RoundingMode::Floor),
            "toward_zero" | "down" => Ok(RoundingMode::TowardZero),
            "away_from_zero" | "up" => Ok(RoundingMode::AwayFromZero),
            "half_to_even" | "half_even" => Ok(RoundingMode::HalfToEven),
            "half_toward_zero" | "half_down" => Ok(RoundingMode::HalfTowardZero),
            "half_away_from_zero" | "half_up" => Ok(RoundingMode::HalfAwayFromZero),
            _ => Err(format!("Unknown rounding mode: {}", s)),
        }
    }
}

/// Number formatting rules bound to one numbering system and locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormatterConfiguration {
    numbering_system: NumberingSystem,
    locale: String,
    separators: Separators,
    min_fraction_digits: u32,
    max_fraction_digits: u32,
    rounding_mode: RoundingMode,
    abbreviate: bool,
    abbreviation_threshold: Decimal,
    accessibility_mode: bool,
}

impl FormatterConfiguration {
    /// Defaults for `system`: its usual locale, 0–2 fraction digits, half-even
    /// rounding, no abbreviation.
    pub fn new(system: NumberingSystem) -> Self {
        Self {
            numbering_system: system,
            locale: default_locale(system).to_string(),
            separators: separators(system),
            min_fraction_digits: 0,
            max_fraction_digits: 2,
            rounding_mode: RoundingMode::default(),
            abbreviate: false,
            abbreviation_threshold: Decimal::ONE_THOUSAND,
            accessibility_mode: false,
        }
    }

    pub fn builder(system: NumberingSystem) -> FormatterConfigurationBuilder {
        FormatterConfigurationBuilder {
            config: Self::new(system),
        }
    }

    /// Starts a builder seeded with this configuration's values.
    pub fn to_builder(&self) -> FormatterConfigurationBuilder {
        FormatterConfigurationBuilder {
            config: self.clone(),
        }
    }

    pub fn numbering_system(&self) -> NumberingSystem {
        self.numbering_system
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn separators(&self) -> &Separators {
        &self.separators
    }

    pub fn min_fraction_digits(&self) -> u32 {
        self.min_fraction_digits
    }

    pub fn max_fraction_digits(&self) -> u32 {
        self.max_fraction_digits
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        self.rounding_mode
    }

    pub fn abbreviate(&self) -> bool {
        self.abbreviate
    }

    pub fn abbreviation_threshold(&self) -> Decimal {
        self.abbreviation_threshold
    }

    pub fn accessibility_mode(&self) -> bool {
        self.accessibility_mode
    }

    /// Stable hash used to partition formatter caches.
    pub fn config_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Fluent builder for [`FormatterConfiguration`].
#[derive(Debug, Clone)]
pub struct FormatterConfigurationBuilder {
    config: FormatterConfiguration,
}

impl FormatterConfigurationBuilder {
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.config.locale = locale.into();
        self
    }

    pub fn with_fraction_digits(mut self, min: u32, max: u32) -> Self {
        self.config.min_fraction_digits = min;
        self.config.max_fraction_digits = max;
        self
    }

    pub fn with_rounding_mode(mut self, mode: RoundingMode) -> Self {
        self.config.rounding_mode = mode;
        self
    }

    pub fn with_abbreviation(mut self, enabled: bool) -> Self {
        self.config.abbreviate = enabled;
        self
    }

    pub fn with_abbreviation_threshold(mut self, threshold: Decimal) -> Self {
        self.config.abbreviation_threshold = threshold;
        self
    }

    pub fn with_accessibility_mode(mut self, enabled: bool) -> Self {
        self.config.accessibility_mode = enabled;
        self
    }

    /// Overrides the grouping sizes of the numbering system.
    pub fn with_grouping_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.config.separators.grouping_sizes = sizes;
        self
    }

    pub fn with_grouping(mut self, enabled: bool) -> Self {
        self.config.separators.use_grouping = enabled;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<FormatterConfiguration, Error> {
        let config = self.config;

        if config.locale.parse::<LanguageIdentifier>().is_err() {
            return Err(Error::InvalidLocale(config.locale));
        }
        if config.min_fraction_digits > config.max_fraction_digits {
            return Err(Error::invalid_configuration(format!(
                "min fraction digits ({}) exceeds max fraction digits ({})",
                config.min_fraction_digits, config.max_fraction_digits
            )));
        }
        if config.max_fraction_digits > MAX_FRACTION_DIGITS {
            return Err(Error::invalid_configuration(format!(
                "max fraction digits must be at most {}",
                MAX_FRACTION_DIGITS
            )));
        }
        if config.separators.grouping_sizes.is_empty() {
            return Err(Error::invalid_configuration(
                "grouping sizes must not be empty",
            ));
        }
        if config.separators.grouping_sizes.contains(&0) {
            return Err(Error::invalid_configuration(
                "grouping sizes must be positive",
            ));
        }
        if config.separators.decimal == config.separators.grouping {
            return Err(Error::invalid_configuration(
                "decimal and grouping separators must differ",
            ));
        }
        if config.abbreviation_threshold.is_sign_negative() {
            return Err(Error::invalid_configuration(
                "abbreviation threshold must not be negative",
            ));
        }

        Ok(config)
    }
}

fn default_locale(system: NumberingSystem) -> &'static str {
    match system {
        NumberingSystem::Indian => "en-IN",
        NumberingSystem::Western => "en-US",
        NumberingSystem::British => "en-GB",
        NumberingSystem::European => "de-DE",
        NumberingSystem::Arabic => "ar-AE",
    }
}
