//! Decimal formatting and parsing under a [`FormatterConfiguration`].

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::warn;

use crate::{
    cache::{DEFAULT_FORMAT_CACHE_CAPACITY, FormatCache, FormatCacheStats, default_format_cache_ttl},
    clock::SharedClock,
    config::FormatterConfiguration,
    numbering::{AbbreviationStyle, Separators, abbreviate_with, group_digits, strip_abbreviation},
};

/// Number formatter bound to one configuration, with a private result cache.
///
/// Formatters are cheap; build one per thread or per context rather than
/// sharing one behind a lock.
#[derive(Debug, Clone)]
pub struct NumberFormatter {
    config: FormatterConfiguration,
    config_hash: u64,
    cache: FormatCache<(Decimal, u64)>,
}

impl NumberFormatter {
    pub fn new(config: FormatterConfiguration) -> Self {
        Self::with_cache_capacity(config, DEFAULT_FORMAT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(config: FormatterConfiguration, capacity: usize) -> Self {
        Self {
            config_hash: config.config_hash(),
            config,
            cache: FormatCache::new(capacity),
        }
    }

    /// Cached results expire against `clock` instead of wall time.
    pub fn with_clock(config: FormatterConfiguration, clock: SharedClock) -> Self {
        Self {
            config_hash: config.config_hash(),
            config,
            cache: FormatCache::with_clock(
                DEFAULT_FORMAT_CACHE_CAPACITY,
                default_format_cache_ttl(),
                clock,
            ),
        }
    }

    pub fn configuration(&self) -> &FormatterConfiguration {
        &self.config
    }

    /// Replaces the configuration and drops every cached result.
    pub fn set_configuration(&mut self, config: FormatterConfiguration) {
        self.config_hash = config.config_hash();
        self.config = config;
        self.cache.clear();
    }

    pub fn format(&mut self, value: Decimal) -> String {
        let config = &self.config;
        self.cache
            .get_or_insert_with((value, self.config_hash), || format_number(value, config))
    }

    /// Formats a ratio as a percentage: `0.125` → `12.5%`.
    pub fn format_percentage(&mut self, ratio: Decimal) -> String {
        let Some(scaled) = ratio.checked_mul(Decimal::ONE_HUNDRED) else {
            warn!(%ratio, "percentage out of range, falling back to plain output");
            return format!("{}%", ratio);
        };
        let percent = format_grouped(scaled, &self.config);
        if self.config.separators().decimal == ',' {
            format!("{} %", percent)
        } else {
            format!("{}%", percent)
        }
    }

    pub fn parse(&self, input: &str) -> Option<Decimal> {
        parse_number(input, &self.config)
    }

    pub fn cache_stats(&self) -> FormatCacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Formats `value` without caching.
///
/// Abbreviates when enabled and `|value|` reaches the threshold, otherwise
/// renders the full grouped number.
pub fn format_number(value: Decimal, config: &FormatterConfiguration) -> String {
    if config.abbreviate() && value.abs() >= config.abbreviation_threshold() {
        let style = if config.accessibility_mode() {
            AbbreviationStyle::Spoken
        } else {
            AbbreviationStyle::Suffix
        };
        if let Some(short) = abbreviate_with(
            config.numbering_system(),
            value,
            config.separators().decimal,
            style,
        ) {
            return short;
        }
    }
    format_grouped(value, config)
}

/// Full-precision rendering with grouping, fraction clamping and rounding.
pub(crate) fn format_grouped(value: Decimal, config: &FormatterConfiguration) -> String {
    let seps = config.separators();
    let mut rounded = value
        .round_dp_with_strategy(config.max_fraction_digits(), config.rounding_mode().strategy())
        .normalize();
    if rounded.scale() < config.min_fraction_digits() {
        rounded.rescale(config.min_fraction_digits());
    }

    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        warn!(%value, "unexpected decimal rendering, falling back to plain output");
        return value.to_string();
    }

    let mut out = String::with_capacity(text.len() + 8);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push_str(if config.accessibility_mode() { "minus " } else { "-" });
    }
    if seps.use_grouping {
        out.push_str(&group_digits(int_part, &seps.grouping_sizes, seps.grouping));
    } else {
        out.push_str(int_part);
    }
    if !frac_part.is_empty() {
        out.push(seps.decimal);
        out.push_str(frac_part);
    }
    out
}

/// Parses text produced by [`format_number`] (or typed by a user) back into a
/// decimal. Returns `None` for anything that is not a well-formed number.
pub fn parse_number(input: &str, config: &FormatterConfiguration) -> Option<Decimal> {
    let (negative, text) = split_sign(input.trim());
    let (numeric, multiplier) = strip_abbreviation(config.numbering_system(), text);
    let canonical = canonicalize(numeric, config.separators())?;
    let magnitude = Decimal::from_str(&canonical).ok()?;
    let value = match multiplier {
        Some(m) => magnitude.checked_mul(m)?,
        None => magnitude,
    };
    Some(if negative { -value } else { value })
}

pub(crate) fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix("minus ") {
        return (true, rest.trim_start());
    }
    if let Some(rest) = text.strip_prefix('-').or_else(|| text.strip_prefix('\u{2212}')) {
        return (true, rest.trim_start());
    }
    if let Some(rest) = text.strip_prefix('+') {
        return (false, rest.trim_start());
    }
    (false, text)
}

// Rewrites localized digits into `1234.56` form. For comma-decimal systems the
// last decimal separator wins and every earlier mark is grouping.
fn canonicalize(text: &str, seps: &Separators) -> Option<String> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let canonical = if seps.decimal == '.' {
        cleaned.replace(seps.grouping, "")
    } else {
        match cleaned.rfind(seps.decimal) {
            Some(idx) => {
                let (int_part, frac_part) = cleaned.split_at(idx);
                format!(
                    "{}.{}",
                    int_part.replace([seps.grouping, seps.decimal], ""),
                    &frac_part[seps.decimal.len_utf8()..]
                )
            }
            None => cleaned.replace(seps.grouping, ""),
        }
    };

    let well_formed = canonical.bytes().any(|b| b.is_ascii_digit())
        && canonical.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && canonical.matches('.').count() <= 1
        && !canonical.ends_with('.');
    well_formed.then_some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::RoundingMode, numbering::NumberingSystem};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn abbreviated(system: NumberingSystem) -> FormatterConfiguration {
        FormatterConfiguration::builder(system)
            .with_abbreviation(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_indian_full_format() {
        let config = FormatterConfiguration::new(NumberingSystem::Indian);
        assert_eq!(format_number(dec("12345678"), &config), "1,23,45,678");
        assert_eq!(format_number(dec("123456.789"), &config), "1,23,456.79");
        assert_eq!(format_number(dec("-100000"), &config), "-1,00,000");
    }

    #[test]
    fn test_indian_abbreviated() {
        let config = abbreviated(NumberingSystem::Indian);
        assert_eq!(format_number(dec("100000"), &config), "1L");
        assert_eq!(format_number(dec("25000000"), &config), "2.5Cr");
        assert_eq!(format_number(dec("999"), &config), "999");
    }

    #[test]
    fn test_western_format() {
        let config = FormatterConfiguration::new(NumberingSystem::Western);
        assert_eq!(format_number(dec("1234567"), &config), "1,234,567");
        assert_eq!(
            format_number(dec("1000000000"), &abbreviated(NumberingSystem::Western)),
            "1B"
        );
    }

    #[test]
    fn test_european_format() {
        let config = FormatterConfiguration::new(NumberingSystem::European);
        assert_eq!(format_number(dec("1234567.891"), &config), "1.234.567,89");
    }

    #[test]
    fn test_min_fraction_digits_pad() {
        let config = FormatterConfiguration::builder(NumberingSystem::Western)
            .with_fraction_digits(2, 2)
            .build()
            .unwrap();
        assert_eq!(format_number(dec("5"), &config), "5.00");
        assert_eq!(format_number(dec("5.1"), &config), "5.10");
    }

    #[test]
    fn test_rounding_modes() {
        let build = |mode| {
            FormatterConfiguration::builder(NumberingSystem::Western)
                .with_fraction_digits(0, 0)
                .with_rounding_mode(mode)
                .build()
                .unwrap()
        };
        assert_eq!(format_number(dec("2.5"), &build(RoundingMode::HalfToEven)), "2");
        assert_eq!(format_number(dec("2.5"), &build(RoundingMode::HalfAwayFromZero)), "3");
        assert_eq!(format_number(dec("2.5"), &build(RoundingMode::HalfTowardZero)), "2");
        assert_eq!(format_number(dec("2.1"), &build(RoundingMode::Ceiling)), "3");
        assert_eq!(format_number(dec("-2.1"), &build(RoundingMode::Floor)), "-3");
        assert_eq!(format_number(dec("-2.9"), &build(RoundingMode::TowardZero)), "-2");
        assert_eq!(format_number(dec("2.1"), &build(RoundingMode::AwayFromZero)), "3");
    }

    #[test]
    fn test_accessibility_mode() {
        let config = FormatterConfiguration::builder(NumberingSystem::Indian)
            .with_abbreviation(true)
            .with_accessibility_mode(true)
            .build()
            .unwrap();
        assert_eq!(format_number(dec("25000000"), &config), "2.5 crore");
        assert_eq!(format_number(dec("-12"), &config), "minus 12");
        assert_eq!(parse_number("2.5 crore", &config), Some(dec("25000000")));
        assert_eq!(parse_number("minus 12", &config), Some(dec("-12")));
    }

    #[test]
    fn test_parse_grouped_values() {
        let indian = FormatterConfiguration::new(NumberingSystem::Indian);
        let european = FormatterConfiguration::new(NumberingSystem::European);
        assert_eq!(parse_number("1,23,45,678", &indian), Some(dec("12345678")));
        assert_eq!(parse_number("1.234.567,89", &european), Some(dec("1234567.89")));
        assert_eq!(parse_number("100.000", &european), Some(dec("100000")));
        assert_eq!(parse_number("-1,00,000.50", &indian), Some(dec("-100000.50")));
    }

    #[test]
    fn test_parse_abbreviations() {
        let indian = FormatterConfiguration::new(NumberingSystem::Indian);
        let european = FormatterConfiguration::new(NumberingSystem::European);
        assert_eq!(parse_number("2.5Cr", &indian), Some(dec("25000000")));
        assert_eq!(parse_number("1L", &indian), Some(dec("100000")));
        assert_eq!(parse_number("2,5M", &european), Some(dec("2500000")));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let config = FormatterConfiguration::new(NumberingSystem::Western);
        for input in ["", "abc", "1.2.3", "12a", "Cr", "--5", "1."] {
            assert_eq!(parse_number(input, &config), None, "input {:?}", input);
        }
    }

    #[test]
    fn test_formatter_cache_and_reconfigure() {
        let mut formatter = NumberFormatter::new(FormatterConfiguration::new(NumberingSystem::Indian));
        assert_eq!(formatter.format(dec("100000")), "1,00,000");
        assert_eq!(formatter.format(dec("100000")), "1,00,000");
        assert_eq!(formatter.cache_stats().hits, 1);

        formatter.set_configuration(FormatterConfiguration::new(NumberingSystem::Western));
        assert_eq!(formatter.cache_stats().len, 0);
        assert_eq!(formatter.format(dec("100000")), "100,000");
    }

    #[test]
    fn test_percentage() {
        let mut western = NumberFormatter::new(FormatterConfiguration::new(NumberingSystem::Western));
        let mut european =
            NumberFormatter::new(FormatterConfiguration::new(NumberingSystem::European));
        assert_eq!(western.format_percentage(dec("0.125")), "12.5%");
        assert_eq!(european.format_percentage(dec("0.125")), "12,5 %");
    }

    #[test]
    fn test_percentage_out_of_range_falls_back() {
        let mut western = NumberFormatter::new(FormatterConfiguration::new(NumberingSystem::Western));
        assert_eq!(
            western.format_percentage(Decimal::MAX),
            "79228162514337593543950335%"
        );
        assert_eq!(
            western.format_percentage(Decimal::MIN),
            "-79228162514337593543950335%"
        );
    }

    #[test]
    fn test_cached_results_expire_with_clock() {
        use std::sync::Arc;

        use chrono::{Duration, TimeZone, Utc};

        use crate::clock::ManualClock;

        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut formatter = NumberFormatter::with_clock(
            FormatterConfiguration::new(NumberingSystem::Indian),
            Arc::new(clock.clone()),
        );
        formatter.format(dec("100000"));
        formatter.format(dec("100000"));
        clock.advance(Duration::hours(2));
        assert_eq!(formatter.format(dec("100000")), "1,00,000");

        let stats = formatter.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expired, 1);
    }
}
