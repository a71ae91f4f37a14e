//! Currency rendering layered on the number formatter: symbol placement,
//! spacing, compact amounts and spoken descriptions.

use std::hash::{DefaultHasher, Hash, Hasher};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    cache::{DEFAULT_FORMAT_CACHE_CAPACITY, FormatCache, FormatCacheStats, default_format_cache_ttl},
    catalog::{AudienceProfile, CurrencyInfo, LocaleCatalog, SymbolPosition},
    clock::{SharedClock, system_clock},
    config::FormatterConfiguration,
    error::Error,
    formatters::number::{format_grouped, parse_number},
    numbering::{AbbreviationStyle, abbreviate_with},
};

/// Stands in for the currency symbol inside a placement pattern.
pub const CURRENCY_PLACEHOLDER: char = '¤';
const AMOUNT_PLACEHOLDER: char = '#';

/// Number rules plus currency placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyConfiguration {
    number: FormatterConfiguration,
    currency: CurrencyInfo,
    symbol_position: SymbolPosition,
    symbol_spacing: bool,
}

impl CurrencyConfiguration {
    pub fn new(
        number: FormatterConfiguration,
        currency: CurrencyInfo,
        symbol_position: SymbolPosition,
    ) -> Self {
        Self {
            number,
            currency,
            symbol_position,
            symbol_spacing: true,
        }
    }

    /// Audience defaults: its numbering system, locale, currency and placement,
    /// with up to the currency's minor digits.
    pub fn for_audience(
        profile: &AudienceProfile,
        catalog: &dyn LocaleCatalog,
    ) -> Result<Self, Error> {
        let currency = catalog
            .currency(profile.currency_code)
            .ok_or_else(|| Error::unknown_currency(profile.currency_code))?
            .clone();
        let number = FormatterConfiguration::builder(profile.numbering_system)
            .with_locale(profile.locale)
            .with_fraction_digits(0, currency.minor_digits)
            .build()?;
        Ok(Self::new(number, currency, profile.symbol_position))
    }

    pub fn with_symbol_spacing(mut self, spacing: bool) -> Self {
        self.symbol_spacing = spacing;
        self
    }

    /// Same placement with different number rules.
    pub fn with_number_configuration(mut self, number: FormatterConfiguration) -> Self {
        self.number = number;
        self
    }

    pub fn number(&self) -> &FormatterConfiguration {
        &self.number
    }

    pub fn currency(&self) -> &CurrencyInfo {
        &self.currency
    }

    pub fn symbol_position(&self) -> SymbolPosition {
        self.symbol_position
    }

    pub fn config_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Placement pattern, e.g. `¤ #` or `# ¤`. Compact amounts hug a leading
    /// symbol.
    pub fn pattern(&self, compact: bool) -> String {
        let space = if self.symbol_spacing { " " } else { "" };
        match self.symbol_position {
            SymbolPosition::Before if compact => {
                format!("{}{}", CURRENCY_PLACEHOLDER, AMOUNT_PLACEHOLDER)
            }
            SymbolPosition::Before => {
                format!("{}{}{}", CURRENCY_PLACEHOLDER, space, AMOUNT_PLACEHOLDER)
            }
            SymbolPosition::After => format!("{} {}", AMOUNT_PLACEHOLDER, CURRENCY_PLACEHOLDER),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    config: CurrencyConfiguration,
    config_hash: u64,
    known_symbols: Vec<String>,
    cache: FormatCache<(Decimal, &'static str, u64)>,
}

impl CurrencyFormatter {
    /// `catalog` supplies the symbols stripped while parsing.
    pub fn new(config: CurrencyConfiguration, catalog: &dyn LocaleCatalog) -> Self {
        Self::with_clock(config, catalog, system_clock())
    }

    pub fn with_clock(
        config: CurrencyConfiguration,
        catalog: &dyn LocaleCatalog,
        clock: SharedClock,
    ) -> Self {
        let mut known_symbols: Vec<String> = catalog
            .currency_symbols()
            .into_iter()
            .map(str::to_string)
            .collect();
        known_symbols.extend(catalog.currencies().iter().map(|c| c.code.to_string()));
        if !known_symbols.iter().any(|s| s == config.currency.symbol) {
            known_symbols.push(config.currency.symbol.to_string());
        }
        known_symbols.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        Self {
            config_hash: config.config_hash(),
            config,
            known_symbols,
            cache: FormatCache::with_clock(
                DEFAULT_FORMAT_CACHE_CAPACITY,
                default_format_cache_ttl(),
                clock,
            ),
        }
    }

    pub fn configuration(&self) -> &CurrencyConfiguration {
        &self.config
    }

    /// Replaces the configuration and drops every cached result.
    pub fn set_configuration(&mut self, config: CurrencyConfiguration) {
        self.config_hash = config.config_hash();
        self.config = config;
        self.cache.clear();
    }

    pub fn format(&mut self, amount: Decimal) -> String {
        let config = &self.config;
        let key = (amount, config.currency.code, self.config_hash);
        self.cache
            .get_or_insert_with(key, || format_currency(amount, config))
    }

    /// Strips any known symbol or currency code, then parses the number.
    pub fn parse(&self, input: &str) -> Option<Decimal> {
        let mut text = input.trim().to_string();
        for symbol in &self.known_symbols {
            if text.contains(symbol.as_str()) {
                text = text.replace(symbol.as_str(), "");
            }
        }
        parse_number(text.trim(), &self.config.number)
    }

    /// Screen-reader description: `1,234 rupees and 50 paise`.
    pub fn accessible_description(&self, amount: Decimal) -> String {
        describe_amount(amount, &self.config)
    }

    pub fn cache_stats(&self) -> FormatCacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Formats `amount` without caching.
pub fn format_currency(amount: Decimal, config: &CurrencyConfiguration) -> String {
    let number = &config.number;
    let minus = if number.accessibility_mode() { "minus " } else { "-" };

    if number.abbreviate() && amount.abs() >= number.abbreviation_threshold() {
        let style = if number.accessibility_mode() {
            AbbreviationStyle::Spoken
        } else {
            AbbreviationStyle::Suffix
        };
        if let Some(short) = abbreviate_with(
            number.numbering_system(),
            amount.abs(),
            number.separators().decimal,
            style,
        ) {
            let sign = if amount.is_sign_negative() { minus } else { "" };
            return format!("{}{}", sign, place(config, &short, true));
        }
    }

    let rounded = amount.round_dp_with_strategy(
        number.max_fraction_digits(),
        number.rounding_mode().strategy(),
    );
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        minus
    } else {
        ""
    };
    let body = format_grouped(rounded.abs(), number);
    format!("{}{}", sign, place(config, &body, false))
}

fn place(config: &CurrencyConfiguration, amount: &str, compact: bool) -> String {
    config
        .pattern(compact)
        .replace(CURRENCY_PLACEHOLDER, config.currency.symbol)
        .replace(AMOUNT_PLACEHOLDER, amount)
}

fn describe_amount(amount: Decimal, config: &CurrencyConfiguration) -> String {
    let currency = &config.currency;
    let whole_number = FormatterConfiguration::new(config.number.numbering_system());

    let rounded = amount
        .abs()
        .round_dp_with_strategy(currency.minor_digits, RoundingStrategy::MidpointAwayFromZero);
    let major = rounded.trunc();
    // Rescaling the fraction to the minor digits turns its mantissa into the
    // count of minor units; scales past 28 are capped rather than overflowing.
    let mut fraction = rounded - major;
    fraction.rescale(currency.minor_digits);
    let minor = fraction.mantissa();

    let major_unit = if major == Decimal::ONE {
        currency.major_unit
    } else {
        currency.major_unit_plural
    };
    let mut out = String::new();
    if amount.is_sign_negative() && !rounded.is_zero() {
        out.push_str("minus ");
    }
    out.push_str(&format_grouped(major, &whole_number));
    out.push(' ');
    out.push_str(major_unit);

    if minor > 0 {
        let minor_unit = if minor == 1 {
            currency.minor_unit_singular
        } else {
            currency.minor_unit
        };
        out.push_str(&format!(" and {} {}", minor, minor_unit));
    }
    out
}
