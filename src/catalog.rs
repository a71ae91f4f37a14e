//! Read-only audience and currency catalogs.
//!
//! The tables are static, but every consumer receives them through the
//! [`LocaleCatalog`] trait so hosts and tests can inject their own data.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::Weekday;
use chrono_tz::Tz;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::{fiscal::FinancialYearRule, numbering::NumberingSystem};

/// A cultural/regional profile driving formatting defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Indian,
    American,
    British,
    Canadian,
    Australian,
    European,
    Singaporean,
    Japanese,
    Emirati,
}

impl Audience {
    pub const ALL: [Audience; 9] = [
        Audience::Indian,
        Audience::American,
        Audience::British,
        Audience::Canadian,
        Audience::Australian,
        Audience::European,
        Audience::Singaporean,
        Audience::Japanese,
        Audience::Emirati,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Indian => "indian",
            Audience::American => "american",
            Audience::British => "british",
            Audience::Canadian => "canadian",
            Audience::Australian => "australian",
            Audience::European => "european",
            Audience::Singaporean => "singaporean",
            Audience::Japanese => "japanese",
            Audience::Emirati => "emirati",
        }
    }
}

impl Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Audience::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown audience: {}", s))
    }
}

/// Where a currency symbol sits relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

impl TextDirection {
    /// Script direction of the locale's base language.
    pub fn for_locale(locale: &LanguageIdentifier) -> Self {
        match locale.language.as_str() {
            "ar" | "he" | "iw" | "fa" | "ur" | "yi" | "ps" => TextDirection::RightToLeft,
            _ => TextDirection::LeftToRight,
        }
    }
}

/// Static defaults for one audience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceProfile {
    pub audience: Audience,
    pub locale: &'static str,
    pub numbering_system: NumberingSystem,
    /// LDML-style short date pattern, e.g. `dd/MM/yyyy`.
    pub date_pattern: &'static str,
    pub uses_24_hour_time: bool,
    pub currency_code: &'static str,
    pub symbol_position: SymbolPosition,
    pub financial_year: FinancialYearRule,
    pub week_start: Weekday,
    pub time_zone: Tz,
}

impl AudienceProfile {
    /// Day precedes month in the audience's short pattern.
    pub fn day_first(&self) -> bool {
        match (self.date_pattern.find('d'), self.date_pattern.find('M')) {
            (Some(d), Some(m)) => d < m,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub major_unit: &'static str,
    pub major_unit_plural: &'static str,
    /// Fractional unit name, e.g. `paise`.
    pub minor_unit: &'static str,
    pub minor_unit_singular: &'static str,
    pub minor_digits: u32,
}

/// Read-only lookup tables consumed by the formatters and the validator.
pub trait LocaleCatalog: Send + Sync + std::fmt::Debug {
    fn audience(&self, audience: Audience) -> Option<&AudienceProfile>;

    fn currency(&self, code: &str) -> Option<&CurrencyInfo>;

    fn currencies(&self) -> Vec<&CurrencyInfo>;

    /// All known symbols, longest first so `A$` is matched before `$`.
    fn currency_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.currencies().iter().map(|c| c.symbol).collect();
        symbols.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        symbols.dedup();
        symbols
    }
}

lazy_static! {
    static ref AUDIENCE_TABLE: BTreeMap<Audience, AudienceProfile> = {
        use chrono_tz::{America, Asia, Australia, Europe};
        use FinancialYearRule::*;

        let profiles = [
            AudienceProfile {
                audience: Audience::Indian,
                locale: "en-IN",
                numbering_system: NumberingSystem::Indian,
                date_pattern: "dd/MM/yyyy",
                uses_24_hour_time: false,
                currency_code: "INR",
                symbol_position: SymbolPosition::Before,
                financial_year: AprilToMarch,
                week_start: Weekday::Mon,
                time_zone: Asia::Kolkata,
            },
            AudienceProfile {
                audience: Audience::American,
                locale: "en-US",
                numbering_system: NumberingSystem::Western,
                date_pattern: "MM/dd/yyyy",
                uses_24_hour_time: false,
                currency_code: "USD",
                symbol_position: SymbolPosition::Before,
                financial_year: JanuaryToDecember,
                week_start: Weekday::Sun,
                time_zone: America::New_York,
            },
            AudienceProfile {
                audience: Audience::British,
                locale: "en-GB",
                numbering_system: NumberingSystem::British,
                date_pattern: "dd/MM/yyyy",
                uses_24_hour_time: true,
                currency_code: "GBP",
                symbol_position: SymbolPosition::Before,
                financial_year: AprilToMarch,
                week_start: Weekday::Mon,
                time_zone: Europe::London,
            },
            AudienceProfile {
                audience: Audience::Canadian,
                locale: "en-CA",
                numbering_system: NumberingSystem::Western,
                date_pattern: "yyyy-MM-dd",
                uses_24_hour_time: false,
                currency_code: "CAD",
                symbol_position: SymbolPosition::Before,
                financial_year: JanuaryToDecember,
                week_start: Weekday::Sun,
                time_zone: America::Toronto,
            },
            AudienceProfile {
                audience: Audience::Australian,
                locale: "en-AU",
                numbering_system: NumberingSystem::Western,
                date_pattern: "dd/MM/yyyy",
                uses_24_hour_time: false,
                currency_code: "AUD",
                symbol_position: SymbolPosition::Before,
                financial_year: Custom { start_month: 7 },
                week_start: Weekday::Mon,
                time_zone: Australia::Sydney,
            },
            AudienceProfile {
                audience: Audience::European,
                locale: "de-DE",
                numbering_system: NumberingSystem::European,
                date_pattern: "dd.MM.yyyy",
                uses_24_hour_time: true,
                currency_code: "EUR",
                symbol_position: SymbolPosition::After,
                financial_year: JanuaryToDecember,
                week_start: Weekday::Mon,
                time_zone: Europe::Berlin,
            },
            AudienceProfile {
                audience: Audience::Singaporean,
                locale: "en-SG",
                numbering_system: NumberingSystem::Western,
                date_pattern: "dd/MM/yyyy",
                uses_24_hour_time: false,
                currency_code: "SGD",
                symbol_position: SymbolPosition::Before,
                financial_year: JanuaryToDecember,
                week_start: Weekday::Mon,
                time_zone: Asia::Singapore,
            },
            AudienceProfile {
                audience: Audience::Japanese,
                locale: "ja-JP",
                numbering_system: NumberingSystem::Western,
                date_pattern: "yyyy/MM/dd",
                uses_24_hour_time: true,
                currency_code: "JPY",
                symbol_position: SymbolPosition::Before,
                financial_year: AprilToMarch,
                week_start: Weekday::Sun,
                time_zone: Asia::Tokyo,
            },
            AudienceProfile {
                audience: Audience::Emirati,
                locale: "ar-AE",
                numbering_system: NumberingSystem::Arabic,
                date_pattern: "dd/MM/yyyy",
                uses_24_hour_time: false,
                currency_code: "AED",
                symbol_position: SymbolPosition::After,
                financial_year: JanuaryToDecember,
                week_start: Weekday::Mon,
                time_zone: Asia::Dubai,
            },
        ];

        profiles.into_iter().map(|p| (p.audience, p)).collect()
    };

    static ref CURRENCY_TABLE: BTreeMap<&'static str, CurrencyInfo> = {
        fn c(
            code: &'static str,
            symbol: &'static str,
            major: (&'static str, &'static str),
            minor: (&'static str, &'static str),
            minor_digits: u32,
        ) -> CurrencyInfo {
            CurrencyInfo {
                code,
                symbol,
                major_unit: major.0,
                major_unit_plural: major.1,
                minor_unit_singular: minor.0,
                minor_unit: minor.1,
                minor_digits,
            }
        }

        [
            c("INR", "₹", ("rupee", "rupees"), ("paisa", "paise"), 2),
            c("USD", "$", ("dollar", "dollars"), ("cent", "cents"), 2),
            c("GBP", "£", ("pound", "pounds"), ("penny", "pence"), 2),
            c("EUR", "€", ("euro", "euros"), ("cent", "cents"), 2),
            c("CAD", "C$", ("dollar", "dollars"), ("cent", "cents"), 2),
            c("AUD", "A$", ("dollar", "dollars"), ("cent", "cents"), 2),
            c("SGD", "S$", ("dollar", "dollars"), ("cent", "cents"), 2),
            c("JPY", "¥", ("yen", "yen"), ("sen", "sen"), 0),
            c("AED", "د.إ", ("dirham", "dirhams"), ("fils", "fils"), 2),
        ]
        .into_iter()
        .map(|info| (info.code, info))
        .collect()
    };
}

/// The catalog compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl LocaleCatalog for BuiltinCatalog {
    fn audience(&self, audience: Audience) -> Option<&AudienceProfile> {
        AUDIENCE_TABLE.get(&audience)
    }

    fn currency(&self, code: &str) -> Option<&CurrencyInfo> {
        CURRENCY_TABLE.get(code.to_uppercase().as_str())
    }

    fn currencies(&self) -> Vec<&CurrencyInfo> {
        CURRENCY_TABLE.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_audience_has_profile_and_currency() {
        let catalog = BuiltinCatalog;
        for audience in Audience::ALL {
            let profile = catalog.audience(audience).unwrap();
            assert_eq!(profile.audience, audience);
            assert!(catalog.currency(profile.currency_code).is_some());
            assert!(profile.locale.parse::<LanguageIdentifier>().is_ok());
        }
    }

    #[test]
    fn test_currency_lookup_is_case_insensitive() {
        let catalog = BuiltinCatalog;
        assert_eq!(catalog.currency("inr").unwrap().symbol, "₹");
        assert!(catalog.currency("XYZ").is_none());
    }

    #[test]
    fn test_symbols_longest_first() {
        let symbols = BuiltinCatalog.currency_symbols();
        let dollar = symbols.iter().position(|s| *s == "$").unwrap();
        let aud = symbols.iter().position(|s| *s == "A$").unwrap();
        assert!(aud < dollar);
    }

    #[test]
    fn test_day_first() {
        let catalog = BuiltinCatalog;
        assert!(catalog.audience(Audience::Indian).unwrap().day_first());
        assert!(!catalog.audience(Audience::American).unwrap().day_first());
        assert!(catalog.audience(Audience::European).unwrap().day_first());
    }

    #[test]
    fn test_text_direction() {
        let ar: LanguageIdentifier = "ar-AE".parse().unwrap();
        let en: LanguageIdentifier = "en-IN".parse().unwrap();
        assert_eq!(TextDirection::for_locale(&ar), TextDirection::RightToLeft);
        assert_eq!(TextDirection::for_locale(&en), TextDirection::LeftToRight);
    }

    #[test]
    fn test_audience_from_str() {
        assert_eq!("Indian".parse::<Audience>(), Ok(Audience::Indian));
        assert!("martian".parse::<Audience>().is_err());
    }
}
