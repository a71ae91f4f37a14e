//! Cultural numbering systems: separators, digit grouping and the
//! abbreviation tiers (lakh/crore, million/billion, ...) used for compact
//! amounts.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use lazy_static::lazy_static;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Grouping/decimal/abbreviation convention for rendering numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingSystem {
    /// Lakh/crore grouping: `1,23,45,678`.
    Indian,
    Western,
    British,
    /// Dot grouping, comma decimal: `1.234.567,89`.
    European,
    Arabic,
}

impl NumberingSystem {
    pub const ALL: [NumberingSystem; 5] = [
        NumberingSystem::Indian,
        NumberingSystem::Western,
        NumberingSystem::British,
        NumberingSystem::European,
        NumberingSystem::Arabic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NumberingSystem::Indian => "indian",
            NumberingSystem::Western => "western",
            NumberingSystem::British => "british",
            NumberingSystem::European => "european",
            NumberingSystem::Arabic => "arabic",
        }
    }

    /// Abbreviation tiers for this system, largest threshold first.
    pub fn tiers(self) -> &'static [AbbreviationTier] {
        TIER_TABLE
            .get(&self)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Display for NumberingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NumberingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indian" => Ok(NumberingSystem::Indian),
            "western" => Ok(NumberingSystem::Western),
            "british" => Ok(NumberingSystem::British),
            "european" => Ok(NumberingSystem::European),
            "arabic" => Ok(NumberingSystem::Arabic),
            _ => Err(format!("Unknown numbering system: {}", s)),
        }
    }
}

/// Separator and grouping rules of a numbering system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Separators {
    pub decimal: char,
    pub grouping: char,
    /// Group sizes from the right. The last size repeats, so `[3, 2]` reads
    /// "three digits, then pairs".
    pub grouping_sizes: Vec<usize>,
    pub use_grouping: bool,
}

/// One step of the compact-notation ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationTier {
    pub threshold: Decimal,
    pub suffix: &'static str,
    /// Word used when rendering for screen readers.
    pub spoken: &'static str,
}

/// How an abbreviated value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbbreviationStyle {
    /// `2.5Cr`
    Suffix,
    /// `2.5 crore`, with `minus` for negatives.
    Spoken,
}

lazy_static! {
    static ref TIER_TABLE: BTreeMap<NumberingSystem, Vec<AbbreviationTier>> = {
        fn tier(threshold: i64, suffix: &'static str, spoken: &'static str) -> AbbreviationTier {
            AbbreviationTier {
                threshold: Decimal::from(threshold),
                suffix,
                spoken,
            }
        }

        let mut m = BTreeMap::new();
        m.insert(
            NumberingSystem::Indian,
            vec![
                tier(10_000_000, "Cr", "crore"),
                tier(100_000, "L", "lakh"),
                tier(1_000, "K", "thousand"),
            ],
        );
        for system in [
            NumberingSystem::Western,
            NumberingSystem::British,
            NumberingSystem::Arabic,
        ] {
            m.insert(
                system,
                vec![
                    tier(1_000_000_000, "B", "billion"),
                    tier(1_000_000, "M", "million"),
                    tier(1_000, "K", "thousand"),
                ],
            );
        }
        m.insert(
            NumberingSystem::European,
            vec![
                tier(1_000_000_000, "Md", "milliard"),
                tier(1_000_000, "M", "million"),
                tier(1_000, "k", "thousand"),
            ],
        );
        m
    };
}

/// Returns the separator and grouping rules for `system`.
pub fn separators(system: NumberingSystem) -> Separators {
    match system {
        NumberingSystem::Indian => Separators {
            decimal: '.',
            grouping: ',',
            grouping_sizes: vec![3, 2],
            use_grouping: true,
        },
        NumberingSystem::Western | NumberingSystem::British | NumberingSystem::Arabic => {
            Separators {
                decimal: '.',
                grouping: ',',
                grouping_sizes: vec![3],
                use_grouping: true,
            }
        }
        NumberingSystem::European => Separators {
            decimal: ',',
            grouping: '.',
            grouping_sizes: vec![3],
            use_grouping: true,
        },
    }
}

/// Abbreviates `value` with the suffix ladder of `system` (`2.5Cr`, `1B`).
///
/// Returns `None` when `|value|` is below the smallest tier; callers then fall
/// back to the full grouped rendering.
pub fn abbreviate(system: NumberingSystem, value: Decimal) -> Option<String> {
    abbreviate_with(system, value, separators(system).decimal, AbbreviationStyle::Suffix)
}

/// Same as [`abbreviate`] with an explicit decimal separator and style.
pub fn abbreviate_with(
    system: NumberingSystem,
    value: Decimal,
    decimal_separator: char,
    style: AbbreviationStyle,
) -> Option<String> {
    let magnitude = value.abs();
    let tier = system.tiers().iter().find(|t| magnitude >= t.threshold)?;
    let quotient = render_quotient(magnitude / tier.threshold, decimal_separator);
    let negative = value.is_sign_negative() && !value.is_zero();

    Some(match style {
        AbbreviationStyle::Suffix => {
            let sign = if negative { "-" } else { "" };
            format!("{}{}{}", sign, quotient, tier.suffix)
        }
        AbbreviationStyle::Spoken => {
            let sign = if negative { "minus " } else { "" };
            format!("{}{} {}", sign, quotient, tier.spoken)
        }
    })
}

// Whole quotients print bare, quotients below ten keep one decimal, larger ones
// round to an integer.
fn render_quotient(quotient: Decimal, decimal_separator: char) -> String {
    let text = if quotient.fract().is_zero() {
        quotient.trunc().normalize().to_string()
    } else {
        let one_place = quotient.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        if one_place < Decimal::TEN {
            let mut s = one_place.to_string();
            if !s.contains('.') {
                s.push_str(".0");
            }
            s
        } else {
            quotient
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
                .to_string()
        }
    };
    if decimal_separator == '.' {
        text
    } else {
        text.replace('.', &decimal_separator.to_string())
    }
}

/// Splits a trailing abbreviation suffix (or its spoken word) of `system`
/// off `input`.
///
/// Returns the remaining numeric text and the multiplier the suffix stands
/// for. Longer suffixes win, so `Md` is never read as `M`.
pub fn strip_abbreviation(system: NumberingSystem, input: &str) -> (&str, Option<Decimal>) {
    let trimmed = input.trim_end();
    let mut markers: Vec<(&'static str, Decimal)> = system
        .tiers()
        .iter()
        .flat_map(|t| [(t.suffix, t.threshold), (t.spoken, t.threshold)])
        .collect();
    markers.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    for (marker, threshold) in markers {
        if let Some(rest) = trimmed.strip_suffix(marker) {
            let rest = rest.trim_end();
            if rest.chars().last().is_some_and(|c| c.is_ascii_digit()) {
                return (rest, Some(threshold));
            }
        }
    }
    (trimmed, None)
}

/// Inserts `separator` into a run of ASCII digits following `sizes`.
pub fn group_digits(digits: &str, sizes: &[usize], separator: char) -> String {
    let Some(&first) = sizes.first() else {
        return digits.to_string();
    };
    if digits.len() <= first {
        return digits.to_string();
    }

    let mut groups: Vec<&str> = Vec::new();
    let mut end = digits.len();
    let mut index = 0;
    while end > 0 {
        let size = sizes[index.min(sizes.len() - 1)].max(1);
        let start = end.saturating_sub(size);
        groups.push(&digits[start..end]);
        end = start;
        index += 1;
    }
    groups.reverse();
    groups.join(&separator.to_string())
}
