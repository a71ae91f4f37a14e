use culturefmt::catalog::{Audience, BuiltinCatalog, LocaleCatalog};
use culturefmt::config::FormatterConfiguration;
use culturefmt::formatters::{CurrencyConfiguration, CurrencyFormatter, format_number, parse_number};
use culturefmt::numbering::NumberingSystem;
use proptest::prelude::*;
use rust_decimal::Decimal;

// Spans every abbreviation tier, both signs, up to two fraction digits.
fn value_strategy(max_scale: u32) -> impl Strategy<Value = Decimal> {
    (-10_000_000_000_000i64..10_000_000_000_000i64, 0..=max_scale)
        .prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn system_strategy() -> impl Strategy<Value = NumberingSystem> {
    prop::sample::select(NumberingSystem::ALL.to_vec())
}

fn audience_strategy() -> impl Strategy<Value = Audience> {
    prop::sample::select(Audience::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn number_format_parse_roundtrip(system in system_strategy(), value in value_strategy(2)) {
        let config = FormatterConfiguration::new(system);
        let rendered = format_number(value, &config);
        prop_assert_eq!(parse_number(&rendered, &config), Some(value), "rendered {:?}", rendered);
    }

    #[test]
    fn accessible_number_roundtrip(system in system_strategy(), value in value_strategy(2)) {
        let config = FormatterConfiguration::builder(system)
            .with_accessibility_mode(true)
            .build()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let rendered = format_number(value, &config);
        prop_assert_eq!(parse_number(&rendered, &config), Some(value), "rendered {:?}", rendered);
    }

    #[test]
    fn currency_format_parse_roundtrip(audience in audience_strategy(), value in value_strategy(2)) {
        let catalog = BuiltinCatalog;
        let profile = catalog
            .audience(audience)
            .ok_or_else(|| TestCaseError::fail("missing profile"))?;
        let config = CurrencyConfiguration::for_audience(profile, &catalog)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let digits = config.currency().minor_digits;
        let value = value.round_dp(digits);

        let mut formatter = CurrencyFormatter::new(config, &catalog);
        let rendered = formatter.format(value);
        prop_assert_eq!(formatter.parse(&rendered), Some(value), "rendered {:?}", rendered);
    }

    #[test]
    fn abbreviated_values_parse_near_original(system in system_strategy(), value in value_strategy(0)) {
        let config = FormatterConfiguration::builder(system)
            .with_abbreviation(true)
            .build()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let rendered = format_number(value, &config);
        let parsed = parse_number(&rendered, &config)
            .ok_or_else(|| TestCaseError::fail(format!("unparsable {:?}", rendered)))?;
        // One decimal of the tier quotient: within 5% of the original.
        let tolerance = value.abs() * Decimal::new(5, 2) + Decimal::ONE;
        prop_assert!((parsed - value).abs() <= tolerance, "{} -> {:?} -> {}", value, rendered, parsed);
    }
}
