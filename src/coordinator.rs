//! The active cultural context and the formatters bound to it.
//!
//! The host calls [`Coordinator::update_context`] from its own event system
//! (locale or accessibility changes). A new [`ActiveContext`] is built in
//! full and published with a single write, so readers see either the old
//! context or the new one.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unic_langid::LanguageIdentifier;

use crate::{
    audit::{AuditTrail, SettingChange, SettingValue},
    cache::FormatCacheStats,
    catalog::{Audience, AudienceProfile, BuiltinCatalog, LocaleCatalog, TextDirection},
    clock::{SharedClock, system_clock},
    error::Error,
    fiscal::FinancialYear,
    formatters::{
        CurrencyConfiguration, CurrencyFormatter, DateFormatter, DateFormatterConfiguration,
        NumberFormatter,
    },
    translation_cache::{CacheStatistics, TranslationCache, TranslationCacheConfig},
    validation::{LocalizationValidator, ValidationResult, ValidatorRules},
};

/// The user's choice, as persisted by the host app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSelection {
    pub audience: Audience,
    /// Overrides the audience's preferred locale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub accessibility: bool,
    #[serde(default)]
    pub abbreviate: bool,
    #[serde(default)]
    pub relative_dates: bool,
    #[serde(default)]
    pub show_financial_year: bool,
}

impl ContextSelection {
    pub fn new(audience: Audience) -> Self {
        Self {
            audience,
            locale: None,
            accessibility: false,
            abbreviate: false,
            relative_dates: false,
            show_financial_year: false,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_accessibility(mut self, enabled: bool) -> Self {
        self.accessibility = enabled;
        self
    }

    pub fn with_abbreviation(mut self, enabled: bool) -> Self {
        self.abbreviate = enabled;
        self
    }

    pub fn with_relative_dates(mut self, enabled: bool) -> Self {
        self.relative_dates = enabled;
        self
    }

    pub fn with_financial_year(mut self, enabled: bool) -> Self {
        self.show_financial_year = enabled;
        self
    }

    fn settings(&self) -> BTreeMap<&'static str, SettingValue> {
        let mut settings = BTreeMap::from([
            (
                "audience",
                SettingValue::choice("audience", self.audience.as_str()),
            ),
            ("accessibility", SettingValue::Bool(self.accessibility)),
            ("abbreviate", SettingValue::Bool(self.abbreviate)),
            ("relative_dates", SettingValue::Bool(self.relative_dates)),
            (
                "show_financial_year",
                SettingValue::Bool(self.show_financial_year),
            ),
        ]);
        if let Some(locale) = &self.locale {
            settings.insert("locale", SettingValue::Text(locale.clone()));
        }
        settings
    }
}

/// Everything derived from one [`ContextSelection`]. Never mutated after
/// publication apart from the formatters' private caches.
#[derive(Debug)]
pub struct ActiveContext {
    selection: ContextSelection,
    profile: AudienceProfile,
    locale: LanguageIdentifier,
    direction: TextDirection,
    number: Mutex<NumberFormatter>,
    currency: Mutex<CurrencyFormatter>,
    date: Mutex<DateFormatter>,
    validator: LocalizationValidator,
}

impl ActiveContext {
    fn build(
        selection: ContextSelection,
        catalog: &dyn LocaleCatalog,
        clock: &SharedClock,
        rules: &ValidatorRules,
    ) -> Result<Self, Error> {
        let profile = catalog
            .audience(selection.audience)
            .ok_or_else(|| Error::UnknownAudience(selection.audience.to_string()))?
            .clone();
        let locale_tag = selection.locale.as_deref().unwrap_or(profile.locale);
        let locale: LanguageIdentifier = locale_tag
            .parse()
            .map_err(|_| Error::InvalidLocale(locale_tag.to_string()))?;

        let base = CurrencyConfiguration::for_audience(&profile, catalog)?;
        let currency_number = base
            .number()
            .to_builder()
            .with_locale(locale_tag)
            .with_abbreviation(selection.abbreviate)
            .with_accessibility_mode(selection.accessibility)
            .build()?;
        let number = currency_number
            .to_builder()
            .with_fraction_digits(0, 2)
            .build()?;
        let currency = base.with_number_configuration(currency_number);

        let date = DateFormatterConfiguration::builder(&profile)
            .with_relative(selection.relative_dates)
            .with_financial_year(selection.show_financial_year)
            .with_accessibility(selection.accessibility)
            .build()?;

        Ok(Self {
            direction: TextDirection::for_locale(&locale),
            number: Mutex::new(NumberFormatter::with_clock(number, clock.clone())),
            currency: Mutex::new(CurrencyFormatter::with_clock(currency, catalog, clock.clone())),
            date: Mutex::new(DateFormatter::new(date, clock.clone())),
            validator: LocalizationValidator::new(rules.clone(), catalog, clock.clone()),
            locale,
            profile,
            selection,
        })
    }

    pub fn selection(&self) -> &ContextSelection {
        &self.selection
    }

    pub fn audience(&self) -> Audience {
        self.selection.audience
    }

    pub fn profile(&self) -> &AudienceProfile {
        &self.profile
    }

    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    pub fn text_direction(&self) -> TextDirection {
        self.direction
    }

    pub fn time_zone(&self) -> Tz {
        self.profile.time_zone
    }
}

/// Format-cache and translation-cache counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorCacheStats {
    pub number: FormatCacheStats,
    pub currency: FormatCacheStats,
    pub date: FormatCacheStats,
    pub translations: CacheStatistics,
}

pub struct CoordinatorBuilder {
    catalog: Arc<dyn LocaleCatalog>,
    clock: SharedClock,
    rules: ValidatorRules,
    cache_config: TranslationCacheConfig,
}

impl CoordinatorBuilder {
    pub fn with_catalog(mut self, catalog: Arc<dyn LocaleCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rules(mut self, rules: ValidatorRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_translation_cache(mut self, config: TranslationCacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn build(self, selection: ContextSelection) -> Result<Coordinator, Error> {
        let context = ActiveContext::build(selection, self.catalog.as_ref(), &self.clock, &self.rules)?;
        let translations = TranslationCache::with_clock(self.cache_config, self.clock.clone())?;

        let coordinator = Coordinator {
            active: RwLock::new(Arc::new(context)),
            translations: Mutex::new(translations),
            audit: Mutex::new(AuditTrail::default()),
            catalog: self.catalog,
            clock: self.clock,
            rules: self.rules,
        };
        coordinator.record_changes(None, &coordinator.current().selection);
        Ok(coordinator)
    }
}

/// Sole owner of the active context.
pub struct Coordinator {
    catalog: Arc<dyn LocaleCatalog>,
    clock: SharedClock,
    rules: ValidatorRules,
    active: RwLock<Arc<ActiveContext>>,
    translations: Mutex<TranslationCache>,
    audit: Mutex<AuditTrail>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("selection", &self.current().selection)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Builtin catalog, system clock, standard validator rules.
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder {
            catalog: Arc::new(BuiltinCatalog),
            clock: system_clock(),
            rules: ValidatorRules::standard(),
            cache_config: TranslationCacheConfig::default(),
        }
    }

    pub fn new(selection: ContextSelection) -> Result<Self, Error> {
        Self::builder().build(selection)
    }

    /// Snapshot of the published context.
    pub fn current(&self) -> Arc<ActiveContext> {
        self.active.read().clone()
    }

    pub fn selection(&self) -> ContextSelection {
        self.current().selection.clone()
    }

    /// Builds a context for `selection` and publishes it. On error the
    /// previous context stays active.
    pub fn update_context(&self, selection: ContextSelection) -> Result<(), Error> {
        let context = Arc::new(ActiveContext::build(
            selection,
            self.catalog.as_ref(),
            &self.clock,
            &self.rules,
        )?);
        let previous = std::mem::replace(&mut *self.active.write(), context.clone());

        debug!(
            from = %previous.selection.audience,
            to = %context.selection.audience,
            locale = %context.locale,
            "context updated"
        );
        self.record_changes(Some(&previous.selection), &context.selection);
        Ok(())
    }

    pub fn text_direction(&self) -> TextDirection {
        self.current().direction
    }

    pub fn format_number(&self, value: Decimal) -> String {
        self.current().number.lock().format(value)
    }

    pub fn format_percentage(&self, ratio: Decimal) -> String {
        self.current().number.lock().format_percentage(ratio)
    }

    pub fn parse_number(&self, input: &str) -> Option<Decimal> {
        self.current().number.lock().parse(input)
    }

    pub fn format_currency(&self, amount: Decimal) -> String {
        self.current().currency.lock().format(amount)
    }

    pub fn parse_currency(&self, input: &str) -> Option<Decimal> {
        self.current().currency.lock().parse(input)
    }

    pub fn describe_currency(&self, amount: Decimal) -> String {
        self.current().currency.lock().accessible_description(amount)
    }

    pub fn format_date(&self, instant: DateTime<Utc>) -> String {
        self.current().date.lock().format(instant)
    }

    pub fn format_time(&self, instant: DateTime<Utc>) -> String {
        self.current().date.lock().format_time(instant)
    }

    pub fn format_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        self.current().date.lock().format_range(start, end)
    }

    pub fn format_relative_date(&self, instant: DateTime<Utc>) -> String {
        self.current().date.lock().format_relative(instant)
    }

    pub fn financial_year(&self, instant: DateTime<Utc>) -> FinancialYear {
        self.current().date.lock().financial_year(instant)
    }

    pub fn financial_quarter(&self, instant: DateTime<Utc>) -> u32 {
        self.current().date.lock().financial_quarter(instant)
    }

    pub fn financial_year_label(&self, instant: DateTime<Utc>) -> String {
        self.current().date.lock().financial_year_label(instant)
    }

    pub fn financial_year_progress(&self, instant: DateTime<Utc>) -> f64 {
        self.current().date.lock().financial_year_progress(instant)
    }

    /// Validates `translations` for the active locale.
    pub fn validate(&self, translations: &BTreeMap<String, String>) -> ValidationResult {
        let context = self.current();
        context
            .validator
            .validate(translations, &context.locale.to_string())
    }

    pub fn validator(&self) -> LocalizationValidator {
        self.current().validator.clone()
    }

    /// Cached translation of `key` for the active locale.
    pub fn translation(&self, key: &str) -> Option<String> {
        let locale = self.current().locale.to_string();
        self.translations.lock().get(key, &locale)
    }

    pub fn cache_translation(&self, key: &str, value: impl Into<String>) {
        let locale = self.current().locale.to_string();
        self.translations.lock().set(key, &locale, value);
    }

    /// Drops every formatter cache and halves the translation cache.
    /// Returns the number of translation entries removed.
    pub fn handle_memory_pressure(&self) -> usize {
        let context = self.current();
        context.number.lock().clear_cache();
        context.currency.lock().clear_cache();
        context.date.lock().clear_cache();
        let removed = self.translations.lock().handle_memory_pressure();
        debug!(removed, "memory pressure handled");
        removed
    }

    /// Expires stale translations; `None` when maintenance ran too recently.
    pub fn perform_maintenance(&self) -> Option<usize> {
        self.translations.lock().perform_maintenance()
    }

    pub fn cache_statistics(&self) -> CoordinatorCacheStats {
        let context = self.current();
        CoordinatorCacheStats {
            number: context.number.lock().cache_stats(),
            currency: context.currency.lock().cache_stats(),
            date: context.date.lock().cache_stats(),
            translations: self.translations.lock().statistics(),
        }
    }

    /// Recorded setting changes, oldest first.
    pub fn audit_trail(&self) -> Vec<SettingChange> {
        self.audit.lock().changes().cloned().collect()
    }

    fn record_changes(&self, previous: Option<&ContextSelection>, next: &ContextSelection) {
        let before = previous.map(ContextSelection::settings).unwrap_or_default();
        let now = self.clock.now();
        let mut audit = self.audit.lock();

        for (setting, value) in next.settings() {
            let old = before.get(setting).cloned();
            if old.as_ref() != Some(&value) {
                audit.record(SettingChange {
                    setting: setting.to_string(),
                    old,
                    new: value,
                    changed_at: now,
                });
            }
        }
    }
}
