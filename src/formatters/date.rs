//! Date, time, range, relative and financial-year formatting.
//!
//! When several rendering flags are set, [`DateFormatter::format`] picks
//! exactly one in this order: relative, financial-year annotated,
//! accessibility, plain cultural pattern.

use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{
    cache::{DEFAULT_FORMAT_CACHE_CAPACITY, FormatCache, FormatCacheStats, default_format_cache_ttl},
    catalog::{Audience, AudienceProfile},
    clock::SharedClock,
    error::Error,
    fiscal::{FinancialYear, FinancialYearRule},
    formatters::pattern::to_strftime,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// The audience's numeric pattern, e.g. `15/01/2024`.
    #[default]
    Short,
    Medium,
    Long,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStyle {
    #[default]
    None,
    Short,
    /// With seconds.
    Medium,
}

/// Date rendering rules for one audience.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateFormatterConfiguration {
    audience: Audience,
    short_pattern: String,
    day_first: bool,
    uses_24_hour_time: bool,
    financial_year: FinancialYearRule,
    week_start: Weekday,
    date_style: DateStyle,
    time_style: TimeStyle,
    custom_format: Option<String>,
    relative: bool,
    show_financial_year: bool,
    accessibility: bool,
    time_zone: Tz,
    compiled: String,
    compiled_time: String,
}

impl DateFormatterConfiguration {
    pub fn builder(profile: &AudienceProfile) -> DateFormatterConfigurationBuilder {
        DateFormatterConfigurationBuilder {
            config: DateFormatterConfiguration {
                audience: profile.audience,
                short_pattern: profile.date_pattern.to_string(),
                day_first: profile.day_first(),
                uses_24_hour_time: profile.uses_24_hour_time,
                financial_year: profile.financial_year,
                week_start: profile.week_start,
                date_style: DateStyle::Short,
                time_style: TimeStyle::None,
                custom_format: None,
                relative: false,
                show_financial_year: false,
                accessibility: false,
                time_zone: profile.time_zone,
                compiled: String::new(),
                compiled_time: String::new(),
            },
        }
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn financial_year_rule(&self) -> FinancialYearRule {
        self.financial_year
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn date_style(&self) -> DateStyle {
        self.date_style
    }

    pub fn time_style(&self) -> TimeStyle {
        self.time_style
    }

    pub fn custom_format(&self) -> Option<&str> {
        self.custom_format.as_deref()
    }

    pub fn relative(&self) -> bool {
        self.relative
    }

    pub fn show_financial_year(&self) -> bool {
        self.show_financial_year
    }

    pub fn accessibility(&self) -> bool {
        self.accessibility
    }

    /// LDML date pattern implied by the audience and date style.
    pub fn cultural_date_pattern(&self) -> String {
        pattern_for_style(self.date_style, &self.short_pattern, self.day_first)
    }

    /// LDML time pattern implied by the audience and time style.
    pub fn cultural_time_pattern(&self) -> Option<String> {
        let pattern = match (self.time_style, self.uses_24_hour_time) {
            (TimeStyle::None, _) => return None,
            (TimeStyle::Short, true) => "HH:mm",
            (TimeStyle::Short, false) => "h:mm a",
            (TimeStyle::Medium, true) => "HH:mm:ss",
            (TimeStyle::Medium, false) => "h:mm:ss a",
        };
        Some(pattern.to_string())
    }

    pub fn config_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, Clone)]
pub struct DateFormatterConfigurationBuilder {
    config: DateFormatterConfiguration,
}

impl DateFormatterConfigurationBuilder {
    pub fn with_date_style(mut self, style: DateStyle) -> Self {
        self.config.date_style = style;
        self
    }

    pub fn with_time_style(mut self, style: TimeStyle) -> Self {
        self.config.time_style = style;
        self
    }

    /// LDML pattern used instead of the cultural one.
    pub fn with_custom_format(mut self, pattern: Option<String>) -> Self {
        self.config.custom_format = pattern;
        self
    }

    pub fn with_relative(mut self, enabled: bool) -> Self {
        self.config.relative = enabled;
        self
    }

    pub fn with_financial_year(mut self, enabled: bool) -> Self {
        self.config.show_financial_year = enabled;
        self
    }

    pub fn with_accessibility(mut self, enabled: bool) -> Self {
        self.config.accessibility = enabled;
        self
    }

    pub fn with_time_zone(mut self, tz: Tz) -> Self {
        self.config.time_zone = tz;
        self
    }

    /// Compiles the patterns; an invalid custom pattern fails here.
    pub fn build(self) -> Result<DateFormatterConfiguration, Error> {
        let mut config = self.config;
        if let FinancialYearRule::Custom { start_month } = config.financial_year
            && !(1..=12).contains(&start_month)
        {
            return Err(Error::invalid_configuration(format!(
                "financial year start month must be 1-12, got {}",
                start_month
            )));
        }

        // Standalone times fall back to the short style when none is set.
        let time = config.cultural_time_pattern();
        config.compiled_time = match &time {
            Some(pattern) => to_strftime(pattern)?,
            None if config.uses_24_hour_time => to_strftime("HH:mm")?,
            None => to_strftime("h:mm a")?,
        };
        config.compiled = match &config.custom_format {
            Some(custom) => to_strftime(custom)?,
            None => {
                let mut compiled = to_strftime(&config.cultural_date_pattern())?;
                if time.is_some() {
                    compiled.push_str(", ");
                    compiled.push_str(&config.compiled_time);
                }
                compiled
            }
        };
        Ok(config)
    }
}

fn pattern_for_style(style: DateStyle, short: &str, day_first: bool) -> String {
    let pattern = match (style, day_first) {
        (DateStyle::Short, _) => return short.to_string(),
        (DateStyle::Medium, true) => "d MMM yyyy",
        (DateStyle::Medium, false) => "MMM d, yyyy",
        (DateStyle::Long, true) => "d MMMM yyyy",
        (DateStyle::Long, false) => "MMMM d, yyyy",
        (DateStyle::Full, true) => "EEEE, d MMMM yyyy",
        (DateStyle::Full, false) => "EEEE, MMMM d, yyyy",
    };
    pattern.to_string()
}

/// Cached date formatter bound to one configuration and clock.
#[derive(Debug, Clone)]
pub struct DateFormatter {
    config: DateFormatterConfiguration,
    config_hash: u64,
    clock: SharedClock,
    cache: FormatCache<(DateTime<Utc>, Option<NaiveDate>, u64)>,
}

impl DateFormatter {
    pub fn new(config: DateFormatterConfiguration, clock: SharedClock) -> Self {
        Self {
            config_hash: config.config_hash(),
            config,
            cache: FormatCache::with_clock(
                DEFAULT_FORMAT_CACHE_CAPACITY,
                default_format_cache_ttl(),
                clock.clone(),
            ),
            clock,
        }
    }

    pub fn configuration(&self) -> &DateFormatterConfiguration {
        &self.config
    }

    /// Replaces the configuration and drops every cached result.
    pub fn set_configuration(&mut self, config: DateFormatterConfiguration) {
        self.config_hash = config.config_hash();
        self.config = config;
        self.cache.clear();
    }

    /// Renders `instant` using the first enabled mode among relative,
    /// financial-year, accessibility and plain.
    pub fn format(&mut self, instant: DateTime<Utc>) -> String {
        // Relative phrases depend on the current day, so it joins the key.
        let today = self.config.relative.then(|| self.today());
        let config = &self.config;
        self.cache
            .get_or_insert_with((instant, today, self.config_hash), || {
                render(instant, today, config)
            })
    }

    /// Time of day in the audience's 12/24-hour convention and the configured
    /// time style, short when the style is `None`.
    pub fn format_time(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.config.time_zone)
            .format(&self.config.compiled_time)
            .to_string()
    }

    /// `1–15 Jan 2024`, `Jan 1 – Mar 15, 2024` or two full dates.
    pub fn format_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        let (mut from, mut to) = (self.local_date(start), self.local_date(end));
        if to < from {
            std::mem::swap(&mut from, &mut to);
        }
        let day_first = self.config.day_first;

        if from == to {
            return from.format(medium_strftime(day_first)).to_string();
        }
        if from.year() == to.year() && from.month() == to.month() {
            return if day_first {
                format!("{}–{}", from.day(), to.format("%-d %b %Y"))
            } else {
                format!("{}–{}", from.format("%b %-d"), to.format("%-d, %Y"))
            };
        }
        if from.year() == to.year() {
            return if day_first {
                format!("{} – {}", from.format("%-d %b"), to.format("%-d %b %Y"))
            } else {
                format!("{} – {}", from.format("%b %-d"), to.format("%b %-d, %Y"))
            };
        }
        let full = medium_strftime(day_first);
        format!("{} – {}", from.format(full), to.format(full))
    }

    /// Relative phrase for `instant` against the clock, regardless of flags.
    pub fn format_relative(&self, instant: DateTime<Utc>) -> String {
        relative_phrase(self.local_date(instant), self.today(), &self.config)
    }

    /// Spoken-style rendering, regardless of flags.
    pub fn accessible_description(&self, instant: DateTime<Utc>) -> String {
        accessible(instant, &self.config)
    }

    pub fn financial_year(&self, instant: DateTime<Utc>) -> FinancialYear {
        self.config
            .financial_year
            .financial_year(self.local_date(instant))
    }

    pub fn financial_year_start(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        self.financial_year(instant)
            .start_instant(self.config.time_zone)
    }

    pub fn financial_year_end(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        self.financial_year(instant).end_instant(self.config.time_zone)
    }

    pub fn financial_quarter(&self, instant: DateTime<Utc>) -> u32 {
        self.config.financial_year.quarter(self.local_date(instant))
    }

    pub fn financial_year_progress(&self, instant: DateTime<Utc>) -> f64 {
        self.financial_year(instant)
            .progress(instant, self.config.time_zone)
    }

    /// `FY 2023-24`
    pub fn financial_year_label(&self, instant: DateTime<Utc>) -> String {
        self.financial_year(instant).label()
    }

    /// `Q4 FY 2023-24`
    pub fn financial_quarter_label(&self, instant: DateTime<Utc>) -> String {
        quarter_label(self.local_date(instant), &self.config)
    }

    pub fn cache_stats(&self) -> FormatCacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn today(&self) -> NaiveDate {
        self.local_date(self.clock.now())
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.config.time_zone).date_naive()
    }
}

fn render(
    instant: DateTime<Utc>,
    today: Option<NaiveDate>,
    config: &DateFormatterConfiguration,
) -> String {
    let local = instant.with_timezone(&config.time_zone);
    if let Some(today) = today {
        return relative_phrase(local.date_naive(), today, config);
    }
    if config.show_financial_year {
        return format!(
            "{} ({})",
            local.format(&config.compiled),
            quarter_label(local.date_naive(), config)
        );
    }
    if config.accessibility {
        return accessible(instant, config);
    }
    local.format(&config.compiled).to_string()
}

fn quarter_label(date: NaiveDate, config: &DateFormatterConfiguration) -> String {
    let rule = config.financial_year;
    format!("Q{} {}", rule.quarter(date), rule.financial_year(date).label())
}

fn medium_strftime(day_first: bool) -> &'static str {
    if day_first { "%-d %b %Y" } else { "%b %-d, %Y" }
}

fn accessible(instant: DateTime<Utc>, config: &DateFormatterConfiguration) -> String {
    let local = instant.with_timezone(&config.time_zone);
    let date_pattern = if config.day_first {
        "%A, %-d %B %Y"
    } else {
        "%A, %B %-d, %Y"
    };
    let mut out = local.format(date_pattern).to_string();
    if config.time_style != TimeStyle::None {
        let time_pattern = if config.uses_24_hour_time {
            "%H:%M"
        } else {
            "%-I:%M %p"
        };
        out.push_str(" at ");
        out.push_str(&local.format(time_pattern).to_string());
    }
    out
}

fn relative_phrase(date: NaiveDate, today: NaiveDate, config: &DateFormatterConfiguration) -> String {
    let days = (date - today).num_days();
    match days {
        0 => return "today".to_string(),
        -1 => return "yesterday".to_string(),
        1 => return "tomorrow".to_string(),
        _ => {}
    }

    let future = days > 0;
    let span = days.unsigned_abs();
    let wrap = |amount: String| {
        if future {
            format!("in {}", amount)
        } else {
            format!("{} ago", amount)
        }
    };

    if same_week(date, today, config.week_start) {
        let direction = if future { "next" } else { "last" };
        return format!("{} {}", direction, weekday_name(date.weekday()));
    }
    if span < 7 {
        return wrap(plural(span, "day"));
    }
    if span <= 30 {
        let weeks = span / 7;
        let rest = span % 7;
        let mut amount = plural(weeks, "week");
        if rest > 0 {
            amount.push_str(" and ");
            amount.push_str(&plural(rest, "day"));
        }
        return wrap(amount);
    }
    if span < 365 {
        return wrap(plural((span / 30).max(1), "month"));
    }
    wrap(plural(span / 365, "year"))
}

fn same_week(a: NaiveDate, b: NaiveDate, week_start: Weekday) -> bool {
    week_start_of(a, week_start) == week_start_of(b, week_start)
}

fn week_start_of(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date - Duration::days(offset as i64)
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::{
        catalog::{BuiltinCatalog, LocaleCatalog},
        clock::ManualClock,
    };

    fn profile(audience: Audience) -> AudienceProfile {
        BuiltinCatalog.audience(audience).unwrap().clone()
    }

    // Noon UTC keeps every test zone on the same calendar day.
    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn formatter(config: DateFormatterConfiguration, now: DateTime<Utc>) -> DateFormatter {
        DateFormatter::new(config, Arc::new(ManualClock::new(now)))
    }

    #[test]
    fn test_cultural_patterns() {
        let indian = DateFormatterConfiguration::builder(&profile(Audience::Indian))
            .build()
            .unwrap();
        let american = DateFormatterConfiguration::builder(&profile(Audience::American))
            .with_time_style(TimeStyle::Short)
            .build()
            .unwrap();
        assert_eq!(indian.cultural_date_pattern(), "dd/MM/yyyy");
        assert_eq!(american.cultural_date_pattern(), "MM/dd/yyyy");
        assert_eq!(american.cultural_time_pattern().as_deref(), Some("h:mm a"));
    }

    #[test]
    fn test_plain_format() {
        let now = noon(2024, 1, 15);
        let mut indian = formatter(
            DateFormatterConfiguration::builder(&profile(Audience::Indian))
                .build()
                .unwrap(),
            now,
        );
        let mut american = formatter(
            DateFormatterConfiguration::builder(&profile(Audience::American))
                .with_date_style(DateStyle::Long)
                .build()
                .unwrap(),
            now,
        );
        assert_eq!(indian.format(now), "15/01/2024");
        assert_eq!(american.format(now), "January 15, 2024");
    }

    #[test]
    fn test_custom_format_override() {
        let config = DateFormatterConfiguration::builder(&profile(Audience::British))
            .with_custom_format(Some("d MMM yy".to_string()))
            .build()
            .unwrap();
        assert_eq!(formatter(config, noon(2024, 3, 5)).format(noon(2024, 3, 5)), "5 Mar 24");

        let err = DateFormatterConfiguration::builder(&profile(Audience::British))
            .with_custom_format(Some("QQQ".to_string()))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_mode_precedence() {
        let now = noon(2024, 1, 15);
        let base = || DateFormatterConfiguration::builder(&profile(Audience::Indian));

        let everything = base()
            .with_relative(true)
            .with_financial_year(true)
            .with_accessibility(true)
            .build()
            .unwrap();
        assert_eq!(formatter(everything, now).format(now), "today");

        let fy_and_accessible = base()
            .with_financial_year(true)
            .with_accessibility(true)
            .build()
            .unwrap();
        assert_eq!(
            formatter(fy_and_accessible, now).format(now),
            "15/01/2024 (Q4 FY 2023-24)"
        );

        let accessible_only = base().with_accessibility(true).build().unwrap();
        assert_eq!(
            formatter(accessible_only, now).format(now),
            "Monday, 15 January 2024"
        );
    }

    #[test]
    fn test_relative_phrases() {
        // Wednesday 17 January 2024, weeks start on Monday for Indian users
        let now = noon(2024, 1, 17);
        let f = formatter(
            DateFormatterConfiguration::builder(&profile(Audience::Indian))
                .build()
                .unwrap(),
            now,
        );
        assert_eq!(f.format_relative(noon(2024, 1, 16)), "yesterday");
        assert_eq!(f.format_relative(noon(2024, 1, 18)), "tomorrow");
        assert_eq!(f.format_relative(noon(2024, 1, 19)), "next Friday");
        assert_eq!(f.format_relative(noon(2024, 1, 15)), "last Monday");
        assert_eq!(f.format_relative(noon(2024, 1, 13)), "4 days ago");
        assert_eq!(f.format_relative(noon(2024, 1, 7)), "1 week and 3 days ago");
        assert_eq!(f.format_relative(noon(2024, 1, 31)), "in 2 weeks");
        assert_eq!(f.format_relative(noon(2024, 4, 17)), "in 3 months");
        assert_eq!(f.format_relative(noon(2021, 12, 1)), "2 years ago");
    }

    #[test]
    fn test_relative_cache_tracks_today() {
        let clock = ManualClock::new(noon(2024, 1, 17));
        let mut f = DateFormatter::new(
            DateFormatterConfiguration::builder(&profile(Audience::Indian))
                .with_relative(true)
                .build()
                .unwrap(),
            Arc::new(clock.clone()),
        );
        let target = noon(2024, 1, 18);
        assert_eq!(f.format(target), "tomorrow");
        clock.advance(Duration::days(1));
        assert_eq!(f.format(target), "today");
    }

    #[test]
    fn test_ranges() {
        let indian = formatter(
            DateFormatterConfiguration::builder(&profile(Audience::Indian))
                .build()
                .unwrap(),
            noon(2024, 1, 1),
        );
        let american = formatter(
            DateFormatterConfiguration::builder(&profile(Audience::American))
                .build()
                .unwrap(),
            noon(2024, 1, 1),
        );

        assert_eq!(american.format_range(noon(2024, 1, 1), noon(2024, 1, 15)), "Jan 1–15, 2024");
        assert_eq!(indian.format_range(noon(2024, 1, 1), noon(2024, 1, 15)), "1–15 Jan 2024");
        assert_eq!(
            american.format_range(noon(2024, 1, 1), noon(2024, 3, 15)),
            "Jan 1 – Mar 15, 2024"
        );
        assert_eq!(
            indian.format_range(noon(2024, 12, 20), noon(2023, 11, 2)),
            "2 Nov 2023 – 20 Dec 2024"
        );
    }

    #[test]
    fn test_financial_year_operations() {
        let f = formatter(
            DateFormatterConfiguration::builder(&profile(Audience::Indian))
                .build()
                .unwrap(),
            noon(2024, 1, 1),
        );
        let march = noon(2024, 3, 31);
        let april = noon(2024, 4, 1);

        assert_ne!(f.financial_year(march), f.financial_year(april));
        assert_eq!(f.financial_year_label(march), "FY 2023-24");
        assert_eq!(f.financial_quarter(march), 4);
        assert_eq!(f.financial_quarter(april), 1);
        assert_eq!(f.financial_quarter_label(april), "Q1 FY 2024-25");

        let start = f.financial_year_start(april).with_timezone(&Utc);
        assert_eq!(f.financial_year_progress(start), 0.0);
        assert_eq!(
            f.financial_year_end(march).date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
    }

    #[test]
    fn test_time_and_accessible_time() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 9, 35, 0).unwrap();
        let british = DateFormatterConfiguration::builder(&profile(Audience::British))
            .with_time_style(TimeStyle::Short)
            .with_accessibility(true)
            .build()
            .unwrap();
        let mut f = formatter(british, instant);
        assert_eq!(f.format_time(instant), "09:35");
        assert_eq!(f.format(instant), "Monday, 15 January 2024 at 09:35");
    }

    #[test]
    fn test_format_time_follows_time_style() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 9, 35, 7).unwrap();
        let medium = |audience| {
            DateFormatterConfiguration::builder(&profile(audience))
                .with_time_style(TimeStyle::Medium)
                .with_time_zone(chrono_tz::UTC)
                .build()
                .unwrap()
        };
        assert_eq!(
            formatter(medium(Audience::British), instant).format_time(instant),
            "09:35:07"
        );
        assert_eq!(
            formatter(medium(Audience::American), instant).format_time(instant),
            "9:35:07 AM"
        );

        let unstyled = DateFormatterConfiguration::builder(&profile(Audience::American))
            .with_time_zone(chrono_tz::UTC)
            .build()
            .unwrap();
        assert_eq!(formatter(unstyled, instant).format_time(instant), "9:35 AM");
    }

    #[test]
    fn test_cached_dates_expire_with_clock() {
        let now = noon(2024, 1, 15);
        let clock = ManualClock::new(now);
        let config = DateFormatterConfiguration::builder(&profile(Audience::Indian))
            .build()
            .unwrap();
        let mut f = DateFormatter::new(config, Arc::new(clock.clone()));

        f.format(now);
        f.format(now);
        clock.advance(Duration::minutes(61));
        assert_eq!(f.format(now), "15/01/2024");

        let stats = f.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expired, 1);
    }
}
