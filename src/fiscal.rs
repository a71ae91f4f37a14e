//! Financial-year arithmetic.
//!
//! A financial year is identified by the calendar year in which it *ends*:
//! with an April–March rule, 15 February 2024 belongs to FY 2024 (labelled
//! `FY 2023-24`) and 1 April 2024 starts FY 2025.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// When an audience's financial year starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialYearRule {
    AprilToMarch,
    JanuaryToDecember,
    /// Starts on the first day of `start_month` (1–12).
    Custom { start_month: u32 },
}

impl FinancialYearRule {
    pub fn start_month(self) -> u32 {
        match self {
            FinancialYearRule::AprilToMarch => 4,
            FinancialYearRule::JanuaryToDecember => 1,
            FinancialYearRule::Custom { start_month } => start_month.clamp(1, 12),
        }
    }

    /// Financial year containing `date`.
    pub fn financial_year(self, date: NaiveDate) -> FinancialYear {
        let start_month = self.start_month();
        let start_year = if date.month() >= start_month {
            date.year()
        } else {
            date.year() - 1
        };
        FinancialYear::starting(start_year, start_month)
    }

    /// Quarter (1–4) of `date` within its financial year.
    pub fn quarter(self, date: NaiveDate) -> u32 {
        let offset = (date.month() + 12 - self.start_month()) % 12;
        offset / 3 + 1
    }
}

/// One concrete financial year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FinancialYear {
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
}

impl FinancialYear {
    fn starting(start_year: i32, start_month: u32) -> Self {
        let start = first_of_month(start_year, start_month);
        let next = first_of_month(start_year + 1, start_month);
        Self {
            start,
            end: next.pred_opt().unwrap_or(next),
        }
    }

    pub fn start_year(&self) -> i32 {
        self.start.year()
    }

    pub fn end_year(&self) -> i32 {
        self.end.year()
    }

    /// The identifying year (the year the period ends in).
    pub fn number(&self) -> i32 {
        self.end_year()
    }

    /// `FY 2024` for calendar years, `FY 2023-24` otherwise.
    pub fn label(&self) -> String {
        if self.start_year() == self.end_year() {
            format!("FY {}", self.end_year())
        } else {
            format!("FY {}-{:02}", self.start_year(), self.end_year().rem_euclid(100))
        }
    }

    /// The year after this one.
    pub fn next(&self) -> FinancialYear {
        FinancialYear::starting(self.start_year() + 1, self.start.month())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Local midnight at which the year begins.
    pub fn start_instant(&self, tz: Tz) -> DateTime<Tz> {
        local_midnight(self.start, tz)
    }

    /// Last representable instant of the year.
    pub fn end_instant(&self, tz: Tz) -> DateTime<Tz> {
        self.next().start_instant(tz) - Duration::nanoseconds(1)
    }

    /// Fraction of the year elapsed at `instant`, in `[0, 1)`.
    pub fn progress(&self, instant: DateTime<Utc>, tz: Tz) -> f64 {
        let start = self.start_instant(tz).with_timezone(&Utc);
        let next = self.next().start_instant(tz).with_timezone(&Utc);
        let total = (next - start).num_milliseconds() as f64;
        if total <= 0.0 {
            return 0.0;
        }
        let elapsed = (instant - start).num_milliseconds() as f64;
        (elapsed / total).clamp(0.0, 1.0 - f64::EPSILON)
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Midnight of `date` in `tz`, or the first valid instant after a DST gap.
pub(crate) fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_april_to_march_boundary() {
        let rule = FinancialYearRule::AprilToMarch;
        let march = rule.financial_year(date(2024, 3, 31));
        let april = rule.financial_year(date(2024, 4, 1));

        assert_ne!(march, april);
        assert_eq!(march.number(), 2024);
        assert_eq!(march.label(), "FY 2023-24");
        assert_eq!(april.number(), 2025);
        assert_eq!(april.label(), "FY 2024-25");
        assert_eq!(march.end, date(2024, 3, 31));
        assert_eq!(april.start, date(2024, 4, 1));
    }

    #[test]
    fn test_calendar_year() {
        let rule = FinancialYearRule::JanuaryToDecember;
        let fy = rule.financial_year(date(2024, 7, 9));
        assert_eq!(fy.start, date(2024, 1, 1));
        assert_eq!(fy.end, date(2024, 12, 31));
        assert_eq!(fy.label(), "FY 2024");
    }

    #[test]
    fn test_custom_july_start() {
        let rule = FinancialYearRule::Custom { start_month: 7 };
        let fy = rule.financial_year(date(2024, 6, 30));
        assert_eq!(fy.start, date(2023, 7, 1));
        assert_eq!(fy.label(), "FY 2023-24");
        assert_eq!(rule.quarter(date(2024, 6, 30)), 4);
        assert_eq!(rule.quarter(date(2024, 7, 1)), 1);
    }

    #[test]
    fn test_quarters() {
        let rule = FinancialYearRule::AprilToMarch;
        assert_eq!(rule.quarter(date(2024, 4, 1)), 1);
        assert_eq!(rule.quarter(date(2024, 8, 15)), 2);
        assert_eq!(rule.quarter(date(2024, 12, 31)), 3);
        assert_eq!(rule.quarter(date(2025, 2, 1)), 4);
    }

    #[test]
    fn test_progress_bounds() {
        let tz = chrono_tz::Asia::Kolkata;
        let fy = FinancialYearRule::AprilToMarch.financial_year(date(2024, 4, 1));
        let start = fy.start_instant(tz).with_timezone(&Utc);
        let end = fy.end_instant(tz).with_timezone(&Utc);

        assert_eq!(fy.progress(start, tz), 0.0);
        let near_end = fy.progress(end - Duration::seconds(1), tz);
        assert!(near_end > 0.99 && near_end < 1.0);
    }

    #[test]
    fn test_contains() {
        let fy = FinancialYearRule::AprilToMarch.financial_year(date(2024, 10, 1));
        assert!(fy.contains(date(2025, 3, 31)));
        assert!(!fy.contains(date(2025, 4, 1)));
    }
}
