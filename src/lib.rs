#![forbid(unsafe_code)]
//! Culture-aware formatting and translation validation for personal finance apps.
//!
//! Renders numbers, currency amounts and dates the way a given audience
//! expects them (Indian lakh/crore grouping, `dd/MM/yyyy` vs `MM/dd/yyyy`,
//! April–March financial years), parses them back, and validates translated
//! UI strings into a scored report.
//!
//! # Quick Start
//!
//! ```rust
//! use culturefmt::{Audience, ContextSelection, Coordinator};
//! use rust_decimal::Decimal;
//!
//! let coordinator = Coordinator::new(ContextSelection::new(Audience::Indian))?;
//! assert_eq!(coordinator.format_number(Decimal::from(12_345_678)), "1,23,45,678");
//! assert_eq!(coordinator.format_currency(Decimal::from(100_000)), "₹ 1,00,000");
//! assert_eq!(coordinator.parse_number("1,23,45,678"), Some(Decimal::from(12_345_678)));
//! # Ok::<(), culturefmt::Error>(())
//! ```
//!
//! # Building blocks
//!
//! - **Numbering systems**: separators, grouping sizes and abbreviation tiers
//!   (`numbering`)
//! - **Formatters**: number, currency and date formatters with private result
//!   caches (`formatters`)
//! - **Financial years**: per-audience year and quarter arithmetic (`fiscal`)
//! - **Translation cache**: LRU + TTL cache with memory-pressure trimming
//!   (`translation_cache`)
//! - **Validation**: scored issues rendered as text, JSON, CSV or Markdown
//!   (`validation`)
//! - **Coordinator**: the active context, swapped atomically on change
//!   (`coordinator`)

pub mod audit;
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fiscal;
pub mod formatters;
pub mod loader;
pub mod numbering;
pub mod placeholder;
pub mod translation_cache;
pub mod validation;

// Re-export most used types for easy consumption
pub use crate::{
    audit::{SettingChange, SettingValue},
    catalog::{Audience, AudienceProfile, BuiltinCatalog, CurrencyInfo, LocaleCatalog, TextDirection},
    clock::{Clock, ManualClock, SharedClock, SystemClock},
    config::{FormatterConfiguration, RoundingMode},
    coordinator::{ActiveContext, ContextSelection, Coordinator},
    error::Error,
    fiscal::{FinancialYear, FinancialYearRule},
    formatters::{
        CurrencyConfiguration, CurrencyFormatter, DateFormatter, DateFormatterConfiguration,
        DateStyle, NumberFormatter, TimeStyle,
    },
    loader::load_translations,
    numbering::NumberingSystem,
    translation_cache::{TranslationCache, TranslationCacheConfig},
    validation::{
        IssueType, LocalizationValidator, Severity, ValidationIssue, ValidationResult,
        ValidatorRules,
    },
};
