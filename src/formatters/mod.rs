//! Culture-aware formatters. Each one owns its configuration and a private
//! result cache; replacing the configuration clears the cache.

pub mod currency;
pub mod date;
pub mod number;
pub mod pattern;

pub use currency::{CurrencyConfiguration, CurrencyFormatter, format_currency};
pub use date::{DateFormatter, DateFormatterConfiguration, DateStyle, TimeStyle};
pub use number::{NumberFormatter, format_number, parse_number};
pub use pattern::to_strftime;
