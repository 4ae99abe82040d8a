//! # Formatting Configuration
//!
//! Store-level display settings (currency symbol, date format, GST rate)
//! passed explicitly into formatting and tax functions. Nothing in the
//! workflow reads ambient/global configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::finance::TaxBreakdown;
use crate::money::Money;
use crate::types::TaxRate;

/// Display and tax settings for one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattingConfig {
    /// Currency symbol prefixed to amounts (e.g. "Rs").
    pub currency_symbol: String,
    /// chrono format string for invoice dates.
    pub date_format: String,
    /// Tax rate applied on invoices (tax-inclusive pricing).
    pub tax_rate: TaxRate,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        FormattingConfig {
            currency_symbol: "Rs".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            tax_rate: TaxRate::from_bps(1_800),
        }
    }
}

impl FormattingConfig {
    /// Formats a money value for display, e.g. `Rs 1,099 → "Rs 10.99"`.
    pub fn format_money(&self, amount: Money) -> String {
        format!("{} {}", self.currency_symbol, amount)
    }

    /// Formats a timestamp with the configured date format.
    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        at.format(&self.date_format).to_string()
    }

    /// Splits a tax-inclusive total using the configured rate.
    /// Invoice display only; never feeds back into totals or stock.
    pub fn tax_breakdown(&self, total: Money) -> TaxBreakdown {
        TaxBreakdown::from_inclusive(total, self.tax_rate)
    }
}
