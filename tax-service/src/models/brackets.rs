//! Income tax bracket tables for tax-service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculation::round2;

/// One marginal bracket: `rate` applies to income above `threshold`, up to
/// the next bracket's threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: Decimal,
    pub rate: Decimal,
}

/// Ordered bracket table tied to an effective-date range, so jurisdictions
/// and tax years can be swapped without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTable {
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    /// Ascending by threshold; the first threshold is zero.
    pub brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// NZ resident brackets (10.5% to 39%) in force since 1 April 2021.
    pub fn nz_default() -> Self {
        let bracket = |threshold: i64, rate_milli: i64| TaxBracket {
            threshold: Decimal::from(threshold),
            rate: Decimal::new(rate_milli, 3),
        };
        Self {
            effective_from: NaiveDate::from_ymd_opt(2021, 4, 1).expect("valid date"),
            effective_to: None,
            brackets: vec![
                bracket(0, 105),
                bracket(14_000, 175),
                bracket(48_000, 300),
                bracket(70_000, 330),
                bracket(180_000, 390),
            ],
        }
    }

    /// Marginal-bracket accumulation: each rate is applied only to the slice
    /// of income falling inside its band, each band rounded to the cent.
    pub fn tax_on(&self, taxable_income: Decimal) -> Decimal {
        let mut tax = Decimal::ZERO;
        for (i, bracket) in self.brackets.iter().enumerate() {
            if taxable_income <= bracket.threshold {
                break;
            }
            let upper = self
                .brackets
                .get(i + 1)
                .map(|next| next.threshold)
                .unwrap_or(taxable_income);
            let band = taxable_income.min(upper) - bracket.threshold;
            tax = round2(tax + round2(band * bracket.rate));
        }
        tax
    }
}
