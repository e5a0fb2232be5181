//! GST period aggregation for tax-service.
//!
//! Folds raw per-record amounts for a reporting period into the sales and
//! purchases boxes of a GST return. Running sums are rounded to the cent
//! after every addition; that rounding is part of the contract, not an
//! implementation detail.

use rust_decimal::Decimal;

use crate::models::{round2, PeriodEntry, PurchaseSummary, SalesSummary, TaxConfiguration};
use crate::services::calculator::gst_portion;

/// Aggregate sales entries into the GST return sales box.
///
/// Taxable entries land in `standard_rated` and contribute GST; non-taxable
/// entries land in `zero_rated` without a GST contribution.
pub fn gst_return_sales(entries: &[PeriodEntry], config: &TaxConfiguration) -> SalesSummary {
    entries.iter().fold(SalesSummary::default(), |mut acc, entry| {
        if entry.taxable {
            acc.standard_rated = round2(acc.standard_rated + entry.amount);
            let gst = gst_portion(entry.amount, config.rate, entry.tax_inclusive);
            acc.gst_on_sales = round2(acc.gst_on_sales + gst);
            if entry.tax_inclusive {
                // Inclusive amounts already contain their GST.
                acc.total_sales = round2(acc.total_sales + entry.amount);
            } else {
                acc.total_sales = round2(acc.total_sales + entry.amount + gst);
            }
        } else {
            acc.zero_rated = round2(acc.zero_rated + entry.amount);
        }
        acc
    })
}

/// Aggregate purchase entries into the GST return purchases box.
///
/// Unlike sales there is no zero-rated bucket: GST on non-claimable
/// purchases is simply dropped and the raw amount still counts toward the
/// purchase total.
pub fn gst_return_purchases(
    entries: &[PeriodEntry],
    config: &TaxConfiguration,
) -> PurchaseSummary {
    entries
        .iter()
        .fold(PurchaseSummary::default(), |mut acc, entry| {
            if entry.taxable {
                acc.standard_rated = round2(acc.standard_rated + entry.amount);
                let gst = gst_portion(entry.amount, config.rate, entry.tax_inclusive);
                acc.gst_on_purchases = round2(acc.gst_on_purchases + gst);
                if entry.tax_inclusive {
                    acc.total_purchases = round2(acc.total_purchases + entry.amount);
                } else {
                    acc.total_purchases = round2(acc.total_purchases + entry.amount + gst);
                }
            } else {
                acc.total_purchases = round2(acc.total_purchases + entry.amount);
            }
            acc
        })
}

/// Net GST position: positive is owed to IRD, negative is a refund due.
pub fn net_gst(gst_on_sales: Decimal, gst_on_purchases: Decimal) -> Decimal {
    round2(gst_on_sales - gst_on_purchases)
}
