//! Tax calculator for tax-service.
//!
//! Pure line-item tax math: no I/O, no clock, no global state. Calling the
//! same request twice yields identical results.

use rust_decimal::Decimal;

use crate::error::TaxError;
use crate::models::{
    round2, LineBreakdown, TaxCalculationRequest, TaxCalculationResult, TaxConfiguration,
    ValidationOutcome,
};

/// GST component of a single amount under the given rate and convention.
pub fn gst_portion(amount: Decimal, rate: Decimal, tax_inclusive: bool) -> Decimal {
    if rate.is_zero() {
        return Decimal::ZERO;
    }
    if tax_inclusive {
        round2(amount - round2(amount / (Decimal::ONE + rate)))
    } else {
        round2(amount * rate)
    }
}

/// Split one amount into (subtotal, tax), both rounded to the cent.
fn split_line(
    line_total: Decimal,
    rate: Decimal,
    tax_inclusive: bool,
    taxable: bool,
) -> (Decimal, Decimal) {
    if !taxable || rate.is_zero() {
        return (round2(line_total), Decimal::ZERO);
    }
    if tax_inclusive {
        let subtotal = round2(line_total / (Decimal::ONE + rate));
        (subtotal, round2(line_total - subtotal))
    } else {
        (round2(line_total), round2(line_total * rate))
    }
}

/// Validate a calculation request without failing fast, so callers can show
/// every problem at once.
pub fn validate_tax_calculation_request(request: &TaxCalculationRequest) -> ValidationOutcome {
    let mut errors = Vec::new();

    if request.items.is_empty() {
        errors.push("At least one line item is required".to_string());
    }
    for (index, item) in request.items.iter().enumerate() {
        if item.quantity <= Decimal::ZERO {
            errors.push(format!(
                "Line {}: quantity must be greater than zero",
                index + 1
            ));
        }
        if item.unit_price < Decimal::ZERO {
            errors.push(format!("Line {}: unit price cannot be negative", index + 1));
        }
    }
    if let Some(charges) = request.additional_charges {
        if charges < Decimal::ZERO {
            errors.push("Additional charges cannot be negative".to_string());
        }
    }
    if let Some(discounts) = request.discounts {
        if discounts < Decimal::ZERO {
            errors.push("Discounts cannot be negative".to_string());
        }
    }

    ValidationOutcome::from_errors(errors)
}

/// Turn priced line items plus a tax configuration into a
/// subtotal/tax/total breakdown.
///
/// Every intermediate currency value is rounded to 2 dp half-up,
/// independently per line, before summation.
pub fn calculate_tax(
    request: &TaxCalculationRequest,
    config: Option<&TaxConfiguration>,
) -> Result<TaxCalculationResult, TaxError> {
    let config = config.ok_or(TaxError::MissingConfiguration)?;
    if config.rate < Decimal::ZERO || config.rate > Decimal::ONE {
        return Err(TaxError::InvalidConfiguration(format!(
            "tax rate {} is outside [0, 1]",
            config.rate
        )));
    }

    let outcome = validate_tax_calculation_request(request);
    if !outcome.is_valid {
        return Err(TaxError::InvalidRequest(outcome.errors.join("; ")));
    }

    let rate = config.rate;
    let mut subtotal = Decimal::ZERO;
    let mut tax_amount = Decimal::ZERO;
    let mut breakdown = Vec::with_capacity(request.items.len());

    for item in &request.items {
        let line_total = round2(item.quantity * item.unit_price);
        let (line_subtotal, line_tax) =
            split_line(line_total, rate, request.tax_inclusive, item.taxable);
        subtotal += line_subtotal;
        tax_amount += line_tax;
        breakdown.push(LineBreakdown {
            description: item.description.clone(),
            line_total,
            subtotal: line_subtotal,
            tax_amount: line_tax,
            taxable: item.taxable,
        });
    }

    // Surcharges are one more always-taxable line under the same convention.
    if let Some(charges) = request.additional_charges {
        if charges > Decimal::ZERO {
            let (charge_subtotal, charge_tax) =
                split_line(round2(charges), rate, request.tax_inclusive, true);
            subtotal += charge_subtotal;
            tax_amount += charge_tax;
        }
    }

    if let Some(discounts) = request.discounts {
        if discounts > Decimal::ZERO {
            if request.tax_inclusive {
                // Inclusive: the discount carries its own tax component, so
                // decompose it and subtract from both running sums.
                let (discount_subtotal, discount_tax) =
                    split_line(round2(discounts), rate, true, true);
                subtotal -= discount_subtotal;
                tax_amount -= discount_tax;
            } else {
                // Exclusive: knock the discount off the subtotal first, then
                // recompute tax against the aggregate discounted subtotal
                // rather than prorating across lines.
                subtotal -= round2(discounts);
                tax_amount = round2(subtotal * rate);
            }
        }
    }

    let subtotal = round2(subtotal);
    let tax_amount = round2(tax_amount);

    Ok(TaxCalculationResult {
        subtotal,
        tax_amount,
        total: round2(subtotal + tax_amount),
        tax_rate: rate,
        tax_name: config.name.clone(),
        breakdown,
    })
}
