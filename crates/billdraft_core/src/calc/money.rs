//! Currency arithmetic helpers.
//!
//! Amounts travel as `f64` in the model and across FFI; all arithmetic is
//! done on `Decimal` and rounded back to minor-unit precision at each step.
//!
//! Products and sums are checked: a result outside the `Decimal` range is
//! coerced to zero (logged at `debug`), never a panic.

use log::debug;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Minor-unit precision for every currency handled by the core.
pub const CURRENCY_DECIMALS: u32 = 2;

/// Converts user input to a non-negative decimal.
///
/// Non-finite and negative values are coerced to zero.
pub fn sanitize(value: f64, field: &'static str) -> Decimal {
    if !value.is_finite() || value < 0.0 {
        debug!("event=input_coerced module=calc field={field} status=skip");
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or_else(|| {
        debug!("event=input_coerced module=calc field={field} status=skip reason=out_of_range");
        Decimal::ZERO
    })
}

/// Like [`sanitize`], additionally capped at 100.
pub fn sanitize_percent(value: f64, field: &'static str) -> Decimal {
    sanitize(value, field).min(Decimal::ONE_HUNDRED)
}

/// Rounds to currency precision, half away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// `left × right`, rounded to currency precision; zero on overflow.
pub fn mul_amount(left: Decimal, right: Decimal, field: &'static str) -> Decimal {
    match left.checked_mul(right) {
        Some(product) => round_currency(product),
        None => overflowed(field),
    }
}

/// `total + amount`; on overflow `amount` is dropped and `total` kept.
pub fn add_amount(total: Decimal, amount: Decimal, field: &'static str) -> Decimal {
    match total.checked_add(amount) {
        Some(sum) => round_currency(sum),
        None => {
            overflowed(field);
            total
        }
    }
}

/// `amount × rate%`, rounded to currency precision.
///
/// Falls back to dividing first when the plain product overflows; with a
/// rate of at most 100 that path cannot overflow.
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    let scaled = amount
        .checked_mul(rate)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .or_else(|| {
            amount
                .checked_div(Decimal::ONE_HUNDRED)
                .and_then(|share| share.checked_mul(rate))
        });
    match scaled {
        Some(value) => round_currency(value),
        None => overflowed("percent"),
    }
}

fn overflowed(field: &'static str) -> Decimal {
    debug!("event=input_coerced module=calc field={field} status=skip reason=overflow");
    Decimal::ZERO
}

/// Converts a rounded amount back to `f64` for the model and FFI.
pub fn to_f64(value: Decimal) -> f64 {
    round_currency(value).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::{
        add_amount, mul_amount, percent_of, round_currency, sanitize, sanitize_percent, to_f64,
    };
    use rust_decimal::Decimal;

    #[test]
    fn sanitize_coerces_invalid_input_to_zero() {
        assert_eq!(sanitize(f64::NAN, "quantity"), Decimal::ZERO);
        assert_eq!(sanitize(f64::INFINITY, "quantity"), Decimal::ZERO);
        assert_eq!(sanitize(-3.0, "quantity"), Decimal::ZERO);
        assert_eq!(sanitize(2.5, "quantity"), Decimal::new(25, 1));
    }

    #[test]
    fn sanitize_percent_caps_at_one_hundred() {
        assert_eq!(sanitize_percent(250.0, "discount"), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn round_currency_is_half_away_from_zero() {
        assert_eq!(round_currency(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_currency(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
        assert_eq!(round_currency(Decimal::new(1004, 3)), Decimal::new(100, 2));
    }

    #[test]
    fn percent_of_rounds_result() {
        assert_eq!(
            percent_of(Decimal::new(3333, 2), Decimal::new(10, 0)),
            Decimal::new(333, 2)
        );
    }

    #[test]
    fn mul_amount_overflow_becomes_zero() {
        assert_eq!(
            mul_amount(Decimal::MAX, Decimal::new(2, 0), "base"),
            Decimal::ZERO
        );
        assert_eq!(
            mul_amount(Decimal::new(25, 1), Decimal::new(4, 0), "base"),
            Decimal::new(10, 0)
        );
    }

    #[test]
    fn add_amount_keeps_total_on_overflow() {
        assert_eq!(add_amount(Decimal::MAX, Decimal::ONE, "subtotal"), Decimal::MAX);
        assert_eq!(
            add_amount(Decimal::new(150, 2), Decimal::new(25, 2), "subtotal"),
            Decimal::new(175, 2)
        );
    }

    #[test]
    fn percent_of_large_amount_does_not_overflow() {
        let amount = Decimal::MAX;
        let half = percent_of(amount, Decimal::new(50, 0));
        assert!(half > Decimal::ZERO);
        assert!(half < amount);
    }

    #[test]
    fn to_f64_keeps_two_decimals() {
        assert_eq!(to_f64(Decimal::new(26010, 2)), 260.10);
    }
}
