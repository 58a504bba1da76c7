//! Totals engine.
//!
//! # Responsibility
//! - Turn a document's line items and modifiers into a totals breakdown.
//!
//! # Invariants
//! - Canonical order per line: discount, then tax, then retention.
//! - Each line amount and each aggregate is rounded to currency precision,
//!   so drift cannot accumulate across many lines.
//! - Invalid numeric input counts as zero and never affects other lines.
//! - Amounts outside the decimal range count as zero; the engine never
//!   panics on finite input.
//! - A line can never go negative; the total discount never exceeds the
//!   subtotal; `grand_total` is clamped at zero.

use crate::calc::money::{
    add_amount, mul_amount, percent_of, round_currency, sanitize, sanitize_percent, to_f64,
};
use crate::model::document::{Document, RetentionPolicy};
use crate::model::line_item::{LineItem, LineItemId};
use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share withheld per line under `RetentionPolicy::RetentionAgent`, in percent.
pub const RETENTION_AGENT_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Document-level totals breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalsResult {
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub retention: f64,
    pub grand_total: f64,
}

/// Per-line amounts, for previews that show a breakdown per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTotals {
    pub item_id: LineItemId,
    pub base: f64,
    pub discount: f64,
    pub after_discount: f64,
    pub tax: f64,
    pub retention: f64,
}

#[derive(Debug, Clone, Copy)]
struct LineAmounts {
    base: Decimal,
    discount: Decimal,
    after_discount: Decimal,
    tax: Decimal,
    retention: Decimal,
}

/// Computes the totals breakdown of `document`.
///
/// Pure function of items and modifiers; empty documents yield all zeros.
pub fn compute_totals(document: &Document) -> TotalsResult {
    let mut subtotal = Decimal::ZERO;
    let mut item_discounts = Decimal::ZERO;
    let mut tax = Decimal::ZERO;
    let mut retention = Decimal::ZERO;

    for item in &document.items {
        let line = line_amounts(item, document);
        subtotal = add_amount(subtotal, line.base, "subtotal");
        item_discounts = add_amount(item_discounts, line.discount, "discount");
        tax = add_amount(tax, line.tax, "tax");
        retention = add_amount(retention, line.retention, "retention");
    }

    let global_rate = document
        .discount_rate
        .map(|rate| sanitize_percent(rate, "discount_rate"))
        .unwrap_or(Decimal::ZERO);
    let global_discount = percent_of(subtotal, global_rate);
    let discount = add_amount(item_discounts, global_discount, "discount").min(subtotal);

    // Both terms are non-negative and in range, so only the tax sum can overflow.
    let net = add_amount(subtotal - discount, tax, "grand_total");
    let grand_total = round_currency(net - retention).max(Decimal::ZERO);

    trace!(
        "event=totals_computed module=calc items={} status=ok",
        document.items.len()
    );

    TotalsResult {
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        tax: to_f64(tax),
        retention: to_f64(retention),
        grand_total: to_f64(grand_total),
    }
}

/// Computes per-line amounts in display order.
pub fn line_totals(document: &Document) -> Vec<LineTotals> {
    document
        .items
        .iter()
        .map(|item| {
            let line = line_amounts(item, document);
            LineTotals {
                item_id: item.id,
                base: to_f64(line.base),
                discount: to_f64(line.discount),
                after_discount: to_f64(line.after_discount),
                tax: to_f64(line.tax),
                retention: to_f64(line.retention),
            }
        })
        .collect()
}

fn line_amounts(item: &LineItem, document: &Document) -> LineAmounts {
    let quantity = sanitize(item.quantity, "quantity");
    let unit_price = sanitize(item.unit_price, "unit_price");
    let base = mul_amount(quantity, unit_price, "base");

    let discount_rate = item
        .discount
        .map(|rate| sanitize_percent(rate, "discount"))
        .unwrap_or(Decimal::ZERO);
    let discount = percent_of(base, discount_rate);
    let after_discount = (base - discount).max(Decimal::ZERO);

    // Line rate wins even when it is explicitly zero.
    let tax_rate = item
        .tax_rate
        .or(document.tax_rate)
        .map(|rate| sanitize_percent(rate, "tax_rate"))
        .unwrap_or(Decimal::ZERO);
    let tax = percent_of(after_discount, tax_rate);

    let retention = match document.retention {
        RetentionPolicy::RetentionAgent => percent_of(after_discount, RETENTION_AGENT_RATE),
        RetentionPolicy::None | RetentionPolicy::NoAgent => Decimal::ZERO,
    };

    LineAmounts {
        base,
        discount,
        after_discount,
        tax,
        retention,
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_totals, line_totals, RETENTION_AGENT_RATE};
    use crate::model::document::{Document, DocumentKind};
    use crate::model::line_item::LineItem;
    use rust_decimal::Decimal;

    #[test]
    fn retention_rate_is_two_percent() {
        assert_eq!(RETENTION_AGENT_RATE, Decimal::new(2, 0));
    }

    #[test]
    fn line_totals_follow_item_order() {
        let mut document = Document::new(DocumentKind::Quote, "QUO-0001", 0);
        let first = LineItem::new("b", 1.0, 10.0);
        let second = LineItem::new("a", 3.0, 1.5).with_discount(50.0);
        document.items = vec![first.clone(), second.clone()];

        let lines = line_totals(&document);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].item_id, first.id);
        assert_eq!(lines[1].item_id, second.id);
        assert_eq!(lines[1].base, 4.5);
        assert_eq!(lines[1].discount, 2.25);
        assert_eq!(lines[1].after_discount, 2.25);
    }

    #[test]
    fn explicit_zero_line_rate_overrides_global_rate() {
        let mut document = Document::new(DocumentKind::Invoice, "INV-0001", 0);
        document.tax_rate = Some(21.0);
        document.items = vec![LineItem::new("exempt", 1.0, 100.0).with_tax_rate(0.0)];

        assert_eq!(compute_totals(&document).tax, 0.0);
    }
}
