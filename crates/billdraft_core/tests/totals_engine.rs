use billdraft_core::{
    compute_totals, line_totals, Document, DocumentKind, LineItem, RetentionPolicy, TotalsResult,
};

fn reference_document() -> Document {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0001", 1_700_000_000_000);
    document.items = vec![
        LineItem::new("Design", 2.0, 100.0).with_tax_rate(10.0),
        LineItem::new("Hosting", 1.0, 50.0).with_discount(10.0),
    ];
    document
}

#[test]
fn reference_invoice_without_retention() {
    let totals = compute_totals(&reference_document());

    assert_eq!(
        totals,
        TotalsResult {
            subtotal: 250.0,
            discount: 5.0,
            tax: 20.0,
            retention: 0.0,
            grand_total: 265.0,
        }
    );
}

#[test]
fn retention_agent_withholds_two_percent_of_each_line() {
    let mut document = reference_document();
    document.retention = RetentionPolicy::RetentionAgent;

    let totals = compute_totals(&document);

    assert_eq!(totals.retention, 4.9);
    assert_eq!(totals.grand_total, 260.1);
}

#[test]
fn empty_document_is_all_zeros() {
    let document = Document::new(DocumentKind::Quote, "QUO-0001", 0);

    assert_eq!(compute_totals(&document), TotalsResult::default());
    assert!(line_totals(&document).is_empty());
}

#[test]
fn invalid_numbers_count_as_zero() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0002", 0);
    document.items = vec![
        LineItem::new("NaN qty", f64::NAN, 100.0),
        LineItem::new("Negative price", 3.0, -20.0),
        LineItem::new("Infinite tax", 1.0, 10.0).with_tax_rate(f64::INFINITY),
        LineItem::new("Valid", 1.0, 40.0),
    ];

    let totals = compute_totals(&document);

    assert_eq!(totals.subtotal, 50.0);
    assert_eq!(totals.tax, 0.0);
    assert_eq!(totals.grand_total, 50.0);
    assert!(totals.grand_total.is_finite());
}

#[test]
fn global_tax_applies_only_to_lines_without_their_own_rate() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0003", 0);
    document.tax_rate = Some(21.0);
    document.items = vec![
        LineItem::new("Default rate", 1.0, 100.0),
        LineItem::new("Exempt", 1.0, 100.0).with_tax_rate(0.0),
        LineItem::new("Reduced", 1.0, 100.0).with_tax_rate(10.0),
    ];

    let totals = compute_totals(&document);

    assert_eq!(totals.tax, 31.0);
    assert_eq!(totals.grand_total, 331.0);
}

#[test]
fn global_discount_reduces_subtotal_without_touching_tax_base() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0004", 0);
    document.discount_rate = Some(10.0);
    document.items = vec![LineItem::new("Consulting", 4.0, 25.0).with_tax_rate(20.0)];

    let totals = compute_totals(&document);

    assert_eq!(totals.subtotal, 100.0);
    assert_eq!(totals.discount, 10.0);
    assert_eq!(totals.tax, 20.0);
    assert_eq!(totals.grand_total, 110.0);
}

#[test]
fn discounts_never_exceed_subtotal() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0005", 0);
    document.discount_rate = Some(80.0);
    document.items = vec![
        LineItem::new("Heavily discounted", 1.0, 100.0).with_discount(150.0),
        LineItem::new("Half off", 2.0, 50.0).with_discount(50.0),
    ];

    let totals = compute_totals(&document);
    let lines = line_totals(&document);

    assert_eq!(lines[0].after_discount, 0.0);
    assert!(totals.discount <= totals.subtotal);
    assert!(totals.grand_total >= 0.0);
}

#[test]
fn fractional_amounts_round_to_minor_units() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0006", 0);
    document.items = vec![LineItem::new("Stickers", 3.0, 0.125).with_tax_rate(21.0)];

    let totals = compute_totals(&document);

    assert_eq!(totals.subtotal, 0.38);
    assert_eq!(totals.tax, 0.08);
    assert_eq!(totals.grand_total, 0.46);
}

#[test]
fn computation_is_idempotent_and_order_independent() {
    let document = reference_document();
    let first = compute_totals(&document);
    let second = compute_totals(&document);
    assert_eq!(first, second);

    let mut reversed = document.clone();
    reversed.items.reverse();
    assert_eq!(compute_totals(&reversed), first);
}

#[test]
fn line_totals_follow_display_order() {
    let document = reference_document();
    let lines = line_totals(&document);

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].item_id, document.items[0].id);
    assert_eq!(lines[0].tax, 20.0);
    assert_eq!(lines[1].discount, 5.0);
    assert_eq!(lines[1].after_discount, 45.0);
}

fn assert_well_formed(totals: &TotalsResult) {
    for amount in [
        totals.subtotal,
        totals.discount,
        totals.tax,
        totals.retention,
        totals.grand_total,
    ] {
        assert!(amount.is_finite());
        assert!(amount >= 0.0);
    }
    assert!(totals.discount <= totals.subtotal);
}

#[test]
fn amounts_beyond_decimal_range_count_as_zero() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0007", 0);
    document.retention = RetentionPolicy::RetentionAgent;
    document.items = vec![
        LineItem::new("Too large", 1e15, 1e15),
        LineItem::new("Normal", 1.0, 100.0).with_tax_rate(10.0),
    ];

    let totals = compute_totals(&document);

    assert_well_formed(&totals);
    assert_eq!(totals.subtotal, 100.0);
    assert_eq!(totals.tax, 10.0);
    assert_eq!(totals.retention, 2.0);
    assert_eq!(totals.grand_total, 108.0);
}

#[test]
fn huge_tax_rate_is_capped_at_one_hundred_percent() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0008", 0);
    document.items = vec![LineItem::new("Taxed", 1.0, 1e10).with_tax_rate(1e20)];

    let totals = compute_totals(&document);

    assert_well_formed(&totals);
    assert_eq!(totals.subtotal, 1e10);
    assert_eq!(totals.tax, 1e10);
    assert_eq!(totals.grand_total, 2e10);
}

#[test]
fn running_sums_near_the_decimal_limit_do_not_panic() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0009", 0);
    document.discount_rate = Some(50.0);
    document.items = (0..8)
        .map(|index| LineItem::new(format!("Line {index}"), 1e14, 1e14).with_tax_rate(100.0))
        .collect();

    let totals = compute_totals(&document);

    assert_well_formed(&totals);
    assert!(totals.subtotal > 0.0);
    assert!(totals.grand_total > 0.0);
}

#[test]
fn invalid_document_rates_count_as_zero() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0010", 0);
    document.tax_rate = Some(f64::NAN);
    document.discount_rate = Some(-5.0);
    document.items = vec![LineItem::new("Consulting", 2.0, 50.0)];

    let totals = compute_totals(&document);

    assert_well_formed(&totals);
    assert_eq!(
        totals,
        TotalsResult {
            subtotal: 100.0,
            discount: 0.0,
            tax: 0.0,
            retention: 0.0,
            grand_total: 100.0,
        }
    );

    document.tax_rate = Some(-21.0);
    document.discount_rate = Some(f64::INFINITY);
    let totals = compute_totals(&document);
    assert_eq!(totals.tax, 0.0);
    assert_eq!(totals.discount, 0.0);
    assert_eq!(totals.grand_total, 100.0);
}

#[test]
fn full_discount_with_retention_never_goes_negative() {
    let mut document = Document::new(DocumentKind::Invoice, "INV-0011", 0);
    document.retention = RetentionPolicy::RetentionAgent;
    document.discount_rate = Some(100.0);
    document.items = vec![LineItem::new("Gift", 1.0, 80.0).with_discount(25.0)];

    let totals = compute_totals(&document);

    assert_well_formed(&totals);
    assert_eq!(totals.discount, 80.0);
    assert_eq!(totals.grand_total, 0.0);
}
