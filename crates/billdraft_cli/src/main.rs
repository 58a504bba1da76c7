//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `billdraft_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use billdraft_core::{compute_totals, Document, DocumentKind, LineItem};

fn main() {
    println!("billdraft_core ping={}", billdraft_core::ping());
    println!("billdraft_core version={}", billdraft_core::core_version());

    // Fixed sample: 2 x 100 @ 10% tax, 1 x 50 @ 5% tax, no discounts.
    let mut sample = Document::new(DocumentKind::Invoice, "INV-0001", 0);
    sample.items = vec![
        LineItem::new("Design", 2.0, 100.0).with_tax_rate(10.0),
        LineItem::new("Hosting", 1.0, 50.0).with_tax_rate(5.0),
    ];
    let totals = compute_totals(&sample);
    println!(
        "billdraft_core sample subtotal={:.2} discount={:.2} tax={:.2} retention={:.2} grand_total={:.2}",
        totals.subtotal, totals.discount, totals.tax, totals.retention, totals.grand_total
    );
}
