//! Line item domain model.
//!
//! # Responsibility
//! - Define one billable row of a document.
//!
//! # Invariants
//! - `id` is unique within its owning document and never reused.
//! - Numeric fields are stored as entered; the totals engine sanitizes them,
//!   so editing a field to an invalid value never corrupts other rows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a line item inside its document.
pub type LineItemId = Uuid;

/// One billable row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Expected non-negative. Invalid values count as zero in totals.
    pub quantity: f64,
    /// Currency amount with minor-unit precision.
    pub unit_price: f64,
    /// Percentage. Falls back to the document's global rate when `None`.
    #[serde(default)]
    pub tax_rate: Option<f64>,
    /// Percentage of the line base.
    #[serde(default)]
    pub discount: Option<f64>,
}

impl LineItem {
    /// Creates a line item with a generated stable ID and no modifiers.
    pub fn new(title: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self::with_id(Uuid::new_v4(), title, quantity, unit_price)
    }

    /// Creates a line item with a caller-provided ID.
    ///
    /// Used by seed/import paths where identity already exists externally.
    pub fn with_id(
        id: LineItemId,
        title: impl Into<String>,
        quantity: f64,
        unit_price: f64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            quantity,
            unit_price,
            tax_rate: None,
            discount: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tax_rate(mut self, rate: f64) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    pub fn with_discount(mut self, rate: f64) -> Self {
        self.discount = Some(rate);
        self
    }
}
