//! Billing document model.
//!
//! # Responsibility
//! - Define the invoice/quote record under edit and its modifiers.
//! - Provide field-level patch semantics and structural validation.
//!
//! # Invariants
//! - Line item IDs are unique within one document.
//! - `due_date_ms`, when set, is not earlier than `issue_date_ms`.
//! - `presentation` is persistence-only; rendering reads the live store.

use crate::model::double_option;
use crate::model::footer::FooterBlock;
use crate::model::line_item::{LineItem, LineItemId};
use crate::model::presentation::PresentationOverride;
use crate::model::profile::ProfileId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Document type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Quote,
}

impl DocumentKind {
    /// Short prefix used by sequential document codes.
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Invoice => "INV",
            Self::Quote => "QUO",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Quote => "quote",
        }
    }
}

/// Withholding policy applied on top of tax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetentionPolicy {
    #[default]
    None,
    /// Sender is exempt from acting as withholding agent.
    NoAgent,
    /// Recipient withholds a fixed share of each line.
    RetentionAgent,
}

/// Document recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Structural validation error for documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    DueBeforeIssue { issue_date_ms: i64, due_date_ms: i64 },
    DuplicateLineItem(LineItemId),
}

impl Display for DocumentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DueBeforeIssue {
                issue_date_ms,
                due_date_ms,
            } => write!(
                f,
                "due_date_ms ({due_date_ms}) must be >= issue_date_ms ({issue_date_ms})"
            ),
            Self::DuplicateLineItem(id) => write!(f, "duplicate line item id: {id}"),
        }
    }
}

impl Error for DocumentValidationError {}

/// Invoice or quote under edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub kind: DocumentKind,
    /// Produced by a `DocumentCodeGenerator`; opaque to the core.
    pub code: String,
    /// Unix epoch milliseconds.
    pub issue_date_ms: i64,
    #[serde(default)]
    pub due_date_ms: Option<i64>,
    #[serde(default)]
    pub client: Client,
    /// Display order; totals do not depend on it.
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Percentage of the subtotal.
    #[serde(default)]
    pub discount_rate: Option<f64>,
    /// Percentage used by lines without their own rate.
    #[serde(default)]
    pub tax_rate: Option<f64>,
    #[serde(default)]
    pub retention: RetentionPolicy,
    #[serde(default)]
    pub profile_id: Option<ProfileId>,
    #[serde(default)]
    pub presentation: PresentationOverride,
    #[serde(default)]
    pub footer: Vec<FooterBlock>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Document {
    /// Creates an empty document without modifiers or profile.
    pub fn new(kind: DocumentKind, code: impl Into<String>, issue_date_ms: i64) -> Self {
        Self {
            kind,
            code: code.into(),
            issue_date_ms,
            due_date_ms: None,
            client: Client::default(),
            items: Vec::new(),
            discount_rate: None,
            tax_rate: None,
            retention: RetentionPolicy::None,
            profile_id: None,
            presentation: PresentationOverride::default(),
            footer: Vec::new(),
            notes: None,
        }
    }

    pub fn item(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_index(&self, id: LineItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Checks structural invariants.
    ///
    /// # Errors
    /// - `DueBeforeIssue` when the due date precedes the issue date.
    /// - `DuplicateLineItem` when two rows share an ID.
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        if let Some(due_date_ms) = self.due_date_ms {
            if due_date_ms < self.issue_date_ms {
                return Err(DocumentValidationError::DueBeforeIssue {
                    issue_date_ms: self.issue_date_ms,
                    due_date_ms,
                });
            }
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(DocumentValidationError::DuplicateLineItem(item.id));
            }
        }
        Ok(())
    }

    /// Applies a field patch atomically.
    ///
    /// Returns whether anything changed. On validation failure the document
    /// is left untouched. `kind` is copied as-is; code regeneration for a
    /// kind switch is the store's job. Non-finite rates are stored as `None`.
    pub fn apply_patch(&mut self, patch: &DocumentPatch) -> Result<bool, DocumentValidationError> {
        let mut next = self.clone();
        if let Some(kind) = patch.kind {
            next.kind = kind;
        }
        if let Some(issue_date_ms) = patch.issue_date_ms {
            next.issue_date_ms = issue_date_ms;
        }
        if let Some(due_date_ms) = patch.due_date_ms {
            next.due_date_ms = due_date_ms;
        }
        if let Some(client) = &patch.client {
            next.client = client.clone();
        }
        if let Some(discount_rate) = patch.discount_rate {
            next.discount_rate = finite_rate(discount_rate);
        }
        if let Some(tax_rate) = patch.tax_rate {
            next.tax_rate = finite_rate(tax_rate);
        }
        if let Some(retention) = patch.retention {
            next.retention = retention;
        }
        if let Some(notes) = &patch.notes {
            next.notes = notes.clone();
        }
        if let Some(footer) = &patch.footer {
            next.footer = footer.clone();
        }

        next.validate()?;
        if next == *self {
            return Ok(false);
        }
        *self = next;
        Ok(true)
    }
}

// NaN never equals itself, so storing it would defeat change detection.
fn finite_rate(rate: Option<f64>) -> Option<f64> {
    rate.filter(|value| value.is_finite())
}

/// Document field update. Outer `None` leaves a field untouched; for
/// nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(default)]
    pub kind: Option<DocumentKind>,
    #[serde(default)]
    pub issue_date_ms: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date_ms: Option<Option<i64>>,
    #[serde(default)]
    pub client: Option<Client>,
    #[serde(default, deserialize_with = "double_option")]
    pub discount_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tax_rate: Option<Option<f64>>,
    #[serde(default)]
    pub retention: Option<RetentionPolicy>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub footer: Option<Vec<FooterBlock>>,
}
