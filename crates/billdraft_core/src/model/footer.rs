//! Footer block model.
//!
//! Footer blocks are optional informational sections (notes, terms, payment
//! instructions) attached to a document's output. Which ones render is
//! decided by `calc::footer::select_visible_footer`.

use crate::model::document::DocumentKind;
use serde::{Deserialize, Serialize};

/// Per-document-kind visibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterVisibility {
    pub show_on_invoice: bool,
    pub show_on_quote: bool,
}

impl FooterVisibility {
    pub const ALL: Self = Self {
        show_on_invoice: true,
        show_on_quote: true,
    };

    /// Returns the flag matching `kind`.
    pub fn allows(self, kind: DocumentKind) -> bool {
        match kind {
            DocumentKind::Invoice => self.show_on_invoice,
            DocumentKind::Quote => self.show_on_quote,
        }
    }
}

impl Default for FooterVisibility {
    fn default() -> Self {
        Self::ALL
    }
}

/// One optional footer section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterBlock {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub enabled: bool,
    #[serde(default)]
    pub visibility: FooterVisibility,
}

impl FooterBlock {
    /// Creates an enabled block visible on every document kind.
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            enabled: true,
            visibility: FooterVisibility::ALL,
        }
    }

    pub fn with_visibility(mut self, show_on_invoice: bool, show_on_quote: bool) -> Self {
        self.visibility = FooterVisibility {
            show_on_invoice,
            show_on_quote,
        };
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns whether this block renders on a document of `kind`.
    ///
    /// Disabled blocks never render, whatever their visibility flags say.
    pub fn is_visible_for(&self, kind: DocumentKind) -> bool {
        self.enabled && self.visibility.allows(kind)
    }
}
