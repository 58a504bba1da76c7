//! Sender profile model.
//!
//! # Invariants
//! - `presentation` is the last presentation applied while this profile was
//!   active. Only the sync bridge writes it, through the document store.

use crate::model::double_option;
use crate::model::presentation::PresentationOverride;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProfileId = Uuid;

/// Sender identity plus its saved presentation preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// ISO 4217 code, e.g. `EUR`.
    pub currency: String,
    /// BCP 47 tag, e.g. `es-ES`.
    pub locale: String,
    #[serde(default)]
    pub presentation: PresentationOverride,
}

impl Profile {
    /// Creates a profile with a generated ID and an empty saved override.
    pub fn new(
        name: impl Into<String>,
        currency: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tax_id: None,
            email: None,
            phone: None,
            address: None,
            website: None,
            currency: currency.into(),
            locale: locale.into(),
            presentation: PresentationOverride::default(),
        }
    }

    pub fn with_presentation(mut self, presentation: PresentationOverride) -> Self {
        self.presentation = presentation;
        self
    }

    /// Applies identity changes. Returns whether anything changed.
    pub fn apply_patch(&mut self, patch: &ProfilePatch) -> bool {
        let before = self.clone();
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(tax_id) = &patch.tax_id {
            self.tax_id = tax_id.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        if let Some(website) = &patch.website {
            self.website = website.clone();
        }
        if let Some(currency) = &patch.currency {
            self.currency = currency.clone();
        }
        if let Some(locale) = &patch.locale {
            self.locale = locale.clone();
        }
        *self != before
    }
}

/// Identity field update. Outer `None` leaves a field untouched; for
/// nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub tax_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub website: Option<Option<String>>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}
