//! Billing document domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by calc, store and sync layers.
//! - Keep one serde wire shape shared by seeds, FFI payloads and exports.
//!
//! # Invariants
//! - Every line item belongs to exactly one document (owned `Vec`).
//! - Live presentation tokens are always fully populated; only overrides
//!   and patches may be partial.

pub mod document;
pub mod footer;
pub mod line_item;
pub mod presentation;
pub mod profile;

use serde::{Deserialize, Deserializer};

/// Decodes a patch field so that an absent key stays `None` while an explicit
/// `null` becomes `Some(None)` (clear the value).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
