//! Flutter-facing bridge crate for the BillDraft editor core.

pub mod api;
