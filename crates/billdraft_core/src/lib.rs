//! Core domain logic for BillDraft invoice and quote editing.
//! This crate is the single source of truth for totals, footer visibility
//! and presentation synchronization rules.

pub mod calc;
pub mod code_generator;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod sync;

pub use calc::footer::select_visible_footer;
pub use calc::totals::{compute_totals, line_totals, LineTotals, TotalsResult};
pub use code_generator::{DocumentCodeGenerator, SequentialCodeGenerator};
pub use logging::{
    default_log_level, init_logging, logging_status, resolve_log_level, LoggingError,
};
pub use model::document::{
    Client, Document, DocumentKind, DocumentPatch, DocumentValidationError, RetentionPolicy,
};
pub use model::footer::{FooterBlock, FooterVisibility};
pub use model::line_item::{LineItem, LineItemId};
pub use model::presentation::{
    PresentationError, PresentationOverride, PresentationState, PresentationTokens, TemplateId,
    TokenPatch,
};
pub use model::profile::{Profile, ProfileId, ProfilePatch};
pub use service::session::{
    global_installed, install_global, with_global, EditorSession, SessionError, SessionSeed,
};
pub use store::document::{DocumentChange, DocumentStore, StoreError, StoreResult};
pub use store::observer::Subscription;
pub use store::presentation::PresentationStore;
pub use store::turn::TurnScheduler;
pub use sync::bridge::{GuardState, PresentationBridge};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
