//! Editor session wiring.
//!
//! # Responsibility
//! - Build the stores and the sync bridge from a startup seed.
//! - Hold the process-wide session for hosts that need a singleton.
//!
//! # Invariants
//! - The bridge is connected exactly once per session, after both stores
//!   exist, and lives as long as the session.
//! - The live presentation store is never torn down mid-session.
//! - The global session is installed at most once per UI thread.

use crate::calc::totals::TotalsResult;
use crate::code_generator::{DocumentCodeGenerator, SequentialCodeGenerator};
use crate::model::document::Document;
use crate::model::footer::FooterBlock;
use crate::model::presentation::{PresentationError, PresentationState};
use crate::model::profile::Profile;
use crate::store::document::{DocumentStore, StoreError};
use crate::store::presentation::PresentationStore;
use crate::store::turn::TurnScheduler;
use crate::sync::bridge::PresentationBridge;
use log::{info, warn};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

thread_local! {
    static GLOBAL_SESSION: OnceCell<EditorSession> = OnceCell::new();
}

/// Startup state supplied by the host (seeded or loaded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSeed {
    pub document: Document,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    /// Live presentation to start from; defaults when absent or invalid.
    #[serde(default)]
    pub presentation: Option<PresentationState>,
}

/// Session construction/installation error.
#[derive(Debug)]
pub enum SessionError {
    Decode(serde_json::Error),
    Store(StoreError),
    AlreadyInstalled,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "invalid session seed: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::AlreadyInstalled => write!(f, "editor session already installed"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::AlreadyInstalled => None,
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Stores, scheduler and bridge for one editing session.
pub struct EditorSession {
    scheduler: TurnScheduler,
    documents: DocumentStore,
    presentation: PresentationStore,
    bridge: PresentationBridge,
}

impl EditorSession {
    /// Builds a session from `seed`.
    ///
    /// Repairs applied before wiring:
    /// - a missing or unknown `profile_id` falls back to the first profile;
    /// - a blank document code is replaced by one from `codes`;
    /// - an invalid seed presentation is replaced by defaults.
    ///
    /// # Errors
    /// - `Store` when the document or profile list is structurally invalid.
    pub fn new(
        seed: SessionSeed,
        mut codes: Box<dyn DocumentCodeGenerator>,
    ) -> Result<Self, SessionError> {
        let SessionSeed {
            mut document,
            profiles,
            presentation,
        } = seed;

        let known = document
            .profile_id
            .is_some_and(|id| profiles.iter().any(|profile| profile.id == id));
        if !known {
            let fallback = profiles.first().map(|profile| profile.id);
            if document.profile_id.is_some() {
                warn!("event=session_seed module=service status=repair reason=unknown_profile");
            }
            document.profile_id = fallback;
        }
        if document.code.trim().is_empty() {
            document.code = codes.next_code(document.kind);
        }

        let initial = match presentation {
            Some(state) => match validate_state(&state) {
                Ok(()) => state,
                Err(err) => {
                    warn!(
                        "event=session_seed module=service status=repair reason=invalid_presentation error={err}"
                    );
                    PresentationState::default()
                }
            },
            None => PresentationState::default(),
        };

        let item_count = document.items.len();
        let profile_count = profiles.len();
        let scheduler = TurnScheduler::new();
        let documents = DocumentStore::new(document, profiles, codes, scheduler.clone())?;
        let presentation = PresentationStore::with_state(initial, scheduler.clone());
        let bridge = PresentationBridge::connect(&documents, &presentation, &scheduler);

        info!(
            "event=session_start module=service items={item_count} profiles={profile_count} status=ok"
        );
        Ok(Self {
            scheduler,
            documents,
            presentation,
            bridge,
        })
    }

    /// Decodes a JSON [`SessionSeed`] and builds a session numbered by
    /// [`SequentialCodeGenerator`].
    pub fn from_json(seed_json: &str) -> Result<Self, SessionError> {
        let seed: SessionSeed = serde_json::from_str(seed_json)?;
        Self::new(seed, Box::new(SequentialCodeGenerator::new()))
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn presentation(&self) -> &PresentationStore {
        &self.presentation
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn bridge(&self) -> &PresentationBridge {
        &self.bridge
    }

    pub fn totals(&self) -> TotalsResult {
        self.documents.totals()
    }

    pub fn visible_footer(&self) -> Vec<FooterBlock> {
        self.documents.visible_footer()
    }
}

fn validate_state(state: &PresentationState) -> Result<(), PresentationError> {
    state.template.validate()?;
    state.tokens.validate()
}

/// Installs the process-wide session for the current (UI) thread.
///
/// # Errors
/// - `AlreadyInstalled` on any call after the first successful one.
pub fn install_global(session: EditorSession) -> Result<(), SessionError> {
    GLOBAL_SESSION.with(|cell| {
        cell.set(session)
            .map_err(|_| SessionError::AlreadyInstalled)
    })
}

/// Runs `read` against the global session, or returns `None` before install.
pub fn with_global<R>(read: impl FnOnce(&EditorSession) -> R) -> Option<R> {
    GLOBAL_SESSION.with(|cell| cell.get().map(read))
}

pub fn global_installed() -> bool {
    GLOBAL_SESSION.with(|cell| cell.get().is_some())
}
