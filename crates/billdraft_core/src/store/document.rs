//! Document store.
//!
//! # Responsibility
//! - Own the document under edit, the sender profiles and the code
//!   generator for the session.
//! - Expose field, line-item and profile mutators that notify observers.
//! - Serve totals and visible footer blocks computed from current state.
//!
//! # Invariants
//! - `totals()` always recomputes from the latest document; nothing is
//!   cached, so there is no staleness window.
//! - Profile IDs are unique; the document's `profile_id`, when set, names
//!   a known profile.
//! - Only `save_presentation` writes saved presentation overrides.

use crate::calc::footer::select_visible_footer;
use crate::calc::totals::{compute_totals, line_totals, LineTotals, TotalsResult};
use crate::code_generator::DocumentCodeGenerator;
use crate::model::document::{Document, DocumentPatch, DocumentValidationError};
use crate::model::footer::FooterBlock;
use crate::model::line_item::{LineItem, LineItemId};
use crate::model::presentation::{PresentationError, PresentationOverride};
use crate::model::profile::{Profile, ProfileId, ProfilePatch};
use crate::store::observer::{Subscribers, Subscription};
use crate::store::turn::TurnScheduler;
use log::debug;
use std::cell::RefCell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Structural misuse of document store APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    LineItemNotFound(LineItemId),
    ProfileNotFound(ProfileId),
    DuplicateProfile(ProfileId),
    InvalidDocument(DocumentValidationError),
    InvalidPresentation(PresentationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LineItemNotFound(id) => write!(f, "line item not found: {id}"),
            Self::ProfileNotFound(id) => write!(f, "profile not found: {id}"),
            Self::DuplicateProfile(id) => write!(f, "duplicate profile id: {id}"),
            Self::InvalidDocument(err) => write!(f, "{err}"),
            Self::InvalidPresentation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDocument(err) => Some(err),
            Self::InvalidPresentation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DocumentValidationError> for StoreError {
    fn from(value: DocumentValidationError) -> Self {
        Self::InvalidDocument(value)
    }
}

impl From<PresentationError> for StoreError {
    fn from(value: PresentationError) -> Self {
        Self::InvalidPresentation(value)
    }
}

/// Change notification emitted after an effective mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentChange {
    /// Scalar fields, client, footer, code or the embedded presentation
    /// changed.
    Fields,
    /// Line items were added, edited, removed or reordered.
    Items,
    /// The active profile reference changed.
    ActiveProfile {
        previous: Option<ProfileId>,
        current: Option<ProfileId>,
    },
    /// Identity fields of a profile changed, or a profile was added.
    Profile(ProfileId),
    /// A profile's saved presentation override was written.
    PresentationSaved(ProfileId),
}

impl DocumentChange {
    fn label(self) -> &'static str {
        match self {
            Self::Fields => "fields",
            Self::Items => "items",
            Self::ActiveProfile { .. } => "active_profile",
            Self::Profile(_) => "profile",
            Self::PresentationSaved(_) => "presentation_saved",
        }
    }
}

struct DocumentInner {
    document: RefCell<Document>,
    profiles: RefCell<Vec<Profile>>,
    codes: RefCell<Box<dyn DocumentCodeGenerator>>,
    subscribers: Subscribers<DocumentChange>,
    scheduler: TurnScheduler,
}

/// Shared handle to the document under edit and the sender profiles.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Rc<DocumentInner>,
}

impl DocumentStore {
    /// Creates a store over validated initial state.
    ///
    /// # Errors
    /// - `InvalidDocument` when the document fails structural validation.
    /// - `DuplicateProfile` when two profiles share an ID.
    /// - `ProfileNotFound` when `document.profile_id` names no profile.
    pub fn new(
        document: Document,
        profiles: Vec<Profile>,
        codes: Box<dyn DocumentCodeGenerator>,
        scheduler: TurnScheduler,
    ) -> StoreResult<Self> {
        document.validate()?;
        let mut seen = HashSet::with_capacity(profiles.len());
        for profile in &profiles {
            if !seen.insert(profile.id) {
                return Err(StoreError::DuplicateProfile(profile.id));
            }
        }
        if let Some(profile_id) = document.profile_id {
            if !seen.contains(&profile_id) {
                return Err(StoreError::ProfileNotFound(profile_id));
            }
        }

        Ok(Self {
            inner: Rc::new(DocumentInner {
                document: RefCell::new(document),
                profiles: RefCell::new(profiles),
                codes: RefCell::new(codes),
                subscribers: Subscribers::new(),
                scheduler,
            }),
        })
    }

    pub fn document(&self) -> Document {
        self.inner.document.borrow().clone()
    }

    /// Reads the document without cloning it.
    pub fn with_document<R>(&self, read: impl FnOnce(&Document) -> R) -> R {
        read(&*self.inner.document.borrow())
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.inner.profiles.borrow().clone()
    }

    pub fn profile(&self, id: ProfileId) -> Option<Profile> {
        self.inner
            .profiles
            .borrow()
            .iter()
            .find(|profile| profile.id == id)
            .cloned()
    }

    pub fn active_profile_id(&self) -> Option<ProfileId> {
        self.inner.document.borrow().profile_id
    }

    /// Returns the active profile, or `None` while none is selected.
    pub fn active_profile(&self) -> Option<Profile> {
        self.active_profile_id().and_then(|id| self.profile(id))
    }

    /// Totals of the current document, recomputed on every call.
    pub fn totals(&self) -> TotalsResult {
        self.with_document(compute_totals)
    }

    pub fn line_totals(&self) -> Vec<LineTotals> {
        self.with_document(line_totals)
    }

    /// Footer blocks that render for the current document kind.
    pub fn visible_footer(&self) -> Vec<FooterBlock> {
        self.with_document(|document| {
            select_visible_footer(document.kind, &document.footer)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Applies a field patch.
    ///
    /// A kind switch also replaces the code with a fresh one from the code
    /// generator. Returns whether anything changed.
    pub fn patch_document(&self, patch: &DocumentPatch) -> StoreResult<bool> {
        let changed = {
            let mut document = self.inner.document.borrow_mut();
            let previous_kind = document.kind;
            let changed = document.apply_patch(patch)?;
            if changed && document.kind != previous_kind {
                document.code = self.inner.codes.borrow_mut().next_code(document.kind);
            }
            changed
        };
        if changed {
            self.emit(DocumentChange::Fields);
        }
        Ok(changed)
    }

    /// Replaces the code with the next one from the code generator.
    ///
    /// Emits nothing when the generator hands back the current code.
    pub fn regenerate_code(&self) -> String {
        let (code, changed) = {
            let mut document = self.inner.document.borrow_mut();
            let next = self.inner.codes.borrow_mut().next_code(document.kind);
            let changed = next != document.code;
            if changed {
                document.code = next;
            }
            (document.code.clone(), changed)
        };
        if changed {
            self.emit(DocumentChange::Fields);
        }
        code
    }

    /// Appends a line item.
    ///
    /// # Errors
    /// - `InvalidDocument(DuplicateLineItem)` when the ID is already used.
    pub fn add_line_item(&self, item: LineItem) -> StoreResult<LineItemId> {
        let id = item.id;
        {
            let mut document = self.inner.document.borrow_mut();
            if document.item(id).is_some() {
                return Err(DocumentValidationError::DuplicateLineItem(id).into());
            }
            document.items.push(item);
        }
        self.emit(DocumentChange::Items);
        Ok(id)
    }

    /// Replaces the line item with the same ID, keeping its position.
    pub fn update_line_item(&self, item: &LineItem) -> StoreResult<bool> {
        {
            let mut document = self.inner.document.borrow_mut();
            let index = document
                .item_index(item.id)
                .ok_or(StoreError::LineItemNotFound(item.id))?;
            if document.items[index] == *item {
                return Ok(false);
            }
            document.items[index] = item.clone();
        }
        self.emit(DocumentChange::Items);
        Ok(true)
    }

    /// Removes and returns a line item.
    pub fn remove_line_item(&self, id: LineItemId) -> StoreResult<LineItem> {
        let removed = {
            let mut document = self.inner.document.borrow_mut();
            let index = document
                .item_index(id)
                .ok_or(StoreError::LineItemNotFound(id))?;
            document.items.remove(index)
        };
        self.emit(DocumentChange::Items);
        Ok(removed)
    }

    /// Moves a line item to `to_index` (clamped to the last position).
    pub fn move_line_item(&self, id: LineItemId, to_index: usize) -> StoreResult<bool> {
        {
            let mut document = self.inner.document.borrow_mut();
            let from = document
                .item_index(id)
                .ok_or(StoreError::LineItemNotFound(id))?;
            let to = to_index.min(document.items.len() - 1);
            if from == to {
                return Ok(false);
            }
            let item = document.items.remove(from);
            document.items.insert(to, item);
        }
        self.emit(DocumentChange::Items);
        Ok(true)
    }

    /// Makes `id` the active profile.
    ///
    /// Returns `Ok(false)` without notifying when it is already active.
    pub fn select_profile(&self, id: ProfileId) -> StoreResult<bool> {
        if self.profile(id).is_none() {
            return Err(StoreError::ProfileNotFound(id));
        }
        let previous = {
            let mut document = self.inner.document.borrow_mut();
            if document.profile_id == Some(id) {
                return Ok(false);
            }
            document.profile_id.replace(id)
        };
        self.emit(DocumentChange::ActiveProfile {
            previous,
            current: Some(id),
        });
        Ok(true)
    }

    /// Registers another sender profile.
    pub fn add_profile(&self, profile: Profile) -> StoreResult<()> {
        let id = profile.id;
        {
            let mut profiles = self.inner.profiles.borrow_mut();
            if profiles.iter().any(|existing| existing.id == id) {
                return Err(StoreError::DuplicateProfile(id));
            }
            profiles.push(profile);
        }
        self.emit(DocumentChange::Profile(id));
        Ok(())
    }

    /// Updates identity fields of a profile.
    pub fn update_profile(&self, id: ProfileId, patch: &ProfilePatch) -> StoreResult<bool> {
        let changed = {
            let mut profiles = self.inner.profiles.borrow_mut();
            let profile = profiles
                .iter_mut()
                .find(|profile| profile.id == id)
                .ok_or(StoreError::ProfileNotFound(id))?;
            profile.apply_patch(patch)
        };
        if changed {
            self.emit(DocumentChange::Profile(id));
        }
        Ok(changed)
    }

    /// Stores `presentation` as the profile's saved override.
    ///
    /// When the profile is the active one, the document's embedded override
    /// is written too. Returns `Ok(false)` without notifying when both
    /// already hold `presentation`.
    pub fn save_presentation(
        &self,
        profile_id: ProfileId,
        presentation: PresentationOverride,
    ) -> StoreResult<bool> {
        presentation.validate()?;
        let changed = {
            let mut profiles = self.inner.profiles.borrow_mut();
            let profile = profiles
                .iter_mut()
                .find(|profile| profile.id == profile_id)
                .ok_or(StoreError::ProfileNotFound(profile_id))?;
            let mut document = self.inner.document.borrow_mut();
            let embeds = document.profile_id == Some(profile_id);

            let mut changed = false;
            if profile.presentation != presentation {
                profile.presentation = presentation.clone();
                changed = true;
            }
            if embeds && document.presentation != presentation {
                document.presentation = presentation;
                changed = true;
            }
            changed
        };
        if changed {
            self.emit(DocumentChange::PresentationSaved(profile_id));
        }
        Ok(changed)
    }

    /// Records `presentation` as the document's embedded override only.
    ///
    /// Profiles are left untouched. Returns `Ok(false)` without notifying
    /// when the document already holds it.
    pub fn embed_presentation(&self, presentation: PresentationOverride) -> StoreResult<bool> {
        presentation.validate()?;
        {
            let mut document = self.inner.document.borrow_mut();
            if document.presentation == presentation {
                return Ok(false);
            }
            document.presentation = presentation;
        }
        self.emit(DocumentChange::Fields);
        Ok(true)
    }

    /// Observes every effective change.
    pub fn subscribe(&self, callback: impl Fn(&DocumentChange) + 'static) -> Subscription {
        self.inner.subscribers.subscribe(callback)
    }

    fn emit(&self, change: DocumentChange) {
        self.inner.scheduler.run(|| {
            let notified = self.inner.subscribers.notify(&change);
            debug!(
                "event=document_changed module=store change={} observers={notified} status=ok",
                change.label()
            );
        });
    }
}
