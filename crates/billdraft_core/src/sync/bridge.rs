//! Bidirectional presentation bridge.
//!
//! Two loop breakers work together:
//! 1. A directional guard: while a profile override is being applied the
//!    persist path returns at once. The guard is released by a task deferred
//!    to the end of the current turn, after every synchronous observer of
//!    the apply has run.
//! 2. Equality short-circuits in the store mutators: re-writing a held value
//!    emits nothing, so a would-be loop dies after one no-op round trip.
//!
//! Guard transitions: `Idle -> Applying` when an apply starts,
//! `Applying -> Idle` when its turn ends. There are no others.
//!
//! After every profile change the live snapshot is also embedded into the
//! document, so a persisted document always carries the look it shows.

use crate::model::presentation::{PresentationOverride, PresentationState};
use crate::model::profile::{Profile, ProfileId};
use crate::store::document::{DocumentChange, DocumentStore};
use crate::store::observer::Subscription;
use crate::store::presentation::PresentationStore;
use crate::store::turn::TurnScheduler;
use log::{debug, info, trace, warn};
use std::cell::Cell;
use std::rc::Rc;

/// Reentrancy guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    Applying,
}

/// Wiring between the document store and the presentation store.
///
/// Runs passively once connected; drop it to disconnect both directions.
pub struct PresentationBridge {
    guard: Rc<Cell<GuardState>>,
    _profile_subscription: Subscription,
    _token_subscription: Subscription,
}

impl PresentationBridge {
    /// Wires both directions and applies the currently active profile.
    pub fn connect(
        documents: &DocumentStore,
        presentation: &PresentationStore,
        scheduler: &TurnScheduler,
    ) -> Self {
        let guard = Rc::new(Cell::new(GuardState::Idle));
        let link = Rc::new(BridgeLink {
            documents: documents.clone(),
            presentation: presentation.clone(),
            scheduler: scheduler.clone(),
            guard: Rc::clone(&guard),
        });

        let apply_link = Rc::clone(&link);
        let profile_subscription = documents.subscribe(move |change| {
            if let DocumentChange::ActiveProfile { current, .. } = change {
                apply_link.apply_profile(*current);
            }
        });

        let persist_link = Rc::clone(&link);
        let token_subscription = presentation.subscribe(move |state| persist_link.persist(state));

        link.apply_profile(documents.active_profile_id());
        info!("event=bridge_connected module=sync status=ok");

        Self {
            guard,
            _profile_subscription: profile_subscription,
            _token_subscription: token_subscription,
        }
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard.get()
    }

    pub fn is_applying(&self) -> bool {
        self.guard.get() == GuardState::Applying
    }
}

struct BridgeLink {
    documents: DocumentStore,
    presentation: PresentationStore,
    scheduler: TurnScheduler,
    guard: Rc<Cell<GuardState>>,
}

impl BridgeLink {
    /// Profile -> tokens, then tokens -> document.
    fn apply_profile(&self, profile_id: Option<ProfileId>) {
        let Some(profile) = profile_id.and_then(|id| self.documents.profile(id)) else {
            debug!("event=profile_apply module=sync status=skip reason=no_profile");
            return;
        };

        self.apply_saved(&profile);
        self.embed_live(profile.id);
    }

    fn apply_saved(&self, profile: &Profile) {
        let saved = &profile.presentation;
        if saved.is_empty() {
            debug!(
                "event=profile_apply module=sync profile_id={} status=skip reason=empty",
                profile.id
            );
            return;
        }
        if saved.matches(&self.presentation.snapshot()) {
            debug!(
                "event=profile_apply module=sync profile_id={} status=skip reason=unchanged",
                profile.id
            );
            return;
        }
        if let Err(err) = saved.validate() {
            warn!(
                "event=profile_apply module=sync profile_id={} status=error error={err}",
                profile.id
            );
            return;
        }

        self.scheduler.run(|| {
            self.guard.set(GuardState::Applying);
            let guard = Rc::clone(&self.guard);
            self.scheduler.defer(move || guard.set(GuardState::Idle));

            if let Some(template) = saved.template.clone() {
                if let Err(err) = self.presentation.set_template(template) {
                    warn!(
                        "event=profile_apply module=sync profile_id={} field=template status=error error={err}",
                        profile.id
                    );
                }
            }
            if let Err(err) = self.presentation.merge_tokens(&saved.tokens) {
                warn!(
                    "event=profile_apply module=sync profile_id={} field=tokens status=error error={err}",
                    profile.id
                );
            }
        });

        info!(
            "event=profile_apply module=sync profile_id={} keys={} status=ok",
            profile.id,
            saved.tokens.len()
        );
    }

    /// Embedded document override <- live snapshot. Profiles are not written.
    fn embed_live(&self, profile_id: ProfileId) {
        let live = PresentationOverride::from_state(&self.presentation.snapshot());
        match self.documents.embed_presentation(live) {
            Ok(true) => debug!(
                "event=presentation_embed module=sync profile_id={profile_id} status=ok"
            ),
            Ok(false) => trace!(
                "event=presentation_embed module=sync profile_id={profile_id} status=skip reason=unchanged"
            ),
            Err(err) => warn!(
                "event=presentation_embed module=sync profile_id={profile_id} status=error error={err}"
            ),
        }
    }

    /// Tokens -> profile.
    fn persist(&self, state: &PresentationState) {
        if self.guard.get() == GuardState::Applying {
            trace!("event=presentation_persist module=sync status=skip reason=applying");
            return;
        }
        let Some(profile) = self.documents.active_profile() else {
            debug!("event=presentation_persist module=sync status=skip reason=no_profile");
            return;
        };
        if profile.presentation.matches(state) {
            trace!(
                "event=presentation_persist module=sync profile_id={} status=skip reason=unchanged",
                profile.id
            );
            return;
        }

        match self
            .documents
            .save_presentation(profile.id, PresentationOverride::from_state(state))
        {
            Ok(_) => debug!(
                "event=presentation_persist module=sync profile_id={} status=ok",
                profile.id
            ),
            Err(err) => warn!(
                "event=presentation_persist module=sync profile_id={} status=error error={err}",
                profile.id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GuardState, PresentationBridge};
    use crate::code_generator::SequentialCodeGenerator;
    use crate::model::document::{Document, DocumentKind};
    use crate::model::presentation::{PresentationOverride, TemplateId, TokenPatch};
    use crate::model::profile::Profile;
    use crate::store::document::DocumentStore;
    use crate::store::presentation::PresentationStore;
    use crate::store::turn::TurnScheduler;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn guard_is_applying_during_apply_and_idle_after() {
        let scheduler = TurnScheduler::new();
        let first = Profile::new("First", "EUR", "es-ES");
        let second = Profile::new("Second", "EUR", "es-ES").with_presentation(
            PresentationOverride {
                template: Some(TemplateId::new("modern")),
                tokens: TokenPatch::default(),
            },
        );
        let mut document = Document::new(DocumentKind::Invoice, "INV-0001", 0);
        document.profile_id = Some(first.id);
        let documents = DocumentStore::new(
            document,
            vec![first, second.clone()],
            Box::new(SequentialCodeGenerator::new()),
            scheduler.clone(),
        )
        .expect("store should build");
        let presentation = PresentationStore::new(scheduler.clone());
        let bridge = Rc::new(PresentationBridge::connect(
            &documents,
            &presentation,
            &scheduler,
        ));

        let observed = Rc::new(Cell::new(None));
        let probe = Rc::clone(&observed);
        let probe_bridge = Rc::clone(&bridge);
        let _sub = presentation.subscribe(move |_| probe.set(Some(probe_bridge.guard_state())));

        documents
            .select_profile(second.id)
            .expect("profile should select");

        assert_eq!(observed.get(), Some(GuardState::Applying));
        assert_eq!(bridge.guard_state(), GuardState::Idle);
        assert_eq!(presentation.template(), TemplateId::new("modern"));
    }
}
