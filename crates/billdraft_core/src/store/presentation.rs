//! Live presentation token store.
//!
//! # Responsibility
//! - Hold the current template identifier and the full token set.
//! - Notify observers with a full snapshot after every effective change.
//!
//! # Invariants
//! - Mutators validate input before touching state.
//! - Writing a value equal to the current one is a no-op: no write, no
//!   notification. The sync bridge relies on this to stop echo loops.

use crate::model::presentation::{
    PresentationError, PresentationState, PresentationTokens, TemplateId, TokenPatch,
};
use crate::store::observer::{Subscribers, Subscription};
use crate::store::turn::TurnScheduler;
use log::{debug, trace};
use std::cell::RefCell;
use std::rc::Rc;

struct PresentationInner {
    state: RefCell<PresentationState>,
    subscribers: Subscribers<PresentationState>,
    scheduler: TurnScheduler,
}

/// Shared handle to the live presentation state.
#[derive(Clone)]
pub struct PresentationStore {
    inner: Rc<PresentationInner>,
}

impl PresentationStore {
    /// Creates a store holding the default template and tokens.
    pub fn new(scheduler: TurnScheduler) -> Self {
        Self::with_state(PresentationState::default(), scheduler)
    }

    pub fn with_state(state: PresentationState, scheduler: TurnScheduler) -> Self {
        Self {
            inner: Rc::new(PresentationInner {
                state: RefCell::new(state),
                subscribers: Subscribers::new(),
                scheduler,
            }),
        }
    }

    pub fn snapshot(&self) -> PresentationState {
        self.inner.state.borrow().clone()
    }

    pub fn template(&self) -> TemplateId {
        self.inner.state.borrow().template.clone()
    }

    pub fn tokens(&self) -> PresentationTokens {
        self.inner.state.borrow().tokens.clone()
    }

    /// Replaces the template identifier.
    ///
    /// Returns `Ok(false)` without notifying when `template` is current.
    ///
    /// # Errors
    /// - `BlankTemplate` for an empty identifier.
    pub fn set_template(&self, template: TemplateId) -> Result<bool, PresentationError> {
        template.validate()?;
        Ok(self.commit("template", |state| {
            if state.template == template {
                return false;
            }
            state.template = template;
            true
        }))
    }

    /// Merges `patch` into the current tokens.
    ///
    /// Returns `Ok(false)` without notifying when the merged set equals the
    /// current one (including an empty patch).
    ///
    /// # Errors
    /// - Any `PresentationError` from validating the set keys; nothing is
    ///   merged in that case.
    pub fn merge_tokens(&self, patch: &TokenPatch) -> Result<bool, PresentationError> {
        patch.validate()?;
        Ok(self.commit("tokens", |state| {
            let merged = patch.apply_to(&state.tokens);
            if merged == state.tokens {
                return false;
            }
            state.tokens = merged;
            true
        }))
    }

    /// Restores default tokens, keeping the template.
    pub fn reset_tokens(&self) -> bool {
        self.commit("tokens_reset", |state| {
            let defaults = PresentationTokens::default();
            if state.tokens == defaults {
                return false;
            }
            state.tokens = defaults;
            true
        })
    }

    /// Observes every effective change with the resulting snapshot.
    pub fn subscribe(&self, callback: impl Fn(&PresentationState) + 'static) -> Subscription {
        self.inner.subscribers.subscribe(callback)
    }

    fn commit(
        &self,
        change: &'static str,
        mutate: impl FnOnce(&mut PresentationState) -> bool,
    ) -> bool {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            if !mutate(&mut state) {
                trace!("event=presentation_unchanged module=store change={change} status=skip");
                return false;
            }
            state.clone()
        };

        self.inner.scheduler.run(|| {
            let notified = self.inner.subscribers.notify(&snapshot);
            debug!(
                "event=presentation_changed module=store change={change} observers={notified} status=ok"
            );
        });
        true
    }
}
