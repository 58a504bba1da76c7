//! Turn scheduler.
//!
//! A turn is one outermost store mutation plus every synchronous observer
//! callback it triggers, including nested mutations. Work handed to
//! [`TurnScheduler::defer`] runs once the outermost turn ends, in FIFO
//! order, before control returns to the caller that started the turn.
//!
//! # Invariants
//! - Deferred work never runs ahead of synchronous observers of the same
//!   mutation.
//! - Deferred work never outlives the turn that queued it.

use log::trace;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct TurnState {
    depth: Cell<usize>,
    deferred: RefCell<VecDeque<Task>>,
}

/// Shared handle to the single-threaded turn queue.
#[derive(Clone, Default)]
pub struct TurnScheduler {
    inner: Rc<TurnState>,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` as (part of) a turn.
    ///
    /// When this call closes the outermost turn, every deferred task is
    /// drained before returning.
    pub fn run<R>(&self, work: impl FnOnce() -> R) -> R {
        let output = {
            let _turn = TurnGuard::enter(&self.inner);
            work()
        };
        if self.inner.depth.get() == 0 {
            self.drain();
        }
        output
    }

    /// Queues `task` for the end of the current turn.
    ///
    /// Outside a turn there is no pending synchronous work, so the task runs
    /// immediately.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        if self.inner.depth.get() == 0 {
            task();
            return;
        }
        self.inner.deferred.borrow_mut().push_back(Box::new(task));
    }

    /// Returns whether a turn is in progress.
    pub fn in_turn(&self) -> bool {
        self.inner.depth.get() > 0
    }

    /// Number of tasks waiting for the current turn to end.
    pub fn pending(&self) -> usize {
        self.inner.deferred.borrow().len()
    }

    fn drain(&self) {
        let mut drained = 0_usize;
        loop {
            // Borrow ends before the task runs; tasks may defer more work.
            let next = self.inner.deferred.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    task();
                    drained += 1;
                }
                None => break,
            }
        }
        if drained > 0 {
            trace!("event=turn_drained module=store tasks={drained} status=ok");
        }
    }
}

struct TurnGuard<'a> {
    state: &'a TurnState,
}

impl<'a> TurnGuard<'a> {
    fn enter(state: &'a TurnState) -> Self {
        state.depth.set(state.depth.get() + 1);
        Self { state }
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.state.depth.set(self.state.depth.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::TurnScheduler;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn deferred_work_runs_after_nested_turns_finish() {
        let scheduler = TurnScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let outer_log = Rc::clone(&log);
        let inner_scheduler = scheduler.clone();
        scheduler.run(|| {
            let deferred_log = Rc::clone(&outer_log);
            inner_scheduler.defer(move || deferred_log.borrow_mut().push("deferred"));
            inner_scheduler.run(|| outer_log.borrow_mut().push("nested"));
            outer_log.borrow_mut().push("outer");
            assert_eq!(inner_scheduler.pending(), 1);
        });

        assert_eq!(*log.borrow(), vec!["nested", "outer", "deferred"]);
        assert!(!scheduler.in_turn());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn defer_outside_turn_runs_immediately() {
        let scheduler = TurnScheduler::new();
        let ran = Rc::new(RefCell::new(false));

        let flag = Rc::clone(&ran);
        scheduler.defer(move || *flag.borrow_mut() = true);

        assert!(*ran.borrow());
    }

    #[test]
    fn run_returns_work_output() {
        let scheduler = TurnScheduler::new();
        assert_eq!(scheduler.run(|| 41 + 1), 42);
    }
}
