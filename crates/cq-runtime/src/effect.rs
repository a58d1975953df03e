#![forbid(unsafe_code)]

//! Commit-phase effects.
//!
//! A render pass must not mutate coordinator state. Work that follows from a
//! render (installing a rebuilt breakpoint table, switching the dimension
//! policy) is queued on an [`EffectHost`] and runs when the host commits.
//!
//! Hosts with a layout phase (a DOM, a terminal that measures before paint)
//! run [`EffectTiming::Layout`] effects synchronously after layout and before
//! paint. Headless hosts (server rendering, tests without a layout pass) only
//! have [`EffectTiming::Passive`]; scheduling a layout effect there is an
//! error rather than a silent downgrade, so callers pick the timing with
//! [`EffectTiming::for_environment`].
//!
//! # Invariants
//!
//! | # | Invariant |
//! |---|-----------|
//! | 1 | `commit()` runs every queued layout effect before any passive effect. |
//! | 2 | Within one timing, effects run in scheduling order. |
//! | 3 | Effects scheduled during a commit run in that same commit. |
//! | 4 | No internal borrow is held while an effect runs. |

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::config::RuntimeConfig;

/// Boxed deferred work.
pub type Effect = Box<dyn FnOnce()>;

/// Deferred cleanup returned by an [`EffectSlot`] body.
pub type Cleanup = Box<dyn FnOnce()>;

/// When, relative to paint, an effect runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectTiming {
    /// After layout, before paint.
    Layout,
    /// After paint.
    Passive,
}

impl EffectTiming {
    /// `Layout` when the host has a layout phase, `Passive` otherwise.
    #[must_use]
    pub const fn for_environment(env: HostEnvironment) -> Self {
        if env.layout_phase {
            Self::Layout
        } else {
            Self::Passive
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Passive => "passive",
        }
    }
}

impl fmt::Display for EffectTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host can do at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostEnvironment {
    /// Whether the host runs a layout phase before paint.
    pub layout_phase: bool,
}

impl HostEnvironment {
    /// Interactive host with a layout phase.
    #[must_use]
    pub const fn dom() -> Self {
        Self { layout_phase: true }
    }

    /// Host without layout (server rendering, headless tests).
    #[must_use]
    pub const fn headless() -> Self {
        Self {
            layout_phase: false,
        }
    }

    /// Environment from `CQ_HOST_LAYOUT_PHASE`, defaulting to [`dom`](Self::dom).
    #[must_use]
    pub fn from_env() -> Self {
        RuntimeConfig::from_env().host
    }

    /// Timing callers should use for work that must precede paint.
    #[must_use]
    pub const fn preferred_timing(self) -> EffectTiming {
        EffectTiming::for_environment(self)
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::dom()
    }
}

/// Scheduling failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectError {
    /// A layout effect was scheduled on a host without a layout phase.
    LayoutPhaseUnavailable,
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayoutPhaseUnavailable => {
                write!(f, "layout effect scheduled on a host without a layout phase")
            }
        }
    }
}

impl std::error::Error for EffectError {}

#[derive(Default)]
struct Queues {
    layout: VecDeque<Effect>,
    passive: VecDeque<Effect>,
}

/// Single-threaded commit queue. Clones share one queue.
#[derive(Clone)]
pub struct EffectHost {
    env: HostEnvironment,
    queues: Rc<RefCell<Queues>>,
}

impl fmt::Debug for EffectHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queues = self.queues.borrow();
        f.debug_struct("EffectHost")
            .field("env", &self.env)
            .field("pending_layout", &queues.layout.len())
            .field("pending_passive", &queues.passive.len())
            .finish()
    }
}

impl Default for EffectHost {
    fn default() -> Self {
        Self::new(HostEnvironment::default())
    }
}

impl EffectHost {
    #[must_use]
    pub fn new(env: HostEnvironment) -> Self {
        Self {
            env,
            queues: Rc::new(RefCell::new(Queues::default())),
        }
    }

    #[must_use]
    pub fn environment(&self) -> HostEnvironment {
        self.env
    }

    /// Queue `effect` for the next commit.
    ///
    /// # Errors
    ///
    /// [`EffectError::LayoutPhaseUnavailable`] when `timing` is
    /// [`EffectTiming::Layout`] and the host is headless.
    pub fn schedule(
        &self,
        timing: EffectTiming,
        effect: impl FnOnce() + 'static,
    ) -> Result<(), EffectError> {
        let mut queues = self.queues.borrow_mut();
        match timing {
            EffectTiming::Layout if !self.env.layout_phase => {
                return Err(EffectError::LayoutPhaseUnavailable);
            }
            EffectTiming::Layout => queues.layout.push_back(Box::new(effect)),
            EffectTiming::Passive => queues.passive.push_back(Box::new(effect)),
        }
        Ok(())
    }

    /// Queue `effect` at the host's preferred timing. Never fails.
    pub fn schedule_preferred(&self, effect: impl FnOnce() + 'static) {
        let timing = self.env.preferred_timing();
        let mut queues = self.queues.borrow_mut();
        match timing {
            EffectTiming::Layout => queues.layout.push_back(Box::new(effect)),
            EffectTiming::Passive => queues.passive.push_back(Box::new(effect)),
        }
    }

    /// Run every pending effect. Returns how many ran.
    pub fn commit(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = {
                let mut queues = self.queues.borrow_mut();
                match queues.layout.pop_front() {
                    Some(effect) => Some(effect),
                    None => queues.passive.pop_front(),
                }
            };
            let Some(effect) = next else { break };
            effect();
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "commit flushed effects");
        }
        ran
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        let queues = self.queues.borrow();
        queues.layout.len() + queues.passive.len()
    }

    #[must_use]
    pub fn pending_for(&self, timing: EffectTiming) -> usize {
        let queues = self.queues.borrow();
        match timing {
            EffectTiming::Layout => queues.layout.len(),
            EffectTiming::Passive => queues.passive.len(),
        }
    }
}

/// Dependency-keyed effect with cleanup.
///
/// [`run`](Self::run) executes the body only when `deps` differ from the
/// last run. The previous cleanup runs first. [`dispose`](Self::dispose)
/// (or drop) runs the outstanding cleanup once.
pub struct EffectSlot<D> {
    deps: Option<D>,
    cleanup: Option<Cleanup>,
    runs: u64,
}

impl<D: fmt::Debug> fmt::Debug for EffectSlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectSlot")
            .field("deps", &self.deps)
            .field("has_cleanup", &self.cleanup.is_some())
            .field("runs", &self.runs)
            .finish()
    }
}

impl<D> Default for EffectSlot<D> {
    fn default() -> Self {
        Self {
            deps: None,
            cleanup: None,
            runs: 0,
        }
    }
}

impl<D: PartialEq> EffectSlot<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `body` if `deps` changed. Returns whether it ran.
    pub fn run(&mut self, deps: D, body: impl FnOnce(&D) -> Option<Cleanup>) -> bool {
        if self.deps.as_ref() == Some(&deps) {
            return false;
        }
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
        self.cleanup = body(&deps);
        self.deps = Some(deps);
        self.runs += 1;
        true
    }

    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Run the outstanding cleanup and forget the dependencies.
    pub fn dispose(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
        self.deps = None;
    }
}

impl<D> Drop for EffectSlot<D> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn log() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn timing_follows_environment() {
        assert_eq!(
            EffectTiming::for_environment(HostEnvironment::dom()),
            EffectTiming::Layout
        );
        assert_eq!(
            EffectTiming::for_environment(HostEnvironment::headless()),
            EffectTiming::Passive
        );
    }

    #[test]
    fn commit_runs_layout_before_passive() {
        let host = EffectHost::new(HostEnvironment::dom());
        let order = log();
        for (timing, tag) in [
            (EffectTiming::Passive, "p1"),
            (EffectTiming::Layout, "l1"),
            (EffectTiming::Passive, "p2"),
            (EffectTiming::Layout, "l2"),
        ] {
            let order = Rc::clone(&order);
            host.schedule(timing, move || order.borrow_mut().push(tag))
                .unwrap();
        }
        assert_eq!(host.pending(), 4);
        assert_eq!(host.commit(), 4);
        assert_eq!(*order.borrow(), vec!["l1", "l2", "p1", "p2"]);
        assert_eq!(host.pending(), 0);
    }

    #[test]
    fn headless_host_rejects_layout_effects() {
        let host = EffectHost::new(HostEnvironment::headless());
        assert_eq!(
            host.schedule(EffectTiming::Layout, || {}),
            Err(EffectError::LayoutPhaseUnavailable)
        );
        assert_eq!(host.pending(), 0);
        host.schedule_preferred(|| {});
        assert_eq!(host.pending_for(EffectTiming::Passive), 1);
    }

    #[test]
    fn effects_scheduled_during_commit_run_in_same_commit() {
        let host = EffectHost::default();
        let order = log();
        let inner_host = host.clone();
        let outer = Rc::clone(&order);
        host.schedule(EffectTiming::Passive, move || {
            outer.borrow_mut().push("outer");
            let nested = Rc::clone(&outer);
            inner_host
                .schedule(EffectTiming::Layout, move || nested.borrow_mut().push("nested"))
                .unwrap();
        })
        .unwrap();
        assert_eq!(host.commit(), 2);
        assert_eq!(*order.borrow(), vec!["outer", "nested"]);
    }

    #[test]
    fn slot_runs_once_per_dependency_change() {
        let cleanups = Rc::new(Cell::new(0));
        let mut slot = EffectSlot::new();
        let make = |c: &Rc<Cell<u32>>| {
            let c = Rc::clone(c);
            move |_: &u32| -> Option<Cleanup> { Some(Box::new(move || c.set(c.get() + 1))) }
        };

        assert!(slot.run(1, make(&cleanups)));
        assert!(!slot.run(1, make(&cleanups)));
        assert_eq!(cleanups.get(), 0);
        assert!(slot.run(2, make(&cleanups)));
        assert_eq!(cleanups.get(), 1);
        assert_eq!(slot.runs(), 2);

        slot.dispose();
        assert_eq!(cleanups.get(), 2);
        drop(slot);
        assert_eq!(cleanups.get(), 2);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            EffectError::LayoutPhaseUnavailable.to_string(),
            "layout effect scheduled on a host without a layout phase"
        );
    }
}
