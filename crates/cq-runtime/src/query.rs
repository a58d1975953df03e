#![forbid(unsafe_code)]

//! Reactive container-query coordinator.
//!
//! A [`ContainerQuery`] owns a breakpoint table, a state cell holding the
//! active breakpoint and the exposed dimensions, and a
//! [`SizeObserverAdapter`] feeding it canonical sizes. Every accepted size is
//! resolved against the installed table inside the notification callback and
//! written to the cell, which notifies the host.
//!
//! # Render and commit
//!
//! The host calls [`render`](ContainerQuery::render) on every render pass.
//! The table is rebuilt only when the `Rc<BreakpointSpec>` changes; a new
//! table or dimension policy is installed by an effect queued on the
//! [`EffectHost`], so nothing observable changes until the host commits.
//!
//! # Dimension policy
//!
//! With `ignore_dimensions` off, every accepted size replaces the exposed
//! dimensions together with the resolved name. With it on, the state is only
//! written when the name changes and the exposed dimensions are carried over
//! unchanged, so `width()` and `height()` keep their initial zero.
//!
//! # Invariants
//!
//! | # | Invariant |
//! |---|-----------|
//! | 1 | `active` is always a name in the installed table. |
//! | 2 | Identical consecutive reports cause at most one state write. |
//! | 3 | Nothing reaches the state cell after teardown. |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use cq_core::{Dimensions, ElementHandle, ObservedDimensions};
use cq_layout::{BreakpointError, BreakpointSpec, RangeTable, RangeTableMemo, ValidationMode};
use tracing::{debug, trace};

use crate::adapter::SizeObserverAdapter;
use crate::config::RuntimeConfig;
use crate::effect::{EffectError, EffectHost, EffectTiming};
use crate::reactive::{Observable, StateCell, Subscription};
use crate::source::SourceFactory;

// ───────────────────────────────────────────────────────────────────────────
// State and options
// ───────────────────────────────────────────────────────────────────────────

/// What a container query exposes to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub active: Rc<str>,
    pub dimensions: Dimensions,
}

impl QueryState {
    /// First declared breakpoint, zero dimensions.
    #[must_use]
    pub fn initial(table: &RangeTable) -> Self {
        Self {
            active: Rc::clone(table.first_name()),
            dimensions: Dimensions::ZERO,
        }
    }
}

/// Per-render configuration.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Compared by `Rc` identity between renders.
    pub breakpoints: Rc<BreakpointSpec>,
    pub ignore_dimensions: bool,
    pub validation: ValidationMode,
}

impl QueryOptions {
    #[must_use]
    pub fn new(breakpoints: impl Into<Rc<BreakpointSpec>>) -> Self {
        Self {
            breakpoints: breakpoints.into(),
            ignore_dimensions: false,
            validation: ValidationMode::Off,
        }
    }

    /// Options seeded from process-wide defaults.
    #[must_use]
    pub fn from_config(breakpoints: impl Into<Rc<BreakpointSpec>>, config: &RuntimeConfig) -> Self {
        Self {
            breakpoints: breakpoints.into(),
            ignore_dimensions: config.ignore_dimensions,
            validation: config.validation,
        }
    }

    #[must_use]
    pub fn with_ignore_dimensions(mut self, ignore: bool) -> Self {
        self.ignore_dimensions = ignore;
        self
    }

    #[must_use]
    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }
}

// ───────────────────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────────────────

/// Why a container query could not be created or re-rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    Breakpoints(BreakpointError),
    Effect(EffectError),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Breakpoints(e) => write!(f, "breakpoint configuration rejected: {e}"),
            Self::Effect(e) => write!(f, "could not schedule policy update: {e}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Breakpoints(e) => Some(e),
            Self::Effect(e) => Some(e),
        }
    }
}

impl From<BreakpointError> for QueryError {
    fn from(e: BreakpointError) -> Self {
        Self::Breakpoints(e)
    }
}

impl From<EffectError> for QueryError {
    fn from(e: EffectError) -> Self {
        Self::Effect(e)
    }
}

// ───────────────────────────────────────────────────────────────────────────
// Ref callback
// ───────────────────────────────────────────────────────────────────────────

/// Cloneable ref callback the host calls with the mounted element, or with
/// `None` when it unmounts.
///
/// Holds only a weak link to its owner; calls after the owner is gone do
/// nothing.
pub struct AssignRef<T> {
    attach: Rc<dyn Fn(Option<T>)>,
}

impl<T> Clone for AssignRef<T> {
    fn clone(&self) -> Self {
        Self {
            attach: Rc::clone(&self.attach),
        }
    }
}

impl<T> fmt::Debug for AssignRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssignRef").finish_non_exhaustive()
    }
}

impl<T: ElementHandle> AssignRef<T> {
    pub(crate) fn from_weak<F>(adapter: Weak<SizeObserverAdapter<T, F>>) -> Self
    where
        F: SourceFactory<T> + 'static,
    {
        Self {
            attach: Rc::new(move |target| match adapter.upgrade() {
                Some(adapter) => adapter.attach(target),
                None => trace!("ref assigned after owner was dropped"),
            }),
        }
    }

    pub fn call(&self, target: Option<T>) {
        (self.attach)(target);
    }
}

// ───────────────────────────────────────────────────────────────────────────
// Coordinator
// ───────────────────────────────────────────────────────────────────────────

struct Policy {
    table: Rc<RangeTable>,
    ignore_dimensions: bool,
}

/// Options behind the last policy handed to the effect host.
struct Requested {
    breakpoints: Rc<BreakpointSpec>,
    ignore_dimensions: bool,
    validation: ValidationMode,
}

impl Requested {
    fn new(options: &QueryOptions) -> Self {
        Self {
            breakpoints: Rc::clone(&options.breakpoints),
            ignore_dimensions: options.ignore_dimensions,
            validation: options.validation,
        }
    }

    fn matches(&self, options: &QueryOptions) -> bool {
        Rc::ptr_eq(&self.breakpoints, &options.breakpoints)
            && self.ignore_dimensions == options.ignore_dimensions
            && self.validation == options.validation
    }
}

/// Tracks an element's width against named breakpoints.
pub struct ContainerQuery<T: ElementHandle, F: SourceFactory<T>, S = Observable<QueryState>> {
    adapter: Rc<SizeObserverAdapter<T, F>>,
    cell: S,
    policy: Rc<RefCell<Policy>>,
    memo: RangeTableMemo,
    requested: Requested,
    host: EffectHost,
    timing: EffectTiming,
}

impl<T: ElementHandle, F: SourceFactory<T> + 'static> ContainerQuery<T, F> {
    /// Coordinator backed by a built-in [`Observable`].
    ///
    /// # Errors
    ///
    /// [`QueryError::Breakpoints`] when the configuration is empty,
    /// contradictory, or fails `options.validation`.
    pub fn new(options: &QueryOptions, factory: F, host: EffectHost) -> Result<Self, QueryError> {
        Self::with_state(options, factory, host, Observable::new)
    }
}

impl<T, F, S> ContainerQuery<T, F, S>
where
    T: ElementHandle,
    F: SourceFactory<T> + 'static,
    S: StateCell<QueryState> + Clone + 'static,
{
    /// Coordinator backed by a host-provided state cell, built from the
    /// initial state by `make_cell`.
    ///
    /// # Errors
    ///
    /// Same as [`ContainerQuery::new`].
    pub fn with_state(
        options: &QueryOptions,
        factory: F,
        host: EffectHost,
        make_cell: impl FnOnce(QueryState) -> S,
    ) -> Result<Self, QueryError> {
        let mut memo = RangeTableMemo::new();
        let table = memo.get_or_build(&options.breakpoints)?;
        options.validation.check(&table)?;

        let initial = QueryState::initial(&table);
        debug!(
            breakpoints = table.len(),
            active = %initial.active,
            ignore_dimensions = options.ignore_dimensions,
            "container query created"
        );
        let cell = make_cell(initial);
        let policy = Rc::new(RefCell::new(Policy {
            table: Rc::clone(&table),
            ignore_dimensions: options.ignore_dimensions,
        }));

        let sink = {
            let cell = cell.clone();
            let policy = Rc::clone(&policy);
            move |dims: Dimensions| apply_report(&cell, &policy, dims)
        };
        let adapter = Rc::new(SizeObserverAdapter::new(factory, sink));

        Ok(Self {
            adapter,
            cell,
            policy,
            memo,
            requested: Requested::new(options),
            timing: EffectTiming::for_environment(host.environment()),
            host,
        })
    }

    /// Queue policy updates at `timing` instead of the host's preferred one.
    #[must_use]
    pub fn with_effect_timing(mut self, timing: EffectTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Render-pass hook. Returns whether a policy update was queued.
    ///
    /// # Errors
    ///
    /// [`QueryError::Breakpoints`] for a rejected configuration (the
    /// installed policy stays in place) and [`QueryError::Effect`] when the
    /// update cannot be queued at the configured timing.
    pub fn render(&mut self, options: &QueryOptions) -> Result<bool, QueryError> {
        if self.requested.matches(options) {
            return Ok(false);
        }
        let table = self.memo.get_or_build(&options.breakpoints)?;
        options.validation.check(&table)?;

        let policy = Rc::clone(&self.policy);
        let cell = self.cell.clone();
        let adapter = Rc::downgrade(&self.adapter);
        let ignore = options.ignore_dimensions;
        self.host.schedule(self.timing, move || {
            let Some(adapter) = adapter.upgrade() else {
                return;
            };
            if adapter.is_torn_down() {
                trace!("policy update after teardown dropped");
                return;
            }
            install(&policy, &cell, table, ignore, adapter.observed());
        })?;
        trace!(timing = %self.timing, "policy update queued");
        self.requested = Requested::new(options);
        Ok(true)
    }

    /// Ref callback for the observed element.
    #[must_use]
    pub fn assign_ref(&self) -> AssignRef<T> {
        AssignRef::from_weak(Rc::downgrade(&self.adapter))
    }

    #[must_use]
    pub fn state(&self) -> QueryState {
        self.cell.get()
    }

    /// Active breakpoint name.
    #[must_use]
    pub fn active(&self) -> Rc<str> {
        self.cell.get().active
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.cell.get().dimensions.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.cell.get().dimensions.height
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.cell.get().dimensions
    }

    /// Last size accepted from the source, regardless of dimension policy.
    #[must_use]
    pub fn observed(&self) -> ObservedDimensions {
        self.adapter.observed()
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.adapter.is_observing()
    }

    /// Installed table.
    #[must_use]
    pub fn table(&self) -> Rc<RangeTable> {
        Rc::clone(&self.policy.borrow().table)
    }

    #[must_use]
    pub fn state_cell(&self) -> &S {
        &self.cell
    }

    /// Re-render hook: `callback` runs after every state change.
    pub fn subscribe(&self, callback: impl Fn(&QueryState) + 'static) -> Subscription {
        self.cell.subscribe(Box::new(callback))
    }

    /// Stop observing for good. Idempotent; also runs on drop.
    pub fn teardown(&self) {
        self.adapter.teardown();
    }
}

impl<T: ElementHandle, F: SourceFactory<T>, S> Drop for ContainerQuery<T, F, S> {
    fn drop(&mut self) {
        self.adapter.teardown();
    }
}

impl<T: ElementHandle, F: SourceFactory<T>, S: fmt::Debug> fmt::Debug for ContainerQuery<T, F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerQuery")
            .field("adapter", &self.adapter)
            .field("cell", &self.cell)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

fn apply_report<S: StateCell<QueryState>>(cell: &S, policy: &RefCell<Policy>, dims: Dimensions) {
    let (table, ignore_dimensions) = {
        let policy = policy.borrow();
        (Rc::clone(&policy.table), policy.ignore_dimensions)
    };
    let current = cell.get();
    let active = table.resolve_dimensions(&current.active, dims);
    let changed = active != current.active;
    if changed {
        debug!(from = %current.active, to = %active, width = dims.width, "breakpoint changed");
    }

    if ignore_dimensions {
        if changed {
            cell.set(QueryState {
                active,
                dimensions: current.dimensions,
            });
        }
    } else {
        cell.set(QueryState {
            active,
            dimensions: dims,
        });
    }
}

fn install<S: StateCell<QueryState>>(
    policy: &RefCell<Policy>,
    cell: &S,
    table: Rc<RangeTable>,
    ignore_dimensions: bool,
    observed: ObservedDimensions,
) {
    {
        let mut policy = policy.borrow_mut();
        policy.table = Rc::clone(&table);
        policy.ignore_dimensions = ignore_dimensions;
    }
    debug!(breakpoints = table.len(), ignore_dimensions, "breakpoint policy installed");

    let current = cell.get();
    if table.contains_name(&current.active) {
        return;
    }
    let width = observed.width.unwrap_or(current.dimensions.width);
    let active = table.resolve_shared(table.first_name(), width);
    debug!(from = %current.active, to = %active, width, "active breakpoint re-resolved");
    cell.update(&mut |state| state.active = Rc::clone(&active));
}
