#![forbid(unsafe_code)]

//! Size observation adapter.
//!
//! Binds one consumer to at most one notification-source instance and at most
//! one observed element, and turns raw report batches into canonical
//! [`Dimensions`] for a downstream sink.
//!
//! # Lifecycle
//!
//! ```text
//!        attach(Some(el))             attach(None)
//!  Idle ────────────────▶ Observing ───────────────▶ Idle
//!   │                        │
//!   └──── teardown() ────────┴──────────▶ TornDown (terminal)
//! ```
//!
//! # Invariants
//!
//! | # | Invariant |
//! |---|-----------|
//! | 1 | At most one source instance per adapter, created on the first non-null attach. |
//! | 2 | Switching targets unobserves the old one before observing the new one. |
//! | 3 | Only entries for the current target are processed; the first one wins. |
//! | 4 | A canonical pair equal to the previous one never reaches the sink. |
//! | 5 | `disconnect` is called at most once; nothing is processed afterwards. |
//! | 6 | No borrow is held while the source runs, so a synchronous report may re-enter `attach` or `teardown`. |
//!
//! # Failure Modes
//!
//! | Situation | Behavior |
//! |-----------|----------|
//! | Disconnected element passed to `attach` | Ignored, logged at `debug`. |
//! | `attach` after teardown | Ignored, logged at `debug`. |
//! | Report after teardown or for a stale target | Dropped, logged at `trace`. |

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use cq_core::{Dimensions, ElementHandle, ObservedDimensions};
use tracing::{debug, trace};

use crate::source::{
    NotificationSource, ObserveOptions, ReportCallback, ResizeEntry, SourceFactory,
};

/// Receives each new canonical size.
pub type DimensionSink = Rc<dyn Fn(Dimensions)>;

enum SourceOp<T> {
    Unobserve(T),
    Observe(T),
    Disconnect,
}

struct Binding<T> {
    target: Option<T>,
    previous: ObservedDimensions,
    torn_down: bool,
    sink: DimensionSink,
    pending: VecDeque<SourceOp<T>>,
    driving: bool,
}

/// Adapter between a notification source and a dimension sink.
pub struct SizeObserverAdapter<T: ElementHandle, F: SourceFactory<T>> {
    factory: F,
    source: RefCell<Option<F::Source>>,
    binding: Rc<RefCell<Binding<T>>>,
}

impl<T: ElementHandle, F: SourceFactory<T>> fmt::Debug for SizeObserverAdapter<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = self.binding.borrow();
        f.debug_struct("SizeObserverAdapter")
            .field("target", &binding.target)
            .field("previous", &binding.previous)
            .field("torn_down", &binding.torn_down)
            .field("has_source", &self.source.borrow().is_some())
            .finish()
    }
}

impl<T: ElementHandle, F: SourceFactory<T>> SizeObserverAdapter<T, F> {
    /// Adapter that reports to `sink`. No source is created until the first
    /// non-null [`attach`](Self::attach).
    pub fn new(factory: F, sink: impl Fn(Dimensions) + 'static) -> Self {
        Self {
            factory,
            source: RefCell::new(None),
            binding: Rc::new(RefCell::new(Binding {
                target: None,
                previous: ObservedDimensions::UNOBSERVED,
                torn_down: false,
                sink: Rc::new(sink),
                pending: VecDeque::new(),
                driving: false,
            })),
        }
    }

    /// Point the adapter at `target`, or at nothing.
    pub fn attach(&self, target: Option<T>) {
        {
            let mut binding = self.binding.borrow_mut();
            if binding.torn_down {
                debug!(element = ?target, "attach after teardown ignored");
                return;
            }
            if let Some(t) = &target
                && !t.is_connected()
            {
                debug!(element = ?t, "attach to disconnected element ignored");
                return;
            }
            if binding.target == target {
                return;
            }
            let previous = std::mem::replace(&mut binding.target, target.clone());
            if let Some(old) = previous {
                binding.pending.push_back(SourceOp::Unobserve(old));
            }
            if let Some(new) = target {
                binding.pending.push_back(SourceOp::Observe(new));
            }
        }
        self.drive();
    }

    /// Disconnect the source and stop processing reports. Idempotent.
    pub fn teardown(&self) {
        {
            let mut binding = self.binding.borrow_mut();
            if binding.torn_down {
                return;
            }
            binding.torn_down = true;
            binding.target = None;
            binding.pending.push_back(SourceOp::Disconnect);
        }
        self.drive();
        debug!("size observer torn down");
    }

    /// Run queued source operations in order. The source is taken out of its
    /// slot for each call, so a host that reports synchronously may re-enter
    /// `attach` or `teardown`; those calls only queue and the outermost frame
    /// drains them.
    fn drive(&self) {
        {
            let mut binding = self.binding.borrow_mut();
            if binding.driving {
                return;
            }
            binding.driving = true;
        }
        loop {
            let (op, torn_down) = {
                let mut binding = self.binding.borrow_mut();
                let Some(op) = binding.pending.pop_front() else {
                    binding.driving = false;
                    return;
                };
                (op, binding.torn_down)
            };
            let mut source = self.source.borrow_mut().take();
            match op {
                // Teardown is queued behind these and disconnects instead.
                SourceOp::Unobserve(_) | SourceOp::Observe(_) if torn_down => {}
                SourceOp::Unobserve(old) => {
                    if let Some(src) = source.as_mut() {
                        src.unobserve(&old);
                        debug!(element = ?old, "stopped observing");
                    }
                }
                SourceOp::Observe(new) => {
                    let src = source.get_or_insert_with(|| {
                        debug!("notification source created");
                        self.factory.create(self.callback())
                    });
                    src.observe(&new, ObserveOptions::border_box());
                    debug!(element = ?new, "observing");
                }
                SourceOp::Disconnect => {
                    if let Some(mut src) = source.take() {
                        src.disconnect();
                    }
                }
            }
            *self.source.borrow_mut() = source;
        }
    }

    /// Whether a target is currently observed.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.binding.borrow().target.is_some()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.binding.borrow().torn_down
    }

    #[must_use]
    pub fn target(&self) -> Option<T> {
        self.binding.borrow().target.clone()
    }

    /// Last canonical pair that passed redundancy suppression.
    #[must_use]
    pub fn observed(&self) -> ObservedDimensions {
        self.binding.borrow().previous
    }

    #[must_use]
    pub fn has_source(&self) -> bool {
        self.source.borrow().is_some()
    }

    fn callback(&self) -> ReportCallback<T> {
        let binding = Rc::downgrade(&self.binding);
        Rc::new(move |entries: &[ResizeEntry<T>]| deliver(&binding, entries))
    }
}

impl<T: ElementHandle, F: SourceFactory<T>> Drop for SizeObserverAdapter<T, F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn deliver<T: ElementHandle>(binding: &Weak<RefCell<Binding<T>>>, entries: &[ResizeEntry<T>]) {
    let Some(binding) = binding.upgrade() else {
        return;
    };
    let (sink, dims) = {
        let mut binding = binding.borrow_mut();
        if binding.torn_down {
            trace!(entries = entries.len(), "report after teardown dropped");
            return;
        }
        let Some(current) = binding.target.as_ref() else {
            trace!(entries = entries.len(), "report without target dropped");
            return;
        };
        let Some(entry) = entries.iter().find(|e| &e.target == current) else {
            trace!(entries = entries.len(), "stale report dropped");
            return;
        };
        let dims = entry.report.canonicalize();
        if !binding.previous.record(dims) {
            trace!(width = dims.width, height = dims.height, "redundant report suppressed");
            return;
        }
        (Rc::clone(&binding.sink), dims)
    };
    trace!(width = dims.width, height = dims.height, "size changed");
    sink(dims);
}
