#![forbid(unsafe_code)]

//! Deterministic test doubles for notification sources and elements.
//!
//! [`MockSourceFactory`] records every instance it creates and every call made
//! on those instances, and lets a test push size reports through the
//! callbacks it was handed. Clones share one recorder.

use std::cell::RefCell;
use std::rc::Rc;

use cq_core::{ElementHandle, SizeReport};

use crate::source::{
    NotificationSource, ObserveOptions, ReportCallback, ResizeEntry, SourceFactory,
};

/// A stand-in element identified by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockElement {
    pub id: u32,
    pub connected: bool,
}

impl MockElement {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            connected: true,
        }
    }

    /// An element that is not part of the document.
    #[must_use]
    pub const fn detached(id: u32) -> Self {
        Self {
            id,
            connected: false,
        }
    }
}

impl ElementHandle for MockElement {
    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// One recorded interaction, tagged with the instance index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Create {
        instance: usize,
    },
    Observe {
        instance: usize,
        target: MockElement,
        options: ObserveOptions,
    },
    Unobserve {
        instance: usize,
        target: MockElement,
    },
    Disconnect {
        instance: usize,
    },
}

struct Instance {
    callback: ReportCallback<MockElement>,
    observed: Vec<MockElement>,
    disconnected: bool,
}

#[derive(Default)]
struct Recorder {
    instances: Vec<Instance>,
    calls: Vec<SourceCall>,
    report_on_observe: Option<SizeReport>,
}

/// Factory whose sources are driven by the test.
#[derive(Clone, Default)]
pub struct MockSourceFactory {
    recorder: Rc<RefCell<Recorder>>,
}

impl std::fmt::Debug for MockSourceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let recorder = self.recorder.borrow();
        f.debug_struct("MockSourceFactory")
            .field("instances", &recorder.instances.len())
            .field("calls", &recorder.calls)
            .finish()
    }
}

impl MockSourceFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose sources deliver `report` for the target synchronously
    /// from inside `observe`, as some hosts do for the initial size.
    #[must_use]
    pub fn reporting_on_observe(report: SizeReport) -> Self {
        let factory = Self::default();
        factory.recorder.borrow_mut().report_on_observe = Some(report);
        factory
    }

    /// Instances created so far.
    #[must_use]
    pub fn instances(&self) -> usize {
        self.recorder.borrow().instances.len()
    }

    /// Every call in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SourceCall> {
        self.recorder.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.recorder.borrow_mut().calls.clear();
    }

    /// Targets instance `instance` currently observes.
    #[must_use]
    pub fn observed(&self, instance: usize) -> Vec<MockElement> {
        self.recorder
            .borrow()
            .instances
            .get(instance)
            .map(|i| i.observed.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn disconnect_count(&self) -> usize {
        self.recorder
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, SourceCall::Disconnect { .. }))
            .count()
    }

    /// Deliver `report` for `target` to every live instance observing it.
    /// Returns how many callbacks ran.
    pub fn emit(&self, target: &MockElement, report: SizeReport) -> usize {
        let callbacks: Vec<_> = self
            .recorder
            .borrow()
            .instances
            .iter()
            .filter(|i| !i.disconnected && i.observed.contains(target))
            .map(|i| Rc::clone(&i.callback))
            .collect();
        let batch = [ResizeEntry::new(*target, report)];
        for callback in &callbacks {
            callback(&batch);
        }
        callbacks.len()
    }

    /// Hand `entries` to every instance's callback as one batch, whether or
    /// not it observes those targets or is still connected. Models reports
    /// already in flight when observation changed.
    pub fn emit_batch(&self, entries: &[ResizeEntry<MockElement>]) {
        let callbacks: Vec<_> = self
            .recorder
            .borrow()
            .instances
            .iter()
            .map(|i| Rc::clone(&i.callback))
            .collect();
        for callback in &callbacks {
            callback(entries);
        }
    }
}

impl SourceFactory<MockElement> for MockSourceFactory {
    type Source = MockSource;

    fn create(&self, callback: ReportCallback<MockElement>) -> MockSource {
        let mut recorder = self.recorder.borrow_mut();
        let instance = recorder.instances.len();
        recorder.instances.push(Instance {
            callback,
            observed: Vec::new(),
            disconnected: false,
        });
        recorder.calls.push(SourceCall::Create { instance });
        MockSource {
            instance,
            recorder: Rc::clone(&self.recorder),
        }
    }
}

/// Source handed out by [`MockSourceFactory`].
pub struct MockSource {
    instance: usize,
    recorder: Rc<RefCell<Recorder>>,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

impl NotificationSource<MockElement> for MockSource {
    fn observe(&mut self, target: &MockElement, options: ObserveOptions) {
        let immediate = {
            let mut recorder = self.recorder.borrow_mut();
            if let Some(slot) = recorder.instances.get_mut(self.instance)
                && !slot.observed.contains(target)
            {
                slot.observed.push(*target);
            }
            recorder.calls.push(SourceCall::Observe {
                instance: self.instance,
                target: *target,
                options,
            });
            let callback = recorder
                .instances
                .get(self.instance)
                .map(|i| Rc::clone(&i.callback));
            callback.zip(recorder.report_on_observe.clone())
        };
        if let Some((callback, report)) = immediate {
            callback(&[ResizeEntry::new(*target, report)]);
        }
    }

    fn unobserve(&mut self, target: &MockElement) {
        let mut recorder = self.recorder.borrow_mut();
        if let Some(slot) = recorder.instances.get_mut(self.instance) {
            slot.observed.retain(|t| t != target);
        }
        recorder.calls.push(SourceCall::Unobserve {
            instance: self.instance,
            target: *target,
        });
    }

    fn disconnect(&mut self) {
        let mut recorder = self.recorder.borrow_mut();
        if let Some(slot) = recorder.instances.get_mut(self.instance) {
            slot.observed.clear();
            slot.disconnected = true;
        }
        recorder.calls.push(SourceCall::Disconnect {
            instance: self.instance,
        });
    }
}
