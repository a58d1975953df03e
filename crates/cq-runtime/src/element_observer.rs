#![forbid(unsafe_code)]

//! Size-only observer for a single element.
//!
//! Same adapter as [`ContainerQuery`](crate::ContainerQuery) but without
//! breakpoints: it exposes [`ObservedDimensions`], which stay `None` until the
//! first report. When built with [`with_on_resize`](ElementSizeObserver::with_on_resize)
//! the sizes go to the caller's sink and the observer's own cell is left
//! untouched.

use std::rc::Rc;

use cq_core::{Dimensions, ElementHandle, ObservedDimensions};

use crate::adapter::SizeObserverAdapter;
use crate::query::AssignRef;
use crate::reactive::{Observable, StateCell, Subscription};
use crate::source::SourceFactory;

/// Observes one element's size.
pub struct ElementSizeObserver<T: ElementHandle, F: SourceFactory<T>> {
    adapter: Rc<SizeObserverAdapter<T, F>>,
    cell: Observable<ObservedDimensions>,
}

impl<T: ElementHandle, F: SourceFactory<T> + 'static> ElementSizeObserver<T, F> {
    /// Observer that records sizes in its own cell.
    pub fn new(factory: F) -> Self {
        let cell = Observable::new(ObservedDimensions::UNOBSERVED);
        let target = cell.clone();
        let adapter = SizeObserverAdapter::new(factory, move |dims: Dimensions| {
            target.set(ObservedDimensions::from(dims));
        });
        Self {
            adapter: Rc::new(adapter),
            cell,
        }
    }

    /// Observer that forwards sizes to `on_resize` instead.
    pub fn with_on_resize(factory: F, on_resize: impl Fn(Dimensions) + 'static) -> Self {
        Self {
            adapter: Rc::new(SizeObserverAdapter::new(factory, on_resize)),
            cell: Observable::new(ObservedDimensions::UNOBSERVED),
        }
    }

    /// Ref callback for the observed element.
    #[must_use]
    pub fn assign_ref(&self) -> AssignRef<T> {
        AssignRef::from_weak(Rc::downgrade(&self.adapter))
    }

    /// Attach directly, without going through a ref handle.
    pub fn attach(&self, target: Option<T>) {
        self.adapter.attach(target);
    }

    /// Sizes recorded in the observer's own cell.
    #[must_use]
    pub fn dimensions(&self) -> ObservedDimensions {
        self.cell.get()
    }

    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.cell.with(|d| d.width)
    }

    #[must_use]
    pub fn height(&self) -> Option<u32> {
        self.cell.with(|d| d.height)
    }

    /// Last size the adapter accepted, whether or not a sink took it.
    #[must_use]
    pub fn last_observed(&self) -> ObservedDimensions {
        self.adapter.observed()
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.adapter.is_observing()
    }

    /// Re-render hook.
    pub fn subscribe(&self, callback: impl Fn(&ObservedDimensions) + 'static) -> Subscription {
        self.cell.subscribe(Box::new(callback))
    }

    pub fn teardown(&self) {
        self.adapter.teardown();
    }

    #[cfg(test)]
    fn adapter(&self) -> std::rc::Weak<SizeObserverAdapter<T, F>> {
        Rc::downgrade(&self.adapter)
    }
}

impl<T: ElementHandle, F: SourceFactory<T>> std::fmt::Debug for ElementSizeObserver<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementSizeObserver")
            .field("adapter", &self.adapter)
            .field("cell", &self.cell)
            .finish()
    }
}
