#![forbid(unsafe_code)]

//! Size-notification source capability.
//!
//! The host platform owns the real observer (a browser `ResizeObserver`, a
//! terminal resize hook). The runtime only needs to ask it to watch or stop
//! watching an element and to receive batches of [`ResizeEntry`] values.

use std::fmt;
use std::rc::Rc;

use cq_core::{ElementHandle, SizeReport};

/// Which box a source should measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoxModel {
    /// Content plus padding and border.
    #[default]
    BorderBox,
    /// Content only.
    ContentBox,
}

/// Options passed with every `observe` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObserveOptions {
    pub box_model: BoxModel,
}

impl ObserveOptions {
    /// Border-box measurement, what the adapter always requests.
    #[must_use]
    pub const fn border_box() -> Self {
        Self {
            box_model: BoxModel::BorderBox,
        }
    }
}

/// One measurement for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeEntry<T> {
    pub target: T,
    pub report: SizeReport,
}

impl<T> ResizeEntry<T> {
    #[must_use]
    pub fn new(target: T, report: SizeReport) -> Self {
        Self { target, report }
    }
}

/// Callback a source invokes with each batch of entries.
pub type ReportCallback<T> = Rc<dyn Fn(&[ResizeEntry<T>])>;

/// A live notification source bound to one callback.
pub trait NotificationSource<T: ElementHandle> {
    fn observe(&mut self, target: &T, options: ObserveOptions);
    fn unobserve(&mut self, target: &T);
    /// Stop all observation. The source is not used afterwards.
    fn disconnect(&mut self);
}

/// Creates notification sources.
pub trait SourceFactory<T: ElementHandle> {
    type Source: NotificationSource<T> + 'static;

    fn create(&self, callback: ReportCallback<T>) -> Self::Source;
}

impl<T: ElementHandle, F: SourceFactory<T>> SourceFactory<T> for Rc<F> {
    type Source = F::Source;

    fn create(&self, callback: ReportCallback<T>) -> Self::Source {
        (**self).create(callback)
    }
}

impl fmt::Display for BoxModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BorderBox => "border-box",
            Self::ContentBox => "content-box",
        })
    }
}
