#![forbid(unsafe_code)]

//! Observable element handles.

use std::fmt;

/// A handle to a rendered element that a notification source can observe.
///
/// Handles are cheap to clone and compared by identity of the element they
/// refer to, not by content. A handle that is no longer part of the rendered
/// tree reports `false` from [`is_connected`](Self::is_connected); attaching
/// such a handle is ignored rather than treated as an error, since repeated
/// attach and detach during re-render churn is expected.
pub trait ElementHandle: Clone + PartialEq + fmt::Debug + 'static {
    /// Whether the element is currently part of the rendered tree.
    fn is_connected(&self) -> bool {
        true
    }
}
