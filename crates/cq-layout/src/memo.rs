#![forbid(unsafe_code)]

//! Identity-keyed memoization of range tables.
//!
//! The table is a pure function of its [`BreakpointSpec`], so it is rebuilt
//! only when the caller hands over a different `Rc`. Passing the same `Rc`
//! again, even after the table was built, is free; passing a new `Rc` with
//! equal contents rebuilds (identity, not equality, is the key).

use std::rc::Rc;

use tracing::debug;

use crate::error::BreakpointError;
use crate::spec::BreakpointSpec;
use crate::table::RangeTable;

/// Caches the table built from the most recent configuration.
#[derive(Debug, Default)]
pub struct RangeTableMemo {
    cached: Option<(Rc<BreakpointSpec>, Rc<RangeTable>)>,
    builds: u64,
}

impl RangeTableMemo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for `spec`, building it only if `spec` is not the cached
    /// configuration.
    ///
    /// A failed build leaves the previous cache entry in place.
    pub fn get_or_build(
        &mut self,
        spec: &Rc<BreakpointSpec>,
    ) -> Result<Rc<RangeTable>, BreakpointError> {
        if let Some((cached_spec, table)) = &self.cached
            && Rc::ptr_eq(cached_spec, spec)
        {
            return Ok(Rc::clone(table));
        }

        let table = Rc::new(spec.build()?);
        self.builds += 1;
        debug!(
            builds = self.builds,
            breakpoints = table.len(),
            "breakpoint table rebuilt"
        );
        self.cached = Some((Rc::clone(spec), Rc::clone(&table)));
        Ok(table)
    }

    /// Whether `spec` is the configuration currently cached.
    #[must_use]
    pub fn is_current(&self, spec: &Rc<BreakpointSpec>) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|(cached, _)| Rc::ptr_eq(cached, spec))
    }

    /// Most recently built table.
    #[must_use]
    pub fn table(&self) -> Option<&Rc<RangeTable>> {
        self.cached.as_ref().map(|(_, table)| table)
    }

    /// Number of builds performed so far.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds
    }
}
