use core::fmt;
use core::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{FbError, FbResult};

/// Compact, immutable identifier of one component adapter.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<ComponentId>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(NonZeroU32);

impl ComponentId {
    /// Create an id from a 0-based index by storing index+1.
    ///
    /// `u32::MAX` has no representation and yields `None`.
    pub fn from_index(index: u32) -> Option<Self> {
        index.checked_add(1).and_then(NonZeroU32::new).map(Self)
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.index())
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

static NEXT_COMPONENT_INDEX: AtomicU32 = AtomicU32::new(0);

/// Allocate a process-unique component id.
///
/// Ids are never reused within a process, even after the adapter that held
/// one is dropped. Fails once the id space is used up.
pub fn next_component_id() -> FbResult<ComponentId> {
    allocate(&NEXT_COMPONENT_INDEX)
}

fn allocate(counter: &AtomicU32) -> FbResult<ComponentId> {
    let exhausted = FbError::Exhausted {
        what: "component ids",
    };
    // The counter parks at u32::MAX, which is never handed out.
    let index = counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| i.checked_add(1))
        .map_err(|_| exhausted.clone())?;
    ComponentId::from_index(index).ok_or(exhausted)
}
