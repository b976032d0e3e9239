// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance and container identity types.

use core::fmt;

/// Sentinel value indicating "no instance" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to an instance in an [`InstanceStore`](super::InstanceStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an instance is removed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter. Must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl InstanceId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({}@gen{})", self.idx, self.generation)
    }
}

/// Identifies a root container (the mount point of one map).
///
/// The driving framework assigns container IDs. Core code uses them as
/// registry keys and never interprets the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContainerId(pub u32);

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}
