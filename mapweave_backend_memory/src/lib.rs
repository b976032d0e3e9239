// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory map host for mapweave.
//!
//! [`MemoryHost`] implements [`MapHost`](mapweave_core::host::MapHost)
//! without any rendering. It models what the reconciler can observe of a
//! real mapping library:
//!
//! - roots with a container element split into panes, where vector shapes
//!   share one surface and raster layers live elsewhere;
//! - structural collections with set semantics, where adding to a collection
//!   on the map renders the object and removing a group takes its members
//!   off the map while the group keeps them;
//! - decorations that bind to one target at a time and open on a source;
//! - named root extensions, listeners, and incidental object state.
//!
//! It is suitable for headless use and serves as the test host for the
//! reconciler. Inspection methods ([`attribute`](MemoryHost::attribute),
//! [`members`](MemoryHost::members), [`is_on_map`](MemoryHost::is_on_map),
//! and friends) and simulated input ([`click`](MemoryHost::click),
//! [`fire`](MemoryHost::fire)) are available on the host itself.

mod dom;
mod host;
mod object;

#[cfg(test)]
mod tests;

pub use dom::ElementId;
pub use host::MemoryHost;
pub use object::{ObjectId, ObjectKind, Pane, SurfaceId};
