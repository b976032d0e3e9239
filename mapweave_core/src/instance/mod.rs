// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance tree data model.
//!
//! An *instance* is the core's live record of one node descriptor. Each
//! instance has:
//!
//! - An identity ([`InstanceId`]), a generational handle that becomes stale
//!   when the instance is removed, so a removed instance can never be
//!   mistaken for a newer one occupying the same slot.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. The parent link is a plain index, never an owning reference.
//! - A record: the kind tag and resolved [`Kind`](crate::kind::Kind), the
//!   owned host handle, the props snapshot, the originating container, and
//!   the [`Lifecycle`] state.
//!
//! Instances are stored in struct-of-arrays layout with index-based handles.

mod id;
mod store;
mod traverse;

pub use id::{ContainerId, INVALID, InstanceId};
pub use store::{InstanceStore, Lifecycle};
pub use traverse::Children;
