// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation engine between a declarative node tree and a live map.
//!
//! `mapweave_core` is a *host adapter*: a declarative UI framework describes
//! the map as a tree of node descriptors, revision by revision, and calls the
//! adapter once per lifecycle event. The adapter keeps a graph of mutable,
//! stateful host objects (owned by an external mapping library) in sync with
//! that tree. It is `no_std` compatible (with `alloc`) and stores instances in
//! struct-of-arrays layout with generational handles.
//!
//! # Architecture
//!
//! ```text
//!   Node ──► create_instance ──► InstanceStore ◄── append / insert / remove
//!                 │                    │
//!                 ▼                    ▼
//!           MapHost::construct   prepare_update ──► UpdatePayload
//!                                      │
//!                                      ▼
//!                 commit_update (in place | replace + state transfer)
//!                                      │
//!                                      ▼
//!                 commit_mount (listeners, decorations, ready)
//! ```
//!
//! **[`kind`]** — Kind taxonomy: a fixed table of built-in kinds plus
//! suffix-declared extension kinds, each mapped to a [`Category`](kind::Category).
//!
//! **[`props`]** — Node descriptors and prop values, with structural
//! equality that ignores children and compares callbacks by source.
//!
//! **[`instance`]** — Struct-of-arrays instance tree with generational
//! handles and per-instance lifecycle state.
//!
//! **[`session`]** — Per-container sessions holding the live root and the
//! content embedder.
//!
//! **[`host`]** — The [`MapHost`](host::MapHost) trait that mapping-library
//! backends implement.
//!
//! **[`reconciler`]** — [`Reconciler`](reconciler::Reconciler), the adapter
//! contract. Its operations are grouped by engine: [`attach`] (attachment
//! strategies), [`update`] (diffing and replacement), and [`order`]
//! (best-effort sibling order). Construction and commit-phase activation
//! live alongside.
//!
//! **[`size`]** — Root container sizing.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! reconciler instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod attach;
pub mod config;
pub mod error;
mod factory;
pub mod host;
pub mod instance;
pub mod kind;
mod lifecycle;
pub mod order;
pub mod props;
pub mod reconciler;
pub mod session;
pub mod size;
pub mod trace;
pub mod update;

pub use error::Error;
pub use reconciler::Reconciler;
