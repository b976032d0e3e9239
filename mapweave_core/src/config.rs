// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciler configuration.

use alloc::string::String;
use alloc::vec::Vec;

use crate::kind::{self, Capability};

/// Tunables for a [`Reconciler`](crate::reconciler::Reconciler).
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcilerConfig {
    /// Kind-tag suffixes declaring third-party kinds, tried in order.
    pub extension_suffixes: Vec<(String, Capability)>,
    /// Smallest parent dimension in pixels that does not trigger a size
    /// warning.
    pub min_container_extent: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            extension_suffixes: kind::default_suffixes(),
            min_container_extent: 10.0,
        }
    }
}
