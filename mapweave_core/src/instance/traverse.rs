// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, InstanceId};
use super::store::InstanceStore;

/// An iterator over the direct children of an instance, in sibling order.
///
/// Created by [`InstanceStore::children`].
#[derive(Debug)]
pub struct Children<'a, T> {
    store: &'a InstanceStore<T>,
    current: u32,
}

impl<'a, T> Children<'a, T> {
    pub(crate) fn new(store: &'a InstanceStore<T>, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl<T> Iterator for Children<'_, T> {
    type Item = InstanceId;

    fn next(&mut self) -> Option<InstanceId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(InstanceId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}
