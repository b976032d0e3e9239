// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays instance storage with allocation, topology, and record
//! management.

use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use crate::kind::{Category, Kind};
use crate::props::Props;

use super::id::{ContainerId, INVALID, InstanceId};
use super::traverse::Children;

/// Lifecycle state of an instance.
///
/// Transitions are strictly forward: `Constructed` → `Attached` →
/// `Committed` → `Removed`. An instance may also go straight from
/// `Constructed` to `Removed` when it is discarded before attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// The factory ran; the instance is not yet part of any tree.
    Constructed,
    /// Wired into its parent during the render phase, not yet visible.
    Attached,
    /// Confirmed part of the live visible tree.
    Committed,
    /// Terminal. Reported for handles whose slot has been freed.
    Removed,
}

/// Struct-of-arrays storage for all instances.
///
/// Instances are addressed by [`InstanceId`] handles. Each instance occupies
/// a slot in parallel arrays; removed instances are recycled through a free
/// list, and generation counters prevent stale handle access.
///
/// `T` is the host handle type. The store owns one handle per live instance.
#[derive(Debug)]
pub struct InstanceStore<T> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Records --
    pub(crate) tag: Vec<String>,
    pub(crate) kind: Vec<Kind>,
    pub(crate) handle: Vec<T>,
    pub(crate) props: Vec<Props>,
    pub(crate) container: Vec<ContainerId>,
    pub(crate) lifecycle: Vec<Lifecycle>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl<T> Default for InstanceStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InstanceStore<T> {
    /// Creates an empty instance store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            tag: Vec::new(),
            kind: Vec::new(),
            handle: Vec::new(),
            props: Vec::new(),
            container: Vec::new(),
            lifecycle: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    // -- Allocation API --

    /// Creates a new, parentless instance in the `Constructed` state.
    pub fn create(
        &mut self,
        tag: String,
        kind: Kind,
        props: Props,
        container: ContainerId,
        handle: T,
    ) -> InstanceId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. The generation was bumped on removal.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.tag[i] = tag;
            self.kind[i] = kind;
            self.handle[i] = handle;
            self.props[i] = props;
            self.container[i] = container;
            self.lifecycle[i] = Lifecycle::Constructed;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.tag.push(tag);
            self.kind.push(kind);
            self.handle.push(handle);
            self.props.push(props);
            self.container.push(container);
            self.lifecycle.push(Lifecycle::Constructed);
            self.generation.push(0);
            idx
        };

        InstanceId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns whether the given handle refers to a live instance.
    #[must_use]
    pub fn is_alive(&self, id: InstanceId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live instances.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Removes `id` and its whole subtree, freeing their slots.
    ///
    /// The instance is unlinked from its parent first. Host handles are
    /// returned in post-order (children before their parent) so the caller
    /// can release them.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_subtree(&mut self, id: InstanceId) -> Vec<(InstanceId, T)>
    where
        T: Clone,
    {
        self.validate(id);
        if self.parent[id.idx as usize] != INVALID {
            self.unlink_from_parent(id.idx);
        }

        let mut order = Vec::new();
        self.collect_post_order(id.idx, &mut order);

        let mut released = Vec::with_capacity(order.len());
        for idx in order {
            let i = idx as usize;
            released.push((
                InstanceId {
                    idx,
                    generation: self.generation[i],
                },
                self.handle[i].clone(),
            ));
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.props[i] = Props::default();
            self.lifecycle[i] = Lifecycle::Removed;
            // Bump generation so old handles immediately fail validation.
            self.generation[i] += 1;
            self.free_list.push(idx);
        }
        released
    }

    // -- Topology API --

    /// Makes `child` the last child of `parent`.
    ///
    /// If `child` is already a child of `parent`, it is moved to the end.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` is attached to a
    /// different parent, or if `child == parent`.
    pub fn append(&mut self, parent: InstanceId, child: InstanceId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(p != c, "instance cannot be its own child");
        self.detach_for_move(c, p);

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// `child` may already be a child of the same parent, in which case it is
    /// moved.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `sibling` has no parent, or `child` is
    /// attached to a different parent.
    pub fn insert_before(&mut self, child: InstanceId, sibling: InstanceId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        if c == s {
            return;
        }
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.detach_for_move(c, p);

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;
    }

    /// Returns the parent of an instance, if any.
    #[must_use]
    pub fn parent(&self, id: InstanceId) -> Option<InstanceId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(InstanceId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of an instance.
    #[must_use]
    pub fn children(&self, id: InstanceId) -> Children<'_, T> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the sibling following `id`, if any.
    #[must_use]
    pub fn next_sibling(&self, id: InstanceId) -> Option<InstanceId> {
        self.validate(id);
        let n = self.next_sibling[id.idx as usize];
        (n != INVALID).then(|| InstanceId {
            idx: n,
            generation: self.generation[n as usize],
        })
    }

    // -- Record getters --

    /// Returns the kind tag the instance was created from.
    #[must_use]
    pub fn tag(&self, id: InstanceId) -> &str {
        self.validate(id);
        &self.tag[id.idx as usize]
    }

    /// Returns the resolved kind.
    #[must_use]
    pub fn kind(&self, id: InstanceId) -> Kind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self, id: InstanceId) -> Category {
        self.kind(id).category()
    }

    /// Returns the owned host handle.
    #[must_use]
    pub fn handle(&self, id: InstanceId) -> &T {
        self.validate(id);
        &self.handle[id.idx as usize]
    }

    /// Returns the props snapshot.
    #[must_use]
    pub fn props(&self, id: InstanceId) -> &Props {
        self.validate(id);
        &self.props[id.idx as usize]
    }

    /// Returns the container the instance was created for.
    #[must_use]
    pub fn container(&self, id: InstanceId) -> ContainerId {
        self.validate(id);
        self.container[id.idx as usize]
    }

    /// Returns the lifecycle state. Stale handles report
    /// [`Lifecycle::Removed`].
    #[must_use]
    pub fn lifecycle(&self, id: InstanceId) -> Lifecycle {
        if self.is_alive(id) {
            self.lifecycle[id.idx as usize]
        } else {
            Lifecycle::Removed
        }
    }

    // -- Record setters --

    /// Repoints the instance at a new host handle, returning the old one.
    pub fn set_handle(&mut self, id: InstanceId, handle: T) -> T {
        self.validate(id);
        mem::replace(&mut self.handle[id.idx as usize], handle)
    }

    /// Replaces the props snapshot.
    pub fn set_props(&mut self, id: InstanceId, props: Props) {
        self.validate(id);
        self.props[id.idx as usize] = props;
    }

    /// Advances the lifecycle state.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the transition goes backwards.
    pub fn set_lifecycle(&mut self, id: InstanceId, state: Lifecycle) {
        self.validate(id);
        let current = &mut self.lifecycle[id.idx as usize];
        assert!(
            rank(state) >= rank(*current),
            "invalid lifecycle transition for {id:?}: {current:?} -> {state:?}"
        );
        *current = state;
    }

    // -- Mutability --

    /// Returns whether every group ancestor of `id` is mutable.
    ///
    /// Combined with the instance's own flag this yields its effective
    /// mutability.
    #[must_use]
    pub fn ancestors_mutable(&self, id: InstanceId) -> bool {
        self.validate(id);
        let mut p = self.parent[id.idx as usize];
        while p != INVALID {
            let i = p as usize;
            if self.kind[i].category().is_group() && !self.props[i].is_mutable() {
                return false;
            }
            p = self.parent[i];
        }
        true
    }

    /// Returns the instance's effective mutability: its own flag AND every
    /// group ancestor's flag.
    #[must_use]
    pub fn effective_mutable(&self, id: InstanceId) -> bool {
        self.props(id).is_mutable() && self.ancestors_mutable(id)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: InstanceId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale InstanceId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Unlinks `c` ahead of a move under `p`. Panics if `c` hangs under a
    /// different parent.
    fn detach_for_move(&mut self, c: u32, p: u32) {
        let current = self.parent[c as usize];
        if current == INVALID {
            return;
        }
        assert!(current == p, "child already has a different parent");
        self.unlink_from_parent(c);
    }

    /// Removes `idx` from its parent's child list.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn collect_post_order(&self, idx: u32, out: &mut Vec<u32>) {
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_post_order(child, out);
            child = self.next_sibling[child as usize];
        }
        out.push(idx);
    }
}

const fn rank(state: Lifecycle) -> u8 {
    match state {
        Lifecycle::Constructed => 0,
        Lifecycle::Attached => 1,
        Lifecycle::Committed => 2,
        Lifecycle::Removed => 3,
    }
}
