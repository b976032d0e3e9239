// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle coordinator: render-phase construction vs. commit-phase wiring.
//!
//! Instances move `Constructed` → `Attached` → `Committed` → `Removed`.
//! Anything externally observable that is not construction itself (event
//! listeners, click-to-open wiring, opening decorations, the root's ready
//! callback) waits for [`commit_mount`](Reconciler::commit_mount), so a
//! speculative instance discarded before commit leaves no trace.

use alloc::vec::Vec;

use crate::error::Error;
use crate::host::{ContentEmbedder, MapHost};
use crate::instance::{ContainerId, InstanceId, Lifecycle};
use crate::kind::{Category, Kind};
use crate::props::{Node, PropValue, Props, event_name};
use crate::reconciler::Reconciler;
use crate::trace::CommittedEvent;

impl<H: MapHost> Reconciler<H> {
    /// Called once all initial children are attached. Always asks for a
    /// [`commit_mount`](Self::commit_mount).
    #[must_use]
    pub fn finalize_initial_children(&self, id: InstanceId) -> bool {
        _ = self.store.kind(id);
        true
    }

    /// Activates an instance confirmed part of the visible tree.
    ///
    /// - Wires callback props as host event listeners.
    /// - Hands a root's `whenReady` callback to the host.
    /// - A root decoration is positioned and opened when it has an explicit
    ///   `latlng` and `isOpen`, and opens on root clicks from then on.
    /// - A bound decoration opens when `isOpen` is set.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, or if a non-root instance was never
    /// attached or is already committed.
    pub fn commit_mount(&mut self, id: InstanceId) {
        let kind = self.store.kind(id);
        let parent = self.store.parent(id);
        let state = self.store.lifecycle(id);
        let expected = if parent.is_none() && kind.category() == Category::Root {
            Lifecycle::Constructed
        } else {
            Lifecycle::Attached
        };
        assert!(
            state == expected,
            "commit_mount on {id:?} in state {state:?}, expected {expected:?}"
        );

        let handle = self.store.handle(id).clone();
        let props = self.store.props(id).clone();
        self.wire_listeners(&handle, &props);

        if kind.category() == Category::Root {
            if let Some(ready) = props.get("whenReady").and_then(PropValue::as_callback) {
                self.host.when_ready(&handle, ready.clone());
            }
        }

        if let (Some(_), Some(parent)) = (kind.decoration(), parent) {
            let parent_handle = self.store.handle(parent).clone();
            let open = props.flag("isOpen", false);
            if self.store.category(parent) == Category::Root {
                let anchor = props.latlng("latlng");
                if let Some(at) = anchor {
                    self.host.set_decoration_position(&handle, at);
                    if open {
                        self.host.open_decoration(&handle, &parent_handle);
                    }
                }
                self.host.open_on_click(&parent_handle, &handle, anchor);
            } else if open {
                self.host.open_decoration(&handle, &parent_handle);
            }
        }

        self.store.set_lifecycle(id, Lifecycle::Committed);
        self.tracer.committed(&CommittedEvent { instance: id });
    }

    /// Mounts a whole node tree, rooted at a `map` node, into `container` in
    /// one pass.
    ///
    /// Registers the container, builds the tree depth-first, attaching
    /// initial children as it goes, then commits every instance children
    /// first. Children of decorations and extension kinds are content for
    /// the embedder, not instances. A root already mounted in the container
    /// is torn down first.
    ///
    /// # Errors
    ///
    /// Returns the first factory error. Instances built before the failure
    /// are discarded.
    pub fn render(
        &mut self,
        container: ContainerId,
        node: &Node,
        embedder: Option<ContentEmbedder<H::Surface>>,
    ) -> Result<InstanceId, Error> {
        self.register(container, embedder);
        let previous = self.sessions.get(container).and_then(|s| s.root);
        if let Some(previous) = previous.filter(|&r| self.store.is_alive(r)) {
            self.teardown_root(container, previous);
        }

        let root = self.build_tree(container, node)?;
        self.commit_tree(root);
        Ok(root)
    }

    fn build_tree(&mut self, container: ContainerId, node: &Node) -> Result<InstanceId, Error> {
        let id = self.create_instance(container, &node.kind, node.props.clone())?;
        let kind = self.store.kind(id);
        if kind.decoration().is_some() || matches!(kind, Kind::Extension(_)) {
            return Ok(id);
        }
        for child in node.props.children() {
            match self.build_tree(container, child) {
                Ok(child) => self.append_initial_child(id, child),
                Err(err) => {
                    self.discard_instance(id);
                    return Err(err);
                }
            }
        }
        _ = self.finalize_initial_children(id);
        Ok(id)
    }

    fn commit_tree(&mut self, id: InstanceId) {
        let children: Vec<_> = self.store.children(id).collect();
        for child in children {
            self.commit_tree(child);
        }
        self.commit_mount(id);
    }

    /// Subscribes every callback prop except `whenReady`.
    pub(crate) fn wire_listeners(&mut self, handle: &H::Handle, props: &Props) {
        for (name, value) in props.values() {
            if name == "whenReady" {
                continue;
            }
            if let PropValue::Callback(callback) = value {
                self.host.listen(handle, &event_name(name), callback.clone());
            }
        }
    }
}
