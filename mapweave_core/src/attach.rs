// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attachment engine: wires child instances into their parents.
//!
//! How a child attaches is a pure function of the parent's category, the
//! child's category, and whether the child is a decoration:
//!
//! | parent                         | decoration child    | handler child   | otherwise  |
//! |--------------------------------|---------------------|-----------------|------------|
//! | root                           | root decoration     | root extension  | structural |
//! | layer, layergroup, featuregroup| bound decoration    | unsupported     | structural |
//! | control, handler               | unsupported         | unsupported     | unsupported|
//!
//! Detaching mirrors the structural case only. Decorations are torn down
//! with the host object they are bound to.

use alloc::borrow::ToOwned;

use crate::error::Error;
use crate::host::MapHost;
use crate::instance::{ContainerId, InstanceId, Lifecycle};
use crate::kind::{Category, Decoration, Kind};
use crate::order;
use crate::props::PropValue;
use crate::reconciler::Reconciler;
use crate::trace::{AttachedEvent, DetachedEvent, RemovedEvent};

/// How a child instance is wired into its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// Inserted into the parent's structural collection.
    Structural,
    /// A decoration living on the root, opened by clicks on the root.
    RootDecoration(Decoration),
    /// A named, switchable extension registered on the root.
    RootExtension,
    /// A decoration bound onto the parent's host object.
    BoundDecoration(Decoration),
    /// The combination has no attachment; only the tree link is kept.
    Unsupported,
}

/// Chooses the attachment for `child_kind` (of `child` category) under a
/// `parent` category.
#[must_use]
pub const fn strategy(parent: Category, child: Category, child_kind: Kind) -> Attachment {
    if matches!(child, Category::Root) {
        return Attachment::Unsupported;
    }
    match parent {
        Category::Root => match child_kind.decoration() {
            Some(decoration) => Attachment::RootDecoration(decoration),
            None if matches!(child, Category::Handler) => Attachment::RootExtension,
            None => Attachment::Structural,
        },
        Category::Layer | Category::LayerGroup | Category::FeatureGroup => {
            match child_kind.decoration() {
                Some(decoration) => Attachment::BoundDecoration(decoration),
                None if matches!(child, Category::Handler) => Attachment::Unsupported,
                None => Attachment::Structural,
            }
        }
        Category::Control | Category::Handler => Attachment::Unsupported,
    }
}

impl<H: MapHost> Reconciler<H> {
    /// Attaches `child` under `parent` while `parent` is still being built.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `child` hangs under a different
    /// parent.
    pub fn append_initial_child(&mut self, parent: InstanceId, child: InstanceId) {
        self.attach(parent, child);
    }

    /// Attaches `child` as the last child of `parent`, moving it if it is
    /// already a child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `child` hangs under a different
    /// parent.
    pub fn append_child(&mut self, parent: InstanceId, child: InstanceId) {
        self.attach(parent, child);
    }

    /// Attaches `child` under `parent` immediately before `before`, then
    /// reorders visual elements on a best-effort basis.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `before` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: InstanceId, child: InstanceId, before: InstanceId) {
        assert!(
            self.store.parent(before) == Some(parent),
            "{before:?} is not a child of {parent:?}"
        );
        self.attach(parent, child);
        self.store.insert_before(child, before);

        let child_handle = self.store.handle(child).clone();
        let before_handle = self.store.handle(before).clone();
        let moved = order::reorder(&mut self.host, &child_handle, &before_handle);
        self.trace_reordered(child, Some(before), moved);
    }

    /// Removes `child` and its whole subtree from `parent`.
    ///
    /// Structural children leave the parent's collection. Root decorations
    /// are closed and no longer open on root clicks; other decorations and
    /// extensions go down with their host. Every removed instance's handle is
    /// released.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: InstanceId, child: InstanceId) {
        assert!(
            self.store.parent(child) == Some(parent),
            "{child:?} is not a child of {parent:?}"
        );
        let parent_handle = self.store.handle(parent).clone();
        let child_handle = self.store.handle(child).clone();
        match self.attachment(parent, child) {
            Attachment::Structural => self.host.remove(&parent_handle, &child_handle),
            Attachment::RootDecoration(_) => {
                self.host.unbind_on_click(&parent_handle, &child_handle);
                self.host.close_decoration(&child_handle);
            }
            _ => {}
        }
        self.tracer.detached(&DetachedEvent {
            parent: Some(parent),
            child,
        });
        self.release_subtree(child);
    }

    /// Removes a root instance from its container, destroying the root host
    /// object and the whole tree below it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] if `container` is not registered.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_child_from_container(
        &mut self,
        container: ContainerId,
        child: InstanceId,
    ) -> Result<(), Error> {
        if self.sessions.get(container).is_none() {
            return Err(Error::SessionNotFound { container });
        }
        self.teardown_root(container, child);
        Ok(())
    }

    /// Destroys a root and clears it from its session.
    pub(crate) fn teardown_root(&mut self, container: ContainerId, root: InstanceId) {
        let handle = self.store.handle(root).clone();
        self.host.destroy_root(&handle);
        if let Some(session) = self.sessions.get_mut(container) {
            if session.root == Some(root) {
                session.root = None;
                session.root_handle = None;
            }
        }
        self.tracer.detached(&DetachedEvent {
            parent: None,
            child: root,
        });
        self.release_subtree(root);
    }

    /// Returns the attachment `child` has (or would have) under `parent`.
    pub(crate) fn attachment(&self, parent: InstanceId, child: InstanceId) -> Attachment {
        strategy(
            self.store.category(parent),
            self.store.category(child),
            self.store.kind(child),
        )
    }

    fn attach(&mut self, parent: InstanceId, child: InstanceId) {
        self.store.append(parent, child);
        let attachment = self.attachment(parent, child);
        let parent_handle = self.store.handle(parent).clone();
        let child_handle = self.store.handle(child).clone();

        match attachment {
            Attachment::Structural => self.host.add(&parent_handle, &child_handle),
            Attachment::RootExtension => {
                let props = self.store.props(child);
                let name = props
                    .get("name")
                    .and_then(PropValue::as_str)
                    .unwrap_or_else(|| self.store.tag(child))
                    .to_owned();
                let enabled = props.flag("enabled", false);
                self.host.add_extension(&parent_handle, &name, &child_handle);
                self.host.set_extension_enabled(&parent_handle, &name, enabled);
            }
            Attachment::BoundDecoration(decoration) => {
                // Moving a bound decoration among its siblings keeps its state.
                let bound = self.host.decoration(&parent_handle, decoration);
                if bound.as_ref() != Some(&child_handle) {
                    self.host.bind_decoration(&parent_handle, &child_handle, decoration);
                    self.host.close_decoration(&child_handle);
                }
            }
            Attachment::RootDecoration(_) => {
                if let Some(at) = self.store.props(child).latlng("latlng") {
                    self.host.set_decoration_position(&child_handle, at);
                }
            }
            Attachment::Unsupported => {}
        }

        if self.store.lifecycle(child) == Lifecycle::Constructed {
            self.store.set_lifecycle(child, Lifecycle::Attached);
        }
        self.tracer.attached(&AttachedEvent {
            parent,
            child,
            attachment,
        });
    }

    fn release_subtree(&mut self, id: InstanceId) {
        let released = self.store.remove_subtree(id);
        for (_, handle) in &released {
            self.host.release(handle);
        }
        self.tracer.removed(&RemovedEvent {
            instance: id,
            released: released.len(),
        });
    }
}
