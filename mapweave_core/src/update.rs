// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diff/update engine.
//!
//! [`prepare_update`](Reconciler::prepare_update) runs in the render phase and
//! only decides; [`commit_update`](Reconciler::commit_update) applies.
//!
//! Most host objects are immutable after construction, so a change to a
//! structural instance *replaces* its host object:
//!
//! 1. Build a new object from the new props. A group takes over the old
//!    group's members.
//! 2. Carry captured state over, if the host supports it.
//! 3. Add the new object to the parent's collection and move it next to the
//!    old one (best effort).
//! 4. Rebind popups and tooltips onto the new object, keeping them open if
//!    they were.
//! 5. Remove and release the old object. A group is emptied first, since
//!    removing a group is a proxy for removing its members.
//! 6. Repoint the instance at the new object. The instance itself survives.
//!
//! Decorations, the root, and handlers are updated in place instead.

use alloc::string::String;
use alloc::vec::Vec;

use crate::attach::Attachment;
use crate::error::Error;
use crate::host::MapHost;
use crate::instance::{ContainerId, InstanceId};
use crate::kind::{Category, Decoration};
use crate::order;
use crate::props::{PropMap, PropValue, Props, changed_keys};
use crate::reconciler::Reconciler;
use crate::trace::{UpdateAction, UpdateCommittedEvent, UpdateOutcome, UpdatePreparedEvent};

/// Where in the tree an update happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HostContext {
    /// Category of the instance's parent, if it has one.
    pub parent_category: Option<Category>,
}

/// The result of a positive [`prepare_update`](Reconciler::prepare_update).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdatePayload {
    /// The container the instance belongs to.
    pub container: ContainerId,
    /// Where the instance sits.
    pub host_context: HostContext,
    /// Names of the props that differ, in name order.
    pub changed: Vec<String>,
}

impl<H: MapHost> Reconciler<H> {
    /// Decides whether moving from `old` to `new` needs a host mutation.
    ///
    /// Returns `None` when the instance is effectively immutable (and not a
    /// decoration) or when the props are structurally equal, children
    /// excluded and callbacks compared by source.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn prepare_update(
        &mut self,
        id: InstanceId,
        old: &Props,
        new: &Props,
    ) -> Option<UpdatePayload> {
        let kind = self.store.kind(id);
        let outcome;
        let payload = if !kind.is_always_mutable() && !self.store.effective_mutable(id) {
            outcome = UpdateOutcome::SkippedImmutable;
            None
        } else {
            let changed = changed_keys(old.values(), new.values());
            if changed.is_empty() {
                outcome = UpdateOutcome::Unchanged;
                None
            } else {
                outcome = UpdateOutcome::Changed(changed.len());
                Some(UpdatePayload {
                    container: self.store.container(id),
                    host_context: HostContext {
                        parent_category: self.store.parent(id).map(|p| self.store.category(p)),
                    },
                    changed,
                })
            }
        };
        self.tracer.update_prepared(&UpdatePreparedEvent {
            instance: id,
            outcome,
        });
        payload
    }

    /// Applies an update decided by [`prepare_update`](Self::prepare_update).
    ///
    /// # Errors
    ///
    /// - [`Error::SessionNotFound`] if the payload's container is not
    ///   registered.
    /// - [`Error::RootNotFound`] if the container has no live root.
    /// - Any factory error while building a replacement object.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn commit_update(
        &mut self,
        id: InstanceId,
        payload: &UpdatePayload,
        old: &Props,
        new: &Props,
    ) -> Result<(), Error> {
        let container = payload.container;
        let session = self
            .sessions
            .get(container)
            .ok_or(Error::SessionNotFound { container })?;
        let kind = self.store.kind(id);
        let root = session
            .root_handle
            .clone()
            .ok_or_else(|| Error::RootNotFound {
                container,
                kind: String::from(self.store.tag(id)),
                category: kind.category(),
            })?;

        let action = if kind.decoration().is_some() {
            self.update_decoration(id, &root, new);
            Some(UpdateAction::InPlace)
        } else {
            match kind.category() {
                Category::Root => {
                    let before = old.map_or_empty("options");
                    let changed: PropMap = new
                        .map_or_empty("options")
                        .into_iter()
                        .filter(|(k, v)| before.get(k) != Some(v))
                        .collect();
                    self.host.merge_options(&root, &changed);
                    self.host.invalidate_size(&root);
                    Some(UpdateAction::RootMerged)
                }
                Category::Handler => {
                    let name = new
                        .get("name")
                        .and_then(PropValue::as_str)
                        .unwrap_or_else(|| self.store.tag(id));
                    let enabled = new.flag("enabled", false);
                    self.host.set_extension_enabled(&root, name, enabled);
                    Some(UpdateAction::ExtensionToggled)
                }
                _ => self
                    .replace(id, new)?
                    .then_some(UpdateAction::Replaced),
            }
        };

        self.store.set_props(id, new.clone());
        if let Some(action) = action {
            self.tracer.update_committed(&UpdateCommittedEvent {
                instance: id,
                action,
            });
        }
        Ok(())
    }

    /// Moves and opens or closes a decoration in place.
    fn update_decoration(&mut self, id: InstanceId, root: &H::Handle, new: &Props) {
        let handle = self.store.handle(id).clone();
        if let Some(at) = new.latlng("latlng") {
            self.host.set_decoration_position(&handle, at);
        }
        let source = match self.store.parent(id) {
            Some(p) if self.store.category(p) != Category::Root => self.store.handle(p).clone(),
            _ => root.clone(),
        };
        if new.flag("isOpen", false) {
            self.host.open_decoration(&handle, &source);
        } else {
            self.host.close_decoration(&handle);
        }
    }

    /// Replaces the host object of a structural instance.
    ///
    /// Returns `false` without touching the host if the instance is not
    /// attached anywhere.
    fn replace(&mut self, id: InstanceId, new: &Props) -> Result<bool, Error> {
        let Some(parent) = self.store.parent(id) else {
            return Ok(false);
        };
        let kind = self.store.kind(id);
        let tag = String::from(self.store.tag(id));
        let container = self.store.container(id);
        let parent_handle = self.store.handle(parent).clone();
        let old = self.store.handle(id).clone();
        let is_group = kind.category().is_group();

        let fresh = self.build(&tag, kind, new, container)?;
        if is_group {
            for member in self.host.group_members(&old) {
                self.host.remove(&old, &member);
                self.host.add(&fresh, &member);
            }
        }
        self.wire_listeners(&fresh, new);

        if let Some(state) = self.host.capture_state(&old) {
            self.host.restore_state(&fresh, state);
        }

        let structural = self.attachment(parent, id) == Attachment::Structural;
        if structural {
            self.host.add(&parent_handle, &fresh);
            let moved = order::reorder(&mut self.host, &fresh, &old);
            self.trace_reordered(id, None, moved);
        }

        for decoration in Decoration::ALL {
            self.rebind(&old, &fresh, decoration);
        }

        // A group's members were moved out above, so removing the old group
        // no longer takes anything off the map.
        if structural {
            self.host.remove(&parent_handle, &old);
        }
        self.host.release(&old);
        self.store.set_handle(id, fresh);
        Ok(true)
    }

    fn rebind(&mut self, old: &H::Handle, fresh: &H::Handle, decoration: Decoration) {
        let Some(bound) = self.host.decoration(old, decoration) else {
            return;
        };
        let was_open = self.host.is_open(&bound);
        self.host.unbind_decoration(old, decoration);
        self.host.bind_decoration(fresh, &bound, decoration);
        if was_open {
            self.host.open_decoration(&bound, fresh);
        }
    }
}
