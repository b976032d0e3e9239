// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance factory: builds host objects from node descriptors.
//!
//! Construction uses only the props present at the call and is free of
//! cross-instance side effects. Event listeners are not wired here; an
//! instance may be built speculatively and discarded before it is ever
//! attached, and such an instance must leave nothing observable behind.

use alloc::borrow::ToOwned;
use alloc::string::String;

use crate::error::Error;
use crate::host::MapHost;
use crate::instance::{ContainerId, InstanceId, Lifecycle};
use crate::kind::{BuiltinKind, Capability, Category, Kind};
use crate::props::{PropValue, Props};
use crate::reconciler::Reconciler;
use crate::trace::{InstanceCreatedEvent, RemovedEvent};

/// Props consumed by the core itself and never forwarded to host setters.
const RESERVED: &[&str] = &[
    "mutable", "isOpen", "whenReady", "class", "params", "name", "enabled",
];

impl<H: MapHost> Reconciler<H> {
    /// Builds an instance for a node of kind `tag` inside `container`.
    ///
    /// A root (`map`) instance becomes the container's session root.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownKind`] if `tag` is neither built in nor declared
    ///   through a configured extension suffix.
    /// - [`Error::SessionNotFound`] if `container` was never registered.
    /// - [`Error::MissingExtensionClass`] if an extension kind has no
    ///   `class` prop.
    pub fn create_instance(
        &mut self,
        container: ContainerId,
        tag: &str,
        props: Props,
    ) -> Result<InstanceId, Error> {
        let kind = Kind::resolve(tag, &self.config.extension_suffixes)?;
        if self.sessions.get(container).is_none() {
            return Err(Error::SessionNotFound { container });
        }

        let handle = self.build(tag, kind, &props, container)?;
        let id = self
            .store
            .create(tag.to_owned(), kind, props, container, handle.clone());

        if kind.category() == Category::Root {
            if let Some(session) = self.sessions.get_mut(container) {
                session.root = Some(id);
                session.root_handle = Some(handle);
            }
        }

        self.tracer.instance_created(&InstanceCreatedEvent {
            instance: id,
            container,
            kind,
            category: kind.category(),
        });
        Ok(id)
    }

    /// Drops an instance that was created but never attached.
    ///
    /// Its subtree of initial children goes with it. Apart from releasing
    /// handles (and destroying a speculative root) nothing reaches the host.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the instance has a parent.
    pub fn discard_instance(&mut self, id: InstanceId) {
        assert!(
            self.store.parent(id).is_none(),
            "cannot discard {id:?}: it is attached to a parent"
        );
        assert!(
            self.store.lifecycle(id) == Lifecycle::Constructed,
            "cannot discard {id:?}: it was already committed"
        );
        let container = self.store.container(id);
        if self.store.category(id) == Category::Root {
            self.teardown_root(container, id);
            return;
        }
        let released = self.store.remove_subtree(id);
        for (_, handle) in &released {
            self.host.release(handle);
        }
        self.tracer.removed(&RemovedEvent {
            instance: id,
            released: released.len(),
        });
    }

    /// Constructs the host object for a node.
    pub(crate) fn build(
        &mut self,
        tag: &str,
        kind: Kind,
        props: &Props,
        container: ContainerId,
    ) -> Result<H::Handle, Error> {
        let embedder = self
            .sessions
            .get(container)
            .and_then(|s| s.embedder.clone());

        let handle = match kind {
            Kind::Builtin(BuiltinKind::Map) => {
                self.host.create_root(container, &props.map_or_empty("options"))
            }
            Kind::Builtin(builtin) => {
                let args = builtin.constructor_args();
                let handle = self.host.construct(builtin, &props.pick(args));
                if builtin.decoration().is_some() {
                    let surface = self.host.create_surface();
                    self.host.set_content(&handle, &surface);
                    if let Some(embed) = &embedder {
                        embed(props.children(), &surface);
                    }
                    // Position is applied on attach and commit.
                    self.apply_setters(&handle, props, &[args, &["latlng"]]);
                } else {
                    self.apply_setters(&handle, props, &[args]);
                }
                handle
            }
            Kind::Extension(capability) => {
                let class = props
                    .get("class")
                    .and_then(PropValue::as_class)
                    .ok_or_else(|| Error::MissingExtensionClass {
                        kind: String::from(tag),
                    })?;
                let handle = self.host.construct_extension(
                    capability,
                    class,
                    &props.map_or_empty("params"),
                    props.children(),
                    embedder.as_ref(),
                );
                if capability == Capability::Layer {
                    self.apply_setters(&handle, props, &[]);
                }
                handle
            }
        };
        Ok(handle)
    }

    /// Applies every non-reserved, non-callback prop through host setters.
    ///
    /// Props without a setter are ignored.
    fn apply_setters(&mut self, handle: &H::Handle, props: &Props, skip: &[&[&str]]) {
        for (name, value) in props.values() {
            let name = name.as_str();
            if matches!(value, PropValue::Callback(_))
                || RESERVED.contains(&name)
                || skip.iter().any(|list| list.contains(&name))
            {
                continue;
            }
            _ = self.host.set_prop(handle, name, value);
        }
    }
}
