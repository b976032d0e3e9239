// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciler: host adapter driven by a declarative UI framework.
//!
//! [`Reconciler`] owns the host, the instance store, and the per-container
//! sessions. The driving framework calls one operation per lifecycle event:
//!
//! | Phase  | Operation |
//! |--------|-----------|
//! | render | [`create_instance`](Reconciler::create_instance), [`append_initial_child`](Reconciler::append_initial_child), [`finalize_initial_children`](Reconciler::finalize_initial_children), [`prepare_update`](Reconciler::prepare_update) |
//! | commit | [`append_child`](Reconciler::append_child), [`insert_before`](Reconciler::insert_before), [`remove_child`](Reconciler::remove_child), [`remove_child_from_container`](Reconciler::remove_child_from_container), [`commit_update`](Reconciler::commit_update), [`commit_mount`](Reconciler::commit_mount) |
//!
//! The operations themselves live next to the engine they belong to:
//! construction in `factory`, wiring in `attach`, diffing and replacement in
//! `update`, commit-phase activation in `lifecycle`, and sibling order in
//! `order`.

use alloc::vec::Vec;

#[cfg(feature = "trace")]
use alloc::boxed::Box;

use crate::config::ReconcilerConfig;
use crate::error::Error;
use crate::host::{ContentEmbedder, MapHost};
use crate::instance::{ContainerId, InstanceId, InstanceStore, Lifecycle};
use crate::kind::{BuiltinKind, Category, Kind};
use crate::props::Props;
use crate::session::{Session, SessionRegistry};
use crate::size::{self, SizeHints, SizeResolution};
use crate::trace::{SizeWarningEvent, Tracer};

#[cfg(feature = "trace")]
use crate::trace::TraceSink;

/// Keeps a live graph of host objects in sync with a declarative node tree.
pub struct Reconciler<H: MapHost> {
    pub(crate) host: H,
    pub(crate) store: InstanceStore<H::Handle>,
    pub(crate) sessions: SessionRegistry<H>,
    pub(crate) config: ReconcilerConfig,
    pub(crate) tracer: Tracer,
}

impl<H: MapHost + core::fmt::Debug> core::fmt::Debug for Reconciler<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reconciler")
            .field("host", &self.host)
            .field("live_instances", &self.store.live_count())
            .field("sessions", &self.sessions)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<H: MapHost> Reconciler<H> {
    /// Creates a reconciler over `host` with the default configuration.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::with_config(host, ReconcilerConfig::default())
    }

    /// Creates a reconciler over `host` with the given configuration.
    #[must_use]
    pub fn with_config(host: H, config: ReconcilerConfig) -> Self {
        Self {
            host,
            store: InstanceStore::new(),
            sessions: SessionRegistry::default(),
            config,
            tracer: Tracer::none(),
        }
    }

    /// Installs a trace sink, replacing any previous one.
    #[cfg(feature = "trace")]
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    // -- Sessions --

    /// Registers `container`, making it available to
    /// [`create_instance`](Self::create_instance).
    ///
    /// Idempotent. A supplied `embedder` becomes the container's active
    /// content embedder.
    pub fn register(
        &mut self,
        container: ContainerId,
        embedder: Option<ContentEmbedder<H::Surface>>,
    ) -> &Session<H> {
        self.sessions.register(container, embedder)
    }

    /// Returns the session of `container`.
    #[must_use]
    pub fn session(&self, container: ContainerId) -> Option<&Session<H>> {
        self.sessions.get(container)
    }

    /// Releases the session of `container`.
    ///
    /// A root still mounted in the container is torn down first. Releasing an
    /// unknown container is a no-op.
    pub fn release(&mut self, container: ContainerId) {
        let root = self.sessions.get(container).and_then(Session::root);
        if let Some(root) = root.filter(|&r| self.store.is_alive(r)) {
            self.teardown_root(container, root);
        }
        self.sessions.release(container);
    }

    // -- Instance queries --

    /// Returns the host object an instance currently owns.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn public_instance(&self, id: InstanceId) -> &H::Handle {
        self.store.handle(id)
    }

    /// Returns whether `id` refers to a live instance.
    #[must_use]
    pub fn is_alive(&self, id: InstanceId) -> bool {
        self.store.is_alive(id)
    }

    /// Returns the kind tag of an instance.
    #[must_use]
    pub fn tag(&self, id: InstanceId) -> &str {
        self.store.tag(id)
    }

    /// Returns the resolved kind of an instance.
    #[must_use]
    pub fn kind(&self, id: InstanceId) -> Kind {
        self.store.kind(id)
    }

    /// Returns the category of an instance.
    #[must_use]
    pub fn category(&self, id: InstanceId) -> Category {
        self.store.category(id)
    }

    /// Returns the parent of an instance.
    #[must_use]
    pub fn parent(&self, id: InstanceId) -> Option<InstanceId> {
        self.store.parent(id)
    }

    /// Returns the children of an instance, in order.
    #[must_use]
    pub fn children(&self, id: InstanceId) -> Vec<InstanceId> {
        self.store.children(id).collect()
    }

    /// Returns the props snapshot of an instance.
    #[must_use]
    pub fn props(&self, id: InstanceId) -> &Props {
        self.store.props(id)
    }

    /// Returns the lifecycle state of an instance.
    #[must_use]
    pub fn lifecycle(&self, id: InstanceId) -> Lifecycle {
        self.store.lifecycle(id)
    }

    /// Returns whether prop changes on `id` may replace its host object.
    #[must_use]
    pub fn is_effectively_mutable(&self, id: InstanceId) -> bool {
        self.store.effective_mutable(id)
    }

    /// Returns the number of live instances across all containers.
    #[must_use]
    pub fn live_instances(&self) -> usize {
        self.store.live_count()
    }

    // -- Sizing --

    /// Sizes the root container of `container` from `hints` and revalidates
    /// the root.
    ///
    /// An undersized parent is reported through the tracer and otherwise
    /// used as-is.
    pub fn size_container(
        &mut self,
        container: ContainerId,
        hints: &SizeHints,
    ) -> Result<SizeResolution, Error> {
        let session = self
            .sessions
            .get(container)
            .ok_or(Error::SessionNotFound { container })?;
        let root = session
            .root_handle
            .clone()
            .ok_or_else(|| Error::RootNotFound {
                container,
                kind: BuiltinKind::Map.tag().into(),
                category: Category::Root,
            })?;

        let resolution = size::resolve(hints, self.config.min_container_extent)?;
        if let Some(parent) = resolution.undersized_parent {
            self.tracer.size_warning(&SizeWarningEvent {
                container,
                width: parent.width,
                height: parent.height,
            });
        }
        self.host.resize_container(&root, resolution.size);
        self.host.invalidate_size(&root);
        Ok(resolution)
    }
}
