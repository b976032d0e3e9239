// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container sessions.
//!
//! Every root container the driving framework renders into gets one
//! [`Session`]: the live root, the root host object, and the content embedder
//! for that container. Sessions are created by explicit registration and live
//! until explicitly released; nothing is created lazily on lookup.

use alloc::collections::BTreeMap;
use core::fmt;

use crate::host::{ContentEmbedder, MapHost};
use crate::instance::{ContainerId, InstanceId};

/// Reconciler state for one root container.
pub struct Session<H: MapHost> {
    container: ContainerId,
    pub(crate) root: Option<InstanceId>,
    pub(crate) root_handle: Option<H::Handle>,
    pub(crate) embedder: Option<ContentEmbedder<H::Surface>>,
}

impl<H: MapHost> Session<H> {
    fn new(container: ContainerId) -> Self {
        Self {
            container,
            root: None,
            root_handle: None,
            embedder: None,
        }
    }

    /// Returns the container this session belongs to.
    #[must_use]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Returns the root instance, once created.
    #[must_use]
    pub fn root(&self) -> Option<InstanceId> {
        self.root
    }

    /// Returns the live root host object, once created.
    #[must_use]
    pub fn root_handle(&self) -> Option<&H::Handle> {
        self.root_handle.as_ref()
    }

    /// Returns the active content embedder.
    #[must_use]
    pub fn embedder(&self) -> Option<&ContentEmbedder<H::Surface>> {
        self.embedder.as_ref()
    }
}

impl<H: MapHost> fmt::Debug for Session<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("container", &self.container)
            .field("root", &self.root)
            .field("root_handle", &self.root_handle)
            .field("embedder", &self.embedder.is_some())
            .finish()
    }
}

/// Maps root containers to their sessions.
pub struct SessionRegistry<H: MapHost> {
    sessions: BTreeMap<ContainerId, Session<H>>,
}

impl<H: MapHost> Default for SessionRegistry<H> {
    fn default() -> Self {
        Self {
            sessions: BTreeMap::new(),
        }
    }
}

impl<H: MapHost> fmt::Debug for SessionRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sessions.values()).finish()
    }
}

impl<H: MapHost> SessionRegistry<H> {
    /// Registers `container`, returning its session.
    ///
    /// Idempotent: an existing session is returned as-is, except that a
    /// supplied `embedder` replaces the active one.
    pub fn register(
        &mut self,
        container: ContainerId,
        embedder: Option<ContentEmbedder<H::Surface>>,
    ) -> &mut Session<H> {
        let session = self
            .sessions
            .entry(container)
            .or_insert_with(|| Session::new(container));
        if embedder.is_some() {
            session.embedder = embedder;
        }
        session
    }

    /// Returns the session for `container`.
    #[must_use]
    pub fn get(&self, container: ContainerId) -> Option<&Session<H>> {
        self.sessions.get(&container)
    }

    /// Returns the session for `container`, mutably.
    pub fn get_mut(&mut self, container: ContainerId) -> Option<&mut Session<H>> {
        self.sessions.get_mut(&container)
    }

    /// Drops the session for `container`, returning it.
    pub fn release(&mut self, container: ContainerId) -> Option<Session<H>> {
        self.sessions.remove(&container)
    }

    /// Returns the number of registered containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns whether no container is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
