// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fatal reconciler errors.
//!
//! Every variant signals either a configuration defect on the caller's side
//! or a lifecycle bug in the driving framework. None of them are retried or
//! recovered inside the core; they are surfaced to the caller as-is.

use alloc::string::String;

use crate::instance::ContainerId;
use crate::kind::Category;

/// Errors returned by [`Reconciler`](crate::reconciler::Reconciler) operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The node kind is neither built in nor declared through an extension
    /// suffix.
    #[error(
        "unknown node kind `{kind}`; custom kinds must end with a recognized suffix \
         such as `Layer`, `Control` or `Handler`"
    )]
    UnknownKind {
        /// The offending kind tag.
        kind: String,
    },

    /// An extension kind was declared without a `class` prop.
    #[error("extension kind `{kind}` has no `class` prop to construct it from")]
    MissingExtensionClass {
        /// The extension kind tag.
        kind: String,
    },

    /// No session is registered for the container.
    #[error("no session registered for {container:?}")]
    SessionNotFound {
        /// The container that was looked up.
        container: ContainerId,
    },

    /// A registered container has no live root object.
    #[error(
        "no root object for {container:?} while updating instance of kind `{kind}` \
         and category `{category}`"
    )]
    RootNotFound {
        /// The container whose root was looked up.
        container: ContainerId,
        /// Kind tag of the instance being updated.
        kind: String,
        /// Category of the instance being updated.
        category: Category,
    },

    /// The sizing collaborator could not find a sized ancestor.
    #[error(
        "unable to determine the container size: no explicit size, no bounds, \
         and no sized parent element was found"
    )]
    UnsizedContainer,
}
