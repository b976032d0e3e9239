// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for reconciliation.
//!
//! This module provides a [`TraceSink`] trait with one method per reconciler
//! event. All method bodies default to no-ops, so implementing only the events
//! you care about is fine.
//!
//! [`Tracer`] wraps an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

#[cfg(feature = "trace")]
use alloc::boxed::Box;

use crate::attach::Attachment;
use crate::instance::{ContainerId, InstanceId};
use crate::kind::{Category, Kind};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What `prepare_update` decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateOutcome {
    /// The instance is effectively immutable; props were not compared.
    SkippedImmutable,
    /// Old and new props are structurally equal.
    Unchanged,
    /// This many props differ.
    Changed(usize),
}

/// How `commit_update` applied a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateAction {
    /// A decoration was updated in place.
    InPlace,
    /// Root options were merged and the root revalidated.
    RootMerged,
    /// A root extension was switched on or off.
    ExtensionToggled,
    /// A new host object replaced the old one.
    Replaced,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after the factory built an instance.
#[derive(Clone, Copy, Debug)]
pub struct InstanceCreatedEvent {
    /// The new instance.
    pub instance: InstanceId,
    /// The container it was created for.
    pub container: ContainerId,
    /// Its resolved kind.
    pub kind: Kind,
    /// Its category.
    pub category: Category,
}

/// Emitted after a child was wired into its parent.
#[derive(Clone, Copy, Debug)]
pub struct AttachedEvent {
    /// The parent instance.
    pub parent: InstanceId,
    /// The attached child.
    pub child: InstanceId,
    /// The strategy used.
    pub attachment: Attachment,
}

/// Emitted after a child was removed from its parent or container.
#[derive(Clone, Copy, Debug)]
pub struct DetachedEvent {
    /// The former parent, or `None` for a root removed from its container.
    pub parent: Option<InstanceId>,
    /// The removed child.
    pub child: InstanceId,
}

/// Emitted when an instance reaches the committed state.
#[derive(Clone, Copy, Debug)]
pub struct CommittedEvent {
    /// The committed instance.
    pub instance: InstanceId,
}

/// Emitted after `prepare_update` ran.
#[derive(Clone, Copy, Debug)]
pub struct UpdatePreparedEvent {
    /// The instance being updated.
    pub instance: InstanceId,
    /// The decision.
    pub outcome: UpdateOutcome,
}

/// Emitted after `commit_update` applied a change.
#[derive(Clone, Copy, Debug)]
pub struct UpdateCommittedEvent {
    /// The updated instance.
    pub instance: InstanceId,
    /// How the change was applied.
    pub action: UpdateAction,
}

/// Emitted after the ordering engine ran for an instance.
#[derive(Clone, Copy, Debug)]
pub struct ReorderedEvent {
    /// The instance that was to be moved.
    pub instance: InstanceId,
    /// The sibling it was to precede, or `None` when a replacement object
    /// was placed where its predecessor stood.
    pub before: Option<InstanceId>,
    /// Whether the visual element actually moved.
    pub moved: bool,
}

/// Emitted after a subtree was removed from the store.
#[derive(Clone, Copy, Debug)]
pub struct RemovedEvent {
    /// The subtree root.
    pub instance: InstanceId,
    /// Number of instance records released.
    pub released: usize,
}

/// Emitted when a root container fills a parent below the minimum extent.
#[derive(Clone, Copy, Debug)]
pub struct SizeWarningEvent {
    /// The affected container.
    pub container: ContainerId,
    /// Parent width in pixels.
    pub width: f64,
    /// Parent height in pixels.
    pub height: f64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the reconciler.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after an instance was created.
    fn on_instance_created(&mut self, e: &InstanceCreatedEvent) {
        _ = e;
    }

    /// Called after a child was attached.
    fn on_attached(&mut self, e: &AttachedEvent) {
        _ = e;
    }

    /// Called after a child was detached.
    fn on_detached(&mut self, e: &DetachedEvent) {
        _ = e;
    }

    /// Called when an instance is committed.
    fn on_committed(&mut self, e: &CommittedEvent) {
        _ = e;
    }

    /// Called after an update was prepared.
    fn on_update_prepared(&mut self, e: &UpdatePreparedEvent) {
        _ = e;
    }

    /// Called after an update was committed.
    fn on_update_committed(&mut self, e: &UpdateCommittedEvent) {
        _ = e;
    }

    /// Called after a reorder attempt.
    fn on_reordered(&mut self, e: &ReorderedEvent) {
        _ = e;
    }

    /// Called after a subtree was removed.
    fn on_removed(&mut self, e: &RemovedEvent) {
        _ = e;
    }

    /// Called when a container is undersized.
    fn on_size_warning(&mut self, e: &SizeWarningEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($(#[$doc:meta] $name:ident => $method:ident($event:ty);)*) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self, e: &$event) {
                #[cfg(feature = "trace")]
                if let Some(s) = &mut self.sink {
                    s.$method(e);
                }
                #[cfg(not(feature = "trace"))]
                {
                    _ = e;
                }
            }
        )*
    };
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[cfg(feature = "trace")]
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns whether a sink is installed.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    emit! {
        /// Emits an [`InstanceCreatedEvent`].
        instance_created => on_instance_created(InstanceCreatedEvent);
        /// Emits an [`AttachedEvent`].
        attached => on_attached(AttachedEvent);
        /// Emits a [`DetachedEvent`].
        detached => on_detached(DetachedEvent);
        /// Emits a [`CommittedEvent`].
        committed => on_committed(CommittedEvent);
        /// Emits an [`UpdatePreparedEvent`].
        update_prepared => on_update_prepared(UpdatePreparedEvent);
        /// Emits an [`UpdateCommittedEvent`].
        update_committed => on_update_committed(UpdateCommittedEvent);
        /// Emits a [`ReorderedEvent`].
        reordered => on_reordered(ReorderedEvent);
        /// Emits a [`RemovedEvent`].
        removed => on_removed(RemovedEvent);
        /// Emits a [`SizeWarningEvent`].
        size_warning => on_size_warning(SizeWarningEvent);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::BuiltinKind;

    fn sample_created() -> InstanceCreatedEvent {
        InstanceCreatedEvent {
            instance: InstanceId {
                idx: 3,
                generation: 0,
            },
            container: ContainerId(1),
            kind: Kind::Builtin(BuiltinKind::Marker),
            category: Category::Layer,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_instance_created(&sample_created());
        sink.on_size_warning(&SizeWarningEvent {
            container: ContainerId(0),
            width: 4.0,
            height: 4.0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.instance_created(&sample_created());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use alloc::vec::Vec;
        use core::cell::RefCell;

        struct RecordingSink {
            created: Rc<RefCell<Vec<u32>>>,
        }
        impl TraceSink for RecordingSink {
            fn on_instance_created(&mut self, e: &InstanceCreatedEvent) {
                self.created.borrow_mut().push(e.instance.index());
            }
        }

        let created = Rc::new(RefCell::new(Vec::new()));
        let mut tracer = Tracer::new(Box::new(RecordingSink {
            created: Rc::clone(&created),
        }));
        assert!(tracer.is_active());
        tracer.instance_created(&sample_created());
        assert_eq!(*created.borrow(), [3]);
    }
}
