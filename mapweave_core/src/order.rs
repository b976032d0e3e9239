// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordering engine: best-effort sibling order for visual elements.
//!
//! Hosts do not keep all object kinds on one rendering surface (vector
//! shapes may share one element while raster layers live in another), so
//! requested sibling order can only be reproduced when both objects expose a
//! visual element and those elements share their immediate container.
//! Everything else is a silent no-op.

use crate::host::MapHost;
use crate::instance::InstanceId;
use crate::reconciler::Reconciler;
use crate::trace::ReorderedEvent;

/// Moves `child`'s visual element to immediately precede `before`'s.
///
/// Returns whether anything moved.
pub fn reorder<H: MapHost + ?Sized>(host: &mut H, child: &H::Handle, before: &H::Handle) -> bool {
    let (Some(element), Some(before_element)) =
        (host.visual_element(child), host.visual_element(before))
    else {
        return false;
    };
    if element == before_element {
        return false;
    }
    match (host.element_parent(&element), host.element_parent(&before_element)) {
        (Some(a), Some(b)) if a == b => {
            host.move_before(&element, &before_element);
            true
        }
        _ => false,
    }
}

impl<H: MapHost> Reconciler<H> {
    pub(crate) fn trace_reordered(
        &mut self,
        instance: InstanceId,
        before: Option<InstanceId>,
        moved: bool,
    ) {
        self.tracer.reordered(&ReorderedEvent {
            instance,
            before,
            moved,
        });
    }
}
