// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal DOM-like element tree.
//!
//! Elements live in a slot arena addressed by [`ElementId`]. Each element
//! knows its parent and its ordered children, which is all the ordering
//! engine needs: a visual element and its immediate container.

use core::fmt;

use kurbo::Size;

/// Handle to an element in a [`Dom`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub(crate) u32);

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

#[derive(Debug)]
struct Element {
    name: &'static str,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    client_size: Option<Size>,
}

/// Slot arena of elements.
#[derive(Debug, Default)]
pub(crate) struct Dom {
    elements: Vec<Option<Element>>,
}

impl Dom {
    /// Creates a detached element.
    pub(crate) fn create(&mut self, name: &'static str) -> ElementId {
        let id = ElementId(u32::try_from(self.elements.len()).unwrap_or(u32::MAX));
        self.elements.push(Some(Element {
            name,
            parent: None,
            children: Vec::new(),
            client_size: None,
        }));
        id
    }

    /// Appends `child` as the last child of `parent`, moving it if it is
    /// attached elsewhere.
    pub(crate) fn append(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Moves `element` to immediately precede `before` in `before`'s parent.
    pub(crate) fn insert_before(&mut self, element: ElementId, before: ElementId) {
        let Some(parent) = self.parent(before) else {
            return;
        };
        self.detach(element);
        if let Some(p) = self.get_mut(parent) {
            let at = p
                .children
                .iter()
                .position(|&c| c == before)
                .unwrap_or(p.children.len());
            p.children.insert(at, element);
        }
        if let Some(e) = self.get_mut(element) {
            e.parent = Some(parent);
        }
    }

    /// Detaches `element` from its parent.
    pub(crate) fn detach(&mut self, element: ElementId) {
        let Some(parent) = self.parent(element) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != element);
        }
        if let Some(e) = self.get_mut(element) {
            e.parent = None;
        }
    }

    /// Detaches and frees `element` and everything below it.
    pub(crate) fn remove(&mut self, element: ElementId) {
        self.detach(element);
        let children = self.children(element).to_vec();
        for child in children {
            self.remove(child);
        }
        if let Some(slot) = self.elements.get_mut(element.0 as usize) {
            *slot = None;
        }
    }

    /// Returns the parent of `element`.
    #[must_use]
    pub(crate) fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.get(element).and_then(|e| e.parent)
    }

    /// Returns the children of `element`, in order.
    #[must_use]
    pub(crate) fn children(&self, element: ElementId) -> &[ElementId] {
        self.get(element).map_or(&[], |e| &e.children)
    }

    /// Returns the tag name of `element`, or `None` once it was removed.
    #[must_use]
    pub(crate) fn name(&self, element: ElementId) -> Option<&'static str> {
        self.get(element).map(|e| e.name)
    }

    /// Returns the measured size of `element`.
    #[must_use]
    pub(crate) fn client_size(&self, element: ElementId) -> Option<Size> {
        self.get(element).and_then(|e| e.client_size)
    }

    /// Sets the measured size of `element`.
    pub(crate) fn set_client_size(&mut self, element: ElementId, size: Option<Size>) {
        if let Some(e) = self.get_mut(element) {
            e.client_size = size;
        }
    }

    fn get(&self, element: ElementId) -> Option<&Element> {
        self.elements.get(element.0 as usize)?.as_ref()
    }

    fn get_mut(&mut self, element: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(element.0 as usize)?.as_mut()
    }
}
