// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The in-memory map host.

use std::fmt;

use kurbo::{Point, Size};
use mapweave_core::host::{ContentEmbedder, MapHost};
use mapweave_core::instance::ContainerId;
use mapweave_core::kind::{BuiltinKind, Capability, Decoration};
use mapweave_core::props::{Callback, ClassRef, Event, LatLng, Node, PropMap, PropValue};
use mapweave_core::size::{ContainerSize, SizeHints};

use crate::dom::{Dom, ElementId};
use crate::object::{Object, ObjectId, ObjectKind, Pane, Panes, SurfaceId, flatten, slot};

/// A mapping library kept entirely in memory.
///
/// Objects live in a flat arena addressed by [`ObjectId`]. Roots own a small
/// element tree (container, panes, a shared vector surface) so that sibling
/// order can be observed the way a browser would expose it. Nothing is ever
/// freed: released and destroyed objects stay inspectable.
#[derive(Default)]
pub struct MemoryHost {
    objects: Vec<Object>,
    dom: Dom,
    surfaces: u32,
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("objects_len", &self.objects.len())
            .field("surfaces", &self.surfaces)
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of objects ever constructed.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn insert(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(u32::try_from(self.objects.len()).unwrap_or(u32::MAX));
        self.objects.push(object);
        id
    }

    fn obj(&self, id: ObjectId) -> &Object {
        &self.objects[id.0 as usize]
    }

    fn obj_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.0 as usize]
    }

    // -- Rendering --

    /// Renders `id` (and, for groups, its members) on `root`.
    fn mount(&mut self, id: ObjectId, root: ObjectId) {
        self.obj_mut(id).map = Some(root);
        if self.obj(id).kind.is_group() {
            for member in self.obj(id).members.clone() {
                self.mount(member, root);
            }
            return;
        }
        let Some(pane) = self.obj(id).kind.pane() else {
            return;
        };
        let Some(panes) = self.obj(root).panes else {
            return;
        };
        let element = match self.obj(id).element {
            Some(element) => element,
            None => {
                let element = self.dom.create(element_name(pane));
                self.obj_mut(id).element = Some(element);
                element
            }
        };
        self.dom.append(panes.get(pane), element);
    }

    /// Takes `id` (and, for groups, its members) off the map.
    fn unmount(&mut self, id: ObjectId) {
        self.obj_mut(id).map = None;
        if self.obj(id).kind.is_group() {
            for member in self.obj(id).members.clone() {
                self.unmount(member);
            }
        }
        if let Some(element) = self.obj(id).element {
            self.dom.detach(element);
        }
    }

    /// Root a collection renders on: itself for a root, its map for a group.
    fn rendering_root(&self, collection: ObjectId) -> Option<ObjectId> {
        match self.obj(collection).kind {
            ObjectKind::Root(_) if !self.obj(collection).destroyed => Some(collection),
            ObjectKind::Root(_) => None,
            _ => self.obj(collection).map,
        }
    }

    // -- Inspection --

    /// Returns an attribute: a constructor argument, a flattened option, or
    /// a setter value.
    #[must_use]
    pub fn attribute(&self, object: ObjectId, name: &str) -> Option<&PropValue> {
        self.obj(object).attributes.get(name)
    }

    /// Returns what `object` was constructed as.
    #[must_use]
    pub fn object_kind(&self, object: ObjectId) -> &ObjectKind {
        &self.obj(object).kind
    }

    /// Returns the structural collection of a root or group.
    #[must_use]
    pub fn members(&self, collection: ObjectId) -> &[ObjectId] {
        &self.obj(collection).members
    }

    /// Returns whether `object` is currently rendered on a map.
    #[must_use]
    pub fn is_on_map(&self, object: ObjectId) -> bool {
        self.obj(object).map.is_some()
    }

    /// Returns the visual element of `object`, whether attached or not.
    #[must_use]
    pub fn element(&self, object: ObjectId) -> Option<ElementId> {
        self.obj(object).element
    }

    /// Returns the children of an element, in order.
    #[must_use]
    pub fn element_children(&self, element: ElementId) -> &[ElementId] {
        self.dom.children(element)
    }

    /// Returns the tag name of an element, or `None` once it was removed.
    #[must_use]
    pub fn element_name(&self, element: ElementId) -> Option<&'static str> {
        self.dom.name(element)
    }

    /// Returns the element of one of a root's panes.
    #[must_use]
    pub fn pane(&self, root: ObjectId, pane: Pane) -> Option<ElementId> {
        self.obj(root).panes.map(|p| p.get(pane))
    }

    /// Returns the position of a decoration.
    #[must_use]
    pub fn position(&self, decoration: ObjectId) -> Option<LatLng> {
        self.obj(decoration).position
    }

    /// Returns the object a decoration was last opened on.
    #[must_use]
    pub fn opened_on(&self, decoration: ObjectId) -> Option<ObjectId> {
        self.obj(decoration).open_on
    }

    /// Returns the object a decoration is bound to.
    #[must_use]
    pub fn bound_to(&self, decoration: ObjectId) -> Option<ObjectId> {
        self.obj(decoration).bound_to
    }

    /// Returns the embedding surface holding an object's content.
    #[must_use]
    pub fn content(&self, object: ObjectId) -> Option<SurfaceId> {
        self.obj(object).content
    }

    /// Returns whether the core released `object`.
    #[must_use]
    pub fn is_released(&self, object: ObjectId) -> bool {
        self.obj(object).released
    }

    /// Returns whether a root was destroyed.
    #[must_use]
    pub fn is_destroyed(&self, root: ObjectId) -> bool {
        self.obj(root).destroyed
    }

    /// Returns how often a root was asked to re-measure.
    #[must_use]
    pub fn invalidations(&self, root: ObjectId) -> u32 {
        self.obj(root).invalidations
    }

    /// Returns whether the named root extension exists and is enabled.
    #[must_use]
    pub fn extension_enabled(&self, root: ObjectId, name: &str) -> Option<bool> {
        self.obj(root).extensions.get(name).map(|&(_, on)| on)
    }

    /// Returns the object registered as the named root extension.
    #[must_use]
    pub fn extension(&self, root: ObjectId, name: &str) -> Option<ObjectId> {
        self.obj(root).extensions.get(name).map(|&(ext, _)| ext)
    }

    /// Returns the number of listeners on `object`, over all events.
    #[must_use]
    pub fn listener_count(&self, object: ObjectId) -> usize {
        self.obj(object).listeners.len()
    }

    /// Returns the root created for `container`, if it was not destroyed.
    #[must_use]
    pub fn root_of(&self, container: ContainerId) -> Option<ObjectId> {
        self.objects
            .iter()
            .rposition(|o| o.kind == ObjectKind::Root(container) && !o.destroyed)
            .and_then(|i| u32::try_from(i).ok())
            .map(ObjectId)
    }

    // -- Container geometry --

    /// Sets the client size of the element hosting a root's container.
    pub fn set_page_size(&mut self, root: ObjectId, size: Option<Size>) {
        if let Some(panes) = self.obj(root).panes {
            self.dom.set_client_size(panes.page, size);
        }
    }

    /// Returns the measured size of a root's container.
    #[must_use]
    pub fn container_size(&self, root: ObjectId) -> Option<Size> {
        self.obj(root)
            .panes
            .and_then(|p| self.dom.client_size(p.container))
    }

    /// Collects sizing hints for a root's container.
    ///
    /// A styled size comes from the root's `width` and `height` options;
    /// `max_bounds` are already-projected corners.
    #[must_use]
    pub fn size_hints(&self, root: ObjectId, max_bounds: Option<(Point, Point)>) -> SizeHints {
        let attributes = &self.obj(root).attributes;
        let dim = |name: &str| attributes.get(name).and_then(PropValue::as_f64);
        let style = match (dim("width"), dim("height")) {
            (Some(w), Some(h)) => Some(Size::new(w, h)),
            _ => None,
        };
        let parent = self
            .obj(root)
            .panes
            .and_then(|p| self.dom.client_size(p.page));
        SizeHints {
            style,
            max_bounds,
            parent,
        }
    }

    // -- Events --

    /// Fires `event` on `object`, calling every matching listener.
    pub fn fire(&self, object: ObjectId, event: &str, latlng: Option<LatLng>) {
        let listeners: Vec<Callback> = self
            .obj(object)
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, callback)| callback.clone())
            .collect();
        let event = Event {
            name: event.to_owned(),
            latlng,
        };
        for callback in listeners {
            callback.call(&event);
        }
    }

    /// Simulates a click on a root at `at`.
    ///
    /// Decorations bound through click-to-open open first, at their anchor
    /// or at `at`; then `click` listeners fire.
    pub fn click(&mut self, root: ObjectId, at: LatLng) {
        for (decoration, anchor) in self.obj(root).click_bindings.clone() {
            let dec = self.obj_mut(decoration);
            dec.position = Some(anchor.unwrap_or(at));
            dec.open_on = Some(root);
        }
        self.fire(root, "click", Some(at));
    }

    /// Sets the incidental state of `object` (scroll offsets, current
    /// frame, and the like).
    pub fn set_state(&mut self, object: ObjectId, state: PropValue) {
        self.obj_mut(object).state = Some(state);
    }

    /// Returns the incidental state of `object`.
    #[must_use]
    pub fn state(&self, object: ObjectId) -> Option<&PropValue> {
        self.obj(object).state.as_ref()
    }
}

fn element_name(pane: Pane) -> &'static str {
    match pane {
        Pane::Tile | Pane::Overlay | Pane::Marker | Pane::Control => "div",
        Pane::Vector => "path",
    }
}

fn is_decoration(kind: &ObjectKind) -> bool {
    matches!(
        kind,
        ObjectKind::Builtin(BuiltinKind::Popup | BuiltinKind::Tooltip)
    )
}

impl MapHost for MemoryHost {
    type Handle = ObjectId;
    type Surface = SurfaceId;
    type Element = ElementId;

    fn create_root(&mut self, container: ContainerId, options: &PropMap) -> ObjectId {
        let page = self.dom.create("body");
        let root_el = self.dom.create("div");
        let tile = self.dom.create("div");
        let overlay = self.dom.create("div");
        let vector = self.dom.create("svg");
        let marker = self.dom.create("div");
        let control = self.dom.create("div");
        self.dom.append(page, root_el);
        for pane in [tile, overlay, marker, control] {
            self.dom.append(root_el, pane);
        }
        self.dom.append(overlay, vector);

        let mut root = Object::new(ObjectKind::Root(container), options.clone());
        root.element = Some(root_el);
        root.panes = Some(Panes {
            page,
            container: root_el,
            tile,
            overlay,
            vector,
            marker,
            control,
        });
        self.insert(root)
    }

    fn construct(&mut self, kind: BuiltinKind, args: &PropMap) -> ObjectId {
        let mut object = Object::new(ObjectKind::Builtin(kind), flatten(args));
        if is_decoration(&object.kind) {
            object.position = args.get("latlng").and_then(PropValue::as_latlng);
        }
        self.insert(object)
    }

    fn construct_extension(
        &mut self,
        capability: Capability,
        class: &ClassRef,
        params: &PropMap,
        children: &[Node],
        embedder: Option<&ContentEmbedder<SurfaceId>>,
    ) -> ObjectId {
        let kind = ObjectKind::Extension {
            capability,
            class: class.clone(),
        };
        let id = self.insert(Object::new(kind, params.clone()));
        if let (false, Some(embed)) = (children.is_empty(), embedder) {
            let surface = self.create_surface();
            self.obj_mut(id).content = Some(surface);
            embed(children, &surface);
        }
        id
    }

    fn create_surface(&mut self) -> SurfaceId {
        self.surfaces += 1;
        SurfaceId(self.surfaces)
    }

    fn set_content(&mut self, decoration: &ObjectId, surface: &SurfaceId) {
        self.obj_mut(*decoration).content = Some(*surface);
    }

    fn set_prop(&mut self, object: &ObjectId, name: &str, value: &PropValue) -> bool {
        let obj = self.obj_mut(*object);
        let supported = match name {
            "opacity" | "zIndex" => !matches!(obj.kind, ObjectKind::Root(_)),
            "style" => obj.kind.is_vector(),
            "latlng" => matches!(
                obj.kind,
                ObjectKind::Builtin(
                    BuiltinKind::Marker
                        | BuiltinKind::Circle
                        | BuiltinKind::CircleMarker
                        | BuiltinKind::Popup
                        | BuiltinKind::Tooltip
                )
            ),
            "bounds" => matches!(
                obj.kind,
                ObjectKind::Builtin(
                    BuiltinKind::Image
                        | BuiltinKind::Video
                        | BuiltinKind::Svg
                        | BuiltinKind::Rectangle
                )
            ),
            "url" => matches!(
                obj.kind,
                ObjectKind::Builtin(BuiltinKind::Image | BuiltinKind::Tiles)
            ),
            _ => false,
        };
        if !supported {
            return false;
        }
        match (name, value) {
            ("style", PropValue::Map(style)) => {
                for (k, v) in style {
                    obj.attributes.insert(k.clone(), v.clone());
                }
            }
            ("latlng", PropValue::LatLng(at)) if is_decoration(&obj.kind) => {
                obj.position = Some(*at);
            }
            _ => {
                obj.attributes.insert(name.to_owned(), value.clone());
            }
        }
        true
    }

    fn listen(&mut self, object: &ObjectId, event: &str, callback: Callback) {
        self.obj_mut(*object).listeners.push((event.to_owned(), callback));
    }

    fn add(&mut self, collection: &ObjectId, object: &ObjectId) {
        let members = &mut self.obj_mut(*collection).members;
        if !members.contains(object) {
            members.push(*object);
        }
        if let Some(root) = self.rendering_root(*collection) {
            self.mount(*object, root);
        }
    }

    fn remove(&mut self, collection: &ObjectId, object: &ObjectId) {
        let members = &mut self.obj_mut(*collection).members;
        let before = members.len();
        members.retain(|m| m != object);
        if members.len() != before {
            self.unmount(*object);
        }
    }

    fn group_members(&self, group: &ObjectId) -> Vec<ObjectId> {
        self.obj(*group).members.clone()
    }

    fn bind_decoration(&mut self, target: &ObjectId, decoration: &ObjectId, kind: Decoration) {
        _ = self.unbind_decoration(target, kind);
        self.obj_mut(*target).decorations[slot(kind)] = Some(*decoration);
        self.obj_mut(*decoration).bound_to = Some(*target);
    }

    fn unbind_decoration(&mut self, target: &ObjectId, kind: Decoration) -> Option<ObjectId> {
        let decoration = self.obj_mut(*target).decorations[slot(kind)].take()?;
        let dec = self.obj_mut(decoration);
        dec.bound_to = None;
        dec.open_on = None;
        Some(decoration)
    }

    fn decoration(&self, target: &ObjectId, kind: Decoration) -> Option<ObjectId> {
        self.obj(*target).decorations[slot(kind)]
    }

    fn set_decoration_position(&mut self, decoration: &ObjectId, at: LatLng) {
        self.obj_mut(*decoration).position = Some(at);
    }

    fn open_decoration(&mut self, decoration: &ObjectId, source: &ObjectId) {
        let anchor = self
            .attribute(*source, "latlng")
            .and_then(PropValue::as_latlng);
        let dec = self.obj_mut(*decoration);
        dec.open_on = Some(*source);
        if dec.position.is_none() {
            dec.position = anchor;
        }
    }

    fn close_decoration(&mut self, decoration: &ObjectId) {
        self.obj_mut(*decoration).open_on = None;
    }

    fn is_open(&self, decoration: &ObjectId) -> bool {
        self.obj(*decoration).open_on.is_some()
    }

    fn open_on_click(&mut self, root: &ObjectId, decoration: &ObjectId, anchor: Option<LatLng>) {
        self.obj_mut(*root).click_bindings.push((*decoration, anchor));
    }

    fn unbind_on_click(&mut self, root: &ObjectId, decoration: &ObjectId) {
        self.obj_mut(*root).click_bindings.retain(|(bound, _)| bound != decoration);
    }

    fn add_extension(&mut self, root: &ObjectId, name: &str, extension: &ObjectId) {
        self.obj_mut(*root)
            .extensions
            .insert(name.to_owned(), (*extension, false));
        self.obj_mut(*extension).map = Some(*root);
    }

    fn set_extension_enabled(&mut self, root: &ObjectId, name: &str, enabled: bool) {
        if let Some(entry) = self.obj_mut(*root).extensions.get_mut(name) {
            entry.1 = enabled;
        }
    }

    fn merge_options(&mut self, root: &ObjectId, options: &PropMap) {
        let attributes = &mut self.obj_mut(*root).attributes;
        for (k, v) in options {
            attributes.insert(k.clone(), v.clone());
        }
    }

    fn invalidate_size(&mut self, root: &ObjectId) {
        self.obj_mut(*root).invalidations += 1;
    }

    fn destroy_root(&mut self, root: &ObjectId) {
        for member in self.obj(*root).members.clone() {
            self.unmount(member);
        }
        let bindings = std::mem::take(&mut self.obj_mut(*root).click_bindings);
        for (decoration, _) in bindings {
            self.close_decoration(&decoration);
        }
        let extensions = std::mem::take(&mut self.obj_mut(*root).extensions);
        for (extension, _) in extensions.into_values() {
            self.obj_mut(extension).map = None;
        }
        if let Some(panes) = self.obj(*root).panes {
            self.dom.remove(panes.page);
        }
        let obj = self.obj_mut(*root);
        obj.members.clear();
        obj.destroyed = true;
    }

    fn capture_state(&self, object: &ObjectId) -> Option<PropValue> {
        self.obj(*object).state.clone()
    }

    fn restore_state(&mut self, object: &ObjectId, state: PropValue) {
        self.obj_mut(*object).state = Some(state);
    }

    fn visual_element(&self, object: &ObjectId) -> Option<ElementId> {
        self.obj(*object)
            .element
            .filter(|&e| self.dom.parent(e).is_some())
    }

    fn element_parent(&self, element: &ElementId) -> Option<ElementId> {
        self.dom.parent(*element)
    }

    fn move_before(&mut self, element: &ElementId, before: &ElementId) {
        self.dom.insert_before(*element, *before);
    }

    fn release(&mut self, object: &ObjectId) {
        self.obj_mut(*object).released = true;
    }

    fn when_ready(&mut self, root: &ObjectId, callback: Callback) {
        // Containers are measured synchronously, so roots are ready at once.
        _ = root;
        callback.call(&Event {
            name: "ready".to_owned(),
            latlng: None,
        });
    }

    fn resize_container(&mut self, root: &ObjectId, size: ContainerSize) {
        let Some(panes) = self.obj(*root).panes else {
            return;
        };
        let measured = match size {
            ContainerSize::AsStyled => self.size_hints(*root, None).style,
            ContainerSize::Fixed(size) => Some(size),
            ContainerSize::FillParent => self.dom.client_size(panes.page),
        };
        self.dom.set_client_size(panes.container, measured);
    }
}
