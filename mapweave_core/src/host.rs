// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for mapping-library integrations.
//!
//! Mapweave never draws anything itself. Everything visible is done by an
//! external, imperative *host* mapping library, reached through the
//! [`MapHost`] trait. The trait is a capability set rather than a class
//! hierarchy:
//!
//! - **Construction** — build a root from a container, a built-in object from
//!   its constructor arguments, or an extension object from a class
//!   reference.
//! - **Structural collections** — add and remove objects to and from the root
//!   or a group.
//! - **Decorations** — bind popups and tooltips onto objects, position them,
//!   and open or close them.
//! - **Root extensions** — register named handlers on the root and switch
//!   them on or off.
//! - **Optional capabilities** — state capture/restore across a replace and
//!   a queryable visual element for best-effort reordering. Both default to
//!   "unsupported".
//!
//! # Crate boundaries
//!
//! `mapweave_core` owns the instance model and this contract. Backend crates
//! depend on `mapweave_core` and wrap a concrete mapping library; the
//! in-memory backend doubles as the test host.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::instance::ContainerId;
use crate::kind::{BuiltinKind, Capability, Decoration};
use crate::props::{Callback, ClassRef, LatLng, Node, PropMap, PropValue};
use crate::size::ContainerSize;

/// Renders nested declarative content into a plain embedding surface.
///
/// Supplied once per root container by the driving framework and invoked
/// whenever a decoration or an extension needs child content rendered.
pub type ContentEmbedder<S> = Rc<dyn Fn(&[Node], &S)>;

/// Capability set of the external mapping library.
///
/// Methods take `&mut self` where they mutate host state. Object handles are
/// cheap, clonable references; the host keeps the objects themselves.
pub trait MapHost {
    /// Reference to a host object (root, layer, group, control, handler,
    /// decoration).
    type Handle: Clone + PartialEq + Debug;
    /// A plain surface nested content can be embedded into.
    type Surface: Debug;
    /// A visual element in the host's rendering tree.
    type Element: Clone + PartialEq + Debug;

    // -- Construction --

    /// Creates the root object inside `container`.
    fn create_root(&mut self, container: ContainerId, options: &PropMap) -> Self::Handle;

    /// Constructs a built-in object from its constructor arguments.
    ///
    /// `args` holds only the props listed in
    /// [`BuiltinKind::constructor_args`] that were present.
    fn construct(&mut self, kind: BuiltinKind, args: &PropMap) -> Self::Handle;

    /// Constructs a third-party object from a class reference.
    ///
    /// `params` are the constructor parameters carried in the node's
    /// `params` prop. The embedder is passed through so the extension can
    /// render `children` into a surface of its own.
    fn construct_extension(
        &mut self,
        capability: Capability,
        class: &ClassRef,
        params: &PropMap,
        children: &[Node],
        embedder: Option<&ContentEmbedder<Self::Surface>>,
    ) -> Self::Handle;

    /// Creates a fresh embedding surface.
    fn create_surface(&mut self) -> Self::Surface;

    /// Makes `surface` the content of a decoration.
    fn set_content(&mut self, decoration: &Self::Handle, surface: &Self::Surface);

    // -- Props and events --

    /// Applies a single prop through the object's setter.
    ///
    /// Returns `false` if the object has no setter for `name`; the prop is
    /// then ignored.
    fn set_prop(&mut self, object: &Self::Handle, name: &str, value: &PropValue) -> bool;

    /// Subscribes `callback` to `event` on `object`.
    fn listen(&mut self, object: &Self::Handle, event: &str, callback: Callback);

    // -- Structural collections --

    /// Adds `object` to the structural collection of `collection` (a root or
    /// a group). Adding an object that is already present is a no-op.
    fn add(&mut self, collection: &Self::Handle, object: &Self::Handle);

    /// Removes `object` from the structural collection of `collection`.
    ///
    /// Removing a group removes its members from the rendering, not the
    /// group object itself.
    fn remove(&mut self, collection: &Self::Handle, object: &Self::Handle);

    /// Returns the current members of a group.
    fn group_members(&self, group: &Self::Handle) -> Vec<Self::Handle>;

    // -- Decorations --

    /// Binds `decoration` onto `target`, replacing any bound decoration of
    /// the same kind.
    fn bind_decoration(
        &mut self,
        target: &Self::Handle,
        decoration: &Self::Handle,
        kind: Decoration,
    );

    /// Unbinds the decoration of `kind` from `target`, returning it.
    fn unbind_decoration(
        &mut self,
        target: &Self::Handle,
        kind: Decoration,
    ) -> Option<Self::Handle>;

    /// Returns the decoration of `kind` bound to `target`.
    fn decoration(&self, target: &Self::Handle, kind: Decoration) -> Option<Self::Handle>;

    /// Moves a decoration to `at`.
    fn set_decoration_position(&mut self, decoration: &Self::Handle, at: LatLng);

    /// Opens a decoration on `source` (the root or the decorated object).
    fn open_decoration(&mut self, decoration: &Self::Handle, source: &Self::Handle);

    /// Closes a decoration.
    fn close_decoration(&mut self, decoration: &Self::Handle);

    /// Returns whether a decoration is open.
    fn is_open(&self, decoration: &Self::Handle) -> bool;

    /// Opens `decoration` on `root` whenever the root is clicked, at `anchor`
    /// if given or at the click location otherwise.
    fn open_on_click(
        &mut self,
        root: &Self::Handle,
        decoration: &Self::Handle,
        anchor: Option<LatLng>,
    );

    /// Stops opening `decoration` on clicks of `root`.
    fn unbind_on_click(&mut self, root: &Self::Handle, decoration: &Self::Handle);

    // -- Root --

    /// Registers `extension` on `root` under `name`.
    fn add_extension(&mut self, root: &Self::Handle, name: &str, extension: &Self::Handle);

    /// Enables or disables the named root extension.
    fn set_extension_enabled(&mut self, root: &Self::Handle, name: &str, enabled: bool);

    /// Merges `options` into the live root's options.
    fn merge_options(&mut self, root: &Self::Handle, options: &PropMap);

    /// Forces the root to re-measure its container.
    fn invalidate_size(&mut self, root: &Self::Handle);

    /// Tears the root down, detaching everything it renders.
    fn destroy_root(&mut self, root: &Self::Handle);

    // -- Optional capabilities --

    /// Captures incidental state to carry across a replace.
    fn capture_state(&self, object: &Self::Handle) -> Option<PropValue> {
        _ = object;
        None
    }

    /// Restores state captured by [`capture_state`](Self::capture_state).
    fn restore_state(&mut self, object: &Self::Handle, state: PropValue) {
        _ = (object, state);
    }

    /// Returns the object's visual element, if it exposes one.
    fn visual_element(&self, object: &Self::Handle) -> Option<Self::Element> {
        _ = object;
        None
    }

    /// Returns the immediate container of a visual element.
    fn element_parent(&self, element: &Self::Element) -> Option<Self::Element> {
        _ = element;
        None
    }

    /// Moves `element` to immediately precede `before` within their shared
    /// container.
    fn move_before(&mut self, element: &Self::Element, before: &Self::Element) {
        _ = (element, before);
    }

    /// Releases a handle the core no longer references.
    fn release(&mut self, object: &Self::Handle) {
        _ = object;
    }

    /// Calls `callback` once the root is ready.
    fn when_ready(&mut self, root: &Self::Handle, callback: Callback) {
        _ = (root, callback);
    }

    /// Applies a resolved container size to the root's container.
    fn resize_container(&mut self, root: &Self::Handle, size: ContainerSize) {
        _ = (root, size);
    }
}
