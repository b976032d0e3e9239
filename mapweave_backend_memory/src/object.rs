// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host object records.

use std::collections::BTreeMap;
use std::fmt;

use mapweave_core::instance::ContainerId;
use mapweave_core::kind::{BuiltinKind, Capability, Decoration};
use mapweave_core::props::{Callback, ClassRef, LatLng, PropMap, PropValue};

use crate::dom::ElementId;

/// Handle to a host object in a [`MemoryHost`](crate::MemoryHost).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub(crate) u32);

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// An embedding surface handed to the content embedder.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub(crate) u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

/// What a host object was constructed as.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKind {
    /// A map root mounted into a container.
    Root(ContainerId),
    /// A built-in object.
    Builtin(BuiltinKind),
    /// A third-party object built from a class reference.
    Extension {
        /// Its capability family.
        capability: Capability,
        /// The class it was built from.
        class: ClassRef,
    },
}

impl ObjectKind {
    pub(crate) fn is_group(&self) -> bool {
        matches!(
            self,
            Self::Builtin(BuiltinKind::LayerGroup | BuiltinKind::FeatureGroup)
        )
    }

    pub(crate) fn is_vector(&self) -> bool {
        matches!(
            self,
            Self::Builtin(
                BuiltinKind::Rectangle
                    | BuiltinKind::Polygon
                    | BuiltinKind::Polyline
                    | BuiltinKind::Circle
                    | BuiltinKind::CircleMarker
                    | BuiltinKind::GeoJson
            )
        )
    }

    /// The pane an object of this kind renders into, if it renders at all.
    pub(crate) fn pane(&self) -> Option<Pane> {
        match self {
            Self::Root(_) => None,
            Self::Builtin(kind) => match kind {
                BuiltinKind::Image | BuiltinKind::Video | BuiltinKind::Svg => Some(Pane::Overlay),
                BuiltinKind::Tiles | BuiltinKind::TilesWms | BuiltinKind::GridLayer => {
                    Some(Pane::Tile)
                }
                BuiltinKind::Marker => Some(Pane::Marker),
                _ if self.is_vector() => Some(Pane::Vector),
                _ => None,
            },
            Self::Extension { capability, .. } => match capability {
                Capability::Layer => Some(Pane::Overlay),
                Capability::Control => Some(Pane::Control),
                Capability::Handler => None,
            },
        }
    }
}

/// A rendering pane of a root container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pane {
    /// Raster tiles.
    Tile,
    /// Image-like overlays and custom layers.
    Overlay,
    /// The shared vector surface inside the overlay pane.
    Vector,
    /// Markers.
    Marker,
    /// Control corner.
    Control,
}

/// Elements making up a root container.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Panes {
    pub(crate) page: ElementId,
    pub(crate) container: ElementId,
    pub(crate) tile: ElementId,
    pub(crate) overlay: ElementId,
    pub(crate) vector: ElementId,
    pub(crate) marker: ElementId,
    pub(crate) control: ElementId,
}

impl Panes {
    pub(crate) fn get(&self, pane: Pane) -> ElementId {
        match pane {
            Pane::Tile => self.tile,
            Pane::Overlay => self.overlay,
            Pane::Vector => self.vector,
            Pane::Marker => self.marker,
            Pane::Control => self.control,
        }
    }
}

/// A host object and everything the host tracks about it.
#[derive(Debug)]
pub(crate) struct Object {
    pub(crate) kind: ObjectKind,
    /// Constructor arguments, flattened options, and setter values.
    pub(crate) attributes: PropMap,
    /// Structural collection (root or group).
    pub(crate) members: Vec<ObjectId>,
    pub(crate) decorations: [Option<ObjectId>; 2],
    pub(crate) bound_to: Option<ObjectId>,
    pub(crate) open_on: Option<ObjectId>,
    pub(crate) position: Option<LatLng>,
    pub(crate) content: Option<SurfaceId>,
    pub(crate) listeners: Vec<(String, Callback)>,
    /// Decorations opened by clicks on this root, with their fixed anchor.
    pub(crate) click_bindings: Vec<(ObjectId, Option<LatLng>)>,
    pub(crate) extensions: BTreeMap<String, (ObjectId, bool)>,
    pub(crate) state: Option<PropValue>,
    pub(crate) element: Option<ElementId>,
    /// Root this object is currently rendered on.
    pub(crate) map: Option<ObjectId>,
    pub(crate) panes: Option<Panes>,
    pub(crate) invalidations: u32,
    pub(crate) released: bool,
    pub(crate) destroyed: bool,
}

impl Object {
    pub(crate) fn new(kind: ObjectKind, attributes: PropMap) -> Self {
        Self {
            kind,
            attributes,
            members: Vec::new(),
            decorations: [None, None],
            bound_to: None,
            open_on: None,
            position: None,
            content: None,
            listeners: Vec::new(),
            click_bindings: Vec::new(),
            extensions: BTreeMap::new(),
            state: None,
            element: None,
            map: None,
            panes: None,
            invalidations: 0,
            released: false,
            destroyed: false,
        }
    }
}

pub(crate) const fn slot(kind: Decoration) -> usize {
    match kind {
        Decoration::Popup => 0,
        Decoration::Tooltip => 1,
    }
}

/// Flattens constructor arguments: entries of `options` become top-level
/// attributes, everything else is kept under its own name.
pub(crate) fn flatten(args: &PropMap) -> PropMap {
    let mut attributes = PropMap::new();
    for (name, value) in args {
        match (name.as_str(), value) {
            ("options", PropValue::Map(options)) => {
                attributes.extend(options.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            _ => {
                attributes.insert(name.clone(), value.clone());
            }
        }
    }
    attributes
}
