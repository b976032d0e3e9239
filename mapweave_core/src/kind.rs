// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kind taxonomy.
//!
//! Every node descriptor carries a kind tag. The tag resolves to a [`Kind`]
//! in two steps:
//!
//! 1. A fixed table of built-in kinds ([`BuiltinKind`]).
//! 2. Otherwise, a suffix match against the configured extension suffixes.
//!    A tag such as `watermarkControl` declares a third-party kind of the
//!    [`Capability::Control`] family; it is constructed from the `class`
//!    and `params` props the node carries.
//!
//! Third-party kinds therefore never touch the dispatch code: declaring the
//! right suffix is enough. A tag matching neither step is a configuration
//! defect and resolves to [`Error::UnknownKind`].

use alloc::string::{String, ToString};
use core::fmt;

use crate::error::Error;

/// Structural role of an instance. Governs how it attaches to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// The map itself. Owns the root structural collection.
    Root,
    /// A single map layer (including decorations).
    Layer,
    /// A plain layer group.
    LayerGroup,
    /// A feature group (a layer group with shared events and bounds).
    FeatureGroup,
    /// A map control.
    Control,
    /// A named, switchable root extension.
    Handler,
}

impl Category {
    /// Returns whether this category is a group of member layers.
    #[inline]
    #[must_use]
    pub const fn is_group(self) -> bool {
        matches!(self, Self::LayerGroup | Self::FeatureGroup)
    }

    /// Returns the lower-case category name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Layer => "layer",
            Self::LayerGroup => "layergroup",
            Self::FeatureGroup => "featuregroup",
            Self::Control => "control",
            Self::Handler => "handler",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A non-structural attachment bound onto a host object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decoration {
    /// A popup, opened on click or explicitly.
    Popup,
    /// A tooltip, shown on hover or explicitly.
    Tooltip,
}

impl Decoration {
    /// All decoration kinds, in rebinding order.
    pub const ALL: [Self; 2] = [Self::Popup, Self::Tooltip];
}

/// Extension families declared through a kind suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// A custom layer.
    Layer,
    /// A custom control.
    Control,
    /// A custom root handler.
    Handler,
}

impl Capability {
    /// Returns the default suffix declaring this capability.
    #[must_use]
    pub const fn default_suffix(self) -> &'static str {
        match self {
            Self::Layer => "Layer",
            Self::Control => "Control",
            Self::Handler => "Handler",
        }
    }

    /// Returns the category instances of this capability belong to.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Layer => Category::Layer,
            Self::Control => Category::Control,
            Self::Handler => Category::Handler,
        }
    }
}

/// Kinds known to the core without any extension declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    /// The map root.
    Map,
    /// Popup decoration.
    Popup,
    /// Tooltip decoration.
    Tooltip,
    /// Image overlay.
    Image,
    /// Rectangle vector shape.
    Rectangle,
    /// Point marker.
    Marker,
    /// Raster tile layer.
    Tiles,
    /// WMS tile layer.
    TilesWms,
    /// Video overlay.
    Video,
    /// Polyline vector shape.
    Polyline,
    /// Polygon vector shape.
    Polygon,
    /// Circle vector shape (radius in meters).
    Circle,
    /// Circle marker vector shape (radius in pixels).
    CircleMarker,
    /// SVG overlay.
    Svg,
    /// `GeoJSON` layer.
    GeoJson,
    /// Grid layer.
    GridLayer,
    /// Plain layer group.
    LayerGroup,
    /// Feature group.
    FeatureGroup,
}

const BUILTIN_TABLE: &[(&str, BuiltinKind)] = &[
    ("map", BuiltinKind::Map),
    ("popup", BuiltinKind::Popup),
    ("tooltip", BuiltinKind::Tooltip),
    ("image", BuiltinKind::Image),
    ("rectangle", BuiltinKind::Rectangle),
    ("marker", BuiltinKind::Marker),
    ("tiles", BuiltinKind::Tiles),
    ("tilesWms", BuiltinKind::TilesWms),
    ("video", BuiltinKind::Video),
    ("polyline", BuiltinKind::Polyline),
    ("polygon", BuiltinKind::Polygon),
    ("circle", BuiltinKind::Circle),
    ("circleMarker", BuiltinKind::CircleMarker),
    ("svg", BuiltinKind::Svg),
    ("geoJson", BuiltinKind::GeoJson),
    ("gridLayer", BuiltinKind::GridLayer),
    ("layerGroup", BuiltinKind::LayerGroup),
    ("featureGroup", BuiltinKind::FeatureGroup),
];

impl BuiltinKind {
    /// Looks up a built-in kind by its tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        BUILTIN_TABLE
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|&(_, kind)| kind)
    }

    /// Returns the tag this kind is declared with.
    #[must_use]
    pub fn tag(self) -> &'static str {
        BUILTIN_TABLE
            .iter()
            .find(|&&(_, kind)| kind == self)
            .map_or("", |&(name, _)| name)
    }

    /// Returns the category of this kind.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Map => Category::Root,
            Self::LayerGroup => Category::LayerGroup,
            Self::FeatureGroup => Category::FeatureGroup,
            _ => Category::Layer,
        }
    }

    /// Returns the decoration this kind represents, if any.
    #[must_use]
    pub const fn decoration(self) -> Option<Decoration> {
        match self {
            Self::Popup => Some(Decoration::Popup),
            Self::Tooltip => Some(Decoration::Tooltip),
            _ => None,
        }
    }

    /// Props consumed by the host constructor for this kind.
    ///
    /// Everything else is applied through setters after construction.
    #[must_use]
    pub const fn constructor_args(self) -> &'static [&'static str] {
        match self {
            Self::Map => &["options"],
            Self::Popup | Self::Tooltip | Self::GridLayer => &["options"],
            Self::LayerGroup | Self::FeatureGroup => &["options"],
            Self::Image => &["imageUrl", "bounds", "options"],
            Self::Rectangle => &["bounds", "options"],
            Self::Marker => &["latlng", "options", "iconOptions"],
            Self::Tiles => &["urlTemplate", "options"],
            Self::TilesWms => &["baseUrl", "options"],
            Self::Video => &["video", "bounds", "options"],
            Self::Polyline | Self::Polygon => &["latlngs", "options"],
            Self::Circle | Self::CircleMarker => &["latlng", "options"],
            Self::Svg => &["svgImage", "bounds", "options"],
            Self::GeoJson => &["geojson", "options"],
        }
    }
}

/// A resolved node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A kind from the built-in table.
    Builtin(BuiltinKind),
    /// A third-party kind declared through a suffix.
    Extension(Capability),
}

impl Kind {
    /// Resolves a kind tag against the built-in table, then `suffixes`.
    ///
    /// Suffixes are tried in order; the first one the tag ends with wins.
    pub fn resolve<S: AsRef<str>>(tag: &str, suffixes: &[(S, Capability)]) -> Result<Self, Error> {
        if let Some(builtin) = BuiltinKind::from_tag(tag) {
            return Ok(Self::Builtin(builtin));
        }
        suffixes
            .iter()
            .find(|(suffix, _)| {
                let suffix = suffix.as_ref();
                !suffix.is_empty() && tag.len() > suffix.len() && tag.ends_with(suffix)
            })
            .map(|&(_, capability)| Self::Extension(capability))
            .ok_or_else(|| Error::UnknownKind {
                kind: tag.to_string(),
            })
    }

    /// Returns the category instances of this kind belong to.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Builtin(builtin) => builtin.category(),
            Self::Extension(capability) => capability.category(),
        }
    }

    /// Returns the decoration this kind represents, if any.
    #[must_use]
    pub const fn decoration(self) -> Option<Decoration> {
        match self {
            Self::Builtin(builtin) => builtin.decoration(),
            Self::Extension(_) => None,
        }
    }

    /// Returns whether prop changes always update in place, regardless of
    /// any mutability flag.
    #[inline]
    #[must_use]
    pub const fn is_always_mutable(self) -> bool {
        self.decoration().is_some()
    }
}

/// The default extension suffix table.
#[must_use]
pub fn default_suffixes() -> alloc::vec::Vec<(String, Capability)> {
    [Capability::Layer, Capability::Control, Capability::Handler]
        .into_iter()
        .map(|c| (c.default_suffix().to_string(), c))
        .collect()
}
