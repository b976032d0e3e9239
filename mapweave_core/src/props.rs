// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node descriptors and prop values.
//!
//! A [`Node`] is the declarative description of one tree element as supplied
//! by the driving framework: a kind tag plus [`Props`]. Props hold named
//! [`PropValue`]s and an ordered list of child nodes.
//!
//! # Equality
//!
//! Props comparison is deep and structural, with two deliberate rules:
//!
//! - Child nodes are never compared. Children are reconciled by the driving
//!   framework, not by props diffing.
//! - [`Callback`]s compare by their *source identity*, not by closure
//!   identity. A freshly allocated closure built from the same source does
//!   not count as a change.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// A map of prop names to values.
pub type PropMap = BTreeMap<String, PropValue>;

/// A geographic position.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a new position.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// An event delivered to a [`Callback`] by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Host event name, e.g. `click`.
    pub name: String,
    /// Where the event happened, for pointer events.
    pub latlng: Option<LatLng>,
}

/// An event handler carried as a prop.
///
/// The `source` string stands in for the handler's serialized source: two
/// callbacks with the same source are considered the same handler even if
/// their closures are distinct allocations.
#[derive(Clone)]
pub struct Callback {
    source: Rc<str>,
    handler: Rc<dyn Fn(&Event)>,
}

impl Callback {
    /// Creates a callback with the given source identity.
    pub fn new(source: impl Into<Rc<str>>, handler: impl Fn(&Event) + 'static) -> Self {
        Self {
            source: source.into(),
            handler: Rc::new(handler),
        }
    }

    /// Returns the source identity.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Invokes the handler.
    pub fn call(&self, event: &Event) {
        (self.handler)(event);
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// A reference to a host-side constructor for extension kinds.
///
/// The host resolves the name to an actual constructor. Equality is by name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ClassRef(Rc<str>);

impl ClassRef {
    /// Creates a class reference.
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassRef({})", self.0)
    }
}

/// A single prop value.
#[derive(Clone, Debug)]
pub enum PropValue {
    /// Explicit absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Text(String),
    /// A geographic position.
    LatLng(LatLng),
    /// An ordered list.
    List(Vec<PropValue>),
    /// A nested map.
    Map(PropMap),
    /// An event handler.
    Callback(Callback),
    /// An extension constructor reference.
    Class(ClassRef),
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            // NaN is deep-equal to NaN.
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::LatLng(a), Self::LatLng(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Callback(a), Self::Callback(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl PropValue {
    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the position, if this is one.
    #[must_use]
    pub fn as_latlng(&self) -> Option<LatLng> {
        match self {
            Self::LatLng(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the nested map, if this is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&PropMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the callback, if this is one.
    #[must_use]
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Self::Callback(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the class reference, if this is one.
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Self::Class(c) => Some(c),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<LatLng> for PropValue {
    fn from(v: LatLng) -> Self {
        Self::LatLng(v)
    }
}

impl From<Vec<Self>> for PropValue {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

impl From<PropMap> for PropValue {
    fn from(v: PropMap) -> Self {
        Self::Map(v)
    }
}

impl From<Callback> for PropValue {
    fn from(v: Callback) -> Self {
        Self::Callback(v)
    }
}

impl From<ClassRef> for PropValue {
    fn from(v: ClassRef) -> Self {
        Self::Class(v)
    }
}

/// Builds a [`PropMap`] from `(name, value)` pairs.
pub fn prop_map<K, V, I>(entries: I) -> PropMap
where
    K: Into<String>,
    V: Into<PropValue>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// The props of one node: named values plus ordered child nodes.
#[derive(Clone, Debug, Default)]
pub struct Props {
    values: PropMap,
    children: Vec<Node>,
}

impl Props {
    /// Creates empty props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns these props with `name` set to `value`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Returns these props with `child` appended to the children.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Sets `name` to `value`, returning the previous value.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        self.values.insert(name.into(), value.into())
    }

    /// Removes `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        self.values.remove(name)
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// Returns the boolean value of `name`, or `default` when absent or not a
    /// boolean.
    #[must_use]
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(PropValue::as_bool).unwrap_or(default)
    }

    /// Returns the position value of `name`.
    #[must_use]
    pub fn latlng(&self, name: &str) -> Option<LatLng> {
        self.get(name).and_then(PropValue::as_latlng)
    }

    /// Returns the nested map `name`, or an empty map.
    #[must_use]
    pub fn map_or_empty(&self, name: &str) -> PropMap {
        self.get(name)
            .and_then(PropValue::as_map)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the instance's own mutability flag (default `true`).
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.flag("mutable", true)
    }

    /// Returns the named values.
    #[must_use]
    pub fn values(&self) -> &PropMap {
        &self.values
    }

    /// Returns the child nodes.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the subset of values whose names are in `names`.
    #[must_use]
    pub fn pick(&self, names: &[&str]) -> PropMap {
        self.values
            .iter()
            .filter(|(k, _)| names.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// A node descriptor: one declarative tree element.
#[derive(Clone, Debug)]
pub struct Node {
    /// The kind tag, resolved through [`Kind::resolve`](crate::kind::Kind::resolve).
    pub kind: String,
    /// The node's props, including its children.
    pub props: Props,
}

impl Node {
    /// Creates a node descriptor.
    pub fn new(kind: impl Into<String>, props: Props) -> Self {
        Self {
            kind: kind.into(),
            props,
        }
    }
}

/// Deep structural equality of two prop sets, ignoring children.
#[must_use]
pub fn props_equal(old: &Props, new: &Props) -> bool {
    old.values == new.values
}

/// Returns the names whose values differ between `old` and `new`, in name
/// order. A name present on only one side counts as changed.
#[must_use]
pub fn changed_keys(old: &PropMap, new: &PropMap) -> Vec<String> {
    let mut changed: Vec<String> = old
        .iter()
        .filter(|(k, v)| new.get(*k) != Some(*v))
        .map(|(k, _)| k.clone())
        .collect();
    changed.extend(
        new.keys()
            .filter(|k| !old.contains_key(*k))
            .cloned(),
    );
    changed.sort();
    changed
}

/// Maps a prop name to the host event it subscribes to.
///
/// `onClick` becomes `click`, `onMouseOver` becomes `mouseover`; names not
/// following the `onXxx` convention are used as-is.
#[must_use]
pub fn event_name(prop: &str) -> String {
    match prop.strip_prefix("on") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => {
            rest.to_ascii_lowercase()
        }
        _ => prop.to_string(),
    }
}
