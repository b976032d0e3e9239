// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciler scenarios against the in-memory host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Point, Size};
use mapweave_core::Error;
use mapweave_core::Reconciler;
use mapweave_core::host::{ContentEmbedder, MapHost};
use mapweave_core::instance::{ContainerId, InstanceId, Lifecycle};
use mapweave_core::kind::{Category, Decoration};
use mapweave_core::props::{Callback, ClassRef, LatLng, Node, PropValue, Props, prop_map};
use mapweave_core::size::ContainerSize;
use mapweave_core::trace::UpdateOutcome;
use mapweave_debug::recorder::{RecordedEvent, RecordedId, RecorderSink};

use crate::{MemoryHost, ObjectId, Pane, SurfaceId};

const C: ContainerId = ContainerId(1);

fn reconciler() -> Reconciler<MemoryHost> {
    let mut r = Reconciler::new(MemoryHost::new());
    r.register(C, None);
    r
}

fn mount_root(r: &mut Reconciler<MemoryHost>) -> InstanceId {
    let root = r.create_instance(C, "map", Props::new()).unwrap();
    r.commit_mount(root);
    root
}

/// Creates, appends, and commits a child.
fn mount(
    r: &mut Reconciler<MemoryHost>,
    parent: InstanceId,
    tag: &str,
    props: Props,
) -> InstanceId {
    let id = r.create_instance(C, tag, props).unwrap();
    r.append_child(parent, id);
    r.commit_mount(id);
    id
}

fn rect(color: &str) -> Props {
    Props::new()
        .with("bounds", "[[0,0],[1,1]]")
        .with("options", prop_map([("fillColor", color)]))
}

fn marker(lat: f64) -> Props {
    Props::new().with("latlng", LatLng::new(lat, 0.0))
}

fn obj(r: &Reconciler<MemoryHost>, id: InstanceId) -> ObjectId {
    *r.public_instance(id)
}

fn update(r: &mut Reconciler<MemoryHost>, id: InstanceId, new: Props) {
    let old = r.props(id).clone();
    let payload = r.prepare_update(id, &old, &new).unwrap();
    r.commit_update(id, &payload, &old, &new).unwrap();
}

fn recorder(r: &mut Reconciler<MemoryHost>) -> RecorderSink {
    let rec = RecorderSink::new();
    r.set_trace_sink(Box::new(rec.clone()));
    rec
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn structural_child_joins_root_collection() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    mount(&mut r, root, "rectangle", rect("black"));

    let host = r.host();
    let members = host.members(obj(&r, root));
    assert_eq!(members.len(), 1);
    assert_eq!(
        host.attribute(members[0], "fillColor"),
        Some(&PropValue::from("black"))
    );
}

#[test]
fn changed_props_replace_in_place() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(&mut r, root, "rectangle", rect("black"));
    let b = mount(&mut r, root, "rectangle", rect("blue"));
    let old_a = obj(&r, a);

    let old = r.props(a).clone();
    let new = rect("red");
    let payload = r.prepare_update(a, &old, &new).expect("props changed");
    assert_eq!(payload.changed, ["options"]);
    assert_eq!(payload.host_context.parent_category, Some(Category::Root));
    r.commit_update(a, &payload, &old, &new).unwrap();

    let host = r.host();
    let fresh = obj(&r, a);
    assert_ne!(fresh, old_a);
    assert_eq!(host.members(obj(&r, root)).len(), 2);
    assert_eq!(
        host.attribute(fresh, "fillColor"),
        Some(&PropValue::from("red"))
    );
    assert!(host.is_released(old_a));
    assert!(!host.is_on_map(old_a));

    // The fresh shape took the old one's place in the vector surface.
    let vector = host.pane(obj(&r, root), Pane::Vector).unwrap();
    assert_eq!(
        host.element_children(vector),
        [host.element(fresh).unwrap(), host.element(obj(&r, b)).unwrap()]
    );
    assert_eq!(r.props(a).get("options"), new.get("options"));
}

#[test]
fn immutable_instance_is_not_updated() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(&mut r, root, "rectangle", rect("black").with("mutable", false));
    let before = obj(&r, a);

    let old = r.props(a).clone();
    let new = rect("red").with("mutable", false);
    assert!(r.prepare_update(a, &old, &new).is_none());
    assert_eq!(obj(&r, a), before);
    assert_eq!(
        r.host().attribute(before, "fillColor"),
        Some(&PropValue::from("black"))
    );
}

#[test]
fn bound_popup_is_not_structural() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(&mut r, root, "rectangle", rect("black"));
    let popup = r
        .create_instance(C, "popup", Props::new().with("isOpen", true))
        .unwrap();
    r.append_child(a, popup);

    let popup_obj = obj(&r, popup);
    assert_eq!(r.host().members(obj(&r, root)), [obj(&r, a)]);
    assert!(!r.host().is_open(&popup_obj));

    r.commit_mount(popup);
    let host = r.host();
    assert!(host.is_open(&popup_obj));
    assert_eq!(host.bound_to(popup_obj), Some(obj(&r, a)));
    assert_eq!(host.opened_on(popup_obj), Some(obj(&r, a)));
    assert_eq!(host.decoration(&obj(&r, a), Decoration::Popup), Some(popup_obj));
}

#[test]
fn reordering_open_decoration_keeps_it_open() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(&mut r, root, "rectangle", rect("black"));
    let tip = mount(&mut r, a, "tooltip", Props::new());
    let popup = mount(&mut r, a, "popup", Props::new().with("isOpen", true));
    let a_obj = obj(&r, a);
    let popup_obj = obj(&r, popup);
    assert!(r.host().is_open(&popup_obj));

    r.insert_before(a, popup, tip);
    assert_eq!(r.children(a), [popup, tip]);
    assert!(r.host().is_open(&popup_obj));

    r.append_child(a, popup);
    assert_eq!(r.children(a), [tip, popup]);
    let host = r.host();
    assert!(host.is_open(&popup_obj));
    assert_eq!(host.opened_on(popup_obj), Some(a_obj));
    assert_eq!(host.decoration(&a_obj, Decoration::Popup), Some(popup_obj));
}

#[test]
fn insert_before_orders_shared_surface() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let y = mount(&mut r, root, "polygon", Props::new());
    let x = r.create_instance(C, "polygon", Props::new()).unwrap();
    r.insert_before(root, x, y);
    r.commit_mount(x);

    let host = r.host();
    let vector = host.pane(obj(&r, root), Pane::Vector).unwrap();
    assert_eq!(
        host.element_children(vector),
        [host.element(obj(&r, x)).unwrap(), host.element(obj(&r, y)).unwrap()]
    );
    assert_eq!(r.children(root), [x, y]);
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn insert_before_across_panes_keeps_elements() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let rec = recorder(&mut r);
    let y = mount(&mut r, root, "polygon", Props::new());
    let x = r.create_instance(C, "image", Props::new()).unwrap();
    r.insert_before(root, x, y);

    // Tree order is honored even though the elements live apart.
    assert_eq!(r.children(root), [x, y]);
    let host = r.host();
    let overlay = host.pane(obj(&r, root), Pane::Overlay).unwrap();
    assert_eq!(
        host.element_children(overlay).last().copied(),
        host.element(obj(&r, x))
    );
    assert!(rec.events().iter().any(|e| matches!(
        e,
        RecordedEvent::Reordered { moved: false, .. }
    )));
}

#[test]
fn replacement_reorder_names_no_sibling() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let y = mount(&mut r, root, "polygon", Props::new());
    let x = r.create_instance(C, "polygon", Props::new()).unwrap();
    let rec = recorder(&mut r);
    r.insert_before(root, x, y);
    r.commit_mount(x);
    update(&mut r, y, Props::new().with("opacity", 0.5));

    let reorders: Vec<_> = rec
        .events()
        .into_iter()
        .filter_map(|e| match e {
            RecordedEvent::Reordered {
                instance, before, ..
            } => Some((instance, before)),
            _ => None,
        })
        .collect();
    assert_eq!(
        reorders,
        [
            (RecordedId::from(x), Some(RecordedId::from(y))),
            (RecordedId::from(y), None),
        ]
    );
}

#[test]
fn insert_before_moves_existing_child() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(&mut r, root, "marker", marker(1.0));
    let b = mount(&mut r, root, "marker", marker(2.0));
    r.insert_before(root, b, a);

    assert_eq!(r.children(root), [b, a]);
    let host = r.host();
    let pane = host.pane(obj(&r, root), Pane::Marker).unwrap();
    assert_eq!(
        host.element_children(pane),
        [host.element(obj(&r, b)).unwrap(), host.element(obj(&r, a)).unwrap()]
    );
}

// ---------------------------------------------------------------------------
// Decorations
// ---------------------------------------------------------------------------

#[test]
fn replace_keeps_bound_decorations_open() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let m = mount(&mut r, root, "marker", marker(1.0));
    let tooltip = mount(&mut r, m, "tooltip", Props::new().with("isOpen", true));
    let popup = mount(&mut r, m, "popup", Props::new());
    let old = obj(&r, m);
    let tooltip_obj = obj(&r, tooltip);
    let popup_obj = obj(&r, popup);

    update(&mut r, m, marker(2.0));

    let host = r.host();
    let fresh = obj(&r, m);
    assert_ne!(fresh, old);
    assert_eq!(host.decoration(&fresh, Decoration::Tooltip), Some(tooltip_obj));
    assert_eq!(host.decoration(&fresh, Decoration::Popup), Some(popup_obj));
    assert_eq!(host.decoration(&old, Decoration::Tooltip), None);
    assert_eq!(host.bound_to(tooltip_obj), Some(fresh));
    assert_eq!(host.opened_on(tooltip_obj), Some(fresh));
    assert!(!host.is_open(&popup_obj));
    assert_eq!(
        host.attribute(fresh, "latlng"),
        Some(&PropValue::from(LatLng::new(2.0, 0.0)))
    );
}

#[test]
fn root_popup_opens_on_click() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let popup = mount(&mut r, root, "popup", Props::new());
    let root_obj = obj(&r, root);
    let popup_obj = obj(&r, popup);
    assert!(r.host().members(root_obj).is_empty());
    assert!(!r.host().is_open(&popup_obj));

    let at = LatLng::new(48.8, 2.3);
    r.host_mut().click(root_obj, at);
    assert_eq!(r.host().opened_on(popup_obj), Some(root_obj));
    assert_eq!(r.host().position(popup_obj), Some(at));
}

#[test]
fn removed_root_popup_ignores_clicks() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let popup = mount(&mut r, root, "popup", Props::new());
    let root_obj = obj(&r, root);
    let popup_obj = obj(&r, popup);

    r.host_mut().click(root_obj, LatLng::new(1.0, 1.0));
    assert!(r.host().is_open(&popup_obj));

    r.remove_child(root, popup);
    assert!(!r.host().is_open(&popup_obj));
    r.host_mut().click(root_obj, LatLng::new(2.0, 2.0));
    let host = r.host();
    assert!(!host.is_open(&popup_obj));
    assert_eq!(host.position(popup_obj), Some(LatLng::new(1.0, 1.0)));
}

#[test]
fn anchored_root_popup_opens_at_anchor() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let anchor = LatLng::new(10.0, 20.0);
    let popup = mount(
        &mut r,
        root,
        "popup",
        Props::new().with("latlng", anchor).with("isOpen", true),
    );
    let root_obj = obj(&r, root);
    let popup_obj = obj(&r, popup);
    assert!(r.host().is_open(&popup_obj));
    assert_eq!(r.host().position(popup_obj), Some(anchor));

    r.host_mut().click(root_obj, LatLng::new(0.0, 0.0));
    assert_eq!(r.host().position(popup_obj), Some(anchor));
}

#[test]
fn decoration_updates_in_place() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let popup = mount(
        &mut r,
        root,
        "popup",
        Props::new()
            .with("latlng", LatLng::new(1.0, 1.0))
            .with("mutable", false),
    );
    let popup_obj = obj(&r, popup);

    // Decorations ignore the mutability flag.
    let moved = LatLng::new(5.0, 5.0);
    update(
        &mut r,
        popup,
        Props::new()
            .with("latlng", moved)
            .with("isOpen", true)
            .with("mutable", false),
    );
    assert_eq!(obj(&r, popup), popup_obj);
    assert_eq!(r.host().position(popup_obj), Some(moved));
    assert_eq!(r.host().opened_on(popup_obj), Some(obj(&r, root)));

    update(&mut r, popup, Props::new().with("latlng", moved));
    assert!(!r.host().is_open(&popup_obj));
}

#[test]
fn bound_decoration_reopens_on_parent() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let m = mount(&mut r, root, "marker", marker(3.0));
    let tooltip = mount(&mut r, m, "tooltip", Props::new());
    let tooltip_obj = obj(&r, tooltip);

    update(&mut r, tooltip, Props::new().with("isOpen", true));
    assert_eq!(r.host().opened_on(tooltip_obj), Some(obj(&r, m)));
    assert_eq!(r.host().position(tooltip_obj), Some(LatLng::new(3.0, 0.0)));
}

// ---------------------------------------------------------------------------
// Extensions and the root
// ---------------------------------------------------------------------------

fn handler(enabled: bool) -> Props {
    Props::new()
        .with("class", ClassRef::new("ScrollWheelZoom"))
        .with("name", "scrollWheelZoom")
        .with("enabled", enabled)
}

#[test]
fn handler_is_switched_on_and_off() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let h = mount(&mut r, root, "scrollHandler", handler(true));
    let root_obj = obj(&r, root);
    assert_eq!(
        r.host().extension_enabled(root_obj, "scrollWheelZoom"),
        Some(true)
    );
    assert_eq!(
        r.host().extension(root_obj, "scrollWheelZoom"),
        Some(obj(&r, h))
    );
    assert!(r.host().members(root_obj).is_empty());

    update(&mut r, h, handler(false));
    assert_eq!(
        r.host().extension_enabled(root_obj, "scrollWheelZoom"),
        Some(false)
    );
}

#[test]
fn handler_defaults_to_tag_and_disabled() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    mount(
        &mut r,
        root,
        "boxHandler",
        Props::new().with("class", ClassRef::new("BoxZoom")),
    );
    assert_eq!(
        r.host().extension_enabled(obj(&r, root), "boxHandler"),
        Some(false)
    );
}

#[test]
fn extension_layer_gets_params_and_setters() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let heat = mount(
        &mut r,
        root,
        "heatLayer",
        Props::new()
            .with("class", ClassRef::new("HeatLayer"))
            .with("params", prop_map([("radius", 4)]))
            .with("opacity", 0.3),
    );
    let host = r.host();
    let heat_obj = obj(&r, heat);
    assert_eq!(host.attribute(heat_obj, "radius"), Some(&PropValue::from(4)));
    assert_eq!(host.attribute(heat_obj, "opacity"), Some(&PropValue::from(0.3)));
    assert!(host.is_on_map(heat_obj));
}

#[test]
fn extension_control_embeds_children() {
    let calls: Rc<RefCell<Vec<(usize, SurfaceId)>>> = Rc::default();
    let seen = calls.clone();
    let embedder: ContentEmbedder<SurfaceId> = Rc::new(move |nodes: &[Node], s: &SurfaceId| {
        seen.borrow_mut().push((nodes.len(), *s));
    });

    let mut r = reconciler();
    r.register(C, Some(embedder));
    let root = mount_root(&mut r);
    let legend = mount(
        &mut r,
        root,
        "legendControl",
        Props::new()
            .with("class", ClassRef::new("Legend"))
            .with_child(Node::new("h4", Props::new()))
            .with_child(Node::new("ul", Props::new())),
    );

    let legend_obj = obj(&r, legend);
    let surface = r.host().content(legend_obj).unwrap();
    assert_eq!(*calls.borrow(), [(2, surface)]);
    let controls = r.host().pane(obj(&r, root), Pane::Control).unwrap();
    assert_eq!(
        r.host().element_children(controls),
        [r.host().element(legend_obj).unwrap()]
    );
}

#[test]
fn root_update_merges_changed_options() {
    let mut r = reconciler();
    let root = r
        .create_instance(
            C,
            "map",
            Props::new().with("options", prop_map([("zoom", 3), ("minZoom", 1)])),
        )
        .unwrap();
    r.commit_mount(root);
    let root_obj = obj(&r, root);

    update(
        &mut r,
        root,
        Props::new().with("options", prop_map([("zoom", 5), ("minZoom", 1)])),
    );
    let host = r.host();
    assert_eq!(obj(&r, root), root_obj);
    assert_eq!(host.attribute(root_obj, "zoom"), Some(&PropValue::from(5)));
    assert_eq!(host.invalidations(root_obj), 1);
}

#[test]
fn when_ready_fires_on_commit() {
    let ready = Rc::new(Cell::new(false));
    let flag = ready.clone();
    let mut r = reconciler();
    let root = r
        .create_instance(
            C,
            "map",
            Props::new().with("whenReady", Callback::new("ready", move |_| flag.set(true))),
        )
        .unwrap();
    assert!(!ready.get());
    r.commit_mount(root);
    assert!(ready.get());
    assert_eq!(r.host().listener_count(obj(&r, root)), 0);
}

// ---------------------------------------------------------------------------
// Mutability
// ---------------------------------------------------------------------------

#[test]
fn immutable_group_freezes_members() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let group = mount(
        &mut r,
        root,
        "layerGroup",
        Props::new().with("mutable", false),
    );
    let a = mount(&mut r, group, "rectangle", rect("black"));
    assert!(!r.is_effectively_mutable(a));

    let old = r.props(a).clone();
    assert!(r.prepare_update(a, &old, &rect("red")).is_none());
}

#[test]
fn unchanged_props_are_skipped() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let rec = recorder(&mut r);
    let a = mount(&mut r, root, "rectangle", rect("black"));

    let old = r.props(a).clone();
    let same = rect("black").with_child(Node::new("ignored", Props::new()));
    assert!(r.prepare_update(a, &old, &same).is_none());
    assert!(rec.events().iter().any(|e| matches!(
        e,
        RecordedEvent::UpdatePrepared {
            outcome: UpdateOutcome::Unchanged,
            ..
        }
    )));
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

#[test]
fn callbacks_compare_by_source() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let clicks = Rc::new(Cell::new(0_u32));
    let counter = clicks.clone();
    let props = marker(1.0).with(
        "onClick",
        Callback::new("count", move |_| counter.set(counter.get() + 1)),
    );
    let m = mount(&mut r, root, "marker", props);
    let m_obj = obj(&r, m);

    r.host().fire(m_obj, "click", None);
    assert_eq!(clicks.get(), 1);

    // A fresh closure with the same source is the same handler.
    let old = r.props(m).clone();
    let same = marker(1.0).with("onClick", Callback::new("count", |_| {}));
    assert!(r.prepare_update(m, &old, &same).is_none());

    let other = marker(1.0).with("onClick", Callback::new("log", |_| {}));
    let payload = r.prepare_update(m, &old, &other).unwrap();
    assert_eq!(payload.changed, ["onClick"]);
}

#[test]
fn replacement_rewires_listeners() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let hits = Rc::new(Cell::new(0_u32));
    let counter = hits.clone();
    let on_click = Callback::new("hit", move |_| counter.set(counter.get() + 1));
    let m = mount(&mut r, root, "marker", marker(1.0).with("onClick", on_click.clone()));

    update(&mut r, m, marker(2.0).with("onClick", on_click));
    let fresh = obj(&r, m);
    assert_eq!(r.host().listener_count(fresh), 1);
    r.host().fire(fresh, "click", None);
    assert_eq!(hits.get(), 1);
}

#[test]
fn discarded_instance_leaves_no_listeners() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let live = r.live_instances();
    let m = r
        .create_instance(
            C,
            "marker",
            marker(1.0).with("onClick", Callback::new("never", |_| {})),
        )
        .unwrap();
    let m_obj = obj(&r, m);
    r.discard_instance(m);

    let host = r.host();
    assert_eq!(host.listener_count(m_obj), 0);
    assert!(host.is_released(m_obj));
    assert!(!host.is_on_map(m_obj));
    assert!(host.members(obj(&r, root)).is_empty());
    assert_eq!(r.live_instances(), live);
    assert!(!r.is_alive(m));
}

// ---------------------------------------------------------------------------
// Replacement
// ---------------------------------------------------------------------------

#[test]
fn replacement_carries_state() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let video = mount(
        &mut r,
        root,
        "video",
        Props::new().with("video", "a.mp4").with("bounds", "b1"),
    );
    let old = obj(&r, video);
    r.host_mut().set_state(old, PropValue::from(12.5));

    update(
        &mut r,
        video,
        Props::new().with("video", "a.mp4").with("bounds", "b2"),
    );
    let fresh = obj(&r, video);
    assert_ne!(fresh, old);
    assert_eq!(r.host().state(fresh), Some(&PropValue::from(12.5)));
}

#[test]
fn group_replacement_moves_members() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let group = r
        .create_instance(C, "featureGroup", Props::new())
        .unwrap();
    let a = r.create_instance(C, "marker", marker(1.0)).unwrap();
    let b = r.create_instance(C, "marker", marker(2.0)).unwrap();
    r.append_initial_child(group, a);
    r.append_initial_child(group, b);
    assert!(r.finalize_initial_children(group));
    r.append_child(root, group);
    for id in [a, b, group] {
        r.commit_mount(id);
    }
    let old_group = obj(&r, group);
    assert!(r.host().is_on_map(obj(&r, a)));

    update(
        &mut r,
        group,
        Props::new().with("options", prop_map([("attribution", "x")])),
    );

    let host = r.host();
    let fresh = obj(&r, group);
    assert_ne!(fresh, old_group);
    assert_eq!(host.group_members(&fresh), [obj(&r, a), obj(&r, b)]);
    assert!(host.members(old_group).is_empty());
    assert!(host.is_on_map(obj(&r, a)));
    assert!(host.is_on_map(obj(&r, b)));
    assert_eq!(host.members(obj(&r, root)), [fresh]);
    assert!(host.is_released(old_group));

    // Members removed later really leave the map.
    let a_obj = obj(&r, a);
    r.remove_child(group, a);
    assert!(!r.host().is_on_map(a_obj));
    assert_eq!(r.host().group_members(&fresh), [obj(&r, b)]);
}

#[test]
fn repeated_group_updates_leave_no_shells() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let group = mount(&mut r, root, "layerGroup", Props::new());
    let m = mount(&mut r, group, "marker", marker(1.0));
    let m_obj = obj(&r, m);

    let mut shells = Vec::new();
    for i in 0..3_i32 {
        shells.push(obj(&r, group));
        update(
            &mut r,
            group,
            Props::new().with("options", prop_map([("pane", PropValue::from(i))])),
        );
    }
    let root_obj = obj(&r, root);
    assert_eq!(r.host().members(root_obj), [obj(&r, group)]);
    assert!(r.host().is_on_map(m_obj));

    let last = obj(&r, group);
    r.remove_child(root, group);
    let host = r.host();
    assert!(host.members(root_obj).is_empty());
    assert!(!host.is_on_map(m_obj));
    assert!(host.is_released(last));
    for shell in shells {
        assert!(host.is_released(shell), "{shell:?} was not released");
    }
}

#[test]
fn ignored_setters_are_dropped() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(
        &mut r,
        root,
        "rectangle",
        rect("black").with("opacity", 0.5).with("sparkle", true),
    );
    let host = r.host();
    let a_obj = obj(&r, a);
    assert_eq!(host.attribute(a_obj, "opacity"), Some(&PropValue::from(0.5)));
    assert_eq!(host.attribute(a_obj, "sparkle"), None);
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

#[test]
fn removed_layer_leaves_map() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(&mut r, root, "rectangle", rect("black"));
    let popup = mount(&mut r, a, "popup", Props::new());
    let a_obj = obj(&r, a);
    let popup_obj = obj(&r, popup);

    r.remove_child(root, a);
    let host = r.host();
    assert!(host.members(obj(&r, root)).is_empty());
    assert!(!host.is_on_map(a_obj));
    assert!(host.is_released(a_obj));
    assert!(host.is_released(popup_obj));
    assert!(!r.is_alive(a));
    assert!(!r.is_alive(popup));
    assert_eq!(r.lifecycle(a), Lifecycle::Removed);
}

#[test]
fn removed_group_takes_members_off_map() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let group = mount(&mut r, root, "layerGroup", Props::new());
    let a = mount(&mut r, group, "marker", marker(1.0));
    let b = mount(&mut r, group, "circle", marker(2.0));
    let group_obj = obj(&r, group);
    let members = [obj(&r, a), obj(&r, b)];
    assert!(r.host().is_on_map(members[0]));

    r.remove_child(root, group);
    let host = r.host();
    assert_eq!(host.members(group_obj), members);
    assert!(!host.is_on_map(members[0]));
    assert!(!host.is_on_map(members[1]));
    assert_eq!(r.live_instances(), 1);
}

#[test]
fn root_removed_from_container() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(&mut r, root, "marker", marker(1.0));
    let root_obj = obj(&r, root);
    let container_el = r.host().element(root_obj).unwrap();

    r.remove_child_from_container(C, root).unwrap();
    let host = r.host();
    assert!(host.is_destroyed(root_obj));
    assert_eq!(host.element_name(container_el), None);
    assert!(!r.is_alive(a));
    assert!(r.session(C).unwrap().root().is_none());
    assert!(r.session(C).unwrap().root_handle().is_none());
}

#[test]
fn release_tears_down_live_root() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let root_obj = obj(&r, root);
    r.release(C);
    assert!(r.session(C).is_none());
    assert!(r.host().is_destroyed(root_obj));
    assert!(!r.is_alive(root));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn unknown_kind_is_rejected() {
    let mut r = reconciler();
    let err = r.create_instance(C, "hexagon", Props::new()).unwrap_err();
    assert_eq!(
        err,
        Error::UnknownKind {
            kind: "hexagon".into()
        }
    );
}

#[test]
fn extension_without_class_is_rejected() {
    let mut r = reconciler();
    let err = r.create_instance(C, "heatLayer", Props::new()).unwrap_err();
    assert_eq!(
        err,
        Error::MissingExtensionClass {
            kind: "heatLayer".into()
        }
    );
    assert_eq!(r.host().object_count(), 0);
}

#[test]
fn unregistered_container_is_rejected() {
    let mut r = reconciler();
    let err = r
        .create_instance(ContainerId(9), "map", Props::new())
        .unwrap_err();
    assert_eq!(
        err,
        Error::SessionNotFound {
            container: ContainerId(9)
        }
    );
    let root = mount_root(&mut r);
    assert_eq!(
        r.remove_child_from_container(ContainerId(9), root),
        Err(Error::SessionNotFound {
            container: ContainerId(9)
        })
    );
}

#[test]
fn update_without_root_is_rejected() {
    let mut r = reconciler();
    let a = r.create_instance(C, "rectangle", rect("black")).unwrap();
    let old = r.props(a).clone();
    let new = rect("red");
    let payload = r.prepare_update(a, &old, &new).unwrap();
    assert_eq!(
        r.commit_update(a, &payload, &old, &new),
        Err(Error::RootNotFound {
            container: C,
            kind: "rectangle".into(),
            category: Category::Layer,
        })
    );
}

#[test]
#[should_panic(expected = "commit_mount on")]
fn double_commit_panics() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let a = mount(&mut r, root, "marker", marker(1.0));
    r.commit_mount(a);
}

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

#[test]
fn container_fills_sized_parent() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let root_obj = obj(&r, root);
    r.host_mut()
        .set_page_size(root_obj, Some(Size::new(640.0, 480.0)));

    let hints = r.host().size_hints(root_obj, None);
    let resolved = r.size_container(C, &hints).unwrap();
    assert_eq!(resolved.size, ContainerSize::FillParent);
    assert_eq!(
        r.host().container_size(root_obj),
        Some(Size::new(640.0, 480.0))
    );
    assert_eq!(r.host().invalidations(root_obj), 1);
}

#[test]
fn undersized_parent_is_reported() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let rec = recorder(&mut r);
    let root_obj = obj(&r, root);
    r.host_mut().set_page_size(root_obj, Some(Size::new(640.0, 4.0)));

    let hints = r.host().size_hints(root_obj, None);
    let resolved = r.size_container(C, &hints).unwrap();
    assert_eq!(resolved.undersized_parent, Some(Size::new(640.0, 4.0)));
    assert_eq!(
        rec.events(),
        [RecordedEvent::SizeWarning {
            container: C.0,
            width: 640.0,
            height: 4.0,
        }]
    );
}

#[test]
fn max_bounds_fix_container_size() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let root_obj = obj(&r, root);
    let hints = r
        .host()
        .size_hints(root_obj, Some((Point::ZERO, Point::new(300.0, 200.0))));
    r.size_container(C, &hints).unwrap();
    assert_eq!(
        r.host().container_size(root_obj),
        Some(Size::new(300.0, 200.0))
    );
}

#[test]
fn styled_container_is_kept() {
    let mut r = reconciler();
    let root = r
        .create_instance(
            C,
            "map",
            Props::new().with("options", prop_map([("width", 320), ("height", 240)])),
        )
        .unwrap();
    r.commit_mount(root);
    let root_obj = obj(&r, root);

    let hints = r.host().size_hints(root_obj, None);
    let resolved = r.size_container(C, &hints).unwrap();
    assert_eq!(resolved.size, ContainerSize::AsStyled);
    assert_eq!(
        r.host().container_size(root_obj),
        Some(Size::new(320.0, 240.0))
    );
}

#[test]
fn unsized_container_is_an_error() {
    let mut r = reconciler();
    let root = mount_root(&mut r);
    let hints = r.host().size_hints(obj(&r, root), None);
    assert_eq!(r.size_container(C, &hints), Err(Error::UnsizedContainer));

    r.release(C);
    r.register(C, None);
    assert!(matches!(
        r.size_container(C, &hints),
        Err(Error::RootNotFound { .. })
    ));
}

// ---------------------------------------------------------------------------
// Render driver
// ---------------------------------------------------------------------------

fn scene() -> Node {
    Node::new(
        "map",
        Props::new()
            .with_child(Node::new("rectangle", rect("black")))
            .with_child(Node::new(
                "layerGroup",
                Props::new().with_child(Node::new("marker", marker(4.0))),
            ))
            .with_child(Node::new(
                "popup",
                Props::new()
                    .with("latlng", LatLng::new(1.0, 2.0))
                    .with("isOpen", true)
                    .with_child(Node::new("p", Props::new())),
            )),
    )
}

#[test]
fn render_mounts_and_commits_tree() {
    let calls: Rc<RefCell<Vec<usize>>> = Rc::default();
    let seen = calls.clone();
    let embedder: ContentEmbedder<SurfaceId> =
        Rc::new(move |nodes: &[Node], _: &SurfaceId| seen.borrow_mut().push(nodes.len()));

    let mut r = Reconciler::new(MemoryHost::new());
    let rec = recorder(&mut r);
    let root = r.render(C, &scene(), Some(embedder)).unwrap();

    let children = r.children(root);
    assert_eq!(children.len(), 3);
    // Decoration content is embedded, not instantiated.
    assert!(r.children(children[2]).is_empty());
    assert_eq!(*calls.borrow(), [1]);
    assert_eq!(r.live_instances(), 5);
    for id in children.iter().copied().chain([root]) {
        assert_eq!(r.lifecycle(id), Lifecycle::Committed);
    }

    let host = r.host();
    let marker_obj = obj(&r, r.children(children[1])[0]);
    assert!(host.is_on_map(marker_obj));
    let popup_obj = obj(&r, children[2]);
    assert!(host.is_open(&popup_obj));
    assert!(host.content(popup_obj).is_some());

    let events = rec.events();
    let committed = events
        .iter()
        .filter(|e| matches!(e, RecordedEvent::Committed { .. }))
        .count();
    assert_eq!(committed, 5);
    // Children commit before their parents, the root last.
    assert!(matches!(
        events.last(),
        Some(RecordedEvent::Committed { instance }) if instance.index == root.index()
    ));
}

#[test]
fn render_replaces_previous_root() {
    let mut r = Reconciler::new(MemoryHost::new());
    let first = r.render(C, &scene(), None).unwrap();
    let first_obj = obj(&r, first);
    let second = r.render(C, &scene(), None).unwrap();

    assert!(!r.is_alive(first));
    assert!(r.host().is_destroyed(first_obj));
    assert_eq!(r.session(C).unwrap().root(), Some(second));
    assert_eq!(r.live_instances(), 5);
    assert_eq!(r.host().root_of(C), Some(obj(&r, second)));
}

#[test]
fn render_failure_discards_partial_tree() {
    let mut r = Reconciler::new(MemoryHost::new());
    let bad = Node::new(
        "map",
        Props::new()
            .with_child(Node::new("marker", marker(1.0)))
            .with_child(Node::new("hexagon", Props::new())),
    );
    let err = r.render(C, &bad, None).unwrap_err();
    assert!(matches!(err, Error::UnknownKind { .. }));
    assert_eq!(r.live_instances(), 0);
    assert!(r.session(C).unwrap().root().is_none());
    assert_eq!(r.host().root_of(C), None);
}
