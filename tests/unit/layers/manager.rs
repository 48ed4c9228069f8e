use super::*;

fn info(id: u64, kind: ObjectKind) -> SceneObjectInfo {
    SceneObjectInfo {
        id: ObjectId(id),
        kind,
        name: None,
    }
}

fn orders(m: &LayerManager) -> Vec<i64> {
    m.sorted_layers().iter().map(|l| l.order).collect()
}

#[test]
fn create_assigns_ids_names_and_top_order() {
    let mut m = LayerManager::new();
    let a = m.create_layer(ObjectId(10), ObjectKind::Image, None);
    let b = m.create_layer(ObjectId(11), ObjectKind::Text, Some("Title"));

    assert_eq!(a.id, LayerId(1));
    assert_eq!(a.name, "image #1");
    assert_eq!(a.opacity, 100.0);
    assert_eq!(a.blend_mode, BlendMode::SourceOver);
    assert!(a.visible && !a.locked);
    assert_eq!(b.name, "Title");
    assert_eq!(b.order, a.order + 1);
    assert_eq!(m.get_layer_by_object(ObjectId(11)).unwrap().id, b.id);
}

#[test]
fn unknown_ids_are_not_found() {
    let mut m = LayerManager::new();
    assert!(matches!(
        m.set_opacity(LayerId(4), 50.0),
        Err(EaselError::NotFound(_))
    ));
    assert!(m.toggle_visibility(LayerId(4)).is_err());
    assert!(m.delete_layer(LayerId(4)).is_err());
    assert!(m.add_filter(LayerId(4), "sepia", BTreeMap::new()).is_err());
}

#[test]
fn opacity_is_clamped() {
    let mut m = LayerManager::new();
    let id = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id;
    m.set_opacity(id, 140.0).unwrap();
    assert_eq!(m.get_layer(id).unwrap().opacity, 100.0);
    m.set_opacity(id, -3.0).unwrap();
    assert_eq!(m.get_layer(id).unwrap().opacity, 0.0);
    m.set_opacity(id, f64::NAN).unwrap();
    assert_eq!(m.get_layer(id).unwrap().opacity, 0.0);
}

#[test]
fn toggle_and_patch() {
    let mut m = LayerManager::new();
    let id = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id;
    assert!(!m.toggle_visibility(id).unwrap());
    assert!(m.toggle_visibility(id).unwrap());

    m.update_layer(
        id,
        LayerPatch {
            name: Some("Box".into()),
            locked: Some(true),
            blend_mode: Some(BlendMode::Multiply),
            ..LayerPatch::default()
        },
    )
    .unwrap();
    let l = m.get_layer(id).unwrap();
    assert_eq!(l.name, "Box");
    assert!(l.locked);
    assert_eq!(l.blend_mode, BlendMode::Multiply);
}

#[test]
fn filters_add_update_merge_and_remove() {
    let mut m = LayerManager::new();
    let id = m.create_layer(ObjectId(1), ObjectKind::Image, None).id;
    let f1 = m
        .add_filter(id, "oil", BTreeMap::from([("range".to_string(), 2.0)]))
        .unwrap();
    let f2 = m.add_filter(id, "sepia", BTreeMap::new()).unwrap();
    assert_ne!(f1, f2);

    let spec = m
        .update_filter(id, f1, BTreeMap::from([("levels".to_string(), 8.0)]))
        .unwrap();
    assert_eq!(spec.params["range"], 2.0);
    assert_eq!(spec.params["levels"], 8.0);

    let removed = m.remove_filter(id, f1).unwrap();
    assert_eq!(removed.name, "oil");
    let names: Vec<_> = m.get_layer(id).unwrap().filters.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["sepia"]);
    assert!(m.remove_filter(id, f1).is_err());
}

#[test]
fn reorder_shifts_colliding_siblings_up() {
    let mut m = LayerManager::new();
    let a = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id; // 0
    let b = m.create_layer(ObjectId(2), ObjectKind::Shape, None).id; // 1
    let c = m.create_layer(ObjectId(3), ObjectKind::Shape, None).id; // 2

    m.reorder(c, 0).unwrap();
    assert_eq!(m.get_layer(c).unwrap().order, 0);
    assert_eq!(m.get_layer(a).unwrap().order, 1);
    assert_eq!(m.get_layer(b).unwrap().order, 2);

    let top: Vec<_> = m.sorted_layers().iter().map(|l| l.id).collect();
    assert_eq!(top, [b, a, c]);
}

#[test]
fn sync_creates_removes_and_is_idempotent() {
    let mut m = LayerManager::new();
    let objs = [info(1, ObjectKind::Shape), info(2, ObjectKind::Image), info(3, ObjectKind::Text)];
    let r = m.sync_with_scene_objects(&objs);
    assert_eq!(r.created.len(), 3);
    assert_eq!(m.len(), 3);

    assert!(m.sync_with_scene_objects(&objs).is_noop());

    let r = m.sync_with_scene_objects(&objs[1..]);
    assert_eq!(r.removed.len(), 1);
    assert!(m.get_layer_by_object(ObjectId(1)).is_none());
    assert_eq!(m.len(), 2);
}

#[test]
fn sync_breaks_order_ties_by_scan_order() {
    let mut m = LayerManager::new();
    let a = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id;
    let b = m.create_layer(ObjectId(2), ObjectKind::Shape, None).id;
    let c = m.create_layer(ObjectId(3), ObjectKind::Shape, None).id;
    for id in [a, b, c] {
        m.layers.get_mut(&id).unwrap().order = 5;
    }

    let r = m.sync_with_scene_objects(&[
        info(1, ObjectKind::Shape),
        info(2, ObjectKind::Shape),
        info(3, ObjectKind::Shape),
    ]);
    assert_eq!(r.reordered, [b, c]);
    assert_eq!(m.get_layer(a).unwrap().order, 5);
    assert_eq!(m.get_layer(b).unwrap().order, 6);
    assert_eq!(m.get_layer(c).unwrap().order, 7);
    assert_eq!(orders(&m), [7, 6, 5]);
}

#[test]
fn sync_tie_break_follows_scan_order_not_layer_ids() {
    let mut m = LayerManager::new();
    // Layer ids run opposite to the scene stacking.
    let top = m.create_layer(ObjectId(2), ObjectKind::Shape, None).id;
    let bottom = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id;
    for id in [top, bottom] {
        m.layers.get_mut(&id).unwrap().order = 3;
    }

    let r = m.sync_with_scene_objects(&[info(1, ObjectKind::Shape), info(2, ObjectKind::Shape)]);
    assert_eq!(r.reordered, [top]);
    assert_eq!(m.get_layer(bottom).unwrap().order, 3);
    assert_eq!(m.get_layer(top).unwrap().order, 4);
    assert_eq!(m.sorted_layers()[0].id, top);
}

#[test]
fn unlisted_layers_lose_ties_to_scanned_ones() {
    let mut m = LayerManager::new();
    let a = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id;
    let b = m.create_layer(ObjectId(2), ObjectKind::Shape, None).id;
    for id in [a, b] {
        m.layers.get_mut(&id).unwrap().order = 0;
    }
    m.restack(&[ObjectId(2)]);
    assert_eq!(m.get_layer(b).unwrap().order, 0);
    assert_eq!(m.get_layer(a).unwrap().order, 1);
}

#[test]
fn extreme_orders_are_rejected_not_overflowed() {
    let mut m = LayerManager::new();
    let a = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id;
    let b = m.create_layer(ObjectId(2), ObjectKind::Shape, None).id;

    assert!(matches!(m.reorder(a, i64::MAX), Err(EaselError::Validation(_))));
    assert!(matches!(m.reorder(b, i64::MIN), Err(EaselError::Validation(_))));
    assert_eq!(m.get_layer(a).unwrap().order, 0);

    m.reorder(a, MAX_LAYER_ORDER).unwrap();
    m.reorder(b, MAX_LAYER_ORDER).unwrap();
    assert_eq!(m.get_layer(a).unwrap().order, MAX_LAYER_ORDER + 1);

    let r = m.sync_with_scene_objects(&[
        info(1, ObjectKind::Shape),
        info(2, ObjectKind::Shape),
        info(3, ObjectKind::Shape),
    ]);
    assert_eq!(r.created.len(), 1);
    let o = orders(&m);
    assert_eq!(o, [MAX_LAYER_ORDER + 2, MAX_LAYER_ORDER + 1, MAX_LAYER_ORDER]);
}

#[test]
fn rejected_order_patch_changes_nothing() {
    let mut m = LayerManager::new();
    let a = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id;
    let patch = LayerPatch {
        name: Some("renamed".to_owned()),
        order: Some(i64::MAX),
        ..LayerPatch::default()
    };
    assert!(m.update_layer(a, patch).is_err());
    assert_eq!(m.get_layer(a).unwrap().name, "shape #1");

    let mut table = m.snapshot();
    table.layers[0].order = i64::MIN;
    assert!(matches!(m.restore(table), Err(EaselError::Validation(_))));
    assert_eq!(m.get_layer(a).unwrap().order, 0);
}

#[test]
fn restack_follows_scene_stacking() {
    let mut m = LayerManager::new();
    let a = m.create_layer(ObjectId(1), ObjectKind::Shape, None).id;
    let b = m.create_layer(ObjectId(2), ObjectKind::Shape, None).id;
    m.restack(&[ObjectId(2), ObjectId(1)]);
    let top: Vec<_> = m.sorted_layers().iter().map(|l| l.id).collect();
    assert_eq!(top, [a, b]);
}

#[test]
fn set_parent_keeps_both_sides_and_refuses_cycles() {
    let mut m = LayerManager::new();
    let group = m.create_layer(ObjectId(1), ObjectKind::Group, None).id;
    let child = m.create_layer(ObjectId(2), ObjectKind::Shape, None).id;

    m.set_parent(child, Some(group)).unwrap();
    assert_eq!(m.get_layer(child).unwrap().parent_id, Some(group));
    assert_eq!(m.get_layer(group).unwrap().children, [child]);
    assert!(m.get_layer(group).unwrap().is_group);

    assert!(m.set_parent(group, Some(child)).is_err());
    assert!(m.set_parent(group, Some(group)).is_err());

    m.delete_layer(group).unwrap();
    assert_eq!(m.get_layer(child).unwrap().parent_id, None);
}

#[test]
fn snapshot_restore_round_trips_and_rejects_duplicates() {
    let mut m = LayerManager::new();
    let id = m.create_layer(ObjectId(1), ObjectKind::Image, None).id;
    m.add_filter(id, "invert", BTreeMap::new()).unwrap();
    let table = m.snapshot();

    let mut other = LayerManager::new();
    other.restore(table.clone()).unwrap();
    assert_eq!(other.snapshot(), table);
    // Counters survive so new ids never collide.
    assert_eq!(other.create_layer(ObjectId(2), ObjectKind::Shape, None).id, LayerId(2));

    let mut dup = table.clone();
    dup.layers.push(dup.layers[0].clone());
    assert!(other.restore(dup).is_err());
    assert_eq!(other.len(), 2);
}

#[test]
fn clear_resets_counters() {
    let mut m = LayerManager::new();
    m.create_layer(ObjectId(1), ObjectKind::Shape, None);
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.create_layer(ObjectId(1), ObjectKind::Shape, None).id, LayerId(1));
}
