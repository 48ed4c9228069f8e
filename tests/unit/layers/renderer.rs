use std::collections::BTreeMap;

use super::*;
use crate::bitmap::buffer::BitmapBuffer;
use crate::bitmap::codec::ExportFormat;
use crate::foundation::core::{BlendMode, ObjectId, Point, Rect, Rgba8};
use crate::scene::memory::{Drawable, ImageSource, Scene};

fn white_png() -> Vec<u8> {
    BitmapBuffer::filled(2, 2, Rgba8::WHITE)
        .unwrap()
        .encode(ExportFormat::Png)
        .unwrap()
}

fn setup() -> (Scene, LayerManager, ObjectId, ObjectId) {
    let mut scene = Scene::new(2, 2).unwrap();
    let shape = scene
        .add_object(Drawable::Rect {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            fill: Rgba8::BLACK,
        })
        .unwrap();
    let image = scene
        .add_object(Drawable::Image(ImageSource::new(Point::ZERO, white_png())))
        .unwrap();
    let mut layers = LayerManager::new();
    layers.sync_with_scene_objects(&scene.objects());
    (scene, layers, shape, image)
}

#[test]
fn unknown_filter_names_are_skipped() {
    let specs = vec![
        FilterSpec {
            id: FilterId(1),
            name: "no-such-effect".into(),
            params: BTreeMap::new(),
        },
        FilterSpec {
            id: FilterId(2),
            name: "invert".into(),
            params: BTreeMap::new(),
        },
    ];
    let chain = build_filter_chain(&specs);
    assert_eq!(chain, vec![Effect::Invert { intensity: 100.0 }]);
}

#[test]
fn layer_properties_reach_the_object() {
    let (mut scene, mut layers, shape, _) = setup();
    let lid = layers.get_layer_by_object(shape).unwrap().id;
    layers.set_opacity(lid, 40.0).unwrap();
    layers.toggle_visibility(lid).unwrap();
    layers.set_blend_mode(lid, BlendMode::Screen).unwrap();

    let layer = layers.get_layer(lid).unwrap().clone();
    let obj = scene.object_mut(shape).unwrap();
    apply_layer_to_object(obj, &layer).unwrap();
    assert!((obj.opacity() - 0.4).abs() < 1e-9);
    assert!(!obj.visible());
    assert_eq!(obj.blend_mode(), BlendMode::Screen);
}

#[test]
fn filters_on_shapes_are_a_silent_noop() {
    let (mut scene, mut layers, shape, _) = setup();
    let lid = layers.get_layer_by_object(shape).unwrap().id;
    layers.add_filter(lid, "sepia", BTreeMap::new()).unwrap();
    let layer = layers.get_layer(lid).unwrap().clone();

    let obj = scene.object_mut(shape).unwrap();
    assert!(!apply_filters_to_object(obj, &layer.filters).unwrap());
    apply_layer_to_object(obj, &layer).unwrap();
}

#[test]
fn image_filters_apply_and_can_be_removed() {
    let (mut scene, mut layers, _, image) = setup();
    let lid = layers.get_layer_by_object(image).unwrap().id;
    let fid = layers.add_filter(lid, "invert", BTreeMap::new()).unwrap();

    apply_all(&mut scene, &layers).unwrap();
    assert_eq!(scene.render().unwrap().get(1, 1).unwrap(), Rgba8::BLACK);

    layers
        .update_filter(lid, fid, BTreeMap::from([("intensity".to_string(), 0.0)]))
        .unwrap();
    let layer = layers.get_layer(lid).unwrap().clone();
    assert!(update_filter_on_object(scene.object_mut(image).unwrap(), &layer, fid).unwrap());
    assert_eq!(scene.render().unwrap().get(1, 1).unwrap(), Rgba8::WHITE);

    assert!(update_filter_on_object(scene.object_mut(image).unwrap(), &layer, FilterId(99)).is_err());

    layers
        .update_filter(lid, fid, BTreeMap::from([("intensity".to_string(), 100.0)]))
        .unwrap();
    apply_all(&mut scene, &layers).unwrap();
    assert!(remove_filters_from_object(scene.object_mut(image).unwrap()).unwrap());
    assert_eq!(scene.render().unwrap().get(1, 1).unwrap(), Rgba8::WHITE);
}

#[test]
fn apply_all_skips_missing_objects() {
    let (mut scene, layers, shape, _) = setup();
    scene.remove_object(shape).unwrap();
    assert_eq!(apply_all(&mut scene, &layers).unwrap(), 1);
}
