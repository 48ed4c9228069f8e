use super::*;
use crate::foundation::core::{ObjectId, Point, Rect};
use crate::scene::graph::SceneGraph;
use crate::scene::memory::{Drawable, ImageSource};

fn sample() -> Scene {
    let mut scene = Scene::new(4, 4).unwrap();
    scene
        .add_object(Drawable::Rect {
            rect: Rect::new(0.0, 0.0, 2.0, 2.0),
            fill: Rgba8::BLACK,
        })
        .unwrap();
    scene
        .add_object(Drawable::Image(ImageSource::new(Point::new(1.0, 1.0), vec![0, 255, 7])))
        .unwrap();
    scene
}

#[test]
fn snapshot_json_shape() {
    let json: serde_json::Value = serde_json::from_str(&sample().to_snapshot().unwrap()).unwrap();
    assert_eq!(json["version"], SCENE_SNAPSHOT_VERSION);
    assert_eq!(json["nextId"], 3);
    assert_eq!(json["objects"][0]["drawable"]["type"], "rect");
    assert_eq!(json["objects"][1]["drawable"]["type"], "image");
    // Image bytes travel as base64.
    assert_eq!(json["objects"][1]["drawable"]["encoded"], "AP8H");
}

#[test]
fn validate_rejects_foreign_versions_and_bad_ids() {
    let scene = sample();

    let mut snap = SceneSnapshot::of(&scene);
    snap.version = 99;
    assert!(snap.validate().is_err());

    let mut snap = SceneSnapshot::of(&scene);
    snap.objects[1].id = ObjectId(1);
    assert!(snap.validate().is_err());

    let mut snap = SceneSnapshot::of(&scene);
    snap.next_id = 2;
    assert!(snap.validate().is_err());

    let mut snap = SceneSnapshot::of(&scene);
    snap.objects[0].opacity = 1.5;
    assert!(snap.validate().is_err());

    assert!(SceneSnapshot::of(&scene).validate().is_ok());
}
