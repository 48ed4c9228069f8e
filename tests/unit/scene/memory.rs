use super::*;
use crate::bitmap::codec::ExportFormat;

fn png(w: u32, h: u32, px: Rgba8) -> Vec<u8> {
    BitmapBuffer::filled(w, h, px)
        .unwrap()
        .encode(ExportFormat::Png)
        .unwrap()
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64, fill: Rgba8) -> Drawable {
    Drawable::Rect {
        rect: Rect::new(x0, y0, x1, y1),
        fill,
    }
}

fn ids(scene: &Scene) -> Vec<u64> {
    scene.objects().iter().map(|o| o.id.get()).collect()
}

#[test]
fn add_list_and_remove() {
    let mut scene = Scene::new(8, 8).unwrap();
    let a = scene.add_object(rect(0.0, 0.0, 2.0, 2.0, Rgba8::BLACK)).unwrap();
    let b = scene
        .add_named(
            Drawable::Image(ImageSource::new(Point::ZERO, png(2, 2, Rgba8::WHITE))),
            "photo",
        )
        .unwrap();

    let objs = scene.objects();
    assert_eq!(objs.len(), 2);
    assert_eq!(objs[0].kind, ObjectKind::Shape);
    assert_eq!(objs[1].kind, ObjectKind::Image);
    assert_eq!(objs[1].name.as_deref(), Some("photo"));

    scene.remove_object(a).unwrap();
    assert_eq!(ids(&scene), [b.get()]);
    assert!(matches!(scene.remove_object(a), Err(EaselError::NotFound(_))));
}

#[test]
fn z_order_moves() {
    let mut scene = Scene::new(4, 4).unwrap();
    let a = scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::BLACK)).unwrap();
    let b = scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::BLACK)).unwrap();
    let c = scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::BLACK)).unwrap();

    scene.bring_forward(a).unwrap();
    assert_eq!(ids(&scene), [2, 1, 3]);
    scene.bring_to_front(a).unwrap();
    assert_eq!(ids(&scene), [2, 3, 1]);
    scene.send_to_back(c).unwrap();
    assert_eq!(ids(&scene), [3, 2, 1]);
    scene.send_backward(b).unwrap();
    assert_eq!(ids(&scene), [2, 3, 1]);
    // Already at the bottom.
    scene.send_backward(b).unwrap();
    assert_eq!(ids(&scene), [2, 3, 1]);
}

#[test]
fn only_images_are_pixel_editable() {
    let mut scene = Scene::new(4, 4).unwrap();
    let shape = scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::BLACK)).unwrap();
    let text = scene
        .add_object(Drawable::Text {
            origin: Point::new(1.0, 1.0),
            content: "hi".into(),
            size: 12.0,
            fill: Rgba8::BLACK,
        })
        .unwrap();
    let img = scene
        .add_object(Drawable::Image(ImageSource::new(Point::ZERO, png(1, 1, Rgba8::BLACK))))
        .unwrap();

    assert!(scene.object(shape).unwrap().pixel_editable().is_none());
    assert!(scene.object_mut(text).unwrap().pixel_editable_mut().is_none());
    assert!(scene.object(img).unwrap().pixel_editable().is_some());
}

#[test]
fn render_composites_bottom_to_top_with_opacity() {
    let mut scene = Scene::new(4, 2).unwrap();
    scene.add_object(rect(0.0, 0.0, 2.0, 2.0, Rgba8::new(255, 0, 0, 255))).unwrap();
    let top = scene.add_object(rect(1.0, 0.0, 4.0, 2.0, Rgba8::new(0, 0, 255, 255))).unwrap();

    let out = scene.render().unwrap();
    assert_eq!(out.get(0, 0).unwrap(), Rgba8::new(255, 0, 0, 255));
    assert_eq!(out.get(1, 0).unwrap(), Rgba8::new(0, 0, 255, 255));
    assert_eq!(out.get(3, 1).unwrap(), Rgba8::new(0, 0, 255, 255));

    scene.object_mut(top).unwrap().set_visible(false);
    let out = scene.render().unwrap();
    assert_eq!(out.get(3, 1).unwrap(), Rgba8::WHITE);

    let node = scene.object_mut(top).unwrap();
    node.set_visible(true);
    node.set_opacity(0.5);
    let out = scene.render().unwrap();
    assert_eq!(out.get(3, 1).unwrap(), Rgba8::new(127, 127, 255, 255));
}

#[test]
fn multiply_blend_over_red() {
    let mut scene = Scene::new(1, 1).unwrap();
    scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::new(255, 0, 0, 255))).unwrap();
    let top = scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::new(128, 128, 128, 255))).unwrap();
    scene.object_mut(top).unwrap().set_blend_mode(BlendMode::Multiply);
    assert_eq!(scene.render().unwrap().get(0, 0).unwrap(), Rgba8::new(128, 0, 0, 255));
}

#[test]
fn ellipse_covers_centre_not_corners() {
    let mut scene = Scene::new(9, 9).unwrap().with_background(Rgba8::TRANSPARENT);
    scene
        .add_object(Drawable::Ellipse {
            rect: Rect::new(0.0, 0.0, 9.0, 9.0),
            fill: Rgba8::BLACK,
        })
        .unwrap();
    let out = scene.render().unwrap();
    assert_eq!(out.get(4, 4).unwrap(), Rgba8::BLACK);
    assert_eq!(out.get(0, 0).unwrap(), Rgba8::TRANSPARENT);
}

#[test]
fn image_filter_chain_applies_on_render() {
    let mut scene = Scene::new(2, 2).unwrap();
    let id = scene
        .add_object(Drawable::Image(ImageSource::new(Point::ZERO, png(2, 2, Rgba8::WHITE))))
        .unwrap();
    let img = scene.object_mut(id).unwrap().pixel_editable_mut().unwrap();
    img.set_filter_chain(vec![Effect::Invert { intensity: 100.0 }]);
    img.apply_filter_chain().unwrap();

    assert_eq!(scene.render().unwrap().get(1, 1).unwrap(), Rgba8::BLACK);
}

#[test]
fn replace_pixel_source_rejects_garbage_and_keeps_old_bytes() {
    let mut img = ImageSource::new(Point::ZERO, png(1, 1, Rgba8::WHITE));
    let before = img.pixel_source().to_vec();
    assert!(img.replace_pixel_source(b"not an image".to_vec()).is_err());
    assert_eq!(img.pixel_source(), before.as_slice());
}

#[test]
fn snapshot_round_trip_fully_replaces() {
    let mut scene = Scene::new(3, 3).unwrap();
    scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::BLACK)).unwrap();
    let snap = scene.to_snapshot().unwrap();

    scene.add_object(rect(1.0, 1.0, 2.0, 2.0, Rgba8::BLACK)).unwrap();
    scene.restore_from_snapshot(&snap).unwrap();
    assert_eq!(ids(&scene), [1]);
    // The id counter is part of the snapshot.
    assert_eq!(scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::BLACK)).unwrap(), ObjectId(2));
}

#[test]
fn malformed_snapshot_leaves_scene_untouched() {
    let mut scene = Scene::new(3, 3).unwrap();
    scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::BLACK)).unwrap();
    let before = scene.to_snapshot().unwrap();

    let err = scene.restore_from_snapshot("{\"version\": 1").unwrap_err();
    assert!(matches!(err, EaselError::SnapshotRestore(_)));
    assert_eq!(scene.to_snapshot().unwrap(), before);
}

#[test]
fn snapshot_with_undecodable_image_is_rejected() {
    let mut good = Scene::new(2, 2).unwrap();
    good.add_object(Drawable::Image(ImageSource::new(Point::ZERO, vec![1, 2, 3])))
        .unwrap();
    let snap = good.to_snapshot().unwrap();

    let mut scene = Scene::new(5, 5).unwrap();
    assert!(scene.restore_from_snapshot(&snap).is_err());
    assert_eq!(scene.width(), 5);
}

#[test]
fn undecodable_image_inside_group_is_rejected_on_restore() {
    let mut good = Scene::new(2, 2).unwrap();
    good.add_object(Drawable::Group {
        children: vec![
            rect(0.0, 0.0, 1.0, 1.0, Rgba8::BLACK),
            Drawable::Group {
                children: vec![Drawable::Image(ImageSource::new(Point::ZERO, vec![9, 9, 9]))],
            },
        ],
    })
    .unwrap();
    let snap = good.to_snapshot().unwrap();

    let mut scene = Scene::new(5, 5).unwrap();
    scene.add_object(rect(0.0, 0.0, 1.0, 1.0, Rgba8::WHITE)).unwrap();
    let before = scene.to_snapshot().unwrap();

    let err = scene.restore_from_snapshot(&snap).unwrap_err();
    assert!(matches!(err, EaselError::SnapshotRestore(_)));
    assert_eq!(scene.to_snapshot().unwrap(), before);
}
