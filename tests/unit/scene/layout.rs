use super::*;
use crate::foundation::core::{Point, Rect, Vec2};
use crate::scene::model::{AttachmentInfo, Category};
use crate::timeline::evaluate::ObjectOverride;

const PUPPET: &str = include_str!("../../data/puppet.svg");

fn approx(a: Point, b: Point) {
    assert!(
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
        "{a:?} != {b:?}"
    );
}

fn puppet_scene(x: f64, y: f64) -> (Scene, RigCache, ObjectId) {
    let mut rigs = RigCache::default();
    rigs.load(PUPPET).unwrap();
    let mut scene = Scene::new();
    let id = scene.spawn(
        PUPPET,
        Category::Puppet,
        Rect::new(x, y, x + 100.0, y + 200.0),
    );
    (scene, rigs, id)
}

#[test]
fn limb_rotates_about_its_pivot() {
    let (mut scene, rigs, id) = puppet_scene(10.0, 20.0);
    scene
        .get_mut(&id)
        .unwrap()
        .articulation
        .insert("left-arm".to_owned(), 90.0);
    let layout = SceneLayout::new(&scene, &rigs, Viewport::default());

    let limb = layout.limb_transform(&id, "left-arm").unwrap();
    approx(limb * Point::new(20.0, 45.0), Point::new(30.0, 65.0));
    approx(limb * Point::new(20.0, 95.0), Point::new(-20.0, 65.0));

    // The frame is the pre-rotation space.
    let frame = layout.part_frame(&id, "left-arm").unwrap();
    approx(frame * Point::new(20.0, 95.0), Point::new(30.0, 115.0));

    // Children inherit the rotation of their parent limb.
    let forearm = layout.part_frame(&id, "left-forearm").unwrap();
    approx(forearm * Point::new(20.0, 95.0), Point::new(-20.0, 65.0));
}

#[test]
fn static_part_transform_is_respected() {
    let (scene, rigs, id) = puppet_scene(0.0, 0.0);
    let layout = SceneLayout::new(&scene, &rigs, Viewport::default());
    let head = layout.limb_transform(&id, "head").unwrap();
    approx(head * Point::new(50.0, 25.0), Point::new(50.0, 20.0));
}

#[test]
fn flipped_puppet_renders_mirrored_angles() {
    let (mut scene, rigs, id) = puppet_scene(0.0, 0.0);
    {
        let obj = scene.get_mut(&id).unwrap();
        obj.articulation.insert("left-arm".to_owned(), 30.0);
        obj.flipped = true;
    }
    let flipped = SceneLayout::new(&scene, &rigs, Viewport::default())
        .limb_transform(&id, "right-arm")
        .unwrap();

    let mut unflipped_scene = scene.clone();
    unflipped_scene.get_mut(&id).unwrap().flipped = false;
    let unflipped = SceneLayout::new(&unflipped_scene, &rigs, Viewport::default())
        .limb_transform(&id, "left-arm")
        .unwrap();

    // The flipped right arm lands where the unflipped left arm was drawn.
    approx(flipped * Point::new(80.0, 45.0), Point::new(20.0, 45.0));
    approx(
        flipped * Point::new(80.0, 95.0),
        unflipped * Point::new(20.0, 95.0),
    );
}

#[test]
fn viewport_applies_after_world() {
    let (scene, rigs, id) = puppet_scene(10.0, 20.0);
    let viewport = Viewport::new(Vec2::new(5.0, 5.0), 2.0).unwrap();
    let layout = SceneLayout::new(&scene, &rigs, viewport);
    approx(
        layout.object_frame(&id).unwrap() * Point::ORIGIN,
        Point::new(25.0, 45.0),
    );
}

#[test]
fn object_rotation_turns_about_box_center() {
    let (mut scene, rigs, id) = puppet_scene(0.0, 0.0);
    scene.get_mut(&id).unwrap().rotation = 90.0;
    let layout = SceneLayout::new(&scene, &rigs, Viewport::default());
    let frame = layout.object_frame(&id).unwrap();
    approx(frame * Point::new(50.0, 100.0), Point::new(50.0, 100.0));
    approx(frame * Point::new(50.0, 0.0), Point::new(150.0, 100.0));
}

#[test]
fn attached_object_follows_limb_and_overrides() {
    let (mut scene, rigs, puppet) = puppet_scene(0.0, 0.0);
    let prop = scene.spawn("<svg/>", Category::Prop, Rect::new(0.0, 0.0, 10.0, 10.0));
    scene.get_mut(&prop).unwrap().attachment_info = Some(AttachmentInfo {
        parent_id: puppet.clone(),
        limb_id: "left-arm".to_owned(),
        transform: Affine::translate((20.0, 95.0)),
    });

    let layout = SceneLayout::new(&scene, &rigs, Viewport::default());
    approx(
        layout.object_frame(&prop).unwrap() * Point::ORIGIN,
        Point::new(20.0, 95.0),
    );

    let overrides: SvgOverrides = [(
        puppet.clone(),
        ObjectOverride {
            x: Some(100.0),
            ..ObjectOverride::default()
        },
    )]
    .into_iter()
    .collect();
    let animated = SceneLayout::new(&scene, &rigs, Viewport::default()).with_overrides(&overrides);
    approx(
        animated.object_frame(&prop).unwrap() * Point::ORIGIN,
        Point::new(120.0, 95.0),
    );
}

#[test]
fn unknown_parts_and_cycles_have_no_frame() {
    let (mut scene, rigs, a) = puppet_scene(0.0, 0.0);
    let layout = SceneLayout::new(&scene, &rigs, Viewport::default());
    assert!(layout.limb_transform(&a, "tail").is_none());
    assert!(layout.object_frame(&ObjectId::from("missing")).is_none());

    let b = scene.spawn(PUPPET, Category::Puppet, Rect::new(0.0, 0.0, 100.0, 200.0));
    for (child, parent) in [(&a, &b), (&b, &a)] {
        scene.get_mut(child).unwrap().attachment_info = Some(AttachmentInfo {
            parent_id: parent.clone(),
            limb_id: "torso".to_owned(),
            transform: Affine::IDENTITY,
        });
    }
    let layout = SceneLayout::new(&scene, &rigs, Viewport::default());
    assert!(layout.object_frame(&a).is_none());
}
