use std::collections::HashMap;

use super::*;
use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::math::rotate_about_deg;
use crate::scene::model::{Category, SceneObject};

#[derive(Default)]
struct FixedGeometry {
    frames: HashMap<ObjectId, Affine>,
    limbs: HashMap<(ObjectId, String), Affine>,
    viewport: Viewport,
}

impl ScreenGeometry for FixedGeometry {
    fn object_frame(&self, object: &ObjectId) -> Option<Affine> {
        self.frames.get(object).copied()
    }

    fn part_frame(&self, object: &ObjectId, part: &str) -> Option<Affine> {
        self.limb_transform(object, part)
    }

    fn limb_transform(&self, object: &ObjectId, limb: &str) -> Option<Affine> {
        self.limbs.get(&(object.clone(), limb.to_owned())).copied()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

fn scene_with(ids: &[&str]) -> Scene {
    let objects = ids
        .iter()
        .map(|id| {
            SceneObject::new(
                ObjectId::from(*id),
                "",
                Category::Prop,
                Rect::new(5.0, 5.0, 15.0, 15.0),
            )
        })
        .collect();
    Scene::from_objects(objects).unwrap()
}

#[test]
fn relative_transform_recovers_child() {
    let limb = Affine::translate((40.0, 10.0)) * rotate_about_deg(30.0, Point::new(2.0, 3.0));
    let child = Affine::translate((7.0, -4.0)) * Affine::scale(2.0);
    let rel = relative_transform(limb, child).unwrap();
    let back = limb * rel;
    for (a, b) in back.as_coeffs().iter().zip(child.as_coeffs()) {
        assert!((a - b).abs() < 1e-9);
    }
    assert!(relative_transform(Affine::scale(0.0), child).is_none());
}

#[test]
fn bake_preserves_center_through_viewport() {
    let viewport = Viewport::new(Vec2::new(10.0, 0.0), 2.0).unwrap();
    let world = Affine::translate((30.0, 40.0)) * rotate_about_deg(90.0, Point::new(5.0, 5.0));
    let pose = bake_standalone(viewport.transform() * world, Size2::new(10.0, 10.0), viewport);
    assert_eq!(
        pose,
        StandalonePose {
            x: 30.0,
            y: 40.0,
            rotation: 90.0
        }
    );
}

#[test]
fn bake_uses_half_open_angle_range() {
    let world = Affine::new([-1.0, 0.0, 0.0, -1.0, 10.0, 10.0]);
    let pose = bake_standalone(world, Size2::new(10.0, 10.0), Viewport::default());
    assert_eq!(pose.rotation, -180.0);
    assert_eq!((pose.x, pose.y), (0.0, 0.0));
}

#[test]
fn attach_stores_relative_matrix_and_clears_position() {
    let mut scene = scene_with(&["puppet", "hat"]);
    let limb = Affine::translate((50.0, 20.0));
    let mut geo = FixedGeometry::default();
    geo.frames
        .insert("hat".into(), Affine::translate((60.0, 25.0)));
    geo.limbs.insert(("puppet".into(), "head".into()), limb);

    assert!(attach(&mut scene, &geo, &"hat".into(), &"puppet".into(), "head").unwrap());
    let hat = scene.get(&"hat".into()).unwrap();
    let info = hat.attachment_info.as_ref().unwrap();
    assert_eq!(info.limb_id, "head");
    assert_eq!(info.transform, Affine::translate((10.0, 5.0)));
    assert_eq!((hat.x, hat.y), (0.0, 0.0));

    // A second attach is a no-op.
    assert!(!attach(&mut scene, &geo, &"hat".into(), &"puppet".into(), "head").unwrap());
}

#[test]
fn self_and_cyclic_attachments_are_refused() {
    let mut scene = scene_with(&["a", "b"]);
    let mut geo = FixedGeometry::default();
    for id in ["a", "b"] {
        geo.frames.insert(id.into(), Affine::IDENTITY);
        geo.limbs.insert((id.into(), "arm".into()), Affine::IDENTITY);
    }
    assert!(!attach(&mut scene, &geo, &"a".into(), &"a".into(), "arm").unwrap());
    assert!(attach(&mut scene, &geo, &"b".into(), &"a".into(), "arm").unwrap());
    assert!(!attach(&mut scene, &geo, &"a".into(), &"b".into(), "arm").unwrap());
    assert!(scene.get(&"a".into()).unwrap().attachment_info.is_none());
}

#[test]
fn missing_geometry_is_an_error_without_mutation() {
    let mut scene = scene_with(&["puppet", "hat"]);
    let mut geo = FixedGeometry::default();
    geo.frames.insert("hat".into(), Affine::IDENTITY);
    let before = scene.clone();

    let err = attach(&mut scene, &geo, &"hat".into(), &"puppet".into(), "head").unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(scene, before);

    assert!(matches!(
        attach(&mut scene, &geo, &"ghost".into(), &"puppet".into(), "head"),
        Err(PuppetryError::Validation(_))
    ));
}

#[test]
fn detach_bakes_current_pose() {
    let mut scene = scene_with(&["puppet", "hat"]);
    scene.get_mut(&"hat".into()).unwrap().attachment_info = Some(AttachmentInfo {
        parent_id: "puppet".into(),
        limb_id: "head".into(),
        transform: Affine::IDENTITY,
    });
    let mut geo = FixedGeometry::default();
    geo.frames.insert(
        "hat".into(),
        Affine::translate((20.0, 30.0)) * rotate_about_deg(-45.0, Point::new(5.0, 5.0)),
    );

    assert!(detach(&mut scene, &geo, &"hat".into()).unwrap());
    let hat = scene.get(&"hat".into()).unwrap();
    assert!(hat.attachment_info.is_none());
    assert_eq!((hat.x, hat.y, hat.rotation), (20.0, 30.0, -45.0));

    assert!(!detach(&mut scene, &geo, &"hat".into()).unwrap());
}
