use super::*;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x, y, x + w, y + h)
}

#[test]
fn spawn_generates_unique_ids() {
    let mut scene = Scene::new();
    let a = scene.spawn("<svg/>", Category::Prop, rect(0.0, 0.0, 10.0, 10.0));
    let b = scene.spawn("<svg/>", Category::Prop, rect(0.0, 0.0, 10.0, 10.0));
    assert_ne!(a, b);
    scene.remove(&a).unwrap();
    let c = scene.spawn("<svg/>", Category::Prop, rect(0.0, 0.0, 10.0, 10.0));
    assert_ne!(c, b);
    assert_eq!(scene.len(), 2);
}

#[test]
fn insert_rejects_duplicates() {
    let mut scene = Scene::new();
    let obj = SceneObject::new("a".into(), "", Category::Other, rect(0.0, 0.0, 1.0, 1.0));
    scene.insert(obj.clone()).unwrap();
    assert!(matches!(
        scene.insert(obj),
        Err(PuppetryError::Validation(_))
    ));
}

#[test]
fn draw_order_sorts_by_z_then_insertion() {
    let mut scene = Scene::new();
    let a = scene.spawn("", Category::Other, rect(0.0, 0.0, 1.0, 1.0));
    let b = scene.spawn("", Category::Other, rect(0.0, 0.0, 1.0, 1.0));
    let c = scene.spawn("", Category::Other, rect(0.0, 0.0, 1.0, 1.0));
    scene.get_mut(&a).unwrap().z_index = 2;
    scene.get_mut(&c).unwrap().z_index = -1;
    let order: Vec<&ObjectId> = scene.draw_order().into_iter().map(|o| &o.id).collect();
    assert_eq!(order, vec![&c, &b, &a]);
}

#[test]
fn patch_merges_articulation_and_normalizes_rotation() {
    let mut obj = SceneObject::new("p".into(), "", Category::Puppet, rect(0.0, 0.0, 10.0, 10.0));
    obj.articulation.insert("arm".to_owned(), 10.0);
    let patch = ObjectPatch {
        rotation: Some(270.0),
        articulation: Some([("leg".to_owned(), 5.0)].into_iter().collect()),
        ..ObjectPatch::default()
    };
    patch.validate().unwrap();
    patch.apply_to(&mut obj);
    assert_eq!(obj.rotation, -90.0);
    assert_eq!(obj.articulation.get("arm"), Some(&10.0));
    assert_eq!(obj.articulation.get("leg"), Some(&5.0));
}

#[test]
fn patch_validation_rejects_bad_numbers() {
    assert!(ObjectPatch::position(f64::NAN, 0.0).validate().is_err());
    let p = ObjectPatch {
        width: Some(0.0),
        ..ObjectPatch::default()
    };
    assert!(p.validate().is_err());
    assert!(ObjectPatch::articulate("a", f64::INFINITY).validate().is_err());
}

#[test]
fn with_override_never_touches_base() {
    let obj = SceneObject::new("p".into(), "", Category::Puppet, rect(1.0, 2.0, 10.0, 10.0));
    let ov = ObjectOverride {
        x: Some(50.0),
        hidden: Some(true),
        articulation: [("arm".to_owned(), 15.0)].into_iter().collect(),
        ..ObjectOverride::default()
    };
    let merged = obj.with_override(&ov);
    assert_eq!((merged.x, merged.y), (50.0, 2.0));
    assert!(merged.hidden);
    assert_eq!(merged.articulation.get("arm"), Some(&15.0));
    assert_eq!(obj.x, 1.0);
    assert!(obj.articulation.is_empty());
}

#[test]
fn standalone_frame_rotates_about_center() {
    let mut obj = SceneObject::new("p".into(), "", Category::Prop, rect(10.0, 20.0, 40.0, 20.0));
    obj.rotation = 90.0;
    let c = obj.standalone_frame() * Point::new(20.0, 10.0);
    assert!((c.x - 30.0).abs() < 1e-9 && (c.y - 30.0).abs() < 1e-9);
}

#[test]
fn attachment_queries_follow_foreign_keys() {
    let mut scene = Scene::new();
    let p = scene.spawn("", Category::Puppet, rect(0.0, 0.0, 1.0, 1.0));
    let c = scene.spawn("", Category::Prop, rect(0.0, 0.0, 1.0, 1.0));
    let g = scene.spawn("", Category::Prop, rect(0.0, 0.0, 1.0, 1.0));
    scene.get_mut(&c).unwrap().attachment_info = Some(AttachmentInfo {
        parent_id: p.clone(),
        limb_id: "arm".to_owned(),
        transform: Affine::IDENTITY,
    });
    scene.get_mut(&g).unwrap().attachment_info = Some(AttachmentInfo {
        parent_id: c.clone(),
        limb_id: "hook".to_owned(),
        transform: Affine::IDENTITY,
    });
    assert_eq!(scene.children_of(&p), vec![c.clone()]);
    assert!(scene.is_self_or_ancestor(&p, &g));
    assert!(scene.is_self_or_ancestor(&g, &g));
    assert!(!scene.is_self_or_ancestor(&g, &p));
}

#[test]
fn serde_shape_uses_camel_case_and_matrix_array() {
    let mut obj = SceneObject::new("k".into(), "<svg/>", Category::Prop, rect(0.0, 0.0, 4.0, 2.0));
    obj.attachment_info = Some(AttachmentInfo {
        parent_id: "p".into(),
        limb_id: "hand".to_owned(),
        transform: Affine::new([1.0, 0.0, 0.0, 1.0, 5.0, 6.0]),
    });
    let v = serde_json::to_value(&obj).unwrap();
    assert_eq!(v["zIndex"], 0);
    assert_eq!(v["category"], "prop");
    assert_eq!(v["attachmentInfo"]["parentId"], "p");
    assert_eq!(
        v["attachmentInfo"]["transform"],
        serde_json::json!([1.0, 0.0, 0.0, 1.0, 5.0, 6.0])
    );
    assert!(v.get("articulation").is_none());
    let back: SceneObject = serde_json::from_value(v).unwrap();
    assert_eq!(back, obj);
}
