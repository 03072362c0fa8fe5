use super::*;
use crate::scene::model::AttachmentInfo;

const PUPPET: &str = include_str!("../../data/puppet.svg");
const HAT: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10"/></svg>"#;

fn session() -> EditorSession {
    EditorSession::new(EditorOpts::default()).unwrap()
}

fn puppet(s: &mut EditorSession) -> ObjectId {
    s.spawn(PUPPET, Category::Puppet, Rect::new(0.0, 0.0, 100.0, 200.0))
        .unwrap()
}

#[test]
fn spawn_validates_rect_and_tolerates_bad_markup() {
    let mut s = session();
    assert!(s
        .spawn(HAT, Category::Prop, Rect::new(0.0, 0.0, 0.0, 10.0))
        .is_err());
    let id = s
        .spawn("not svg", Category::Other, Rect::new(0.0, 0.0, 5.0, 5.0))
        .unwrap();
    assert!(s.scene().contains(&id));
}

#[test]
fn edits_record_keyframes_only_when_paused() {
    let mut s = session();
    let p = puppet(&mut s);
    s.seek(10);
    s.update_object(&p, &ObjectPatch::position(30.0, 40.0)).unwrap();
    assert_eq!(s.timeline().tracks.len(), 1);

    s.play();
    s.set_articulation(&p, "left-arm", 20.0).unwrap();
    assert_eq!(s.timeline().tracks.len(), 1);
    assert_eq!(s.scene().get(&p).unwrap().articulation["left-arm"], 20.0);

    s.pause();
    s.edit_timeline(|t| t.auto_keyframe = false);
    s.update_object(&p, &ObjectPatch::position(0.0, 0.0)).unwrap();
    assert_eq!(s.timeline().tracks.len(), 1);
}

#[test]
fn overrides_follow_the_playhead() {
    let mut s = session();
    let p = puppet(&mut s);
    s.seek(0);
    s.update_object(&p, &ObjectPatch::position(0.0, 0.0)).unwrap();
    s.seek(10);
    s.update_object(&p, &ObjectPatch::position(100.0, 0.0)).unwrap();

    s.seek(5);
    assert_eq!(s.overrides()[&p].x, Some(50.0));
    // The base object keeps the last edited value.
    assert_eq!(s.scene().get(&p).unwrap().x, 100.0);

    s.play();
    assert_eq!(s.tick(0.0), 0);
    // 24 fps: 125 ms is three whole frames.
    assert_eq!(s.tick(125.0), 3);
    assert_eq!(s.timeline().current_frame(), FrameIndex(8));
    assert_eq!(s.overrides()[&p].x, Some(80.0));
}

#[test]
fn pointer_drag_rotates_a_limb() {
    let mut s = session();
    let p = puppet(&mut s);
    // Pivot of the left arm is (20, 45); press straight right of it.
    assert!(s.pointer_down(&p, "left-arm-shape", Point::new(40.0, 45.0)));
    assert!(s.is_rotating(&p));
    // A second press is ignored while dragging.
    assert!(!s.pointer_down(&p, "right-arm-shape", Point::new(90.0, 45.0)));

    let change = s
        .pointer_move(&p, Point::new(20.0, 65.0))
        .unwrap()
        .unwrap();
    assert_eq!(change.part, "left-arm");
    assert!((change.angle - 90.0).abs() < 1e-9);
    assert!((s.scene().get(&p).unwrap().articulation["left-arm"] - 90.0).abs() < 1e-9);

    s.pointer_up(&p);
    assert!(!s.is_rotating(&p));
    assert!(s.pointer_move(&p, Point::new(0.0, 0.0)).unwrap().is_none());
}

#[test]
fn rotate_mode_off_blocks_and_cancels_drags() {
    let mut s = session();
    let p = puppet(&mut s);
    assert!(s.pointer_down(&p, "left-arm", Point::new(40.0, 45.0)));
    s.set_rotate_mode(false);
    assert!(!s.is_rotating(&p));
    assert!(!s.pointer_down(&p, "left-arm", Point::new(40.0, 45.0)));
}

#[test]
fn attach_then_detach_keeps_pose() {
    let mut s = session();
    let p = puppet(&mut s);
    let hat = s
        .spawn(HAT, Category::Prop, Rect::new(45.0, 0.0, 55.0, 10.0))
        .unwrap();
    assert!(s.attach(&hat, &p, "head").unwrap());
    assert!(s.scene().get(&hat).unwrap().is_attached());
    assert!(s.detach(&hat).unwrap());
    let obj = s.scene().get(&hat).unwrap();
    assert_eq!((obj.x, obj.y, obj.rotation), (45.0, 0.0, 0.0));
}

#[test]
fn deleting_a_parent_frees_children_in_place() {
    let mut s = session();
    let p = puppet(&mut s);
    let hat = s
        .spawn(HAT, Category::Prop, Rect::new(10.0, 85.0, 20.0, 95.0))
        .unwrap();
    assert!(s.attach(&hat, &p, "left-arm").unwrap());
    s.set_articulation(&p, "left-arm", 90.0).unwrap();
    s.update_object(&p, &ObjectPatch::position(5.0, 0.0)).unwrap();

    let center = |m: crate::foundation::core::Affine| m * Point::new(5.0, 5.0);
    let before = center(s.layout().object_frame(&hat).unwrap());
    assert!((before.x + 20.0).abs() < 1e-9 && (before.y - 40.0).abs() < 1e-9);

    s.delete_object(&p).unwrap();
    let obj = s.scene().get(&hat).unwrap();
    assert!(obj.attachment_info.is_none());
    assert_eq!((obj.x, obj.y, obj.rotation), (-25.0, 35.0, 90.0));
    assert!(s.timeline().tracks.iter().all(|t| t.object_id != p));

    let after = center(s.layout().object_frame(&hat).unwrap());
    assert!((after.x - before.x).abs() <= 1.0 && (after.y - before.y).abs() <= 1.0);
}

#[test]
fn snapshot_round_trips_document_state() {
    let mut s = session();
    let p = puppet(&mut s);
    let hat = s
        .spawn(HAT, Category::Prop, Rect::new(45.0, 0.0, 55.0, 10.0))
        .unwrap();
    s.attach(&hat, &p, "head").unwrap();
    s.set_articulation(&p, "right-arm", -30.0).unwrap();
    s.seek(12);
    s.play();

    let json = s.snapshot().to_json().unwrap();
    let doc = DocumentSnapshot::from_json(&json).unwrap();
    let restored = EditorSession::from_snapshot(doc, EditorOpts::default()).unwrap();
    assert_eq!(restored.scene(), s.scene());
    assert_eq!(restored.timeline().tracks, s.timeline().tracks);
    assert_eq!(restored.timeline().current_frame(), FrameIndex::ZERO);
    assert!(!restored.timeline().is_playing());
    assert!(matches!(
        restored.scene().get(&hat).unwrap().attachment_info,
        Some(AttachmentInfo { .. })
    ));
}

#[test]
fn in_memory_snapshot_drops_playhead_and_playback() {
    let mut s = session();
    puppet(&mut s);
    s.seek(24);
    s.play();

    let snap = s.snapshot();
    assert_eq!(snap.timeline.current_frame(), FrameIndex::ZERO);
    assert!(!snap.timeline.is_playing());
    // The live session keeps its own state.
    assert_eq!(s.timeline().current_frame(), FrameIndex(24));
    assert!(s.timeline().is_playing());

    let restored = EditorSession::from_snapshot(
        DocumentSnapshot {
            objects: s.scene().objects().to_vec(),
            timeline: s.timeline().clone(),
        },
        EditorOpts::default(),
    )
    .unwrap();
    assert_eq!(restored.timeline().current_frame(), FrameIndex::ZERO);
    assert!(!restored.timeline().is_playing());
    assert_eq!(restored.timeline().tracks, s.timeline().tracks);
}

#[test]
fn unknown_ids_are_validation_errors() {
    let mut s = session();
    let ghost = ObjectId::from("ghost");
    assert!(matches!(
        s.update_object(&ghost, &ObjectPatch::position(1.0, 1.0)),
        Err(PuppetryError::Validation(_))
    ));
    assert!(s.delete_object(&ghost).is_err());
    assert!(!s.pointer_down(&ghost, "left-arm", Point::ORIGIN));
}
