//! Puppetry is the rig, attachment and keyframe-timeline engine behind an SVG puppet editor.
//!
//! - Rigs are discovered from `data-*` metadata in SVG markup ([`extract_rig`], [`RigCache`]).
//! - Limbs rotate about their pivots, flipped puppets render mirrored poses ([`evaluate_pose`],
//!   [`RotationController`]).
//! - Objects attach rigidly to limbs by a stored relative matrix ([`attach`], [`detach`]).
//! - Tracks of keyframes evaluate into per-frame overrides ([`evaluate_tracks`]).
//!
//! [`EditorSession`] ties these together for an interactive editor.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod attach;
pub(crate) mod render;
pub(crate) mod rig;
pub(crate) mod scene;
pub(crate) mod session;
pub(crate) mod timeline;

pub use crate::foundation::core::{Affine, Fps, FrameIndex, Point, Rect, Size2, Vec2};
pub use crate::foundation::error::{PuppetryError, PuppetryResult};
pub use crate::foundation::math::{normalize_deg_detach, normalize_deg_signed, round_unit};

pub use crate::attach::engine::{
    AttachmentEdit, StandalonePose, attach, bake_standalone, detach, plan_attach, plan_detach,
    relative_transform,
};
pub use crate::render::tree::{LimbGroup, RenderNode, build_render_tree};
pub use crate::rig::cache::{Rig, RigCache};
pub use crate::rig::geometry::RigGeometry;
pub use crate::rig::metadata::{PuppetPart, RigMetadata, RigSchema, Side, extract_rig, extract_rig_with};
pub use crate::rig::mirror::MirrorTable;
pub use crate::rig::pose::{
    Articulation, PartPose, PuppetPose, canonical_angle, effective_angle, evaluate_pose,
    flip_transform,
};
pub use crate::rig::rotation::{
    ArticulationChange, DragInfo, DragState, PressInput, RotationController,
};
pub use crate::scene::layout::{SceneLayout, ScreenGeometry};
pub use crate::scene::model::{
    AttachmentInfo, Category, ObjectId, ObjectPatch, Scene, SceneObject,
};
pub use crate::scene::viewport::Viewport;
pub use crate::session::editor::{EditorOpts, EditorSession};
pub use crate::session::snapshot::DocumentSnapshot;
pub use crate::timeline::evaluate::{ObjectOverride, SvgOverrides, evaluate_tracks};
pub use crate::timeline::model::{
    Interpolation, Keyframe, Lerp, TimelineOpts, TimelineState, TimelineTrack, TrackChannel,
    TrackId, TrackTarget,
};
pub use crate::timeline::playback::PlaybackClock;
pub use crate::timeline::record::record_patch;
