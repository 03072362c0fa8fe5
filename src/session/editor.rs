//! Editor-facing facade over the scene, rigs and timeline.

use std::collections::HashMap;

use crate::attach::engine::{plan_attach, plan_detach};
use crate::foundation::core::{FrameIndex, Point, Rect, Size2};
use crate::foundation::error::{PuppetryError, PuppetryResult};
use crate::render::tree::{RenderNode, build_render_tree};
use crate::rig::cache::RigCache;
use crate::rig::metadata::RigSchema;
use crate::rig::rotation::{ArticulationChange, PressInput, RotationController};
use crate::scene::layout::{SceneLayout, ScreenGeometry};
use crate::scene::model::{Category, ObjectId, ObjectPatch, Scene, SceneObject};
use crate::scene::viewport::Viewport;
use crate::session::snapshot::DocumentSnapshot;
use crate::timeline::evaluate::{SvgOverrides, evaluate_tracks};
use crate::timeline::model::{TimelineOpts, TimelineState};
use crate::timeline::playback::PlaybackClock;
use crate::timeline::record::record_patch;

#[derive(Clone, Debug)]
/// Options for [`EditorSession::new`].
pub struct EditorOpts {
    /// Attribute names used for rig discovery.
    pub schema: RigSchema,
    /// Settings of a new timeline.
    pub timeline: TimelineOpts,
    /// Initial pan/zoom.
    pub viewport: Viewport,
    /// Whether pointer presses on limbs start rotations.
    pub rotate_mode: bool,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            schema: RigSchema::default(),
            timeline: TimelineOpts::default(),
            viewport: Viewport::default(),
            rotate_mode: true,
        }
    }
}

/// One open document with its live editing state.
///
/// Every mutation goes through the session so the timeline overrides stay in sync with the
/// scene and the playhead.
pub struct EditorSession {
    scene: Scene,
    timeline: TimelineState,
    rigs: RigCache,
    viewport: Viewport,
    clock: PlaybackClock,
    rotators: HashMap<ObjectId, RotationController>,
    rotate_mode: bool,
    overrides: SvgOverrides,
}

impl EditorSession {
    /// An empty document.
    pub fn new(opts: EditorOpts) -> PuppetryResult<Self> {
        Ok(Self {
            scene: Scene::new(),
            timeline: TimelineState::new(&opts.timeline)?,
            rigs: RigCache::new(opts.schema),
            viewport: opts.viewport,
            clock: PlaybackClock::new(),
            rotators: HashMap::new(),
            rotate_mode: opts.rotate_mode,
            overrides: SvgOverrides::new(),
        })
    }

    /// Open a persisted document.
    ///
    /// Content that fails rig parsing still loads; such objects simply have no parts.
    pub fn from_snapshot(snapshot: DocumentSnapshot, opts: EditorOpts) -> PuppetryResult<Self> {
        let DocumentSnapshot {
            objects,
            mut timeline,
        } = snapshot;
        timeline.validate()?;
        timeline.clear_live_state();
        let scene = Scene::from_objects(objects)?;
        let mut rigs = RigCache::new(opts.schema);
        for obj in scene.iter() {
            if let Err(err) = rigs.load(&obj.content) {
                tracing::warn!(object = %obj.id, %err, "content has no usable rig");
            }
        }
        let mut session = Self {
            scene,
            timeline,
            rigs,
            viewport: opts.viewport,
            clock: PlaybackClock::new(),
            rotators: HashMap::new(),
            rotate_mode: opts.rotate_mode,
            overrides: SvgOverrides::new(),
        };
        session.refresh_overrides();
        Ok(session)
    }

    /// Persistable copy of the document.
    pub fn snapshot(&self) -> DocumentSnapshot {
        let mut timeline = self.timeline.clone();
        timeline.clear_live_state();
        DocumentSnapshot {
            objects: self.scene.objects().to_vec(),
            timeline,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn timeline(&self) -> &TimelineState {
        &self.timeline
    }

    pub fn rigs(&self) -> &RigCache {
        &self.rigs
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Overrides at the current frame.
    pub fn overrides(&self) -> &SvgOverrides {
        &self.overrides
    }

    /// Geometry of the scene as currently rendered.
    pub fn layout(&self) -> SceneLayout<'_> {
        SceneLayout::new(&self.scene, &self.rigs, self.viewport).with_overrides(&self.overrides)
    }

    /// Render tree at the current frame.
    pub fn render_tree(&self) -> Vec<RenderNode> {
        build_render_tree(&self.scene, &self.rigs, &self.overrides)
    }

    /// Add a free-standing object occupying `rect` (world units).
    pub fn spawn(
        &mut self,
        content: impl Into<String>,
        category: Category,
        rect: Rect,
    ) -> PuppetryResult<ObjectId> {
        let size = Size2::new(rect.width(), rect.height());
        if !size.is_positive() || !rect.x0.is_finite() || !rect.y0.is_finite() {
            return Err(PuppetryError::validation("spawn rect must have a positive size"));
        }
        let content = content.into();
        if let Err(err) = self.rigs.load(&content) {
            tracing::warn!(%err, "spawned content has no usable rig");
        }
        let id = self.scene.spawn(content, category, rect);
        tracing::debug!(object = %id, "spawned");
        Ok(id)
    }

    /// Apply `patch` to an object, recording keyframes when auto-keyframe is on and the timeline
    /// is not playing.
    pub fn update_object(&mut self, id: &ObjectId, patch: &ObjectPatch) -> PuppetryResult<()> {
        patch.validate()?;
        let obj = self
            .scene
            .get(id)
            .ok_or_else(|| PuppetryError::validation(format!("unknown object '{id}'")))?;
        if self.timeline.auto_keyframe && !self.timeline.is_playing() {
            record_patch(&mut self.timeline, obj, patch);
        }
        if let Some(obj) = self.scene.get_mut(id) {
            patch.apply_to(obj);
        }
        self.refresh_overrides();
        Ok(())
    }

    /// Store one limb angle (canonical part id).
    pub fn set_articulation(&mut self, id: &ObjectId, part: &str, angle: f64) -> PuppetryResult<()> {
        self.update_object(id, &ObjectPatch::articulate(part, angle))
    }

    /// Delete an object.
    ///
    /// Children attached to it are detached first, keeping their on-screen pose, and the object's
    /// tracks are dropped.
    pub fn delete_object(&mut self, id: &ObjectId) -> PuppetryResult<SceneObject> {
        if !self.scene.contains(id) {
            return Err(PuppetryError::validation(format!("unknown object '{id}'")));
        }
        for child in self.scene.children_of(id) {
            let plan = plan_detach(&self.scene, &self.layout(), &child);
            match plan {
                Ok(Some(edit)) => edit.apply(&mut self.scene)?,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(object = %child, %err, "dropping attachment of deleted parent");
                    if let Some(obj) = self.scene.get_mut(&child) {
                        obj.attachment_info = None;
                    }
                }
            }
        }
        let removed = self
            .scene
            .remove(id)
            .ok_or_else(|| PuppetryError::validation(format!("unknown object '{id}'")))?;
        self.timeline.remove_tracks_for_object(id);
        self.rotators.remove(id);
        self.rigs
            .retain_contents(self.scene.iter().map(|o| o.content.as_str()));
        self.refresh_overrides();
        Ok(removed)
    }

    /// Attach `child` to `limb` of `parent` at its current on-screen pose.
    pub fn attach(&mut self, child: &ObjectId, parent: &ObjectId, limb: &str) -> PuppetryResult<bool> {
        let plan = plan_attach(&self.scene, &self.layout(), child, parent, limb)?;
        self.apply_plan(plan)
    }

    /// Detach `child`, keeping its on-screen pose.
    pub fn detach(&mut self, child: &ObjectId) -> PuppetryResult<bool> {
        let plan = plan_detach(&self.scene, &self.layout(), child)?;
        self.apply_plan(plan)
    }

    fn apply_plan(
        &mut self,
        plan: Option<crate::attach::engine::AttachmentEdit>,
    ) -> PuppetryResult<bool> {
        match plan {
            Some(edit) => {
                tracing::debug!(object = %edit.child(), "attachment changed");
                edit.apply(&mut self.scene)?;
                self.refresh_overrides();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Toggle rotate mode for every puppet; turning it off ends active drags.
    pub fn set_rotate_mode(&mut self, enabled: bool) {
        self.rotate_mode = enabled;
        for rotator in self.rotators.values_mut() {
            rotator.set_enabled(enabled);
        }
    }

    pub fn rotate_mode(&self) -> bool {
        self.rotate_mode
    }

    /// Pointer pressed on `target_element` inside `object` at a screen position.
    ///
    /// Returns `true` when a limb rotation started.
    pub fn pointer_down(&mut self, object: &ObjectId, target_element: &str, pointer: Point) -> bool {
        let Some(obj) = self.scene.get(object) else {
            return false;
        };
        if obj.locked {
            return false;
        }
        let Some(rig) = self.rigs.get(&obj.content) else {
            return false;
        };
        let merged;
        let obj = match self.overrides.get(object) {
            Some(ov) => {
                merged = obj.with_override(ov);
                &merged
            }
            None => obj,
        };
        let input = PressInput {
            rig: &rig.metadata,
            mirror: &rig.mirror,
            articulation: &obj.articulation,
            flipped: obj.flipped,
        };
        let layout =
            SceneLayout::new(&self.scene, &self.rigs, self.viewport).with_overrides(&self.overrides);
        let rotator = self
            .rotators
            .entry(object.clone())
            .or_insert_with(|| RotationController::new(self.rotate_mode));
        rotator.press(target_element, pointer, input, |part| {
            layout.part_frame(object, part)
        })
    }

    /// Pointer moved; stores the new angle of the dragged limb, if any.
    pub fn pointer_move(
        &mut self,
        object: &ObjectId,
        pointer: Point,
    ) -> PuppetryResult<Option<ArticulationChange>> {
        let Some(change) = self.rotators.get_mut(object).and_then(|r| r.drag(pointer)) else {
            return Ok(None);
        };
        self.set_articulation(object, &change.part, change.angle)?;
        Ok(Some(change))
    }

    /// Pointer released or cancelled.
    pub fn pointer_up(&mut self, object: &ObjectId) {
        if let Some(rotator) = self.rotators.get_mut(object) {
            rotator.release();
        }
    }

    /// Return `true` while a limb of `object` is being dragged.
    pub fn is_rotating(&self, object: &ObjectId) -> bool {
        self.rotators.get(object).is_some_and(RotationController::is_dragging)
    }

    pub fn play(&mut self) {
        self.timeline.play();
        self.clock.reset();
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
        self.clock.reset();
    }

    /// Move the playhead (clamped to the timeline).
    pub fn seek(&mut self, frame: u64) -> FrameIndex {
        self.timeline.set_current_frame(frame);
        self.clock.reset();
        self.refresh_overrides();
        self.timeline.current_frame()
    }

    /// Change timeline settings or tracks; overrides are recomputed afterwards.
    pub fn edit_timeline<R>(&mut self, f: impl FnOnce(&mut TimelineState) -> R) -> R {
        let out = f(&mut self.timeline);
        self.refresh_overrides();
        out
    }

    /// Per-display-frame callback; returns the number of timeline frames advanced.
    pub fn tick(&mut self, now_ms: f64) -> u64 {
        let frames = self.clock.tick(&mut self.timeline, now_ms);
        if frames > 0 {
            self.refresh_overrides();
        }
        frames
    }

    fn refresh_overrides(&mut self) {
        self.overrides = evaluate_tracks(&self.timeline.tracks, self.timeline.current_frame());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
