//! Live geometry of a laid-out scene.
//!
//! Attach and detach read "what is on screen right now". Hosts that render through a DOM can
//! implement [`ScreenGeometry`] from measured transforms; [`SceneLayout`] computes the same values
//! from the scene model so the engine is usable (and testable) without a renderer.

use std::borrow::Cow;

use crate::foundation::core::Affine;
use crate::foundation::math::{checked_inverse, rotate_about_deg};
use crate::rig::cache::{Rig, RigCache};
use crate::rig::pose::{effective_angle, flip_transform};
use crate::scene::model::{ObjectId, Scene, SceneObject};
use crate::scene::viewport::Viewport;
use crate::timeline::evaluate::SvgOverrides;

/// Source of current on-screen transforms.
///
/// Every method returns `None` when the element is not laid out (unknown object, unknown part,
/// unresolvable document geometry).
pub trait ScreenGeometry {
    /// Screen transform of an object's box frame (`(0,0)..(width,height)`).
    fn object_frame(&self, object: &ObjectId) -> Option<Affine>;

    /// Screen transform of a part's local space, before the part's own rotation.
    fn part_frame(&self, object: &ObjectId, part: &str) -> Option<Affine>;

    /// Screen transform of a part's local space, including its own rotation.
    fn limb_transform(&self, object: &ObjectId, limb: &str) -> Option<Affine>;

    /// Current pan/zoom.
    fn viewport(&self) -> Viewport;
}

/// [`ScreenGeometry`] computed from the scene model.
#[derive(Clone, Copy)]
pub struct SceneLayout<'a> {
    scene: &'a Scene,
    rigs: &'a RigCache,
    viewport: Viewport,
    overrides: Option<&'a SvgOverrides>,
}

impl<'a> SceneLayout<'a> {
    /// Layout of the authoritative scene.
    pub fn new(scene: &'a Scene, rigs: &'a RigCache, viewport: Viewport) -> Self {
        Self {
            scene,
            rigs,
            viewport,
            overrides: None,
        }
    }

    /// Layout with timeline overrides merged on top, as rendered.
    pub fn with_overrides(mut self, overrides: &'a SvgOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Object as rendered (override merged).
    pub fn effective(&self, id: &ObjectId) -> Option<Cow<'a, SceneObject>> {
        let obj = self.scene.get(id)?;
        match self.overrides.and_then(|o| o.get(id)) {
            Some(ov) => Some(Cow::Owned(obj.with_override(ov))),
            None => Some(Cow::Borrowed(obj)),
        }
    }

    /// Map from document units into an object's box, including the flip mirror.
    pub fn content_transform(obj: &SceneObject, rig: Option<&Rig>) -> Affine {
        let doc = rig.and_then(Rig::doc_size);
        let (fit, doc_width) = match doc {
            Some(d) => (
                Affine::scale_non_uniform(obj.width / d.width, obj.height / d.height),
                d.width,
            ),
            None => (Affine::IDENTITY, obj.width),
        };
        if obj.flipped {
            fit * flip_transform(doc_width)
        } else {
            fit
        }
    }

    fn object_world(&self, id: &ObjectId, depth: usize) -> Option<Affine> {
        if depth > self.scene.len() {
            tracing::warn!(object = %id, "attachment cycle detected");
            return None;
        }
        let obj = self.effective(id)?;
        match &obj.attachment_info {
            None => Some(obj.standalone_frame()),
            Some(info) => {
                let (_, limb) = self.part_world(&info.parent_id, &info.limb_id, depth + 1)?;
                Some(limb * info.transform)
            }
        }
    }

    /// World transforms `(frame, limb)` of `part`: before and after its own rotation.
    fn part_world(&self, id: &ObjectId, part: &str, depth: usize) -> Option<(Affine, Affine)> {
        let obj = self.effective(id)?;
        let rig = self.rigs.get(&obj.content)?;
        let geometry = rig.geometry.as_ref()?;
        let chain = rig.metadata.chain_to(part)?;

        let mut world =
            self.object_world(id, depth)? * Self::content_transform(&obj, Some(rig));
        let mut parent_static = Affine::IDENTITY;
        let mut frame = world;
        for p in chain {
            let own_static = geometry.part_transform(&p.id).unwrap_or(parent_static);
            frame = world * checked_inverse(parent_static)? * own_static;
            let rotation = match p.pivot {
                Some(pivot) => rotate_about_deg(
                    effective_angle(&obj.articulation, &p.id, obj.flipped, &rig.mirror),
                    pivot,
                ),
                None => Affine::IDENTITY,
            };
            world = frame * rotation;
            parent_static = own_static;
        }
        Some((frame, world))
    }
}

impl ScreenGeometry for SceneLayout<'_> {
    fn object_frame(&self, object: &ObjectId) -> Option<Affine> {
        Some(self.viewport.transform() * self.object_world(object, 0)?)
    }

    fn part_frame(&self, object: &ObjectId, part: &str) -> Option<Affine> {
        let (frame, _) = self.part_world(object, part, 0)?;
        Some(self.viewport.transform() * frame)
    }

    fn limb_transform(&self, object: &ObjectId, limb: &str) -> Option<Affine> {
        let (_, world) = self.part_world(object, limb, 0)?;
        Some(self.viewport.transform() * world)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layout.rs"]
mod tests;
