//! Rigid parenting of objects to puppet limbs.
//!
//! Attachment stores the child's box frame relative to the limb (`limb^-1 * child`) as a full
//! matrix, so the child follows every later change of the limb, its ancestors, the puppet flip and
//! the viewport without decomposing anything. Detachment bakes the current on-screen pose back into
//! standalone `x`/`y`/`rotation`.
//!
//! Both operations read live geometry through [`ScreenGeometry`]. They are split into a planning
//! step over `&Scene` and an [`AttachmentEdit`] applied afterwards, so a layout borrowing the scene
//! can drive them.

use crate::foundation::core::{Affine, Size2};
use crate::foundation::error::{PuppetryError, PuppetryResult};
use crate::foundation::math::{checked_inverse, normalize_deg_detach, rotation_deg_of, round_unit};
use crate::scene::layout::ScreenGeometry;
use crate::scene::model::{AttachmentInfo, ObjectId, Scene};
use crate::scene::viewport::Viewport;

/// Child frame expressed in the limb's local frame: `limb_world^-1 * child_world`.
///
/// Both transforms must be in the same space (typically screen); any shared outer transform such
/// as the viewport cancels out. `None` if the limb transform is singular.
pub fn relative_transform(limb_world: Affine, child_world: Affine) -> Option<Affine> {
    Some(checked_inverse(limb_world)? * child_world)
}

/// Free-standing placement equivalent to an on-screen pose.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct StandalonePose {
    /// World-space left edge of the unrotated box.
    pub x: f64,
    /// World-space top edge of the unrotated box.
    pub y: f64,
    /// Degrees in `[-180, 180)`.
    pub rotation: f64,
}

/// Bake a screen-space box frame into a standalone pose.
///
/// The visual center is preserved (screen bounding box center mapped back through the viewport),
/// and the rotation is read from the matrix as `atan2(b, a)`. Values are rounded to whole units.
pub fn bake_standalone(element_screen: Affine, size: Size2, viewport: Viewport) -> StandalonePose {
    let bounds = element_screen.transform_rect_bbox(size.to_rect());
    let center = viewport.screen_to_world(bounds.center());
    StandalonePose {
        x: round_unit(center.x - size.width / 2.0),
        y: round_unit(center.y - size.height / 2.0),
        rotation: round_unit(normalize_deg_detach(rotation_deg_of(element_screen))),
    }
}

/// A validated attachment change, ready to apply.
#[derive(Clone, Debug, PartialEq)]
pub enum AttachmentEdit {
    /// Parent `child` under a limb.
    Attach {
        child: ObjectId,
        info: AttachmentInfo,
    },
    /// Make `child` free-standing at `pose`.
    Detach {
        child: ObjectId,
        pose: StandalonePose,
    },
}

impl AttachmentEdit {
    pub fn child(&self) -> &ObjectId {
        match self {
            Self::Attach { child, .. } | Self::Detach { child, .. } => child,
        }
    }

    /// Write the change into `scene`.
    pub fn apply(self, scene: &mut Scene) -> PuppetryResult<()> {
        let id = self.child().clone();
        let obj = scene
            .get_mut(&id)
            .ok_or_else(|| PuppetryError::validation(format!("unknown object '{id}'")))?;
        match self {
            Self::Attach { info, .. } => {
                obj.x = 0.0;
                obj.y = 0.0;
                obj.attachment_info = Some(info);
            }
            Self::Detach { pose, .. } => {
                obj.x = pose.x;
                obj.y = pose.y;
                obj.rotation = pose.rotation;
                obj.attachment_info = None;
            }
        }
        Ok(())
    }
}

/// Validate and compute an attachment of `child` to `limb` of `parent`.
///
/// Returns `Ok(None)` when the request breaks a precondition (child already attached, attaching to
/// itself, or a cycle through the child's own attached descendants). Fails with a geometry error
/// when either transform cannot be resolved.
pub fn plan_attach(
    scene: &Scene,
    geometry: &dyn ScreenGeometry,
    child: &ObjectId,
    parent: &ObjectId,
    limb: &str,
) -> PuppetryResult<Option<AttachmentEdit>> {
    let obj = scene
        .get(child)
        .ok_or_else(|| PuppetryError::validation(format!("unknown object '{child}'")))?;
    if !scene.contains(parent) {
        return Err(PuppetryError::validation(format!("unknown object '{parent}'")));
    }
    if obj.is_attached() {
        tracing::debug!(%child, "already attached");
        return Ok(None);
    }
    if scene.is_self_or_ancestor(child, parent) {
        tracing::debug!(%child, %parent, "attachment would create a cycle");
        return Ok(None);
    }

    let child_world = geometry
        .object_frame(child)
        .ok_or_else(|| PuppetryError::geometry(format!("object '{child}' is not laid out")))?;
    let limb_world = geometry.limb_transform(parent, limb).ok_or_else(|| {
        PuppetryError::geometry(format!("limb '{limb}' of '{parent}' is not laid out"))
    })?;
    let transform = relative_transform(limb_world, child_world)
        .ok_or_else(|| PuppetryError::geometry(format!("limb '{limb}' transform is singular")))?;

    Ok(Some(AttachmentEdit::Attach {
        child: child.clone(),
        info: AttachmentInfo {
            parent_id: parent.clone(),
            limb_id: limb.to_owned(),
            transform,
        },
    }))
}

/// Validate and compute the detachment of `child`.
///
/// Returns `Ok(None)` when the child is not attached.
pub fn plan_detach(
    scene: &Scene,
    geometry: &dyn ScreenGeometry,
    child: &ObjectId,
) -> PuppetryResult<Option<AttachmentEdit>> {
    let obj = scene
        .get(child)
        .ok_or_else(|| PuppetryError::validation(format!("unknown object '{child}'")))?;
    if !obj.is_attached() {
        tracing::debug!(%child, "not attached");
        return Ok(None);
    }
    let screen = geometry
        .object_frame(child)
        .ok_or_else(|| PuppetryError::geometry(format!("object '{child}' is not laid out")))?;
    Ok(Some(AttachmentEdit::Detach {
        child: child.clone(),
        pose: bake_standalone(screen, obj.size(), geometry.viewport()),
    }))
}

/// Attach `child` to `limb` of `parent`; `Ok(false)` when a precondition fails.
#[tracing::instrument(skip(scene, geometry))]
pub fn attach(
    scene: &mut Scene,
    geometry: &dyn ScreenGeometry,
    child: &ObjectId,
    parent: &ObjectId,
    limb: &str,
) -> PuppetryResult<bool> {
    match plan_attach(scene, geometry, child, parent, limb)? {
        Some(edit) => {
            edit.apply(scene)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Detach `child`, keeping its visual pose; `Ok(false)` when it was not attached.
#[tracing::instrument(skip(scene, geometry))]
pub fn detach(
    scene: &mut Scene,
    geometry: &dyn ScreenGeometry,
    child: &ObjectId,
) -> PuppetryResult<bool> {
    match plan_detach(scene, geometry, child)? {
        Some(edit) => {
            edit.apply(scene)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/attach/engine.rs"]
mod tests;
