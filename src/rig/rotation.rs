//! Pointer-driven limb rotation.
//!
//! One controller per puppet instance. It is a two-state machine: at most one part is dragged at a
//! time, and a second press while dragging is ignored rather than queued.

use crate::foundation::core::{Affine, Point};
use crate::foundation::math::{angle_around_deg, checked_inverse, normalize_deg_signed};
use crate::rig::metadata::RigMetadata;
use crate::rig::mirror::MirrorTable;
use crate::rig::pose::{Articulation, effective_angle};

/// Articulation update emitted while dragging, keyed by the canonical (unflipped) part id.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ArticulationChange {
    /// Canonical part id to store the angle under.
    pub part: String,
    /// Angle to store, in degrees.
    pub angle: f64,
}

/// Puppet state read at press time.
#[derive(Clone, Copy, Debug)]
pub struct PressInput<'a> {
    /// Rig of the pressed puppet.
    pub rig: &'a RigMetadata,
    /// Mirror pairs of the pressed puppet.
    pub mirror: &'a MirrorTable,
    /// Current stored articulation.
    pub articulation: &'a Articulation,
    /// Whether the puppet is flipped.
    pub flipped: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct ActiveDrag {
    part: String,
    canonical_part: String,
    sign: f64,
    pivot: Point,
    to_local: Affine,
    base_offset: f64,
}

/// Drag state of a [`RotationController`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragState {
    /// No rotation in progress.
    #[default]
    Idle,
    /// A part is being rotated.
    Dragging(DragInfo),
}

/// Public view of an in-progress drag.
#[derive(Clone, Debug, PartialEq)]
pub struct DragInfo {
    /// Part id under the pointer (as it appears in the markup).
    pub part: String,
    /// Pivot in the part's local space.
    pub pivot: Point,
    /// Offset between the stored angle and the pointer angle captured at press time.
    pub base_offset: f64,
    active: ActiveDrag,
}

/// Converts pointer gestures into articulation changes for one puppet.
#[derive(Clone, Debug, Default)]
pub struct RotationController {
    enabled: bool,
    state: DragState,
}

impl RotationController {
    /// A controller with rotate mode on or off.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: DragState::Idle,
        }
    }

    /// Current drag state.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Return `true` while a part is being dragged.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Return `true` when rotate mode is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle rotate mode. Turning it off ends any drag immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.state = DragState::Idle;
        }
    }

    /// Begin rotating the part that owns `target_element`.
    ///
    /// `part_frame` returns the screen transform of a part's local frame before its own rotation.
    /// Returns `false` (and stays idle) when rotate mode is off, a drag is already active, or the
    /// part, its pivot or its frame cannot be resolved.
    pub fn press(
        &mut self,
        target_element: &str,
        pointer: Point,
        input: PressInput<'_>,
        part_frame: impl FnOnce(&str) -> Option<Affine>,
    ) -> bool {
        if !self.enabled || self.is_dragging() {
            return false;
        }
        let Some(part) = input.rig.owning_part(target_element) else {
            return false;
        };
        let Some(pivot) = input.rig.pivot(part) else {
            tracing::debug!(part, "rotation ignored: part has no pivot");
            return false;
        };
        let Some(to_local) = part_frame(part).and_then(checked_inverse) else {
            tracing::debug!(part, "rotation ignored: part frame unavailable");
            return false;
        };

        let initial = angle_around_deg(pivot, to_local * pointer);
        let current = effective_angle(input.articulation, part, input.flipped, input.mirror);
        let (canonical_part, sign) = if input.flipped {
            (input.mirror.mirror_or_self(part).to_owned(), -1.0)
        } else {
            (part.to_owned(), 1.0)
        };

        let active = ActiveDrag {
            part: part.to_owned(),
            canonical_part,
            sign,
            pivot,
            to_local,
            base_offset: current - initial,
        };
        self.state = DragState::Dragging(DragInfo {
            part: active.part.clone(),
            pivot,
            base_offset: active.base_offset,
            active,
        });
        true
    }

    /// Pointer moved: compute the angle to store, or `None` when idle.
    pub fn drag(&mut self, pointer: Point) -> Option<ArticulationChange> {
        let DragState::Dragging(info) = &self.state else {
            return None;
        };
        let a = &info.active;
        let pointer_angle = angle_around_deg(a.pivot, a.to_local * pointer);
        let raw = normalize_deg_signed(pointer_angle + a.base_offset);
        Some(ArticulationChange {
            part: a.canonical_part.clone(),
            angle: a.sign * raw,
        })
    }

    /// Pointer released: end the drag.
    pub fn release(&mut self) {
        self.state = DragState::Idle;
    }

    /// Pointer cancelled: end the drag.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/rotation.rs"]
mod tests;
