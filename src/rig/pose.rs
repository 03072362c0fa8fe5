//! Rendering-time pose evaluation.
//!
//! Articulation angles are always stored in the unflipped, canonical frame and keyed by the
//! unflipped part id. A horizontally flipped puppet is a pure view over that state: each rendered
//! part reads the angle of its mirrored counterpart and negates it.

use std::collections::BTreeMap;

use crate::foundation::core::{Affine, Point};
use crate::foundation::math::{normalize_deg_signed, rotate_about_deg};
use crate::rig::metadata::RigMetadata;
use crate::rig::mirror::MirrorTable;

/// Part id to stored rotation angle in degrees. Absent parts are at 0°.
pub type Articulation = BTreeMap<String, f64>;

fn stored(articulation: &Articulation, part: &str) -> f64 {
    articulation.get(part).copied().unwrap_or(0.0)
}

/// Angle to render for `part`, accounting for a whole-puppet flip.
pub fn effective_angle(
    articulation: &Articulation,
    part: &str,
    flipped: bool,
    mirror: &MirrorTable,
) -> f64 {
    if flipped {
        -stored(articulation, mirror.mirror_or_self(part))
    } else {
        stored(articulation, part)
    }
}

/// Inverse of [`effective_angle`]: the canonical part id and stored value that make `part`
/// render at `effective` degrees.
pub fn canonical_angle(
    part: &str,
    effective: f64,
    flipped: bool,
    mirror: &MirrorTable,
) -> (String, f64) {
    if flipped {
        (mirror.mirror_or_self(part).to_owned(), -effective)
    } else {
        (part.to_owned(), effective)
    }
}

/// Horizontal mirror of a document `doc_width` units wide: `x -> doc_width - x`.
pub fn flip_transform(doc_width: f64) -> Affine {
    Affine::translate((doc_width, 0.0)) * Affine::FLIP_X
}

/// Rotation of one interactive part about its pivot, in the part's local space.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartPose {
    /// Part id as it appears in the markup.
    pub part: String,
    /// Effective angle in degrees.
    pub angle_deg: f64,
    /// Rotation origin, or `None` when the part cannot rotate.
    pub pivot: Option<Point>,
    /// Local rotation about `pivot`; identity without a pivot.
    pub transform: Affine,
}

impl PartPose {
    /// SVG `transform` attribute value (`rotate(a cx cy)`), if the part rotates.
    pub fn svg_transform(&self) -> Option<String> {
        let pivot = self.pivot?;
        Some(format!(
            "rotate({} {} {})",
            self.angle_deg, pivot.x, pivot.y
        ))
    }
}

/// Per-part render transforms for one puppet instance.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuppetPose {
    /// Interactive parts in document order.
    pub parts: Vec<PartPose>,
    /// Outer horizontal mirror, present when the puppet is flipped.
    pub flip: Option<Affine>,
}

impl PuppetPose {
    /// Pose of `part`, if it is an interactive part.
    pub fn part(&self, part: &str) -> Option<&PartPose> {
        self.parts.iter().find(|p| p.part == part)
    }
}

/// Compute the render pose of a rig.
pub fn evaluate_pose(
    meta: &RigMetadata,
    mirror: &MirrorTable,
    articulation: &Articulation,
    flipped: bool,
    doc_width: f64,
) -> PuppetPose {
    let parts = meta
        .parts
        .iter()
        .map(|p| {
            let angle_deg = normalize_deg_signed(effective_angle(
                articulation,
                &p.id,
                flipped,
                mirror,
            ));
            let transform = match p.pivot {
                Some(pivot) => rotate_about_deg(angle_deg, pivot),
                None => Affine::IDENTITY,
            };
            PartPose {
                part: p.id.clone(),
                angle_deg,
                pivot: p.pivot,
                transform,
            }
        })
        .collect();

    PuppetPose {
        parts,
        flip: flipped.then(|| flip_transform(doc_width)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/pose.rs"]
mod tests;
