//! Sampling of timeline tracks into per-object overrides.

use std::collections::BTreeMap;

use crate::foundation::core::FrameIndex;
use crate::foundation::math::round_unit;
use crate::rig::pose::Articulation;
use crate::scene::model::ObjectId;
use crate::timeline::model::{Interpolation, Keyframe, Lerp, TimelineTrack, TrackChannel};

/// Animated values of one object at one frame. `None` fields leave the base object untouched.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Articulation::is_empty")]
    pub articulation: Articulation,
}

/// Overrides keyed by object, recomputed whenever the frame or the tracks change.
pub type SvgOverrides = BTreeMap<ObjectId, ObjectOverride>;

/// Evaluate every track at `frame`.
///
/// Pure: the result depends only on the inputs. Numeric outputs are rounded to whole units.
#[tracing::instrument(skip(tracks), fields(tracks = tracks.len()))]
pub fn evaluate_tracks(tracks: &[TimelineTrack], frame: FrameIndex) -> SvgOverrides {
    let mut out = SvgOverrides::new();
    for track in tracks {
        match &track.channel {
            TrackChannel::Position { keyframes } => {
                if let Some(p) = sample(keyframes, frame) {
                    let ov = out.entry(track.object_id.clone()).or_default();
                    ov.x = Some(round_unit(p.x));
                    ov.y = Some(round_unit(p.y));
                }
            }
            TrackChannel::Rotation { keyframes } => {
                if let Some(r) = sample(keyframes, frame) {
                    out.entry(track.object_id.clone()).or_default().rotation =
                        Some(round_unit(r));
                }
            }
            TrackChannel::Visibility { keyframes } => {
                if let Some(visible) = sample_held(keyframes, frame) {
                    out.entry(track.object_id.clone()).or_default().hidden = Some(!visible);
                }
            }
            TrackChannel::Articulation { part, keyframes } => {
                if let Some(angle) = sample(keyframes, frame) {
                    out.entry(track.object_id.clone())
                        .or_default()
                        .articulation
                        .insert(part.clone(), round_unit(angle));
                }
            }
        }
    }
    out
}

/// Keys bracketing `frame`: `Ok(exact)` on a key, otherwise `Err((prev, next))`.
fn bracket<T>(
    keys: &[Keyframe<T>],
    frame: FrameIndex,
) -> Result<&Keyframe<T>, (Option<&Keyframe<T>>, Option<&Keyframe<T>>)> {
    let idx = keys.partition_point(|k| k.frame <= frame);
    let prev = idx.checked_sub(1).map(|i| &keys[i]);
    match prev {
        Some(k) if k.frame == frame => Ok(k),
        _ => Err((prev, keys.get(idx))),
    }
}

pub(crate) fn sample<T: Lerp + Clone>(keys: &[Keyframe<T>], frame: FrameIndex) -> Option<T> {
    match bracket(keys, frame) {
        Ok(exact) => Some(exact.value.clone()),
        Err((None, None)) => None,
        Err((Some(k), None)) | Err((None, Some(k))) => Some(k.value.clone()),
        Err((Some(a), Some(b))) => match b.interpolation {
            Interpolation::Step => Some(a.value.clone()),
            Interpolation::Linear => {
                // Brackets are strictly ordered, so the span is at least one frame.
                let span = (b.frame.0 - a.frame.0) as f64;
                let t = (frame.0 - a.frame.0) as f64 / span;
                Some(T::lerp(&a.value, &b.value, t))
            }
        },
    }
}

// Booleans hold the previous key, or the first key before it is reached.
fn sample_held<T: Clone>(keys: &[Keyframe<T>], frame: FrameIndex) -> Option<T> {
    match bracket(keys, frame) {
        Ok(exact) => Some(exact.value.clone()),
        Err((Some(k), _)) | Err((None, Some(k))) => Some(k.value.clone()),
        Err((None, None)) => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/evaluate.rs"]
mod tests;
