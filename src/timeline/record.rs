use crate::foundation::core::{FrameIndex, Point};
use crate::foundation::math::normalize_deg_signed;
use crate::scene::model::{ObjectPatch, SceneObject};
use crate::timeline::model::{
    Interpolation, Keyframe, TimelineState, TrackChannel, TrackTarget, upsert_key,
};

/// Turn an edit into keyframes at the playhead.
///
/// Each animatable property present in `patch` gets a keyframe holding the value the object will
/// have once the patch is applied (`x`/`y` share one position key, `hidden` is stored as
/// visibility). Returns the number of keyframes written.
pub fn record_patch(timeline: &mut TimelineState, object: &SceneObject, patch: &ObjectPatch) -> usize {
    let frame = timeline.current_frame();
    let mut written = 0;

    if patch.x.is_some() || patch.y.is_some() {
        let value = Point::new(patch.x.unwrap_or(object.x), patch.y.unwrap_or(object.y));
        let track = timeline.find_or_create_track(&object.id, &TrackTarget::Position);
        if let TrackChannel::Position { keyframes } = &mut track.channel {
            upsert_key(keyframes, Keyframe::new(frame, value, Interpolation::Linear));
            written += 1;
        }
    }

    if let Some(rotation) = patch.rotation {
        written += record_scalar(
            timeline,
            object,
            &TrackTarget::Rotation,
            frame,
            normalize_deg_signed(rotation),
        );
    }

    if let Some(hidden) = patch.hidden {
        let track = timeline.find_or_create_track(&object.id, &TrackTarget::Visibility);
        if let TrackChannel::Visibility { keyframes } = &mut track.channel {
            upsert_key(keyframes, Keyframe::new(frame, !hidden, Interpolation::Step));
            written += 1;
        }
    }

    if let Some(articulation) = &patch.articulation {
        for (part, angle) in articulation {
            written += record_scalar(
                timeline,
                object,
                &TrackTarget::Articulation(part.clone()),
                frame,
                *angle,
            );
        }
    }

    tracing::debug!(object = %object.id, frame = frame.0, written, "recorded keyframes");
    written
}

fn record_scalar(
    timeline: &mut TimelineState,
    object: &SceneObject,
    target: &TrackTarget,
    frame: FrameIndex,
    value: f64,
) -> usize {
    let track = timeline.find_or_create_track(&object.id, target);
    match &mut track.channel {
        TrackChannel::Rotation { keyframes } | TrackChannel::Articulation { keyframes, .. } => {
            upsert_key(keyframes, Keyframe::new(frame, value, Interpolation::Linear));
            1
        }
        _ => 0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/record.rs"]
mod tests;
