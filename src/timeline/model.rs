use crate::foundation::core::{FrameIndex, Fps, Point};
use crate::foundation::error::{PuppetryError, PuppetryResult};
use crate::scene::model::ObjectId;

/// Values that can be linearly interpolated between two keyframes.
pub trait Lerp: Sized {
    /// Value at `t` in `[0, 1]` between `a` and `b`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Point::new(
            <f64 as Lerp>::lerp(&a.x, &b.x, t),
            <f64 as Lerp>::lerp(&a.y, &b.y, t),
        )
    }
}

/// How the span ending at a keyframe is filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Straight-line blend from the previous key.
    #[default]
    Linear,
    /// Hold the previous key's value until this frame.
    Step,
}

/// A value pinned to a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    pub frame: FrameIndex,
    pub value: T,
    /// Governs the span from the previous key into this one.
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl<T> Keyframe<T> {
    pub fn new(frame: FrameIndex, value: T, interpolation: Interpolation) -> Self {
        Self {
            frame,
            value,
            interpolation,
        }
    }
}

/// Animatable property of a scene object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrackTarget {
    /// `x`/`y` together.
    Position,
    /// Standalone rotation in degrees.
    Rotation,
    /// Visible flag (the inverse of `hidden`).
    Visibility,
    /// Stored angle of one rig part.
    Articulation(String),
}

/// Keyframes of one property, typed by what the property holds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "property", rename_all = "lowercase")]
pub enum TrackChannel {
    Position { keyframes: Vec<Keyframe<Point>> },
    Rotation { keyframes: Vec<Keyframe<f64>> },
    Visibility { keyframes: Vec<Keyframe<bool>> },
    Articulation {
        part: String,
        keyframes: Vec<Keyframe<f64>>,
    },
}

impl TrackChannel {
    /// Channel with no keyframes for `target`.
    pub fn empty(target: &TrackTarget) -> Self {
        match target {
            TrackTarget::Position => Self::Position {
                keyframes: Vec::new(),
            },
            TrackTarget::Rotation => Self::Rotation {
                keyframes: Vec::new(),
            },
            TrackTarget::Visibility => Self::Visibility {
                keyframes: Vec::new(),
            },
            TrackTarget::Articulation(part) => Self::Articulation {
                part: part.clone(),
                keyframes: Vec::new(),
            },
        }
    }

    pub fn target(&self) -> TrackTarget {
        match self {
            Self::Position { .. } => TrackTarget::Position,
            Self::Rotation { .. } => TrackTarget::Rotation,
            Self::Visibility { .. } => TrackTarget::Visibility,
            Self::Articulation { part, .. } => TrackTarget::Articulation(part.clone()),
        }
    }

    fn matches(&self, target: &TrackTarget) -> bool {
        match (self, target) {
            (Self::Position { .. }, TrackTarget::Position)
            | (Self::Rotation { .. }, TrackTarget::Rotation)
            | (Self::Visibility { .. }, TrackTarget::Visibility) => true,
            (Self::Articulation { part, .. }, TrackTarget::Articulation(p)) => part == p,
            _ => false,
        }
    }

    /// Frames that carry a keyframe, ascending.
    pub fn frames(&self) -> Vec<FrameIndex> {
        match self {
            Self::Position { keyframes } => keyframes.iter().map(|k| k.frame).collect(),
            Self::Rotation { keyframes }
            | Self::Articulation { keyframes, .. } => keyframes.iter().map(|k| k.frame).collect(),
            Self::Visibility { keyframes } => keyframes.iter().map(|k| k.frame).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Position { keyframes } => keyframes.len(),
            Self::Rotation { keyframes } | Self::Articulation { keyframes, .. } => keyframes.len(),
            Self::Visibility { keyframes } => keyframes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_at(&mut self, frame: FrameIndex) -> bool {
        match self {
            Self::Position { keyframes } => remove_key(keyframes, frame),
            Self::Rotation { keyframes } | Self::Articulation { keyframes, .. } => {
                remove_key(keyframes, frame)
            }
            Self::Visibility { keyframes } => remove_key(keyframes, frame),
        }
    }

    fn normalize(&mut self) {
        match self {
            Self::Position { keyframes } => normalize_keys(keyframes),
            Self::Rotation { keyframes } | Self::Articulation { keyframes, .. } => {
                normalize_keys(keyframes)
            }
            Self::Visibility { keyframes } => normalize_keys(keyframes),
        }
    }
}

/// Insert `key`, replacing any keyframe at the same frame, keeping frames ascending.
pub(crate) fn upsert_key<T>(keys: &mut Vec<Keyframe<T>>, key: Keyframe<T>) {
    keys.retain(|k| k.frame != key.frame);
    keys.push(key);
    keys.sort_by_key(|k| k.frame);
}

fn remove_key<T>(keys: &mut Vec<Keyframe<T>>, frame: FrameIndex) -> bool {
    let before = keys.len();
    keys.retain(|k| k.frame != frame);
    keys.len() != before
}

// Stable sort, then keep the last key written for each frame.
fn normalize_keys<T>(keys: &mut Vec<Keyframe<T>>) {
    keys.sort_by_key(|k| k.frame);
    let mut i = 0;
    while i + 1 < keys.len() {
        if keys[i].frame == keys[i + 1].frame {
            keys.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Synthetic track identifier.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One property stream of one object.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineTrack {
    pub id: TrackId,
    pub object_id: ObjectId,
    #[serde(flatten)]
    pub channel: TrackChannel,
}

impl TimelineTrack {
    /// Return `true` when this track animates `target` of `object`.
    pub fn drives(&self, object: &ObjectId, target: &TrackTarget) -> bool {
        &self.object_id == object && self.channel.matches(target)
    }
}

/// Defaults for a new timeline.
#[derive(Clone, Debug)]
pub struct TimelineOpts {
    /// Playback rate.
    pub fps: Fps,
    /// Last frame index; must be positive.
    pub duration: u64,
    /// Record keyframes when objects are edited while paused.
    pub auto_keyframe: bool,
    /// Wrap to the start instead of stopping at the end.
    pub looping: bool,
}

impl Default for TimelineOpts {
    fn default() -> Self {
        Self {
            fps: Fps::FILM,
            duration: 120,
            auto_keyframe: true,
            looping: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Document timeline: tracks plus playback state.
///
/// `current_frame` and `is_playing` are live state and are not serialized; a loaded timeline
/// starts paused at frame 0.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    fps: Fps,
    duration: u64,
    #[serde(skip)]
    current_frame: FrameIndex,
    #[serde(skip)]
    is_playing: bool,
    #[serde(rename = "loop", default)]
    looping: bool,
    #[serde(default)]
    pub tracks: Vec<TimelineTrack>,
    #[serde(default = "default_true")]
    pub auto_keyframe: bool,
}

impl Default for TimelineState {
    fn default() -> Self {
        let opts = TimelineOpts::default();
        Self {
            fps: opts.fps,
            duration: opts.duration,
            current_frame: FrameIndex::ZERO,
            is_playing: false,
            looping: opts.looping,
            tracks: Vec::new(),
            auto_keyframe: opts.auto_keyframe,
        }
    }
}

impl TimelineState {
    /// Empty timeline, paused at frame 0.
    pub fn new(opts: &TimelineOpts) -> PuppetryResult<Self> {
        validate_duration(opts.duration)?;
        Ok(Self {
            fps: opts.fps,
            duration: opts.duration,
            looping: opts.looping,
            auto_keyframe: opts.auto_keyframe,
            ..Self::default()
        })
    }

    /// Playback rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Last frame index.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Playhead position, always within `[0, duration]`.
    pub fn current_frame(&self) -> FrameIndex {
        self.current_frame
    }

    /// Whether the playback clock is advancing the playhead.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Whether playback wraps at the end.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Check invariants of a deserialized timeline and sort keyframes.
    ///
    /// Duplicate keyframes at one frame collapse to the last one listed.
    pub fn validate(&mut self) -> PuppetryResult<()> {
        validate_duration(self.duration)?;
        for track in &mut self.tracks {
            track.channel.normalize();
        }
        let mut ids = std::collections::HashSet::new();
        for track in &self.tracks {
            if !ids.insert(&track.id) {
                return Err(PuppetryError::timeline(format!(
                    "duplicate track id '{}'",
                    track.id
                )));
            }
        }
        self.current_frame = self.current_frame.min(FrameIndex(self.duration));
        Ok(())
    }

    /// Seek, clamping to `[0, duration]`.
    pub fn set_current_frame(&mut self, frame: u64) {
        self.current_frame = FrameIndex(frame.min(self.duration));
    }

    /// Change the playback rate. Keyframes stay on their frame indices.
    pub fn set_fps(&mut self, fps: Fps) {
        self.fps = fps;
    }

    /// Change the length; the playhead is clamped into the new range.
    pub fn set_duration(&mut self, duration: u64) -> PuppetryResult<()> {
        validate_duration(duration)?;
        self.duration = duration;
        self.set_current_frame(self.current_frame.0);
        Ok(())
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn toggle_playing(&mut self) {
        self.is_playing = !self.is_playing;
    }

    /// Toggle wrap-around at the end of the timeline.
    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Stop playback and return the playhead to frame 0. Tracks are kept.
    ///
    /// Used wherever a timeline crosses the persistence boundary.
    pub fn clear_live_state(&mut self) {
        self.current_frame = FrameIndex::ZERO;
        self.is_playing = false;
    }

    /// Drop every track and stop at frame 0. Rate and length are kept.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.clear_live_state();
    }

    /// Move the playhead forward by `frames`.
    ///
    /// Past the end a looping timeline wraps (`next % duration`); otherwise it clamps to
    /// `duration` and stops.
    pub fn advance(&mut self, frames: u64) -> FrameIndex {
        let next = self.current_frame.0.saturating_add(frames);
        if next > self.duration {
            if self.looping {
                self.current_frame = FrameIndex(next % self.duration);
            } else {
                self.current_frame = FrameIndex(self.duration);
                self.is_playing = false;
            }
        } else {
            self.current_frame = FrameIndex(next);
        }
        self.current_frame
    }

    pub fn find_track(&self, object: &ObjectId, target: &TrackTarget) -> Option<&TimelineTrack> {
        self.tracks.iter().find(|t| t.drives(object, target))
    }

    /// First track driving `target` of `object`, created empty if there is none.
    pub fn find_or_create_track(
        &mut self,
        object: &ObjectId,
        target: &TrackTarget,
    ) -> &mut TimelineTrack {
        let idx = match self.tracks.iter().position(|t| t.drives(object, target)) {
            Some(idx) => idx,
            None => {
                let id = self.fresh_track_id();
                self.tracks.push(TimelineTrack {
                    id,
                    object_id: object.clone(),
                    channel: TrackChannel::empty(target),
                });
                self.tracks.len() - 1
            }
        };
        &mut self.tracks[idx]
    }

    fn fresh_track_id(&self) -> TrackId {
        let mut n = self.tracks.len() + 1;
        loop {
            let id = TrackId(format!("track-{n}"));
            if !self.tracks.iter().any(|t| t.id == id) {
                return id;
            }
            n += 1;
        }
    }

    pub fn remove_track(&mut self, id: &TrackId) -> Option<TimelineTrack> {
        let idx = self.tracks.iter().position(|t| &t.id == id)?;
        Some(self.tracks.remove(idx))
    }

    /// Drop every track of `object`; returns how many were removed.
    pub fn remove_tracks_for_object(&mut self, object: &ObjectId) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|t| &t.object_id != object);
        before - self.tracks.len()
    }

    /// Remove the keyframe at `frame` on track `id`.
    pub fn remove_keyframe(&mut self, id: &TrackId, frame: FrameIndex) -> PuppetryResult<bool> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| PuppetryError::timeline(format!("unknown track '{id}'")))?;
        Ok(track.channel.remove_at(frame))
    }
}

fn validate_duration(duration: u64) -> PuppetryResult<()> {
    if duration == 0 {
        return Err(PuppetryError::validation("timeline duration must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
