use crate::timeline::model::TimelineState;

/// Wall-clock driver for timeline playback.
///
/// Call [`PlaybackClock::tick`] once per display frame. Elapsed time is converted to whole
/// timeline frames with floor division; the reference timestamp only moves when at least one
/// frame is consumed, so slow ticks accumulate instead of being lost.
#[derive(Clone, Debug, Default)]
pub struct PlaybackClock {
    last_ms: Option<f64>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the reference timestamp (e.g. after a pause or seek).
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Advance `state` for a tick at `now_ms`; returns the number of frames consumed.
    pub fn tick(&mut self, state: &mut TimelineState, now_ms: f64) -> u64 {
        if !state.is_playing() {
            self.last_ms = None;
            return 0;
        }
        let Some(last) = self.last_ms else {
            self.last_ms = Some(now_ms);
            return 0;
        };
        let frames = state.fps().whole_frames_in_ms(now_ms - last);
        if frames == 0 {
            return 0;
        }
        self.last_ms = Some(now_ms);
        let frame = state.advance(frames);
        if !state.is_playing() {
            tracing::debug!(frame = frame.0, "playback reached the end");
            self.last_ms = None;
        }
        frames
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/playback.rs"]
mod tests;
