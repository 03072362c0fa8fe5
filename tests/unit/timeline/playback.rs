use super::*;
use crate::foundation::core::{FrameIndex, Fps};
use crate::timeline::model::TimelineOpts;

fn timeline(looping: bool) -> TimelineState {
    let mut tl = TimelineState::new(&TimelineOpts {
        fps: Fps::new(10.0).unwrap(),
        duration: 100,
        looping,
        ..TimelineOpts::default()
    })
    .unwrap();
    tl.play();
    tl
}

#[test]
fn first_tick_only_sets_reference() {
    let mut tl = timeline(false);
    let mut clock = PlaybackClock::new();
    assert_eq!(clock.tick(&mut tl, 1000.0), 0);
    assert_eq!(tl.current_frame(), FrameIndex::ZERO);
    assert_eq!(clock.tick(&mut tl, 1250.0), 2);
    assert_eq!(tl.current_frame(), FrameIndex(2));
}

#[test]
fn partial_frames_accumulate_until_consumed() {
    let mut tl = timeline(false);
    let mut clock = PlaybackClock::new();
    clock.tick(&mut tl, 0.0);
    assert_eq!(clock.tick(&mut tl, 60.0), 0);
    assert_eq!(clock.tick(&mut tl, 120.0), 1);
    assert_eq!(tl.current_frame(), FrameIndex(1));
}

#[test]
fn looping_wraps_past_the_end() {
    let mut tl = timeline(true);
    tl.set_current_frame(98);
    let mut clock = PlaybackClock::new();
    clock.tick(&mut tl, 0.0);
    assert_eq!(clock.tick(&mut tl, 500.0), 5);
    assert_eq!(tl.current_frame(), FrameIndex(3));
    assert!(tl.is_playing());
}

#[test]
fn non_looping_stops_at_duration() {
    let mut tl = timeline(false);
    tl.set_current_frame(98);
    let mut clock = PlaybackClock::new();
    clock.tick(&mut tl, 0.0);
    clock.tick(&mut tl, 500.0);
    assert_eq!(tl.current_frame(), FrameIndex(100));
    assert!(!tl.is_playing());
    assert_eq!(clock.tick(&mut tl, 900.0), 0);
}

#[test]
fn paused_timeline_does_not_move() {
    let mut tl = timeline(false);
    tl.pause();
    let mut clock = PlaybackClock::new();
    clock.tick(&mut tl, 0.0);
    assert_eq!(clock.tick(&mut tl, 1000.0), 0);
    assert_eq!(tl.current_frame(), FrameIndex::ZERO);
}
