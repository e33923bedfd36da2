use log::debug;
use serde::{Deserialize, Serialize};

use crate::tween::{Ease, Tween, DEFAULT_DURATION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationTarget {
    /// Uniform mesh scale, applied to x, y and z.
    MeshScale,
    /// Navigation bar vertical offset, percent of its own height.
    NavOffset,
    CaptionOpacity,
}

/// Where an entry starts relative to the rest of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum StartOffset {
    /// Starts when the previous entry ends, shifted by the given seconds.
    #[default]
    AfterPrevious,
    Gap(f32),
    WithPrevious,
    /// Absolute start time in seconds.
    At(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub target: AnimationTarget,
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub offset: StartOffset,
    pub ease: Ease,
}

impl AnimationDescriptor {
    pub fn new(target: AnimationTarget, from: f32, to: f32) -> Self {
        Self {
            target,
            from,
            to,
            duration: DEFAULT_DURATION,
            offset: StartOffset::AfterPrevious,
            ease: Ease::default(),
        }
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn offset(mut self, offset: StartOffset) -> Self {
        self.offset = offset;
        self
    }
}

pub trait AnimationSink {
    fn apply(&mut self, target: AnimationTarget, value: f32);
}

/// Mesh scales in, then the navigation bar slides down, then the caption fades in.
pub fn entrance_sequence() -> Vec<AnimationDescriptor> {
    vec![
        AnimationDescriptor::new(AnimationTarget::MeshScale, 0.0, 1.0),
        AnimationDescriptor::new(AnimationTarget::NavOffset, -100.0, 0.0),
        AnimationDescriptor::new(AnimationTarget::CaptionOpacity, 0.0, 1.0),
    ]
}

#[derive(Debug, Clone)]
struct ScheduledEntry {
    descriptor: AnimationDescriptor,
    start: f32,
    tween: Tween<f32>,
    settled: bool,
}

/// Plays a fixed list of animations once. A completed timeline never writes again.
#[derive(Debug, Clone)]
pub struct Timeline {
    entries: Vec<ScheduledEntry>,
    elapsed: f32,
    started: bool,
}

impl Timeline {
    pub fn new(descriptors: Vec<AnimationDescriptor>) -> Self {
        let mut entries = Vec::with_capacity(descriptors.len());
        let mut previous: Option<(f32, f32)> = None;
        for descriptor in descriptors {
            let (prev_start, prev_end) = previous.unwrap_or((0.0, 0.0));
            let start = match descriptor.offset {
                StartOffset::AfterPrevious => prev_end,
                StartOffset::Gap(gap) => (prev_end + gap).max(0.0),
                StartOffset::WithPrevious => prev_start,
                StartOffset::At(at) => at.max(0.0),
            };
            let duration = descriptor.duration.max(0.0);
            previous = Some((start, start + duration));
            entries.push(ScheduledEntry {
                tween: Tween::new(descriptor.from, descriptor.to, duration, descriptor.ease),
                descriptor,
                start,
                settled: false,
            });
        }
        Self {
            entries,
            elapsed: 0.0,
            started: false,
        }
    }

    /// Applies every start value immediately, so later entries stay hidden
    /// until their turn. Has no effect after the first call.
    pub fn start(&mut self, sink: &mut impl AnimationSink) {
        if self.started {
            return;
        }
        self.started = true;
        for entry in &self.entries {
            sink.apply(entry.descriptor.target, entry.descriptor.from);
        }
        self.advance(0.0, sink);
    }

    pub fn advance(&mut self, dt: f32, sink: &mut impl AnimationSink) {
        if !self.started || self.is_complete() {
            return;
        }
        let previous = self.elapsed;
        self.elapsed += dt.max(0.0);
        for entry in self.entries.iter_mut().filter(|entry| !entry.settled) {
            if self.elapsed < entry.start {
                continue;
            }
            let local_dt = self.elapsed - previous.max(entry.start);
            let value = entry.tween.advance(local_dt);
            sink.apply(entry.descriptor.target, value);
            if entry.tween.is_finished() {
                entry.settled = true;
                debug!("timeline entry {:?} settled at {value}", entry.descriptor.target);
            }
        }
    }

    pub fn duration(&self) -> f32 {
        self.entries
            .iter()
            .map(|entry| entry.start + entry.descriptor.duration.max(0.0))
            .fold(0.0, f32::max)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_complete(&self) -> bool {
        self.started && self.entries.iter().all(|entry| entry.settled)
    }

    pub fn start_times(&self) -> Vec<f32> {
        self.entries.iter().map(|entry| entry.start).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        values: HashMap<AnimationTarget, f32>,
        writes: usize,
    }

    impl AnimationSink for Recorder {
        fn apply(&mut self, target: AnimationTarget, value: f32) {
            self.values.insert(target, value);
            self.writes += 1;
        }
    }

    #[test]
    fn entrance_entries_run_back_to_back() {
        let timeline = Timeline::new(entrance_sequence());
        assert_eq!(timeline.start_times(), vec![0.0, 1.0, 2.0]);
        assert_eq!(timeline.duration(), 3.0);
    }

    #[test]
    fn start_applies_every_from_value() {
        let mut timeline = Timeline::new(entrance_sequence());
        let mut sink = Recorder::default();
        timeline.start(&mut sink);
        assert_eq!(sink.values[&AnimationTarget::MeshScale], 0.0);
        assert_eq!(sink.values[&AnimationTarget::NavOffset], -100.0);
        assert_eq!(sink.values[&AnimationTarget::CaptionOpacity], 0.0);
    }

    #[test]
    fn later_entries_wait_for_their_turn() {
        let mut timeline = Timeline::new(entrance_sequence());
        let mut sink = Recorder::default();
        timeline.start(&mut sink);
        timeline.advance(0.5, &mut sink);
        let scale = sink.values[&AnimationTarget::MeshScale];
        assert!(scale > 0.0 && scale < 1.0);
        assert_eq!(sink.values[&AnimationTarget::NavOffset], -100.0);

        timeline.advance(1.0, &mut sink);
        assert_eq!(sink.values[&AnimationTarget::MeshScale], 1.0);
        let nav = sink.values[&AnimationTarget::NavOffset];
        assert!(nav > -100.0 && nav < 0.0);
        assert_eq!(sink.values[&AnimationTarget::CaptionOpacity], 0.0);
    }

    #[test]
    fn plays_once_and_stops_writing() {
        let mut timeline = Timeline::new(entrance_sequence());
        let mut sink = Recorder::default();
        timeline.start(&mut sink);
        timeline.advance(5.0, &mut sink);
        assert!(timeline.is_complete());
        assert_eq!(sink.values[&AnimationTarget::NavOffset], 0.0);
        assert_eq!(sink.values[&AnimationTarget::CaptionOpacity], 1.0);

        let writes = sink.writes;
        timeline.start(&mut sink);
        timeline.advance(1.0, &mut sink);
        assert_eq!(sink.writes, writes);
    }

    #[test]
    fn offsets_shift_start_times() {
        let timeline = Timeline::new(vec![
            AnimationDescriptor::new(AnimationTarget::MeshScale, 0.0, 1.0).duration(2.0),
            AnimationDescriptor::new(AnimationTarget::NavOffset, -100.0, 0.0)
                .offset(StartOffset::WithPrevious),
            AnimationDescriptor::new(AnimationTarget::CaptionOpacity, 0.0, 1.0)
                .offset(StartOffset::Gap(0.5)),
            AnimationDescriptor::new(AnimationTarget::CaptionOpacity, 1.0, 0.0)
                .offset(StartOffset::At(0.25)),
        ]);
        assert_eq!(timeline.start_times(), vec![0.0, 0.0, 1.5, 0.25]);
        assert_eq!(timeline.duration(), 2.5);
    }

    #[test]
    fn unstarted_timeline_ignores_time() {
        let mut timeline = Timeline::new(entrance_sequence());
        let mut sink = Recorder::default();
        timeline.advance(10.0, &mut sink);
        assert_eq!(sink.writes, 0);
        assert!(!timeline.is_complete());
    }
}
