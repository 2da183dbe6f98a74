//! Frame loop that pulls frames from a source and feeds the engine.

use std::collections::VecDeque;

use crate::clock::{FrameClock, ReplayClock};
use crate::jump::{JumpEngine, JumpSink, SkipReason, TickOutcome};
use crate::pose::AnkleFrame;

/// Upstream producer of ankle frames (pose model driver, recording, network).
pub trait FrameSource {
    /// `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<AnkleFrame>;
}

impl FrameSource for VecDeque<AnkleFrame> {
    fn next_frame(&mut self) -> Option<AnkleFrame> {
        self.pop_front()
    }
}

impl<I: Iterator<Item = AnkleFrame>> FrameSource for std::iter::Fuse<I> {
    fn next_frame(&mut self) -> Option<AnkleFrame> {
        self.next()
    }
}

/// Frame counts for one run of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub processed: u64,
    pub throttled: u64,
    pub missing_keypoint: u64,
    pub jumps: u64,
}

impl RunSummary {
    fn count(&mut self, outcome: &TickOutcome) {
        self.frames += 1;
        match outcome {
            TickOutcome::Processed(report) => {
                self.processed += 1;
                if report.jump.is_some() {
                    self.jumps += 1;
                }
            }
            TickOutcome::Skipped(SkipReason::Throttled) => self.throttled += 1,
            TickOutcome::Skipped(SkipReason::MissingKeypoint) => self.missing_keypoint += 1,
        }
    }
}

/// Drive the engine until the source runs dry, timing each frame with `clock`.
pub fn run<Src, C, S>(engine: &mut JumpEngine, source: &mut Src, clock: &mut C, sink: &mut S) -> RunSummary
where
    Src: FrameSource + ?Sized,
    C: FrameClock + ?Sized,
    S: JumpSink + ?Sized,
{
    let mut summary = RunSummary::default();
    loop {
        clock.wait_next_frame();
        let Some(frame) = source.next_frame() else {
            break;
        };
        let outcome = engine.process_frame(&frame, clock.now_ms(), sink);
        summary.count(&outcome);
    }
    summary
}

/// Replay recorded frames using their own timestamps as the clock.
pub fn replay<S: JumpSink + ?Sized>(engine: &mut JumpEngine, frames: &[AnkleFrame], sink: &mut S) -> RunSummary {
    let mut clock = ReplayClock::new();
    let mut summary = RunSummary::default();
    for frame in frames {
        clock.set(frame.timestamp_ms);
        let outcome = engine.process_frame(frame, clock.now_ms(), sink);
        summary.count(&outcome);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::JumpConfig;
    use crate::jump::NullSink;
    use crate::pose::AnkleKeypoint;

    fn frame(height_px: f32, timestamp_ms: f64) -> AnkleFrame {
        let y = 480.0 - height_px;
        AnkleFrame {
            left_ankle: Some(AnkleKeypoint::new(300.0, y, 0.9)),
            right_ankle: Some(AnkleKeypoint::new(340.0, y, 0.9)),
            frame_width_px: 640.0,
            frame_height_px: 480.0,
            timestamp_ms,
        }
    }

    fn jump_heights() -> Vec<f32> {
        let mut heights = vec![100.0; 3];
        heights.extend([135.0; 6]);
        heights.extend([100.0; 3]);
        heights
    }

    #[test]
    fn test_run_with_manual_clock() {
        let mut engine = JumpEngine::start(JumpConfig::default()).unwrap();
        // フレームのタイムスタンプは使わず、クロック側の時刻で間引く
        let mut source: VecDeque<AnkleFrame> = jump_heights()
            .into_iter()
            .enumerate()
            .map(|(i, h)| frame(h, i as f64 * 40.0))
            .collect();
        let mut clock = ManualClock::new(0.0, 40.0);

        let summary = run(&mut engine, &mut source, &mut clock, &mut NullSink);
        assert_eq!(summary.frames, 12);
        assert_eq!(summary.processed, 12);
        assert_eq!(summary.jumps, 1);
        assert_eq!(engine.stats().jump_count, 1);
    }

    #[test]
    fn test_run_throttles_fast_clock() {
        let mut engine = JumpEngine::start(JumpConfig::default()).unwrap();
        let mut source = (0..10).map(|i| frame(100.0, i as f64 * 10.0)).fuse();
        let mut clock = ManualClock::new(0.0, 10.0);

        let summary = run(&mut engine, &mut source, &mut clock, &mut NullSink);
        assert_eq!(summary.frames, 10);
        // 0, 30, 60, 90ms だけ処理される
        assert_eq!(summary.processed, 4);
        assert_eq!(summary.throttled, 6);
    }

    #[test]
    fn test_replay_counts_missing_keypoints() {
        let mut engine = JumpEngine::start(JumpConfig::default()).unwrap();
        let mut frames: Vec<AnkleFrame> = jump_heights()
            .into_iter()
            .enumerate()
            .map(|(i, h)| frame(h, i as f64 * 40.0))
            .collect();
        frames[1].left_ankle = None;

        let summary = replay(&mut engine, &frames, &mut NullSink);
        assert_eq!(summary.frames, 12);
        assert_eq!(summary.missing_keypoint, 1);
        assert_eq!(summary.processed, 11);
        assert_eq!(summary.jumps, 1);
    }

    #[test]
    fn test_run_empty_source() {
        let mut engine = JumpEngine::start(JumpConfig::default()).unwrap();
        let mut source: VecDeque<AnkleFrame> = VecDeque::new();
        let mut clock = ManualClock::new(0.0, 33.0);
        let summary = run(&mut engine, &mut source, &mut clock, &mut NullSink);
        assert_eq!(summary, RunSummary::default());
    }
}
