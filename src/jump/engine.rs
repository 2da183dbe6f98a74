use serde::{Deserialize, Serialize};

use super::airborne::{AirborneDetector, AirborneState};
use super::buffer::SampleBuffer;
use super::cadence::CadenceController;
use super::foot::{FootHeightExtractor, FootHeightSample};
use super::ground::GroundLevelEstimator;
use super::metrics::{JumpEvent, JumpMetrics};
use super::stats::RunningStats;
use crate::config::JumpConfig;
use crate::pose::{AnkleFrame, KeypointSample};

/// ティックが処理されなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// 足首キーポイントの片方または両方が無い
    MissingKeypoint,
    /// 前回処理から最小間隔が経っていない
    Throttled,
}

/// 処理済みティックの出力
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub heights: FootHeightSample,
    pub airborne: AirborneState,
    pub ground_level_px: Option<f32>,
    /// このティックで確定したジャンプ
    pub jump: Option<JumpEvent>,
    /// ジャンプ確定時のみ、更新後の統計
    pub stats: Option<RunningStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Processed(TickReport),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            Self::Processed(report) => Some(report),
            Self::Skipped(_) => None,
        }
    }

    pub fn jump(&self) -> Option<&JumpEvent> {
        self.report().and_then(|r| r.jump.as_ref())
    }
}

/// セッション内のフレーム数カウンタ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameCounters {
    pub processed: u64,
    pub throttled: u64,
    pub missing_keypoint: u64,
}

/// ジャンプ検出エンジンの全状態
///
/// ティックをまたぐ状態はすべてここにある。`tick` は状態を受け取って
/// 新しい状態を返すので、途中まで更新された状態が外から見えることはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    cadence: CadenceController,
    extractor: FootHeightExtractor,
    buffer: SampleBuffer,
    ground: GroundLevelEstimator,
    airborne: AirborneDetector,
    metrics: JumpMetrics,
    stats: RunningStats,
    counters: FrameCounters,
    first_sample_ms: Option<f64>,
    last_sample_ms: Option<f64>,
    persist_best: bool,
}

impl EngineState {
    pub fn new(config: &JumpConfig) -> Self {
        Self {
            cadence: CadenceController::from_config(config),
            extractor: FootHeightExtractor::from_config(config),
            buffer: SampleBuffer::new(config.buffer_capacity),
            ground: GroundLevelEstimator::from_config(config),
            airborne: AirborneDetector::from_config(config),
            metrics: JumpMetrics::from_config(config),
            stats: RunningStats::new(),
            counters: FrameCounters::default(),
            first_sample_ms: None,
            last_sample_ms: None,
            persist_best: config.persist_best_stats_across_sessions,
        }
    }

    /// 入力フレームを1つ処理する。足首が欠けていれば何も変更しない
    pub fn tick_frame(self, frame: &AnkleFrame, now_ms: f64) -> (Self, TickOutcome) {
        match frame.to_sample() {
            Some(sample) => self.tick(&sample, now_ms),
            None => {
                let mut next = self;
                next.counters.missing_keypoint += 1;
                (next, TickOutcome::Skipped(SkipReason::MissingKeypoint))
            }
        }
    }

    /// サンプル1つをパイプライン全段に流す
    pub fn tick(mut self, sample: &KeypointSample, now_ms: f64) -> (Self, TickOutcome) {
        if !self.cadence.accept(now_ms) {
            self.counters.throttled += 1;
            return (self, TickOutcome::Skipped(SkipReason::Throttled));
        }
        self.counters.processed += 1;
        self.first_sample_ms.get_or_insert(sample.timestamp_ms);
        self.last_sample_ms = Some(sample.timestamp_ms);

        let heights = self.extractor.extract(sample);
        let height = heights.combined_height_px;

        self.buffer.push(height);
        let ground = self.ground.update(height);
        let landing = self.airborne.update(height, ground, heights.timestamp_ms);

        let jump = match (landing, ground) {
            (Some(landing), Some(ground)) => {
                self.metrics
                    .evaluate(&landing, &self.buffer, ground, self.stats.jump_count)
            }
            _ => None,
        };
        let stats = jump.map(|event| {
            self.stats.record(&event);
            self.stats
        });

        let report = TickReport {
            heights,
            airborne: self.airborne.state(),
            ground_level_px: ground,
            jump,
            stats,
        };
        (self, TickOutcome::Processed(report))
    }

    /// 新しいセッション用に状態を初期化する
    pub fn reset_session(mut self) -> Self {
        self.cadence.reset();
        self.buffer.clear();
        self.ground.reset();
        self.airborne.reset();
        self.stats.reset_session(self.persist_best);
        self.counters = FrameCounters::default();
        self.first_sample_ms = None;
        self.last_sample_ms = None;
        self
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    pub fn airborne_state(&self) -> AirborneState {
        self.airborne.state()
    }

    pub fn ground_level(&self) -> Option<f32> {
        self.ground.level()
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn counters(&self) -> &FrameCounters {
        &self.counters
    }

    pub fn first_sample_ms(&self) -> Option<f64> {
        self.first_sample_ms
    }

    pub fn last_sample_ms(&self) -> Option<f64> {
        self.last_sample_ms
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new(&JumpConfig::default())
    }
}
