use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::airborne::AirborneState;
use super::engine::{EngineState, TickOutcome};
use super::foot::FootHeightSample;
use super::metrics::JumpEvent;
use super::stats::RunningStats;
use crate::config::JumpConfig;
use crate::pose::{AnkleFrame, KeypointSample};

/// エンジン出力の受け取り先（グラフ、統計表示、ネットワークなど）
pub trait JumpSink {
    /// 処理済みティックごとに呼ばれる
    fn on_heights(&mut self, heights: &FootHeightSample, airborne: AirborneState, ground_level_px: Option<f32>);

    /// ジャンプ確定時に、更新後の統計と一緒に呼ばれる
    fn on_jump(&mut self, event: &JumpEvent, stats: &RunningStats);
}

/// 出力を捨てるシンク
pub struct NullSink;

impl JumpSink for NullSink {
    fn on_heights(&mut self, _: &FootHeightSample, _: AirborneState, _: Option<f32>) {}
    fn on_jump(&mut self, _: &JumpEvent, _: &RunningStats) {}
}

/// セッション終了時のまとめ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    pub stats: RunningStats,
    pub first_sample_ms: Option<f64>,
    pub last_sample_ms: Option<f64>,
    pub processed_samples: u64,
    pub throttled_samples: u64,
    pub skipped_frames: u64,
}

impl FinalStats {
    pub fn duration_seconds(&self) -> f64 {
        match (self.first_sample_ms, self.last_sample_ms) {
            (Some(first), Some(last)) => (last - first) / 1000.0,
            _ => 0.0,
        }
    }
}

/// ジャンプ検出エンジン
///
/// `start` → `process_frame` / `process_sample` を繰り返す → `stop`。
/// `stop` はセッションを閉じて状態を初期化するので、そのまま次のセッションに使える。
pub struct JumpEngine {
    config: JumpConfig,
    state: EngineState,
}

impl JumpEngine {
    pub fn start(config: JumpConfig) -> Result<Self> {
        config.validate().context("invalid jump engine config")?;
        let state = EngineState::new(&config);
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &JumpConfig {
        &self.config
    }

    pub fn process_frame<S: JumpSink + ?Sized>(&mut self, frame: &AnkleFrame, now_ms: f64, sink: &mut S) -> TickOutcome {
        let state = std::mem::take(&mut self.state);
        let (state, outcome) = state.tick_frame(frame, now_ms);
        self.commit(state, &outcome, sink);
        outcome
    }

    pub fn process_sample<S: JumpSink + ?Sized>(&mut self, sample: &KeypointSample, now_ms: f64, sink: &mut S) -> TickOutcome {
        let state = std::mem::take(&mut self.state);
        let (state, outcome) = state.tick(sample, now_ms);
        self.commit(state, &outcome, sink);
        outcome
    }

    /// 状態を確定させてから出力を流す
    fn commit<S: JumpSink + ?Sized>(&mut self, state: EngineState, outcome: &TickOutcome, sink: &mut S) {
        self.state = state;
        if let TickOutcome::Processed(report) = outcome {
            sink.on_heights(&report.heights, report.airborne, report.ground_level_px);
            if let (Some(event), Some(stats)) = (&report.jump, &report.stats) {
                sink.on_jump(event, stats);
            }
        }
    }

    /// 現在のセッションを破棄して新しく始める
    pub fn restart(&mut self) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reset_session();
    }

    /// セッションを閉じてまとめを返す
    pub fn stop(&mut self) -> FinalStats {
        let summary = self.summary();
        self.restart();
        summary
    }

    pub fn summary(&self) -> FinalStats {
        let counters = self.state.counters();
        FinalStats {
            stats: *self.state.stats(),
            first_sample_ms: self.state.first_sample_ms(),
            last_sample_ms: self.state.last_sample_ms(),
            processed_samples: counters.processed,
            throttled_samples: counters.throttled,
            skipped_frames: counters.missing_keypoint,
        }
    }

    pub fn stats(&self) -> &RunningStats {
        self.state.stats()
    }

    pub fn airborne_state(&self) -> AirborneState {
        self.state.airborne_state()
    }

    pub fn ground_level(&self) -> Option<f32> {
        self.state.ground_level()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }
}
