use serde::{Deserialize, Serialize};

use super::airborne::Landing;
use super::buffer::SampleBuffer;
use crate::config::JumpConfig;

/// 最小滞空時間を通過した1回のジャンプ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpEvent {
    /// 1始まりの通し番号
    pub jump_index: u32,
    pub start_timestamp_ms: f64,
    pub end_timestamp_ms: f64,
    pub flight_time_seconds: f64,
    /// 接地レベルからのピーク高さ（ピクセル）
    pub peak_height_px: f32,
}

/// 着地時に滞空時間とピーク高さを計算し、ジャンプとして数えるか決める
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpMetrics {
    min_flight_time_seconds: f64,
    peak_lookback: usize,
}

impl JumpMetrics {
    pub fn new(min_flight_time_seconds: f64, peak_lookback: usize) -> Self {
        Self {
            min_flight_time_seconds,
            peak_lookback,
        }
    }

    pub fn from_config(config: &JumpConfig) -> Self {
        Self::new(config.min_flight_time_seconds, config.peak_lookback)
    }

    /// `min_flight_time_seconds` 以下の滞空はノイズとして None
    pub fn evaluate(
        &self,
        landing: &Landing,
        buffer: &SampleBuffer,
        ground_px: f32,
        previous_jump_count: u32,
    ) -> Option<JumpEvent> {
        let flight_time_seconds = landing.flight_time_seconds();
        if flight_time_seconds <= self.min_flight_time_seconds {
            return None;
        }

        let peak = buffer.recent_max(self.peak_lookback)?;

        Some(JumpEvent {
            jump_index: previous_jump_count + 1,
            start_timestamp_ms: landing.start_timestamp_ms,
            end_timestamp_ms: landing.end_timestamp_ms,
            flight_time_seconds,
            peak_height_px: peak - ground_px,
        })
    }
}
