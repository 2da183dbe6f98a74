use serde::{Deserialize, Serialize};

use crate::config::JumpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AirborneState {
    #[default]
    Grounded,
    Airborne,
}

/// 1回の滞空区間（離地から着地まで）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landing {
    pub start_timestamp_ms: f64,
    pub end_timestamp_ms: f64,
}

impl Landing {
    pub fn flight_time_seconds(&self) -> f64 {
        (self.end_timestamp_ms - self.start_timestamp_ms) / 1000.0
    }
}

/// 接地/空中の2状態マシン
///
/// 閾値は1本だけ（立ち上がりと立ち下がりで同じ）。境界付近で振動すると
/// 状態もそのまま振動する。短い振動はジャンプ判定側の最小滞空時間で落ちる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirborneDetector {
    threshold_px: f32,
    state: AirborneState,
    jump_start_ms: Option<f64>,
}

impl AirborneDetector {
    pub fn new(threshold_px: f32) -> Self {
        Self {
            threshold_px,
            state: AirborneState::Grounded,
            jump_start_ms: None,
        }
    }

    pub fn from_config(config: &JumpConfig) -> Self {
        Self::new(config.jump_threshold_px)
    }

    /// 1フレーム分の状態遷移。着地（空中→接地）したときだけ滞空区間を返す
    pub fn update(&mut self, height_px: f32, ground: Option<f32>, timestamp_ms: f64) -> Option<Landing> {
        let is_airborne = match ground {
            Some(g) => height_px > g + self.threshold_px,
            None => false,
        };

        match (self.state, is_airborne) {
            (AirborneState::Grounded, true) => {
                self.state = AirborneState::Airborne;
                self.jump_start_ms = Some(timestamp_ms);
                None
            }
            (AirborneState::Airborne, false) => {
                self.state = AirborneState::Grounded;
                self.jump_start_ms.take().map(|start| Landing {
                    start_timestamp_ms: start,
                    end_timestamp_ms: timestamp_ms,
                })
            }
            _ => None,
        }
    }

    pub fn state(&self) -> AirborneState {
        self.state
    }

    /// 空中にいる場合の離地時刻
    pub fn jump_start_ms(&self) -> Option<f64> {
        self.jump_start_ms
    }

    pub fn reset(&mut self) {
        self.state = AirborneState::Grounded;
        self.jump_start_ms = None;
    }
}
