use serde::{Deserialize, Serialize};

use crate::config::{FootCombine, JumpConfig};
use crate::pose::KeypointSample;

/// 1フレーム分の足の高さ（画像下端からの距離、大きいほど高い）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootHeightSample {
    pub left_height_px: f32,
    pub right_height_px: f32,
    /// 接地レベル・ジャンプ判定に使う代表値
    pub combined_height_px: f32,
    pub timestamp_ms: f64,
    /// 信頼度不足で高さを0に潰したフレーム
    pub low_confidence: bool,
}

/// 左右の足首から足の高さを求める
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootHeightExtractor {
    low_confidence_sum_threshold: f32,
    combine: FootCombine,
}

impl FootHeightExtractor {
    pub fn new(low_confidence_sum_threshold: f32, combine: FootCombine) -> Self {
        Self {
            low_confidence_sum_threshold,
            combine,
        }
    }

    pub fn from_config(config: &JumpConfig) -> Self {
        Self::new(config.low_confidence_sum_threshold, config.foot_combine)
    }

    pub fn extract(&self, sample: &KeypointSample) -> FootHeightSample {
        let confidence_sum = sample.left_confidence + sample.right_confidence;
        let low_confidence = confidence_sum < self.low_confidence_sum_threshold;

        // 低信頼度フレームは補間せず0にする（バッファ・接地レベルにもそのまま流れる）
        let (left, right) = if low_confidence {
            (0.0, 0.0)
        } else {
            (
                sample.frame_height_px - sample.left_ankle_y,
                sample.frame_height_px - sample.right_ankle_y,
            )
        };

        let combined = match self.combine {
            FootCombine::Min => left.min(right),
            FootCombine::Average => (left + right) / 2.0,
        };

        FootHeightSample {
            left_height_px: left,
            right_height_px: right,
            combined_height_px: combined,
            timestamp_ms: sample.timestamp_ms,
            low_confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(left_y: f32, left_conf: f32, right_y: f32, right_conf: f32) -> KeypointSample {
        KeypointSample {
            left_ankle_y: left_y,
            left_confidence: left_conf,
            right_ankle_y: right_y,
            right_confidence: right_conf,
            frame_height_px: 480.0,
            timestamp_ms: 33.0,
        }
    }

    #[test]
    fn test_height_from_frame_bottom() {
        let ex = FootHeightExtractor::new(0.6, FootCombine::Min);
        let h = ex.extract(&sample(380.0, 0.9, 350.0, 0.9));
        assert_eq!(h.left_height_px, 100.0);
        assert_eq!(h.right_height_px, 130.0);
        assert_eq!(h.timestamp_ms, 33.0);
        assert!(!h.low_confidence);
    }

    #[test]
    fn test_min_combine_follows_planted_foot() {
        let ex = FootHeightExtractor::new(0.6, FootCombine::Min);
        let h = ex.extract(&sample(380.0, 0.9, 350.0, 0.9));
        assert_eq!(h.combined_height_px, 100.0);
    }

    #[test]
    fn test_average_combine() {
        let ex = FootHeightExtractor::new(0.6, FootCombine::Average);
        let h = ex.extract(&sample(380.0, 0.9, 350.0, 0.9));
        assert_eq!(h.combined_height_px, 115.0);
    }

    #[test]
    fn test_low_confidence_forces_zero() {
        let ex = FootHeightExtractor::new(0.6, FootCombine::Min);
        let h = ex.extract(&sample(100.0, 0.2, 50.0, 0.2));
        assert_eq!(h.left_height_px, 0.0);
        assert_eq!(h.right_height_px, 0.0);
        assert_eq!(h.combined_height_px, 0.0);
        assert!(h.low_confidence);
    }

    #[test]
    fn test_one_confident_ankle_is_enough() {
        // 合計で判定するので片足の信頼度が高ければ有効
        let ex = FootHeightExtractor::new(0.6, FootCombine::Min);
        let h = ex.extract(&sample(380.0, 0.7, 380.0, 0.0));
        assert!(!h.low_confidence);
        assert_eq!(h.combined_height_px, 100.0);
    }
}
