use serde::{Deserialize, Serialize};

use crate::config::JumpConfig;

/// 立っているときの足の高さ（接地レベル）の推定
///
/// 最初の有効サンプルで初期化し、以後は許容幅内で下がる方向にだけ更新する。
/// 許容幅を超える急な低下（検出ミス、遮蔽）はノイズとして無視する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundLevelEstimator {
    tolerance_band_px: f32,
    level: Option<f32>,
}

impl GroundLevelEstimator {
    pub fn new(tolerance_band_px: f32) -> Self {
        Self {
            tolerance_band_px,
            level: None,
        }
    }

    pub fn from_config(config: &JumpConfig) -> Self {
        Self::new(config.ground_tolerance_band_px)
    }

    pub fn update(&mut self, height_px: f32) -> Option<f32> {
        match self.level {
            None => self.level = Some(height_px),
            Some(level) => {
                if height_px < level && height_px > level - self.tolerance_band_px {
                    self.level = Some(height_px);
                }
            }
        }
        self.level
    }

    pub fn level(&self) -> Option<f32> {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_sets_level() {
        let mut g = GroundLevelEstimator::new(100.0);
        assert_eq!(g.level(), None);
        assert_eq!(g.update(140.0), Some(140.0));
    }

    #[test]
    fn test_never_increases() {
        let mut g = GroundLevelEstimator::new(100.0);
        g.update(100.0);
        assert_eq!(g.update(150.0), Some(100.0));
        assert_eq!(g.update(100.5), Some(100.0));
    }

    #[test]
    fn test_small_drop_is_followed() {
        let mut g = GroundLevelEstimator::new(100.0);
        g.update(100.0);
        assert_eq!(g.update(95.0), Some(95.0));
        assert_eq!(g.update(10.0), Some(10.0));
    }

    #[test]
    fn test_large_drop_is_rejected() {
        let mut g = GroundLevelEstimator::new(100.0);
        g.update(150.0);
        assert_eq!(g.update(0.0), Some(150.0));
        // ちょうど許容幅の境界も除外
        assert_eq!(g.update(50.0), Some(150.0));
        assert_eq!(g.update(50.5), Some(50.5));
    }

    #[test]
    fn test_monotonic_over_sequence() {
        let mut g = GroundLevelEstimator::new(100.0);
        let heights = [120.0, 130.0, 118.0, 0.0, 240.0, 90.0, 95.0, -20.0, 85.0];
        let mut prev = g.update(heights[0]).unwrap();
        for &h in &heights[1..] {
            let level = g.update(h).unwrap();
            assert!(level <= prev, "ground rose from {} to {}", prev, level);
            prev = level;
        }
    }

    #[test]
    fn test_reset() {
        let mut g = GroundLevelEstimator::new(100.0);
        g.update(100.0);
        g.reset();
        assert_eq!(g.level(), None);
        assert_eq!(g.update(300.0), Some(300.0));
    }
}
