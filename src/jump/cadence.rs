use serde::{Deserialize, Serialize};

use crate::config::JumpConfig;

/// 処理レートの上限を決めるスロットル
///
/// 描画や推論のフレームレートとは独立に、前回処理から
/// `min_interval_ms` 未満のサンプルを捨てる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceController {
    min_interval_ms: f64,
    last_processed_ms: Option<f64>,
}

impl CadenceController {
    pub fn new(min_interval_ms: f64) -> Self {
        Self {
            min_interval_ms,
            last_processed_ms: None,
        }
    }

    pub fn from_config(config: &JumpConfig) -> Self {
        Self::new(config.min_sample_interval_ms)
    }

    /// 処理してよければ `last_processed_ms` を進めて true を返す
    pub fn accept(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_processed_ms {
            if now_ms - last < self.min_interval_ms {
                return false;
            }
        }
        self.last_processed_ms = Some(now_ms);
        true
    }

    pub fn last_processed_ms(&self) -> Option<f64> {
        self.last_processed_ms
    }

    pub fn reset(&mut self) {
        self.last_processed_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_accepted() {
        let mut c = CadenceController::new(30.0);
        assert!(c.accept(0.0));
        assert_eq!(c.last_processed_ms(), Some(0.0));
    }

    #[test]
    fn test_drops_samples_inside_interval() {
        let mut c = CadenceController::new(30.0);
        assert!(c.accept(100.0));
        assert!(!c.accept(110.0));
        assert!(!c.accept(129.9));
        // 捨てたサンプルは基準時刻を動かさない
        assert_eq!(c.last_processed_ms(), Some(100.0));
        assert!(c.accept(130.0));
        assert_eq!(c.last_processed_ms(), Some(130.0));
    }

    #[test]
    fn test_zero_interval_accepts_everything() {
        let mut c = CadenceController::new(0.0);
        assert!(c.accept(5.0));
        assert!(c.accept(5.0));
        assert!(c.accept(6.0));
    }

    #[test]
    fn test_reset() {
        let mut c = CadenceController::new(30.0);
        c.accept(100.0);
        c.reset();
        assert_eq!(c.last_processed_ms(), None);
        assert!(c.accept(101.0));
    }
}
