use serde::{Deserialize, Serialize};

use super::metrics::JumpEvent;

/// ジャンプ統計
///
/// 1イベントにつき `record` で一度だけ、全フィールドをまとめて更新する。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunningStats {
    pub jump_count: u32,
    pub last_jump_height_px: f32,
    pub last_flight_time_seconds: f64,
    pub max_height_ever_px: f32,
    pub best_flight_time_seconds: f64,
    /// 0 = まだ記録なし
    pub best_flight_time_jump_index: u32,
    pub best_height_px: f32,
    /// 0 = まだ記録なし
    pub best_height_jump_index: u32,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// イベントを反映した新しい統計を返す
    pub fn with_event(&self, event: &JumpEvent) -> Self {
        let mut next = *self;
        next.jump_count = event.jump_index;
        next.last_jump_height_px = event.peak_height_px;
        next.last_flight_time_seconds = event.flight_time_seconds;
        next.max_height_ever_px = self.max_height_ever_px.max(event.peak_height_px);
        if event.flight_time_seconds > self.best_flight_time_seconds {
            next.best_flight_time_seconds = event.flight_time_seconds;
            next.best_flight_time_jump_index = event.jump_index;
        }
        if event.peak_height_px > self.best_height_px {
            next.best_height_px = event.peak_height_px;
            next.best_height_jump_index = event.jump_index;
        }
        next
    }

    pub fn record(&mut self, event: &JumpEvent) {
        *self = self.with_event(event);
    }

    /// セッション開始時のリセット。`keep_best` ならベスト記録だけ残す
    pub fn reset_session(&mut self, keep_best: bool) {
        let best = *self;
        *self = Self::default();
        if keep_best {
            self.best_flight_time_seconds = best.best_flight_time_seconds;
            self.best_flight_time_jump_index = best.best_flight_time_jump_index;
            self.best_height_px = best.best_height_px;
            self.best_height_jump_index = best.best_height_jump_index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(jump_index: u32, flight_time_seconds: f64, peak_height_px: f32) -> JumpEvent {
        JumpEvent {
            jump_index,
            start_timestamp_ms: 0.0,
            end_timestamp_ms: flight_time_seconds * 1000.0,
            flight_time_seconds,
            peak_height_px,
        }
    }

    #[test]
    fn test_first_event_sets_everything() {
        let mut s = RunningStats::new();
        s.record(&event(1, 0.3, 40.0));
        assert_eq!(
            s,
            RunningStats {
                jump_count: 1,
                last_jump_height_px: 40.0,
                last_flight_time_seconds: 0.3,
                max_height_ever_px: 40.0,
                best_flight_time_seconds: 0.3,
                best_flight_time_jump_index: 1,
                best_height_px: 40.0,
                best_height_jump_index: 1,
            }
        );
    }

    #[test]
    fn test_best_flight_and_best_height_tracked_separately() {
        let mut s = RunningStats::new();
        s.record(&event(1, 0.5, 30.0));
        s.record(&event(2, 0.2, 50.0));
        assert_eq!(s.jump_count, 2);
        assert_eq!(s.last_jump_height_px, 50.0);
        assert_eq!(s.last_flight_time_seconds, 0.2);
        assert_eq!(s.best_flight_time_seconds, 0.5);
        assert_eq!(s.best_flight_time_jump_index, 1);
        assert_eq!(s.best_height_px, 50.0);
        assert_eq!(s.best_height_jump_index, 2);
        assert_eq!(s.max_height_ever_px, 50.0);
    }

    #[test]
    fn test_tie_keeps_earlier_best() {
        let mut s = RunningStats::new();
        s.record(&event(1, 0.3, 40.0));
        s.record(&event(2, 0.3, 40.0));
        assert_eq!(s.best_flight_time_jump_index, 1);
        assert_eq!(s.best_height_jump_index, 1);
    }

    #[test]
    fn test_with_event_does_not_touch_original() {
        let s = RunningStats::new();
        let next = s.with_event(&event(1, 0.3, 40.0));
        assert_eq!(s, RunningStats::default());
        assert_eq!(next.jump_count, 1);
    }

    #[test]
    fn test_reset_session_clears_all() {
        let mut s = RunningStats::new();
        s.record(&event(1, 0.3, 40.0));
        s.reset_session(false);
        assert_eq!(s, RunningStats::default());
    }

    #[test]
    fn test_reset_session_keeps_best() {
        let mut s = RunningStats::new();
        s.record(&event(1, 0.3, 40.0));
        s.record(&event(2, 0.4, 20.0));
        s.reset_session(true);
        assert_eq!(s.jump_count, 0);
        assert_eq!(s.last_jump_height_px, 0.0);
        assert_eq!(s.last_flight_time_seconds, 0.0);
        assert_eq!(s.max_height_ever_px, 0.0);
        assert_eq!(s.best_flight_time_seconds, 0.4);
        assert_eq!(s.best_flight_time_jump_index, 2);
        assert_eq!(s.best_height_px, 40.0);
        assert_eq!(s.best_height_jump_index, 1);
    }
}
