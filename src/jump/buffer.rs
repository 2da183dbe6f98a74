use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// 直近の足の高さを保持する固定長FIFO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffer {
    capacity: usize,
    values: VecDeque<f32>,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::new(),
        }
    }

    /// 追加して、容量を超えた分を古い順に捨てる
    pub fn push(&mut self, value: f32) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 古い順の全サンプル
    pub fn window(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    /// 新しい方から `n` 個（古い順）
    pub fn recent(&self, n: usize) -> impl Iterator<Item = f32> + '_ {
        let skip = self.values.len().saturating_sub(n);
        self.values.iter().skip(skip).copied()
    }

    /// 直近 `n` 個の最大値
    pub fn recent_max(&self, n: usize) -> Option<f32> {
        self.recent(n).reduce(f32::max)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
