use serde::{Deserialize, Serialize};

use super::keypoint::{KeypointIndex, Pose};

/// 足首キーポイント（ピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnkleKeypoint {
    pub x: f32,
    /// 画像上端からの距離（下向きが正）
    pub y: f32,
    pub score: f32,
}

impl AnkleKeypoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }
}

/// 姿勢推定モデルから1フレームごとに届く入力
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnkleFrame {
    pub left_ankle: Option<AnkleKeypoint>,
    pub right_ankle: Option<AnkleKeypoint>,
    pub frame_width_px: f32,
    pub frame_height_px: f32,
    pub timestamp_ms: f64,
}

impl AnkleFrame {
    /// 正規化座標のPoseから足首だけを取り出す。信頼度0のキーポイントは欠損扱い
    pub fn from_pose(pose: &Pose, width: f32, height: f32, timestamp_ms: f64) -> Self {
        let ankle = |index: KeypointIndex| {
            let kp = pose.get(index);
            kp.is_detected().then(|| {
                let (x, y) = kp.to_pixel(width, height);
                AnkleKeypoint::new(x, y, kp.confidence)
            })
        };

        Self {
            left_ankle: ankle(KeypointIndex::LeftAnkle),
            right_ankle: ankle(KeypointIndex::RightAnkle),
            frame_width_px: width,
            frame_height_px: height,
            timestamp_ms,
        }
    }

    /// 両足首が揃っていればエンジン入力に変換。片方でも欠ければNone
    pub fn to_sample(&self) -> Option<KeypointSample> {
        let left = self.left_ankle?;
        let right = self.right_ankle?;
        Some(KeypointSample {
            left_ankle_y: left.y,
            left_confidence: left.score,
            right_ankle_y: right.y,
            right_confidence: right.score,
            frame_height_px: self.frame_height_px,
            timestamp_ms: self.timestamp_ms,
        })
    }
}

/// エンジンが1ティックで消費するサンプル
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeypointSample {
    pub left_ankle_y: f32,
    pub left_confidence: f32,
    pub right_ankle_y: f32,
    pub right_confidence: f32,
    pub frame_height_px: f32,
    pub timestamp_ms: f64,
}
