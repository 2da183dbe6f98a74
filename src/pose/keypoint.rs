use serde::{Deserialize, Serialize};

/// MoveNet の 17 キーポイントインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const COUNT: usize = 17;
}

/// 単一キーポイント（姿勢推定モデルの出力）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0、下向きが正)
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// モデルが検出できなかったキーポイントは信頼度0で埋められる
    pub fn is_detected(&self) -> bool {
        self.confidence > 0.0
    }

    /// ピクセル座標に変換
    pub fn to_pixel(&self, width: f32, height: f32) -> (f32, f32) {
        (self.x * width, self.y * height)
    }
}

/// 17キーポイントからなる姿勢
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
}

impl Pose {
    pub fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self { keypoints }
    }

    /// インデックスでキーポイントを取得
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::default(); KeypointIndex::COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_index_count() {
        assert_eq!(KeypointIndex::COUNT, 17);
        assert_eq!(KeypointIndex::RightAnkle as usize, KeypointIndex::COUNT - 1);
    }

    #[test]
    fn test_keypoint_is_detected() {
        assert!(Keypoint::new(0.5, 0.5, 0.01).is_detected());
        assert!(!Keypoint::new(0.5, 0.5, 0.0).is_detected());
        assert!(!Keypoint::default().is_detected());
    }

    #[test]
    fn test_keypoint_to_pixel() {
        let kp = Keypoint::new(0.5, 0.25, 1.0);
        let (px, py) = kp.to_pixel(640.0, 480.0);
        assert_eq!(px, 320.0);
        assert_eq!(py, 120.0);
    }

    #[test]
    fn test_pose_get() {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints[KeypointIndex::LeftAnkle as usize] = Keypoint::new(0.4, 0.9, 0.8);

        let pose = Pose::new(keypoints);
        let ankle = pose.get(KeypointIndex::LeftAnkle);
        assert_eq!(ankle.x, 0.4);
        assert_eq!(ankle.y, 0.9);
        assert_eq!(ankle.confidence, 0.8);
        assert!(!pose.get(KeypointIndex::RightAnkle).is_detected());
    }
}
