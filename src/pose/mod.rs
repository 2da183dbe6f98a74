pub mod ankle;
pub mod keypoint;

pub use ankle::{AnkleFrame, AnkleKeypoint, KeypointSample};
pub use keypoint::{Keypoint, KeypointIndex, Pose};
