pub mod airborne;
pub mod buffer;
pub mod cadence;
pub mod engine;
pub mod foot;
pub mod ground;
pub mod metrics;
pub mod session;
pub mod stats;

pub use airborne::{AirborneDetector, AirborneState, Landing};
pub use buffer::SampleBuffer;
pub use cadence::CadenceController;
pub use engine::{EngineState, SkipReason, TickOutcome, TickReport};
pub use foot::{FootHeightExtractor, FootHeightSample};
pub use ground::GroundLevelEstimator;
pub use metrics::{JumpEvent, JumpMetrics};
pub use session::{FinalStats, JumpEngine, JumpSink, NullSink};
pub use stats::RunningStats;
