pub mod clock;
pub mod config;
pub mod jump;
pub mod logging;
pub mod pose;
pub mod protocol;
pub mod recording;
pub mod runner;
