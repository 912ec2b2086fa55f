//! Local computations layered on top of upstream data.

pub mod indicators;
pub mod predictor;
pub mod sentiment;
pub mod synthetic;

pub use indicators::build_indicator_set;
pub use predictor::predict;
pub use sentiment::score_headlines;
