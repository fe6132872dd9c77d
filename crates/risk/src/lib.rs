pub mod gate;
pub mod thresholds;

pub use gate::{SubmissionDecision, SubmissionGate};
pub use thresholds::{classify, RiskThresholds};
