//! Health Evaluation
//!
//! Turns a raw regression output into a bounded health score and status.

mod evaluator;

pub use evaluator::{HealthEvaluator, HealthReport, HealthStatus, HealthThresholds, MAX_RUL};
