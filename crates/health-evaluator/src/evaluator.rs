//! Health Evaluator Implementation

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper clip for reported RUL, in cycles
pub const MAX_RUL: f64 = 125.0;

/// Coarse health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// Failure is near
    Red,
    /// Degrading, plan maintenance
    Yellow,
    /// Healthy
    Green,
}

impl HealthStatus {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Red => "RED",
            HealthStatus::Yellow => "YELLOW",
            HealthStatus::Green => "GREEN",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds (inclusive) of the RED and YELLOW buckets, in health points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// `health <= red_max` is RED
    pub red_max: f64,
    /// `red_max < health <= yellow_max` is YELLOW
    pub yellow_max: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            red_max: 30.0,
            yellow_max: 60.0,
        }
    }
}

impl HealthThresholds {
    /// Classify a health score
    pub fn classify(&self, health: f64) -> HealthStatus {
        if health <= self.red_max {
            HealthStatus::Red
        } else if health <= self.yellow_max {
            HealthStatus::Yellow
        } else {
            HealthStatus::Green
        }
    }
}

/// User-facing verdict for one prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// RUL clipped to `[0, MAX_RUL]`
    pub rul: f64,
    /// Health score in `[0, 100]`
    pub health_score: f64,
    /// Status bucket
    pub status: HealthStatus,
}

/// Maps raw RUL estimates to health reports
#[derive(Debug, Clone, Copy)]
pub struct HealthEvaluator {
    max_rul: f64,
    thresholds: HealthThresholds,
}

impl Default for HealthEvaluator {
    fn default() -> Self {
        Self::new(MAX_RUL, HealthThresholds::default())
    }
}

impl HealthEvaluator {
    /// Create an evaluator with a custom clip and thresholds
    pub fn new(max_rul: f64, thresholds: HealthThresholds) -> Self {
        Self {
            max_rul,
            thresholds,
        }
    }

    /// Evaluate a raw model output.
    ///
    /// Total over every input: negatives and huge values are clipped, and a
    /// NaN estimate is treated as zero remaining life.
    pub fn evaluate(&self, raw_rul: f64) -> HealthReport {
        let rul = if raw_rul.is_nan() {
            0.0
        } else {
            raw_rul.clamp(0.0, self.max_rul)
        };
        let health_score = ((rul / self.max_rul) * 100.0).clamp(0.0, 100.0);
        let status = self.thresholds.classify(health_score);

        debug!(
            "Raw RUL {:.3} -> rul={:.3}, health={:.2}, status={}",
            raw_rul, rul, health_score, status
        );

        HealthReport {
            rul,
            health_score,
            status,
        }
    }
}
