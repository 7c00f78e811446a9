//! Telemetry Sequence Validation

use crate::error::ValidationError;
use crate::record::TelemetryRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject sequences whose records carry different `engine_id` values
    pub require_single_unit: bool,
    /// Reject sequences whose `cycle` values do not strictly increase
    pub require_increasing_cycles: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_single_unit: true,
            require_increasing_cycles: true,
        }
    }
}

impl ValidationConfig {
    /// Skip unit and cycle checks
    pub fn lenient() -> Self {
        Self {
            require_single_unit: false,
            require_increasing_cycles: false,
        }
    }
}

/// Upstream checks on a telemetry sequence before feature selection.
///
/// Feature presence is left to the selector so the caller gets a
/// `MissingFeature` error naming the key.
#[derive(Debug, Clone, Default)]
pub struct SequenceValidator {
    config: ValidationConfig,
}

impl SequenceValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a whole sequence, stopping at the first problem
    pub fn validate(&self, records: &[TelemetryRecord]) -> Result<(), ValidationError> {
        let mut unit: Option<i64> = None;
        let mut previous_cycle: Option<i64> = None;

        for (index, record) in records.iter().enumerate() {
            if self.config.require_single_unit {
                if let Some(found) = record.engine_id() {
                    match unit {
                        Some(expected) if expected != found => {
                            warn!("Rejecting sequence: engine {} after engine {}", found, expected);
                            return Err(ValidationError::MixedUnits {
                                expected,
                                found,
                                index,
                            });
                        }
                        _ => unit = Some(found),
                    }
                }
            }

            if self.config.require_increasing_cycles {
                if let Some(current) = record.cycle() {
                    if let Some(previous) = previous_cycle {
                        if current <= previous {
                            warn!("Rejecting sequence: cycle {} after {}", current, previous);
                            return Err(ValidationError::CycleOrder {
                                previous,
                                current,
                                index,
                            });
                        }
                    }
                    previous_cycle = Some(current);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CANONICAL_FEATURES;

    fn record(engine: f64, cycle: f64) -> TelemetryRecord {
        let mut r: TelemetryRecord = CANONICAL_FEATURES.iter().map(|n| (*n, 1.0)).collect();
        r.insert("engine_id", engine);
        r.insert("cycle", cycle);
        r
    }

    #[test]
    fn test_valid_sequence() {
        let records: Vec<_> = (1..=5).map(|c| record(2.0, c as f64)).collect();
        assert!(SequenceValidator::default().validate(&records).is_ok());
    }

    #[test]
    fn test_empty_sequence_passes() {
        assert!(SequenceValidator::default().validate(&[]).is_ok());
    }

    #[test]
    fn test_mixed_units_rejected() {
        let records = vec![record(1.0, 1.0), record(1.0, 2.0), record(3.0, 3.0)];
        let err = SequenceValidator::default().validate(&records).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MixedUnits {
                expected: 1,
                found: 3,
                index: 2
            }
        );
    }

    #[test]
    fn test_cycle_order_rejected() {
        let records = vec![record(1.0, 1.0), record(1.0, 5.0), record(1.0, 5.0)];
        let err = SequenceValidator::default().validate(&records).unwrap_err();
        assert!(matches!(err, ValidationError::CycleOrder { previous: 5, current: 5, index: 2 }));
    }

    #[test]
    fn test_lenient_skips_identity_checks() {
        let records = vec![record(1.0, 9.0), record(2.0, 1.0)];
        assert!(SequenceValidator::new(ValidationConfig::lenient())
            .validate(&records)
            .is_ok());
    }

    #[test]
    fn test_records_without_identity_fields() {
        let records: Vec<TelemetryRecord> = (0..3)
            .map(|_| CANONICAL_FEATURES.iter().map(|n| (*n, 0.5)).collect())
            .collect();
        assert!(SequenceValidator::default().validate(&records).is_ok());
    }
}
