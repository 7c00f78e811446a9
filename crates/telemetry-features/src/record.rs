//! Telemetry Records and Canonical Feature Selection

use crate::error::FeatureError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Number of features the regression model consumes per cycle
pub const FEATURE_COUNT: usize = 10;

/// Canonical feature order. Any permutation silently changes predictions.
pub const CANONICAL_FEATURES: [&str; FEATURE_COUNT] = [
    "sensor_2",
    "sensor_3",
    "sensor_4",
    "sensor_7",
    "sensor_11",
    "sensor_12",
    "sensor_15",
    "sensor_17",
    "sensor_20",
    "sensor_21",
];

/// One cycle worth of feature values in canonical order
pub type FeatureVector = [f64; FEATURE_COUNT];

/// One measurement cycle of one unit.
///
/// Holds every field the client sent; fields outside the canonical set
/// (`engine_id`, `cycle`, operational settings, unused sensors) are kept for
/// validation but never reach the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetryRecord {
    fields: Map<String, Value>,
}

impl TelemetryRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a numeric field.
    ///
    /// JSON has no representation for NaN or infinities: a non-finite value
    /// is stored as `null` and reads back as absent.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.fields.insert(key.into(), Value::from(value));
    }

    /// Builder-style variant of [`TelemetryRecord::insert`]
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    /// Numeric value of a field, `None` if absent or not a number
    pub fn get(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// Unit identifier, if the record carries one
    pub fn engine_id(&self) -> Option<i64> {
        self.fields.get("engine_id").and_then(as_integer)
    }

    /// Cycle index, if the record carries one
    pub fn cycle(&self) -> Option<i64> {
        self.fields.get("cycle").and_then(as_integer)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for TelemetryRecord {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64))
}

/// Extracts canonical feature vectors from telemetry records
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSelector;

impl FeatureSelector {
    /// Create a new selector
    pub fn new() -> Self {
        Self
    }

    /// Select the canonical features of a single record.
    ///
    /// `index` is the record's position in its sequence and is only used to
    /// make the error point at the offending record.
    pub fn select(
        &self,
        record: &TelemetryRecord,
        index: usize,
    ) -> Result<FeatureVector, FeatureError> {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, &feature) in values.iter_mut().zip(CANONICAL_FEATURES.iter()) {
            *slot = record
                .get(feature)
                .ok_or(FeatureError::MissingFeature { feature, index })?;
        }
        Ok(values)
    }

    /// Select features for every record, preserving order
    pub fn select_sequence(
        &self,
        records: &[TelemetryRecord],
    ) -> Result<Vec<FeatureVector>, FeatureError> {
        debug!("Selecting {} features from {} records", FEATURE_COUNT, records.len());
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.select(record, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record(base: f64) -> TelemetryRecord {
        CANONICAL_FEATURES
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, base + i as f64))
            .collect()
    }

    #[test]
    fn test_select_canonical_order() {
        let record = full_record(100.0)
            .with("engine_id", 2.0)
            .with("cycle", 7.0)
            .with("sensor_1", -1.0)
            .with("op_setting_1", 0.0023);

        let values = FeatureSelector::new().select(&record, 0).unwrap();
        assert_eq!(
            values,
            [100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0, 108.0, 109.0]
        );
    }

    #[test]
    fn test_missing_feature_names_key() {
        let mut record = TelemetryRecord::new();
        for name in CANONICAL_FEATURES.iter().filter(|n| **n != "sensor_15") {
            record.insert(*name, 1.0);
        }

        let err = FeatureSelector::new().select(&record, 3).unwrap_err();
        assert_eq!(
            err,
            FeatureError::MissingFeature {
                feature: "sensor_15",
                index: 3
            }
        );
        assert!(err.to_string().contains("sensor_15"));
    }

    #[test]
    fn test_non_numeric_value_is_missing() {
        let json = r#"{"sensor_2": "642.1", "sensor_3": 1589.7}"#;
        let record: TelemetryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.get("sensor_2"), None);
        assert_eq!(record.get("sensor_3"), Some(1589.7));
    }

    #[test]
    fn test_select_sequence_preserves_order() {
        let records: Vec<_> = (0..5).map(|i| full_record(i as f64 * 10.0)).collect();
        let rows = FeatureSelector::new().select_sequence(&records).unwrap();

        assert_eq!(rows.len(), 5);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row[0], i as f64 * 10.0);
        }
    }

    #[test]
    fn test_select_sequence_reports_first_bad_record() {
        let mut records: Vec<_> = (0..4).map(|_| full_record(1.0)).collect();
        records[2] = TelemetryRecord::new().with("sensor_2", 1.0);

        let err = FeatureSelector::new().select_sequence(&records).unwrap_err();
        assert_eq!(
            err,
            FeatureError::MissingFeature {
                feature: "sensor_3",
                index: 2
            }
        );
    }

    #[test]
    fn test_record_identity_fields() {
        let json = r#"{"engine_id": 2, "cycle": 31.0, "sensor_2": 642.0}"#;
        let record: TelemetryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.engine_id(), Some(2));
        assert_eq!(record.cycle(), Some(31));
        assert_eq!(record.get("sensor_2"), Some(642.0));
    }

    #[test]
    fn test_non_finite_insert_reads_as_absent() {
        let mut record = full_record(1.0);
        record.insert("sensor_4", f64::NAN);
        record.insert("sensor_7", f64::INFINITY);
        assert_eq!(record.get("sensor_4"), None);
        assert_eq!(record.get("sensor_7"), None);

        let err = FeatureSelector::new().select(&record, 0).unwrap_err();
        assert_eq!(
            err,
            FeatureError::MissingFeature {
                feature: "sensor_4",
                index: 0
            }
        );
    }
}
