//! Fixed-Length Sequence Windows
//!
//! The window builder only ever sees rows that are already scaled. Padding is
//! added afterwards as literal `0.0` in scaled space, so synthetic rows are
//! never pushed through the normalizer as if they were minimum-range readings.

use crate::record::{FeatureVector, FEATURE_COUNT};
use tracing::debug;

/// Number of cycles the regression model consumes per prediction
pub const SEQ_LEN: usize = 50;

/// Scaled model input, oldest cycle first and most recent cycle last
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWindow {
    rows: Vec<FeatureVector>,
    padding: usize,
}

impl FeatureWindow {
    /// Wrap rows without any length check.
    ///
    /// The inference invoker verifies the shape before running the model.
    pub fn from_rows(rows: Vec<FeatureVector>) -> Self {
        Self { rows, padding: 0 }
    }

    /// Rows in cycle order
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    /// `(rows, features)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), FEATURE_COUNT)
    }

    /// Number of leading zero rows added by the builder
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Number of rows carrying real sensor data
    pub fn real_rows(&self) -> usize {
        self.rows.len() - self.padding
    }

    /// Row-major `f32` buffer, ready to be reshaped to `(1, rows, features)`
    pub fn to_tensor(&self) -> Vec<f32> {
        self.rows
            .iter()
            .flat_map(|row| row.iter().map(|&v| v as f32))
            .collect()
    }
}

/// Truncates or front-pads scaled rows to a fixed length
#[derive(Debug, Clone, Copy)]
pub struct WindowBuilder {
    seq_len: usize,
}

impl Default for WindowBuilder {
    fn default() -> Self {
        Self::new(SEQ_LEN)
    }
}

impl WindowBuilder {
    /// Create a builder producing windows of `seq_len` rows
    pub fn new(seq_len: usize) -> Self {
        Self { seq_len }
    }

    /// Build a window from already-scaled rows.
    ///
    /// Keeps the most recent `seq_len` rows when there are enough, otherwise
    /// prepends zero rows so the real data sits at the tail.
    pub fn build(&self, scaled: &[FeatureVector]) -> FeatureWindow {
        let n = scaled.len();
        let window = if n >= self.seq_len {
            FeatureWindow {
                rows: scaled[n - self.seq_len..].to_vec(),
                padding: 0,
            }
        } else {
            let padding = self.seq_len - n;
            let mut rows = Vec::with_capacity(self.seq_len);
            rows.resize(padding, [0.0; FEATURE_COUNT]);
            rows.extend_from_slice(scaled);
            FeatureWindow { rows, padding }
        };

        debug!(
            "Built window: {} input rows, {} padding, {} discarded",
            n,
            window.padding,
            n.saturating_sub(self.seq_len)
        );
        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(v: f64) -> FeatureVector {
        let mut r = [0.0; FEATURE_COUNT];
        for (j, slot) in r.iter_mut().enumerate() {
            *slot = v + j as f64 / 100.0;
        }
        r
    }

    fn rows(n: usize) -> Vec<FeatureVector> {
        (1..=n).map(|i| row(i as f64)).collect()
    }

    #[test]
    fn test_exact_length_unchanged() {
        let input = rows(SEQ_LEN);
        let window = WindowBuilder::default().build(&input);
        assert_eq!(window.rows(), input.as_slice());
        assert_eq!(window.padding(), 0);
    }

    #[test]
    fn test_short_sequence_front_padded() {
        // 20 real cycles -> 30 zero rows, then the 20 rows in order
        let input = rows(20);
        let window = WindowBuilder::default().build(&input);

        assert_eq!(window.shape(), (SEQ_LEN, FEATURE_COUNT));
        assert_eq!(window.padding(), 30);
        assert_eq!(window.real_rows(), 20);
        for r in &window.rows()[..30] {
            assert_eq!(*r, [0.0; FEATURE_COUNT]);
        }
        assert_eq!(&window.rows()[30..], input.as_slice());
    }

    #[test]
    fn test_long_sequence_keeps_most_recent() {
        // 80 cycles -> cycles 31..=80
        let input = rows(80);
        let window = WindowBuilder::default().build(&input);

        assert_eq!(window.shape(), (SEQ_LEN, FEATURE_COUNT));
        assert_eq!(window.rows()[0], row(31.0));
        assert_eq!(window.rows()[SEQ_LEN - 1], row(80.0));
        assert_eq!(window.rows(), &input[30..]);
    }

    #[test]
    fn test_empty_sequence_all_zero() {
        let window = WindowBuilder::default().build(&[]);
        assert_eq!(window.shape(), (SEQ_LEN, FEATURE_COUNT));
        assert_eq!(window.padding(), SEQ_LEN);
        assert!(window.rows().iter().all(|r| *r == [0.0; FEATURE_COUNT]));
    }

    #[test]
    fn test_tensor_is_row_major() {
        let window = WindowBuilder::new(2).build(&rows(1));
        let tensor = window.to_tensor();
        assert_eq!(tensor.len(), 2 * FEATURE_COUNT);
        assert!(tensor[..FEATURE_COUNT].iter().all(|&v| v == 0.0));
        assert_eq!(tensor[FEATURE_COUNT], 1.0);
        assert!((tensor[FEATURE_COUNT + 1] - 1.01).abs() < 1e-6);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_window_always_seq_len(n in 0usize..200) {
            let window = WindowBuilder::default().build(&rows(n));
            prop_assert_eq!(window.shape(), (SEQ_LEN, FEATURE_COUNT));
        }

        #[test]
        fn prop_short_input_layout(n in 0usize..SEQ_LEN) {
            let input = rows(n);
            let window = WindowBuilder::default().build(&input);
            let pad = SEQ_LEN - n;
            prop_assert!(window.rows()[..pad].iter().all(|r| *r == [0.0; FEATURE_COUNT]));
            prop_assert_eq!(&window.rows()[pad..], input.as_slice());
        }

        #[test]
        fn prop_long_input_ignores_prefix(n in SEQ_LEN..200, junk in -1e6f64..1e6) {
            let input = rows(n);
            let mut altered = input.clone();
            for r in altered[..n - SEQ_LEN].iter_mut() {
                *r = [junk; FEATURE_COUNT];
            }
            let builder = WindowBuilder::default();
            let window = builder.build(&input);
            prop_assert_eq!(&window, &builder.build(&altered));
            prop_assert_eq!(window.rows(), &input[n - SEQ_LEN..]);
        }
    }
}
