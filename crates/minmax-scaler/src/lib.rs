//! Min-Max Feature Scaling
//!
//! Applies a normalizer fitted offline over the training distribution. The
//! fitted state is loaded once and only ever read afterwards.

mod error;
mod scaler;

pub use error::ScalerError;
pub use scaler::{MinMaxScaler, NormalizerState};
