//! Error types for the Shepard filter

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShepardError {
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Invalid band count: {0} (at least one band is required)")]
    InvalidBandCount(usize),

    #[error("Frequency {frequency} Hz outside (0, {nyquist}) Hz")]
    FrequencyOutOfRange { frequency: f64, nyquist: f64 },
}

impl ShepardError {
    /// Shorthand for an [`ShepardError::InvalidParam`] naming the offending value
    pub fn invalid(name: &str, value: f64) -> Self {
        Self::InvalidParam(format!("{name} = {value}"))
    }
}

/// Result type alias
pub type ShepardResult<T> = Result<T, ShepardError>;

/// Reject values that are not finite and strictly positive
#[inline]
pub fn ensure_positive(name: &str, value: f64) -> ShepardResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ShepardError::invalid(name, value))
    }
}

/// Reject values outside the closed unit interval
#[inline]
pub fn ensure_unit(name: &str, value: f64) -> ShepardResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ShepardError::invalid(name, value))
    }
}
