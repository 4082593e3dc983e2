//! Sample type and log-frequency helpers

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;

/// Absolute lower bound of the audible band window (Hz)
pub const FREQ_MIN: f64 = 20.0;

/// Nyquist frequency for a sample rate
#[inline]
pub fn nyquist(sample_rate: f64) -> f64 {
    sample_rate / 2.0
}

/// Frequency in Hz to octave (log2) position
#[inline]
pub fn hz_to_log2(hz: f64) -> f64 {
    hz.log2()
}

/// Octave (log2) position to frequency in Hz
#[inline]
pub fn log2_to_hz(log2: f64) -> f64 {
    2.0_f64.powf(log2)
}

/// Check a signal contains no NaN or Infinity
#[inline]
pub fn is_finite_signal(signal: &[Sample]) -> bool {
    signal.iter().all(|s| s.is_finite())
}
