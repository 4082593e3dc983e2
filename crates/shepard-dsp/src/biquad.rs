//! Biquad bandpass filter in Direct Form I
//!
//! Each band of the Shepard bank is one of these. The coefficient set is
//! the constant skirt gain bandpass (peak gain = Q) and the output is
//! clamped to [-1, 1] every sample so an unstable corner of the parameter
//! space (very high Q close to Nyquist) cannot run away.

use shepard_core::{Sample, ShepardError, ShepardResult, ensure_positive, nyquist};
use std::f64::consts::PI;

use crate::BandFilter;

/// Biquad coefficients, normalized by a0
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Calculate bandpass filter coefficients (constant skirt gain, peak gain = Q)
    pub fn bandpass_skirt(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = sin_omega / 2.0;
        let b1 = 0.0;
        let b2 = -sin_omega / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Single bandpass band with its own two-sample input/output history
#[derive(Debug, Clone)]
pub struct BandpassUnit {
    coeffs: BiquadCoeffs,
    frequency: f64,
    q: f64,
    sample_rate: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BandpassUnit {
    pub fn new(sample_rate: f64, frequency: f64, q: f64) -> ShepardResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ShepardError::InvalidSampleRate(sample_rate));
        }
        let mut unit = Self {
            coeffs: BiquadCoeffs::default(),
            frequency,
            q,
            sample_rate,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        };
        unit.configure(frequency, q)?;
        Ok(unit)
    }

    #[inline]
    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    fn validate(&self, frequency: f64, q: f64) -> ShepardResult<()> {
        let nyquist = nyquist(self.sample_rate);
        if !(frequency.is_finite() && frequency > 0.0 && frequency < nyquist) {
            return Err(ShepardError::FrequencyOutOfRange { frequency, nyquist });
        }
        ensure_positive("q", q)?;
        Ok(())
    }
}

impl BandFilter for BandpassUnit {
    fn with_params(sample_rate: f64, frequency: f64, q: f64) -> ShepardResult<Self> {
        Self::new(sample_rate, frequency, q)
    }

    /// Retuning always starts from silence: history is cleared.
    fn configure(&mut self, frequency: f64, q: f64) -> ShepardResult<()> {
        self.validate(frequency, q)?;
        self.frequency = frequency;
        self.q = q;
        self.coeffs = BiquadCoeffs::bandpass_skirt(frequency, q, self.sample_rate);
        self.reset();
        Ok(())
    }

    #[inline(always)]
    fn process(&mut self, input: Sample) -> Sample {
        let c = &self.coeffs;
        let output = (c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2)
            .clamp(-1.0, 1.0);

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    #[inline]
    fn frequency(&self) -> f64 {
        self.frequency
    }

    #[inline]
    fn q(&self) -> f64 {
        self.q
    }
}
