//! Parameter types for the Shepard filter

use portable_atomic::{AtomicF64, Ordering};
use serde::{Deserialize, Serialize};

/// Control parameters exposed to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    /// Window position; one full cycle per unit
    Offset,
    /// Wet/dry balance (0 = dry, 1 = wet)
    Mix,
    /// Bandwidth of every band
    Q,
    /// Gain curve shape near the window edges
    Rolloff,
    /// Center of the band window (Hz)
    CenterFrequency,
    /// Half-width of the band window (octaves)
    Width,
}

impl ParamId {
    pub fn name(&self) -> &'static str {
        match self {
            ParamId::Offset => "offset",
            ParamId::Mix => "mix",
            ParamId::Q => "q",
            ParamId::Rolloff => "rolloff",
            ParamId::CenterFrequency => "center_frequency",
            ParamId::Width => "width",
        }
    }

    /// Host-facing range of the parameter
    pub fn range(&self) -> ParamRange {
        match self {
            ParamId::Offset => ParamRange::linear(0.0, 1.0, 0.0),
            ParamId::Mix => ParamRange::linear(0.0, 1.0, 0.9),
            ParamId::Q => ParamRange::logarithmic(0.5, 100.0, 16.0),
            ParamId::Rolloff => ParamRange::linear(0.0, 0.99, 0.5),
            ParamId::CenterFrequency => ParamRange::logarithmic(20.0, 20000.0, 500.0),
            ParamId::Width => ParamRange::linear(0.1, 8.0, 4.3),
        }
    }
}

/// Atomic parameter for lock-free access
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicF64,
}

impl AtomicParam {
    pub fn new(value: f64) -> Self {
        Self {
            value: AtomicF64::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.value.store(value, Ordering::Relaxed);
    }
}

impl Default for AtomicParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Parameter range specification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub skew: ParamSkew,
}

impl ParamRange {
    pub fn linear(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
            skew: ParamSkew::Linear,
        }
    }

    pub fn logarithmic(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
            skew: ParamSkew::Logarithmic,
        }
    }

    /// Denormalize a 0-1 value to actual value
    pub fn denormalize(&self, normalized: f64) -> f64 {
        let normalized = normalized.clamp(0.0, 1.0);
        match self.skew {
            ParamSkew::Linear => self.min + normalized * (self.max - self.min),
            ParamSkew::Logarithmic => {
                let log_min = self.min.ln();
                let log_max = self.max.ln();
                (log_min + normalized * (log_max - log_min)).exp()
            }
        }
    }
}

/// Parameter skew type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamSkew {
    Linear,
    Logarithmic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_param() {
        let p = AtomicParam::new(0.9);
        assert_eq!(p.get(), 0.9);
        p.set(-3.25);
        assert_eq!(p.get(), -3.25);
        assert_eq!(AtomicParam::default().get(), 0.0);
    }

    #[test]
    fn test_linear_range() {
        let range = ParamRange::linear(0.0, 1.0, 0.9);
        assert_eq!(range.denormalize(0.25), 0.25);
        assert_eq!(range.denormalize(0.75), 0.75);
        // Out-of-range inputs are clamped
        assert_eq!(range.denormalize(2.0), 1.0);
        assert_eq!(range.denormalize(-1.0), 0.0);
    }

    #[test]
    fn test_logarithmic_range() {
        let range = ParamId::CenterFrequency.range();
        assert!((range.denormalize(0.0) - 20.0).abs() < 1e-9);
        assert!((range.denormalize(1.0) - 20000.0).abs() < 1e-6);
        // Geometric midpoint
        assert!((range.denormalize(0.5) - (20.0_f64 * 20000.0).sqrt()).abs() < 1e-6);
        assert!((range.denormalize(0.466) - 500.0).abs() < 1.0);
    }

    #[test]
    fn test_defaults_inside_ranges() {
        for id in [
            ParamId::Offset,
            ParamId::Mix,
            ParamId::Q,
            ParamId::Rolloff,
            ParamId::CenterFrequency,
            ParamId::Width,
        ] {
            let range = id.range();
            assert!(
                range.default >= range.min && range.default <= range.max,
                "{} default outside range",
                id.name()
            );
        }
    }
}
