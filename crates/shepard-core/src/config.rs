//! Filter bank configuration

use serde::{Deserialize, Serialize};

use crate::error::{ShepardError, ShepardResult, ensure_positive, ensure_unit};

/// How the user-facing rolloff value becomes the gain-curve exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RolloffMapping {
    /// Value is used as the exponent unchanged
    #[default]
    Exponent,
    /// Exponent is `-log2(1 - r)` for r in [0, 1)
    NegLog2,
}

impl RolloffMapping {
    /// Map a user rolloff value to the gain-curve exponent
    pub fn exponent(self, rolloff: f64) -> ShepardResult<f64> {
        match self {
            RolloffMapping::Exponent => {
                if rolloff.is_finite() && rolloff >= 0.0 {
                    Ok(rolloff)
                } else {
                    Err(ShepardError::invalid("rolloff", rolloff))
                }
            }
            RolloffMapping::NegLog2 => {
                if (0.0..1.0).contains(&rolloff) {
                    // -log2(1 - 0) is -0.0
                    Ok((-(1.0 - rolloff).log2()).max(0.0))
                } else {
                    Err(ShepardError::invalid("rolloff", rolloff))
                }
            }
        }
    }
}

/// Construction-time settings of a Shepard filter bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShepardConfig {
    /// Number of bandpass bands
    pub num_bands: usize,
    /// Q applied to every band
    pub q: f64,
    /// Center of the band window (Hz)
    pub center_frequency: f64,
    /// Half-width of the band window (octaves)
    pub width: f64,
    /// User-facing rolloff, see [`RolloffMapping`]
    pub rolloff: f64,
    pub rolloff_mapping: RolloffMapping,
    /// Wet/dry balance (0 = dry, 1 = wet)
    pub mix: f64,
}

impl Default for ShepardConfig {
    fn default() -> Self {
        Self {
            num_bands: 17,
            q: 16.0,
            center_frequency: 500.0,
            width: 4.3,
            rolloff: 0.5,
            rolloff_mapping: RolloffMapping::Exponent,
            mix: 0.9,
        }
    }
}

impl ShepardConfig {
    /// Check every field, reporting the first offending one
    pub fn validate(&self) -> ShepardResult<()> {
        if self.num_bands == 0 {
            return Err(ShepardError::InvalidBandCount(self.num_bands));
        }
        ensure_positive("q", self.q)?;
        ensure_positive("center_frequency", self.center_frequency)?;
        ensure_positive("width", self.width)?;
        ensure_unit("mix", self.mix)?;
        self.rolloff_exponent()?;
        Ok(())
    }

    /// Gain-curve exponent after applying the rolloff mapping
    pub fn rolloff_exponent(&self) -> ShepardResult<f64> {
        self.rolloff_mapping.exponent(self.rolloff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ShepardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_bands, 17);
        assert_eq!(config.rolloff_exponent(), Ok(0.5));
    }

    #[test]
    fn test_validate_rejects() {
        let bad = [
            ShepardConfig { num_bands: 0, ..Default::default() },
            ShepardConfig { q: 0.0, ..Default::default() },
            ShepardConfig { width: -1.0, ..Default::default() },
            ShepardConfig { center_frequency: 0.0, ..Default::default() },
            ShepardConfig { mix: 1.5, ..Default::default() },
            ShepardConfig { rolloff: -0.1, ..Default::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} accepted");
        }
    }

    #[test]
    fn test_neg_log2_mapping() {
        let m = RolloffMapping::NegLog2;
        assert_eq!(m.exponent(0.0), Ok(0.0));
        assert!((m.exponent(0.5).unwrap() - 1.0).abs() < 1e-12);
        assert!((m.exponent(0.75).unwrap() - 2.0).abs() < 1e-12);
        assert!(m.exponent(1.0).is_err());
        assert!(m.exponent(-0.5).is_err());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: ShepardConfig =
            serde_json::from_str(r#"{"num_bands": 9, "rolloff_mapping": "NegLog2"}"#).unwrap();
        assert_eq!(config.num_bands, 9);
        assert_eq!(config.rolloff_mapping, RolloffMapping::NegLog2);
        assert_eq!(config.q, 16.0);

        let json = serde_json::to_string(&ShepardConfig::default()).unwrap();
        let back: ShepardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ShepardConfig::default());
    }
}
