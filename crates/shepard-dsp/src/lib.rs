//! shepard-dsp: Shepard-tone filter bank
//!
//! A bank of parallel bandpass filters whose center frequencies are spread
//! over a logarithmic window and rotated as an offset control advances,
//! producing an endlessly rising (or falling) glissando from any input.
//!
//! ## Modules
//! - `biquad` - Constant skirt gain biquad bandpass band
//! - `engine` - Band layout, gain envelope, rotation and wet/dry mixing
//! - `filter` - Per-buffer host adapter with coalesced parameter updates

pub mod biquad;
pub mod engine;
pub mod filter;

pub use biquad::{BandpassUnit, BiquadCoeffs};
pub use engine::{BandState, ShepardEngine};
pub use filter::{ShepardControl, ShepardFilter};

use shepard_core::{Sample, ShepardResult};

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// A single tunable band of the filter bank.
///
/// New band shapes are added as further implementations and chosen through
/// the engine's type parameter.
pub trait BandFilter: Send + Sized {
    /// Build a band already tuned to `frequency` / `q`
    fn with_params(sample_rate: f64, frequency: f64, q: f64) -> ShepardResult<Self>;

    /// Retune the band
    fn configure(&mut self, frequency: f64, q: f64) -> ShepardResult<()>;

    /// Filter one sample
    fn process(&mut self, input: Sample) -> Sample;

    /// Clear the filter history
    fn reset(&mut self);

    fn frequency(&self) -> f64;

    fn q(&self) -> f64;
}
