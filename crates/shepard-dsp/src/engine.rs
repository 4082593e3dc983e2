//! Shepard filter bank engine
//!
//! Bands are spread evenly in octave (log2) space over a window of
//! `2 * width` octaves starting at `log2(center) - width`. The offset
//! control slides every band up by `frac(offset)` band spacings; when the
//! integer part of the offset changes, the band roles rotate by one so the
//! band leaving the top of the window is the one entering at the bottom.
//!
//! Gain of each band follows a triangular window around the center,
//! shaped by the rolloff exponent:
//!
//! ```text
//! dist = 1 - |log2(center) - f_log2| / width
//! gain = 0 outside [log2(20 Hz), log2(nyquist)) or when dist <= 0
//!      = 1 when dist >= 1
//!      = dist^rolloff otherwise
//! ```
//!
//! Rotation is index arithmetic: logical band `b` lives in physical slot
//! `(b + rotation) % num_bands`.

use parking_lot::Mutex;
use shepard_core::{
    AtomicParam, FREQ_MIN, Sample, ShepardConfig, ShepardError, ShepardResult, ensure_positive,
    ensure_unit, hz_to_log2, log2_to_hz, nyquist,
};

use crate::BandFilter;
use crate::biquad::BandpassUnit;

/// Where a band at or above Nyquist is parked, relative to the sample rate.
/// Parked bands are silent.
pub const PARKED_BAND_RATIO: f64 = 0.49;

/// Band layout seen from the control side, in logical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandState {
    /// Physical slot holding this band's filter
    pub slot: usize,
    /// Tuned center frequency (Hz)
    pub frequency: f64,
    /// Mixing weight
    pub gain: f64,
}

/// Gain envelope of a band at octave position `f_log2`
#[inline]
pub fn envelope_gain(
    f_log2: f64,
    center_log2: f64,
    width: f64,
    rolloff: f64,
    min_log2: f64,
    max_log2: f64,
) -> f64 {
    if f_log2 < min_log2 || f_log2 >= max_log2 {
        return 0.0;
    }
    let dist = 1.0 - (center_log2 - f_log2).abs() / width;
    if dist <= 0.0 {
        0.0
    } else if dist >= 1.0 {
        1.0
    } else {
        dist.powf(rolloff)
    }
}

/// State shared by `shift` and the render path
#[derive(Debug)]
struct BankState<F> {
    /// Physical band slots
    bands: Vec<F>,
    /// Index-aligned with `bands`
    gains: Vec<f64>,
    rotation: usize,
    last_offset: f64,
    wet_gain: f64,
    dry_gain: f64,
}

impl<F: BandFilter> BankState<F> {
    #[inline(always)]
    fn process(&mut self, input: Sample) -> Sample {
        let mut sum = 0.0;
        for (band, gain) in self.bands.iter_mut().zip(self.gains.iter()) {
            sum += band.process(input) * gain;
        }
        sum / self.bands.len() as f64 * self.wet_gain + input * self.dry_gain
    }
}

/// Layout parameters edited by the control side without locking
#[derive(Debug)]
struct Settings {
    center_frequency: AtomicParam,
    width: AtomicParam,
    q: AtomicParam,
    rolloff: AtomicParam,
}

/// Bank of parallel bandpass filters producing the Shepard glissando.
///
/// All methods take `&self`; the engine can be shared between a control
/// thread and the audio thread behind an `Arc`. `shift` and the process
/// methods are mutually exclusive, parameter setters never block.
#[derive(Debug)]
pub struct ShepardEngine<F = BandpassUnit> {
    state: Mutex<BankState<F>>,
    settings: Settings,
    num_bands: usize,
    sample_rate: f64,
    min_log2: f64,
    max_log2: f64,
}

impl ShepardEngine<BandpassUnit> {
    /// Create an engine of biquad bandpass bands
    pub fn new(
        num_bands: usize,
        q: f64,
        center_frequency: f64,
        width: f64,
        rolloff: f64,
        mix: f64,
        sample_rate: f64,
    ) -> ShepardResult<Self> {
        Self::with_band_filter(num_bands, q, center_frequency, width, rolloff, mix, sample_rate)
    }

    /// Create an engine from a configuration, applying its rolloff mapping
    pub fn from_config(config: &ShepardConfig, sample_rate: f64) -> ShepardResult<Self> {
        config.validate()?;
        Self::new(
            config.num_bands,
            config.q,
            config.center_frequency,
            config.width,
            config.rolloff_exponent()?,
            config.mix,
            sample_rate,
        )
    }
}

impl<F: BandFilter> ShepardEngine<F> {
    /// Create an engine with any band filter implementation
    pub fn with_band_filter(
        num_bands: usize,
        q: f64,
        center_frequency: f64,
        width: f64,
        rolloff: f64,
        mix: f64,
        sample_rate: f64,
    ) -> ShepardResult<Self> {
        if num_bands == 0 {
            return Err(ShepardError::InvalidBandCount(num_bands));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ShepardError::InvalidSampleRate(sample_rate));
        }
        ensure_positive("q", q)?;
        ensure_positive("center_frequency", center_frequency)?;
        ensure_positive("width", width)?;
        validate_rolloff(rolloff)?;
        let (wet_gain, dry_gain) = mix_gains(mix)?;

        let min_log2 = hz_to_log2(FREQ_MIN);
        let max_log2 = hz_to_log2(nyquist(sample_rate));
        let lowest_log2 = hz_to_log2(center_frequency) - width;
        let spacing = 2.0 * width / num_bands as f64;

        let bands = (0..num_bands)
            .map(|b| {
                let f_log2 = b as f64 * spacing + lowest_log2;
                let (f_hz, _) = band_tuning(log2_to_hz(f_log2), sample_rate);
                F::with_params(sample_rate, f_hz, q)
            })
            .collect::<ShepardResult<Vec<F>>>()?;

        let engine = Self {
            state: Mutex::new(BankState {
                bands,
                gains: vec![0.0; num_bands],
                rotation: 0,
                last_offset: 0.0,
                wet_gain,
                dry_gain,
            }),
            settings: Settings {
                center_frequency: AtomicParam::new(center_frequency),
                width: AtomicParam::new(width),
                q: AtomicParam::new(q),
                rolloff: AtomicParam::new(rolloff),
            },
            num_bands,
            sample_rate,
            min_log2,
            max_log2,
        };
        engine.shift(0.0)?;

        log::debug!(
            "ShepardEngine: {} bands over {:.1}-{:.1} Hz, q={}, rolloff={}, sr={}",
            num_bands,
            log2_to_hz(lowest_log2),
            log2_to_hz(lowest_log2 + 2.0 * width),
            q,
            rolloff,
            sample_rate
        );

        Ok(engine)
    }

    // ───────────────────────────── control side ─────────────────────────────

    /// Set wet/dry balance with an equal-power crossfade
    pub fn set_mix(&self, mix: f64) -> ShepardResult<()> {
        let (wet, dry) = mix_gains(mix)?;
        let mut state = self.state.lock();
        state.wet_gain = wet;
        state.dry_gain = dry;
        Ok(())
    }

    /// Takes effect on the next `shift`
    pub fn set_center_frequency(&self, frequency: f64) -> ShepardResult<()> {
        ensure_positive("center_frequency", frequency)?;
        self.settings.center_frequency.set(frequency);
        Ok(())
    }

    /// Takes effect on the next `shift`
    pub fn set_width(&self, width: f64) -> ShepardResult<()> {
        ensure_positive("width", width)?;
        self.settings.width.set(width);
        Ok(())
    }

    /// Takes effect on the next `shift`
    pub fn set_q(&self, q: f64) -> ShepardResult<()> {
        ensure_positive("q", q)?;
        self.settings.q.set(q);
        Ok(())
    }

    /// Set the gain-curve exponent; takes effect on the next `shift`
    pub fn set_rolloff(&self, rolloff: f64) -> ShepardResult<()> {
        validate_rolloff(rolloff)?;
        self.settings.rolloff.set(rolloff);
        Ok(())
    }

    /// Move the band window to `offset`.
    ///
    /// The fractional part positions the bands, a change in the integer part
    /// rotates the band roles by a single step whatever the size of the jump.
    /// Every band is retuned, which clears its history.
    pub fn shift(&self, offset: f64) -> ShepardResult<()> {
        if !offset.is_finite() {
            return Err(ShepardError::invalid("offset", offset));
        }

        let q = self.settings.q.get();
        let width = self.settings.width.get();
        let rolloff = self.settings.rolloff.get();
        let center_log2 = hz_to_log2(self.settings.center_frequency.get());
        let lowest_log2 = center_log2 - width;

        let n = self.num_bands;
        let spacing = 2.0 * width / n as f64;
        let curr_int = offset.floor();
        let frac = offset - curr_int;

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let prev_int = state.last_offset.floor();
        if curr_int > prev_int {
            // last band to the front
            state.rotation = (state.rotation + n - 1) % n;
            log::trace!("ShepardEngine: rotate up, rotation={}", state.rotation);
        } else if curr_int < prev_int {
            // first band to the back
            state.rotation = (state.rotation + 1) % n;
            log::trace!("ShepardEngine: rotate down, rotation={}", state.rotation);
        }

        for b in 0..n {
            let slot = (b + state.rotation) % n;
            let f_log2 = (b as f64 + frac) * spacing + lowest_log2;
            let (f_hz, parked) = band_tuning(log2_to_hz(f_log2), self.sample_rate);
            state.bands[slot].configure(f_hz, q)?;
            state.gains[slot] = if parked {
                0.0
            } else {
                envelope_gain(
                    f_log2,
                    center_log2,
                    width,
                    rolloff,
                    self.min_log2,
                    self.max_log2,
                )
            };
        }

        state.last_offset = offset;
        Ok(())
    }

    // ───────────────────────────── render side ─────────────────────────────

    /// Run one sample through every band and mix with the dry input
    #[inline]
    pub fn process_parallel(&self, input: Sample) -> Sample {
        self.state.lock().process(input)
    }

    /// Replace every sample of `buffer` with the engine output, holding the
    /// bank lock once for the whole block
    pub fn process_block(&self, buffer: &mut [Sample]) {
        let mut state = self.state.lock();
        for sample in buffer.iter_mut() {
            *sample = state.process(*sample);
        }
    }

    /// Clear the history of every band
    pub fn reset(&self) {
        let mut state = self.state.lock();
        for band in state.bands.iter_mut() {
            band.reset();
        }
    }

    // ───────────────────────────── inspection ─────────────────────────────

    /// Current band layout in logical order
    pub fn bands(&self) -> Vec<BandState> {
        let state = self.state.lock();
        (0..self.num_bands)
            .map(|b| {
                let slot = (b + state.rotation) % self.num_bands;
                BandState {
                    slot,
                    frequency: state.bands[slot].frequency(),
                    gain: state.gains[slot],
                }
            })
            .collect()
    }

    #[inline]
    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn rotation(&self) -> usize {
        self.state.lock().rotation
    }

    pub fn last_offset(&self) -> f64 {
        self.state.lock().last_offset
    }

    pub fn wet_gain(&self) -> f64 {
        self.state.lock().wet_gain
    }

    pub fn dry_gain(&self) -> f64 {
        self.state.lock().dry_gain
    }

    pub fn center_frequency(&self) -> f64 {
        self.settings.center_frequency.get()
    }

    pub fn width(&self) -> f64 {
        self.settings.width.get()
    }

    pub fn q(&self) -> f64 {
        self.settings.q.get()
    }

    pub fn rolloff(&self) -> f64 {
        self.settings.rolloff.get()
    }

    /// Octave position of the bottom of the band window
    pub fn lowest_frequency_log2(&self) -> f64 {
        hz_to_log2(self.center_frequency()) - self.width()
    }
}

/// Equal-power wet/dry gains for a mix in [0, 1]
fn mix_gains(mix: f64) -> ShepardResult<(f64, f64)> {
    let mix = ensure_unit("mix", mix)?;
    Ok((mix.sqrt(), (1.0 - mix).sqrt()))
}

fn validate_rolloff(rolloff: f64) -> ShepardResult<f64> {
    if rolloff.is_finite() && rolloff >= 0.0 {
        Ok(rolloff)
    } else {
        Err(ShepardError::invalid("rolloff", rolloff))
    }
}

/// Frequency to tune a band to, and whether it had to be parked.
/// Bands below Nyquist keep their exact frequency.
#[inline]
fn band_tuning(hz: f64, sample_rate: f64) -> (f64, bool) {
    if hz >= nyquist(sample_rate) {
        (sample_rate * PARKED_BAND_RATIO, true)
    } else {
        (hz.max(f64::MIN_POSITIVE), false)
    }
}
