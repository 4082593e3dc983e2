//! Per-buffer host adapter
//!
//! The control side writes parameters through a [`ShepardControl`] handle;
//! writes only land in atomics and raise a dirty flag. The audio side calls
//! [`MonoProcessor::process_block`] once per buffer, which applies all
//! pending writes in a single `shift` before rendering the samples, so the
//! O(bands) retune runs at most once per buffer however many writes arrived.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shepard_core::{
    AtomicParam, ParamId, RolloffMapping, Sample, ShepardConfig, ShepardError, ShepardResult,
    ensure_positive, ensure_unit,
};

use crate::engine::ShepardEngine;
use crate::{MonoProcessor, Processor};

/// Pending parameter values shared between control and audio threads
#[derive(Debug)]
struct ControlState {
    offset: AtomicParam,
    mix: AtomicParam,
    q: AtomicParam,
    /// User-facing value, mapped on apply
    rolloff: AtomicParam,
    center_frequency: AtomicParam,
    width: AtomicParam,
    rolloff_mapping: RolloffMapping,
    dirty: AtomicBool,
}

impl ControlState {
    fn param(&self, id: ParamId) -> &AtomicParam {
        match id {
            ParamId::Offset => &self.offset,
            ParamId::Mix => &self.mix,
            ParamId::Q => &self.q,
            ParamId::Rolloff => &self.rolloff,
            ParamId::CenterFrequency => &self.center_frequency,
            ParamId::Width => &self.width,
        }
    }
}

/// Cloneable, thread-safe handle for changing filter parameters
#[derive(Debug, Clone)]
pub struct ShepardControl {
    state: Arc<ControlState>,
}

impl ShepardControl {
    /// Validate and store a parameter; it is applied before the next buffer
    pub fn set(&self, id: ParamId, value: f64) -> ShepardResult<()> {
        self.validate(id, value).inspect_err(|e| {
            log::warn!("ShepardControl: rejected {}: {}", id.name(), e);
        })?;
        self.state.param(id).set(value);
        self.state.dirty.store(true, Ordering::Release);
        Ok(())
    }

    /// Set a parameter from a host value in [0, 1]
    pub fn set_normalized(&self, id: ParamId, normalized: f64) -> ShepardResult<()> {
        if !normalized.is_finite() {
            return Err(ShepardError::invalid(id.name(), normalized));
        }
        self.set(id, id.range().denormalize(normalized))
    }

    /// Last stored value of a parameter
    pub fn get(&self, id: ParamId) -> f64 {
        self.state.param(id).get()
    }

    pub fn set_offset(&self, offset: f64) -> ShepardResult<()> {
        self.set(ParamId::Offset, offset)
    }

    pub fn set_mix(&self, mix: f64) -> ShepardResult<()> {
        self.set(ParamId::Mix, mix)
    }

    pub fn set_q(&self, q: f64) -> ShepardResult<()> {
        self.set(ParamId::Q, q)
    }

    pub fn set_rolloff(&self, rolloff: f64) -> ShepardResult<()> {
        self.set(ParamId::Rolloff, rolloff)
    }

    pub fn set_center_frequency(&self, frequency: f64) -> ShepardResult<()> {
        self.set(ParamId::CenterFrequency, frequency)
    }

    pub fn set_width(&self, width: f64) -> ShepardResult<()> {
        self.set(ParamId::Width, width)
    }

    /// True while writes are waiting for the next buffer
    pub fn is_dirty(&self) -> bool {
        self.state.dirty.load(Ordering::Acquire)
    }

    pub fn rolloff_mapping(&self) -> RolloffMapping {
        self.state.rolloff_mapping
    }

    fn validate(&self, id: ParamId, value: f64) -> ShepardResult<()> {
        match id {
            ParamId::Offset => {
                if !value.is_finite() {
                    return Err(ShepardError::invalid("offset", value));
                }
            }
            ParamId::Mix => {
                ensure_unit("mix", value)?;
            }
            ParamId::Rolloff => {
                self.state.rolloff_mapping.exponent(value)?;
            }
            ParamId::Q | ParamId::CenterFrequency | ParamId::Width => {
                ensure_positive(id.name(), value)?;
            }
        }
        Ok(())
    }
}

/// Shepard filter as a mono processor with coalesced parameter updates
#[derive(Debug)]
pub struct ShepardFilter {
    engine: Arc<ShepardEngine>,
    control: ShepardControl,
}

impl ShepardFilter {
    pub fn new(config: &ShepardConfig, sample_rate: f64) -> ShepardResult<Self> {
        let engine = ShepardEngine::from_config(config, sample_rate)?;
        let state = ControlState {
            offset: AtomicParam::new(0.0),
            mix: AtomicParam::new(config.mix),
            q: AtomicParam::new(config.q),
            rolloff: AtomicParam::new(config.rolloff),
            center_frequency: AtomicParam::new(config.center_frequency),
            width: AtomicParam::new(config.width),
            rolloff_mapping: config.rolloff_mapping,
            dirty: AtomicBool::new(true),
        };

        Ok(Self {
            engine: Arc::new(engine),
            control: ShepardControl {
                state: Arc::new(state),
            },
        })
    }

    /// Handle for the control thread
    pub fn control(&self) -> ShepardControl {
        self.control.clone()
    }

    pub fn engine(&self) -> &Arc<ShepardEngine> {
        &self.engine
    }

    /// Push pending parameter writes into the engine.
    /// Returns `true` if anything was applied.
    pub fn apply_pending(&self) -> ShepardResult<bool> {
        let state = &self.control.state;
        if !state.dirty.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }

        self.engine.set_q(state.q.get())?;
        self.engine
            .set_rolloff(state.rolloff_mapping.exponent(state.rolloff.get())?)?;
        self.engine.set_center_frequency(state.center_frequency.get())?;
        self.engine.set_width(state.width.get())?;
        self.engine.set_mix(state.mix.get())?;
        self.engine.shift(state.offset.get())?;
        Ok(true)
    }
}

impl Processor for ShepardFilter {
    fn reset(&mut self) {
        self.engine.reset();
    }
}

impl MonoProcessor for ShepardFilter {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        self.engine.process_parallel(input)
    }

    fn process_block(&mut self, buffer: &mut [Sample]) {
        if let Err(e) = self.apply_pending() {
            log::warn!("ShepardFilter: parameter update failed: {}", e);
        }
        self.engine.process_block(buffer);
    }
}
