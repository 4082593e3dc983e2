//! shepard-core: Shared types, traits, and utilities for the Shepard filter
//!
//! This crate provides the foundational types used by the DSP crate:
//! sample type, error type, parameter descriptors and configuration.

mod config;
mod error;
mod params;
mod sample;

pub use config::*;
pub use error::*;
pub use params::*;
pub use sample::*;
