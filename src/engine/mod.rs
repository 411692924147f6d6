//! Boundary to the DSP engine that does the actual filtering and compression.
//!
//! An engine is prepared once per fitting through [`EngineInitializer`] and
//! then driven chunk by chunk through an [`EngineProcessor`] bound to the
//! filterbank the fitting selects ([`PreparedEngine`]). [`BypassEngine`] is
//! a pure-Rust stand-in with unity gain for hosts that have no native engine.

pub mod bypass;
pub mod filterbank;
pub mod handle;
pub mod initializer;
pub mod processor;

pub use bypass::BypassEngine;
pub use filterbank::{EngineFilterbank, FirFilterbank, IirFilterbank};
pub use handle::EngineHandle;
pub use initializer::EngineInitializer;
pub use processor::{EngineProcessor, PreparedEngine};

use crate::builder::{AutomaticGainControl, FeedbackManagement, FirParameters, IirParameters};
use crate::error::EngineError;

/// Zeros (and poles) per channel of the IIR filterbank design.
pub const IIR_ZEROS_PER_CHANNEL: usize = 4;

/// Impulse-response delay the IIR filterbank is designed for.
pub const IIR_IMPULSE_DELAY_MS: f64 = 2.5;

/// FIR filterbank window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Hamming,
    Blackman,
}

/// Poles, zeros, gains and delays of a designed IIR filterbank.
///
/// `zeros` and `poles` hold `(re, im)` pairs, `zeros_per_channel` of them per
/// channel. `gains` and `delays` hold one entry per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct IirDesign {
    pub zeros: Vec<f32>,
    pub poles: Vec<f32>,
    pub gains: Vec<f32>,
    pub delays: Vec<usize>,
    pub zeros_per_channel: usize,
}

impl IirDesign {
    /// Expected length of `zeros` and `poles` for a channel count.
    pub const fn root_len(channels: usize, zeros_per_channel: usize) -> usize {
        2 * channels * zeros_per_channel
    }
}

/// Broadband compression applied around the per-channel stage. Only the
/// sample rate and full-scale level come from the fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadbandCompression {
    pub attack: f64,
    pub release: f64,
    pub sample_rate: f64,
    pub full_scale_level: f64,
    pub kneepoint_gain: f64,
    pub kneepoint: f64,
    pub compression_ratio: f64,
    pub limiting_threshold: f64,
}

impl BroadbandCompression {
    pub const fn for_fitting(sample_rate: f64, full_scale_level: f64) -> Self {
        Self {
            attack: 1.0,
            release: 50.0,
            sample_rate,
            full_scale_level,
            kneepoint_gain: 0.0,
            kneepoint: 105.0,
            compression_ratio: 10.0,
            limiting_threshold: 105.0,
        }
    }
}

/// Entry points of a DSP engine instance.
///
/// The `prepare_*` calls happen once, before any chunk is processed, and are
/// the only place an engine may fail. The per-chunk calls mirror the stage
/// traits: real-domain buffers are the caller's chunk, complex-domain buffers
/// hold `2 * channels * chunk_size` interleaved values.
pub trait DspEngine: Send {
    fn prepare_fir(&mut self, parameters: &FirParameters, window: Window)
    -> Result<(), EngineError>;

    fn design_iir(
        &self,
        parameters: &IirParameters,
        zeros_per_channel: usize,
        impulse_delay_ms: f64,
    ) -> Result<IirDesign, EngineError>;

    fn prepare_iir(
        &mut self,
        design: &IirDesign,
        parameters: &IirParameters,
    ) -> Result<(), EngineError>;

    fn prepare_afc(&mut self, parameters: &FeedbackManagement) -> Result<(), EngineError>;

    fn prepare_agc(
        &mut self,
        channels: &AutomaticGainControl,
        broadband: &BroadbandCompression,
    ) -> Result<(), EngineError>;

    fn afc_input(&mut self, signal: &mut [f32], chunk_size: usize);

    fn afc_output(&mut self, signal: &[f32], chunk_size: usize);

    fn agc_input(&mut self, signal: &mut [f32], chunk_size: usize);

    fn agc_channel(&mut self, channels: &mut [f32], chunk_size: usize);

    fn agc_output(&mut self, signal: &mut [f32], chunk_size: usize);

    fn fir_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize);

    fn fir_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize);

    fn iir_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize);

    fn iir_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize);

    /// Releases everything the engine acquired while preparing.
    fn cleanup(&mut self);
}
