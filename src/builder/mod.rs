//! Turns the flat tuning parameters of a fitting into the per-stage blocks an
//! engine is prepared from.
//!
//! The channel count is never configured directly: it is always one more than
//! the number of cross frequencies.

pub mod capture;

pub use capture::StageConfiguration;

use log::debug;
use serde::Serialize;

use crate::error::{ConfigError, EngineError};

/// Most channels an engine can be prepared with.
pub const MAX_CHANNELS: usize = 32;

/// Filterbank design used for analysis and synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Fir,
    Iir,
}

impl FilterType {
    /// Parses a host selector. Anything but `"FIR"` selects the IIR design.
    pub fn from_name(name: &str) -> Self {
        if name == Self::Fir.name() {
            Self::Fir
        } else {
            Self::Iir
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Fir => "FIR",
            Self::Iir => "IIR",
        }
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether acoustic feedback management is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    On,
    Off,
}

impl Feedback {
    /// Parses a host selector. Anything but `"yes"` turns feedback management off.
    pub fn from_name(name: &str) -> Self {
        if name == Self::On.name() {
            Self::On
        } else {
            Self::Off
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::On => "yes",
            Self::Off => "no",
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirParameters {
    pub cross_frequencies: Vec<f64>,
    pub sample_rate: f64,
    pub channels: usize,
    pub window_size: usize,
    pub chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IirParameters {
    pub cross_frequencies: Vec<f64>,
    pub sample_rate: f64,
    pub channels: usize,
    pub chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackManagement {
    pub gain: f64,
    pub filter_estimation_forgetting_factor: f64,
    pub filter_estimation_power_threshold: f64,
    pub filter_estimation_step_size: f64,
    pub adaptive_filter_length: usize,
    pub signal_whitening_filter_length: usize,
    pub persistent_feedback_filter_length: usize,
    /// Output-to-input hardware delay in samples.
    pub hardware_latency: usize,
    pub save_quality_metric: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticGainControl {
    pub cross_frequencies: Vec<f64>,
    pub compression_ratios: Vec<f64>,
    /// Compression-start kneepoints in dB SPL.
    pub kneepoints: Vec<f64>,
    /// Gains at the kneepoints in dB.
    pub kneepoint_gains: Vec<f64>,
    /// Broadband output limiting thresholds in dB SPL.
    pub broadband_output_limiting_thresholds: Vec<f64>,
    /// Attack time in milliseconds.
    pub attack: f64,
    /// Release time in milliseconds.
    pub release: f64,
    pub sample_rate: f64,
    /// Level in dB SPL of a full-scale sample.
    pub full_scale_level: f64,
    pub channels: usize,
}

/// Receives the assembled blocks. Implemented by engine bindings.
pub trait Initializer {
    fn initialize_fir_filter(&mut self, parameters: &FirParameters) -> Result<(), EngineError>;

    fn initialize_iir_filter(&mut self, parameters: &IirParameters) -> Result<(), EngineError>;

    fn initialize_feedback_management(
        &mut self,
        parameters: &FeedbackManagement,
    ) -> Result<(), EngineError>;

    fn initialize_automatic_gain_control(
        &mut self,
        parameters: &AutomaticGainControl,
    ) -> Result<(), EngineError>;
}

/// Everything a fitting specifies, in the units the stages expect.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub cross_frequencies: Vec<f64>,
    pub compression_ratios: Vec<f64>,
    pub kneepoints: Vec<f64>,
    pub kneepoint_gains: Vec<f64>,
    pub broadband_output_limiting_thresholds: Vec<f64>,
    pub filter_type: FilterType,
    pub feedback: Feedback,
    pub attack: f64,
    pub release: f64,
    pub sample_rate: f64,
    pub full_scale_level: f64,
    pub feedback_gain: f64,
    pub filter_estimation_forgetting_factor: f64,
    pub filter_estimation_power_threshold: f64,
    pub filter_estimation_step_size: f64,
    pub adaptive_feedback_filter_length: usize,
    pub signal_whitening_filter_length: usize,
    pub persistent_feedback_filter_length: usize,
    pub hardware_latency: usize,
    pub save_quality_metric: bool,
    pub window_size: usize,
    pub chunk_size: usize,
}

impl Parameters {
    pub fn channels(&self) -> usize {
        self.cross_frequencies.len() + 1
    }

    /// Checks everything the stages rely on before any of them is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::EmptyChunk);
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.filter_type == FilterType::Fir && self.window_size == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        self.validate_cross_frequencies()?;

        let channels = self.channels();
        if channels > MAX_CHANNELS {
            return Err(ConfigError::TooManyChannels {
                channels,
                max: MAX_CHANNELS,
            });
        }

        let per_channel = [
            ("compression ratios", &self.compression_ratios),
            ("kneepoints", &self.kneepoints),
            ("kneepoint gains", &self.kneepoint_gains),
            (
                "broadband output limiting thresholds",
                &self.broadband_output_limiting_thresholds,
            ),
        ];
        for (field, values) in per_channel {
            if values.len() != channels {
                return Err(ConfigError::ChannelCountMismatch {
                    field,
                    expected: channels,
                    actual: values.len(),
                });
            }
        }

        Ok(())
    }

    // Band edges must be usable frequencies in strictly increasing order.
    fn validate_cross_frequencies(&self) -> Result<(), ConfigError> {
        let mut previous = 0.0;
        for (index, &value) in self.cross_frequencies.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidCrossFrequency { index, value });
            }
            if index > 0 && value <= previous {
                return Err(ConfigError::UnorderedCrossFrequencies { index, value });
            }
            previous = value;
        }
        Ok(())
    }
}

/// Drives an [`Initializer`] through one filterbank, feedback management and
/// automatic gain control.
pub struct HearingAidBuilder<'a, I: ?Sized> {
    initializer: &'a mut I,
}

impl<'a, I: Initializer + ?Sized> HearingAidBuilder<'a, I> {
    pub fn new(initializer: &'a mut I) -> Self {
        Self { initializer }
    }

    /// Validates `parameters`, then initializes exactly one filterbank,
    /// feedback management and automatic gain control, in that order. The
    /// first failure aborts the build.
    pub fn build(&mut self, parameters: &Parameters) -> Result<(), ConfigError> {
        parameters.validate()?;

        self.prepare_filter(parameters)?;
        self.prepare_feedback_management(parameters)?;
        self.prepare_automatic_gain_control(parameters)?;

        Ok(())
    }

    fn prepare_filter(&mut self, p: &Parameters) -> Result<(), ConfigError> {
        debug!(
            "Preparing {} filterbank with {} channels",
            p.filter_type,
            p.channels()
        );

        match p.filter_type {
            FilterType::Fir => self.initializer.initialize_fir_filter(&FirParameters {
                cross_frequencies: p.cross_frequencies.clone(),
                sample_rate: p.sample_rate,
                channels: p.channels(),
                window_size: p.window_size,
                chunk_size: p.chunk_size,
            })?,
            FilterType::Iir => self.initializer.initialize_iir_filter(&IirParameters {
                cross_frequencies: p.cross_frequencies.clone(),
                sample_rate: p.sample_rate,
                channels: p.channels(),
                chunk_size: p.chunk_size,
            })?,
        }

        Ok(())
    }

    fn prepare_feedback_management(&mut self, p: &Parameters) -> Result<(), ConfigError> {
        let (gain, adaptive_filter_length) = match p.feedback {
            Feedback::On => (p.feedback_gain, p.adaptive_feedback_filter_length),
            Feedback::Off => (0.0, 0),
        };
        debug!("Preparing feedback management ({})", p.feedback);

        self.initializer
            .initialize_feedback_management(&FeedbackManagement {
                gain,
                filter_estimation_forgetting_factor: p.filter_estimation_forgetting_factor,
                filter_estimation_power_threshold: p.filter_estimation_power_threshold,
                filter_estimation_step_size: p.filter_estimation_step_size,
                adaptive_filter_length,
                signal_whitening_filter_length: p.signal_whitening_filter_length,
                persistent_feedback_filter_length: p.persistent_feedback_filter_length,
                hardware_latency: p.hardware_latency,
                save_quality_metric: p.save_quality_metric,
            })?;

        Ok(())
    }

    fn prepare_automatic_gain_control(&mut self, p: &Parameters) -> Result<(), ConfigError> {
        debug!("Preparing automatic gain control");

        self.initializer
            .initialize_automatic_gain_control(&AutomaticGainControl {
                cross_frequencies: p.cross_frequencies.clone(),
                compression_ratios: p.compression_ratios.clone(),
                kneepoints: p.kneepoints.clone(),
                kneepoint_gains: p.kneepoint_gains.clone(),
                broadband_output_limiting_thresholds: p
                    .broadband_output_limiting_thresholds
                    .clone(),
                attack: p.attack,
                release: p.release,
                sample_rate: p.sample_rate,
                full_scale_level: p.full_scale_level,
                channels: p.channels(),
            })?;

        Ok(())
    }
}
