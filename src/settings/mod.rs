use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

use crate::builder::{Feedback, FilterType, Parameters};

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => flag,
        Flag::Int(value) => value != 0,
    })
}

/// JACK port wiring for the live host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioSettings {
    pub input_port: String,
    pub output_left_port: String,
    pub output_right_port: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            input_port: "system:capture_1".to_string(),
            output_left_port: "system:playback_1".to_string(),
            output_right_port: "system:playback_2".to_string(),
        }
    }
}

impl std::fmt::Display for AudioSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Input Port: {}", self.input_port)?;
        writeln!(f, "Output Left Port: {}", self.output_left_port)?;
        writeln!(f, "Output Right Port: {}", self.output_right_port)?;
        Ok(())
    }
}

/// The flat fitting record a host hands over at setup.
///
/// Keys are camelCase; the short names used by hearing-aid fitting tools
/// (`cross_freq`, `cr`, `tk`, ...) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HearingAidSettings {
    #[serde(alias = "cross_freq")]
    pub cross_frequencies: Vec<f64>,
    #[serde(alias = "cr")]
    pub compression_ratios: Vec<f64>,
    #[serde(rename = "kneepoints_dBSpl", alias = "tk")]
    pub kneepoints_db_spl: Vec<f64>,
    #[serde(rename = "kneepointGains_dB", alias = "tkgain")]
    pub kneepoint_gains_db: Vec<f64>,
    #[serde(rename = "broadbandOutputLimitingThresholds_dBSpl", alias = "bolt")]
    pub broadband_output_limiting_thresholds_db_spl: Vec<f64>,
    #[serde(rename = "attack_ms", alias = "attack")]
    pub attack_ms: f64,
    #[serde(rename = "release_ms", alias = "release")]
    pub release_ms: f64,
    #[serde(rename = "max_dB_Spl", alias = "maxdB")]
    pub max_db_spl: f64,
    pub sample_rate: f64,
    pub chunk_size: usize,
    #[serde(alias = "nw")]
    pub window_size: usize,
    /// `"FIR"` or `"IIR"`.
    #[serde(alias = "filter_type")]
    pub filter_type: String,
    /// `"yes"` or `"no"`.
    #[serde(alias = "feedback_management")]
    pub feedback_management: String,
    #[serde(alias = "fbg")]
    pub feedback_gain: f64,
    #[serde(alias = "afl")]
    pub adaptive_feedback_filter_length: usize,
    #[serde(alias = "mu")]
    pub filter_estimation_step_size: f64,
    #[serde(alias = "rho")]
    pub filter_estimation_forgetting_factor: f64,
    #[serde(alias = "eps")]
    pub filter_estimation_power_threshold: f64,
    #[serde(alias = "wfl")]
    pub signal_whitening_filter_length: usize,
    #[serde(alias = "pfl")]
    pub persistent_feedback_filter_length: usize,
    #[serde(alias = "hdel")]
    pub hardware_latency: usize,
    /// Fitting tools write this as `0`/`1`, both forms are accepted.
    #[serde(alias = "sqm", deserialize_with = "deserialize_flag")]
    pub save_quality_metric: bool,
}

impl Default for HearingAidSettings {
    // An eight-channel mild-to-moderate fitting.
    fn default() -> Self {
        Self {
            cross_frequencies: vec![
                317.1666, 502.9734, 797.6319, 1264.9, 2005.9, 3181.1, 5044.7,
            ],
            compression_ratios: vec![0.7, 0.9, 1.0, 1.1, 1.2, 1.4, 1.6, 1.7],
            kneepoints_db_spl: vec![32.2, 26.5, 26.7, 26.7, 29.8, 33.6, 34.3, 32.7],
            kneepoint_gains_db: vec![
                -13.5942, -16.5909, -3.7978, 6.6176, 11.3050, 23.7183, 35.8586, 37.3885,
            ],
            broadband_output_limiting_thresholds_db_spl: vec![
                78.7667, 88.2, 90.7, 92.8333, 98.2, 103.3, 101.9, 99.8,
            ],
            attack_ms: 1.0,
            release_ms: 50.0,
            max_db_spl: 119.0,
            sample_rate: 24000.0,
            chunk_size: 32,
            window_size: 256,
            filter_type: FilterType::Iir.name().to_string(),
            feedback_management: Feedback::On.name().to_string(),
            feedback_gain: 0.0,
            adaptive_feedback_filter_length: 100,
            filter_estimation_step_size: 1e-3,
            filter_estimation_forgetting_factor: 0.9,
            filter_estimation_power_threshold: 0.008,
            signal_whitening_filter_length: 9,
            persistent_feedback_filter_length: 0,
            hardware_latency: 0,
            save_quality_metric: false,
        }
    }
}

impl std::fmt::Display for HearingAidSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cross Frequencies (Hz): {:?}", self.cross_frequencies)?;
        writeln!(f, "Compression Ratios: {:?}", self.compression_ratios)?;
        writeln!(f, "Kneepoints (dB SPL): {:?}", self.kneepoints_db_spl)?;
        writeln!(f, "Kneepoint Gains (dB): {:?}", self.kneepoint_gains_db)?;
        writeln!(
            f,
            "Broadband Output Limiting Thresholds (dB SPL): {:?}",
            self.broadband_output_limiting_thresholds_db_spl
        )?;
        writeln!(f, "Attack/Release (ms): {}/{}", self.attack_ms, self.release_ms)?;
        writeln!(f, "Full Scale (dB SPL): {}", self.max_db_spl)?;
        writeln!(f, "Sample Rate: {}", self.sample_rate)?;
        writeln!(f, "Chunk Size: {}", self.chunk_size)?;
        writeln!(f, "Filter Type: {}", self.filter_type)?;
        writeln!(f, "Window Size: {}", self.window_size)?;
        writeln!(f, "Feedback Management: {}", self.feedback_management)?;
        writeln!(f, "Feedback Gain: {}", self.feedback_gain)?;
        writeln!(
            f,
            "Filter Lengths (adaptive/whitening/persistent): {}/{}/{}",
            self.adaptive_feedback_filter_length,
            self.signal_whitening_filter_length,
            self.persistent_feedback_filter_length
        )?;
        writeln!(f, "Hardware Latency: {}", self.hardware_latency)?;
        Ok(())
    }
}

impl HearingAidSettings {
    pub fn filter_type(&self) -> FilterType {
        FilterType::from_name(&self.filter_type)
    }

    pub fn feedback(&self) -> Feedback {
        Feedback::from_name(&self.feedback_management)
    }

    pub fn to_parameters(&self) -> Parameters {
        Parameters {
            cross_frequencies: self.cross_frequencies.clone(),
            compression_ratios: self.compression_ratios.clone(),
            kneepoints: self.kneepoints_db_spl.clone(),
            kneepoint_gains: self.kneepoint_gains_db.clone(),
            broadband_output_limiting_thresholds: self
                .broadband_output_limiting_thresholds_db_spl
                .clone(),
            filter_type: self.filter_type(),
            feedback: self.feedback(),
            attack: self.attack_ms,
            release: self.release_ms,
            sample_rate: self.sample_rate,
            full_scale_level: self.max_db_spl,
            feedback_gain: self.feedback_gain,
            filter_estimation_forgetting_factor: self.filter_estimation_forgetting_factor,
            filter_estimation_power_threshold: self.filter_estimation_power_threshold,
            filter_estimation_step_size: self.filter_estimation_step_size,
            adaptive_feedback_filter_length: self.adaptive_feedback_filter_length,
            signal_whitening_filter_length: self.signal_whitening_filter_length,
            persistent_feedback_filter_length: self.persistent_feedback_filter_length,
            hardware_latency: self.hardware_latency,
            save_quality_metric: self.save_quality_metric,
            window_size: self.window_size,
            chunk_size: self.chunk_size,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub audio: AudioSettings,
    pub hearing_aid: HearingAidSettings,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "------------------------------")?;

        writeln!(f, "Audio Settings:")?;
        writeln!(f, "{}", self.audio)?;

        writeln!(f, "Hearing Aid Settings:")?;
        writeln!(f, "{}", self.hearing_aid)?;
        Ok(())
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings: Settings =
            serde_json::from_str(&contents).context("failed to parse settings")?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Loads `path` when given, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                info!("No settings file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create settings directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("failed to serialize settings")?;

        fs::write(path, json)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}
