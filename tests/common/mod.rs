#![allow(dead_code)]

use hearing_aid::builder::{Feedback, FilterType, Parameters};
use hearing_aid::stage::{FeedbackCanceller, Filter, SignalProcessor};
use std::cell::Cell;

/// One stage invocation as the stub saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub stage: &'static str,
    pub chunk_size: usize,
    /// Address and length of every buffer the stage received.
    pub buffers: Vec<(usize, usize)>,
}

/// Stage stub that records every call.
#[derive(Default)]
pub struct RecordingProcessor {
    pub chunk_size: usize,
    pub channels: usize,
    pub calls: Vec<Call>,
    pub chunk_size_queries: Cell<usize>,
    pub channels_queries: Cell<usize>,
}

impl RecordingProcessor {
    pub fn new(chunk_size: usize, channels: usize) -> Self {
        Self {
            chunk_size,
            channels,
            ..Self::default()
        }
    }

    pub fn stages(&self) -> Vec<&'static str> {
        self.calls.iter().map(|c| c.stage).collect()
    }

    pub fn call(&self, stage: &str) -> &Call {
        self.calls
            .iter()
            .find(|c| c.stage == stage)
            .unwrap_or_else(|| panic!("{stage} was not called"))
    }

    fn record(&mut self, stage: &'static str, chunk_size: usize, buffers: &[&[f32]]) {
        self.calls.push(Call {
            stage,
            chunk_size,
            buffers: buffers
                .iter()
                .map(|b| (b.as_ptr() as usize, b.len()))
                .collect(),
        });
    }
}

impl Filter for RecordingProcessor {
    fn filterbank_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize) {
        self.record("filterbank_analyze", chunk_size, &[signal, &*channels]);
    }

    fn filterbank_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize) {
        self.record("filterbank_synthesize", chunk_size, &[channels, &*signal]);
    }
}

impl SignalProcessor for RecordingProcessor {
    fn compress_input(&mut self, signal: &mut [f32], chunk_size: usize) {
        self.record("compress_input", chunk_size, &[&*signal]);
    }

    fn compress_channel(&mut self, channels: &mut [f32], chunk_size: usize) {
        self.record("compress_channel", chunk_size, &[&*channels]);
    }

    fn compress_output(&mut self, signal: &mut [f32], chunk_size: usize) {
        self.record("compress_output", chunk_size, &[&*signal]);
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size_queries.set(self.chunk_size_queries.get() + 1);
        self.chunk_size
    }

    fn channels(&self) -> usize {
        self.channels_queries.set(self.channels_queries.get() + 1);
        self.channels
    }
}

impl FeedbackCanceller for RecordingProcessor {
    fn feedback_cancel_input(&mut self, signal: &mut [f32], chunk_size: usize) {
        self.record("feedback_cancel_input", chunk_size, &[&*signal]);
    }

    fn feedback_cancel_output(&mut self, signal: &[f32], chunk_size: usize) {
        self.record("feedback_cancel_output", chunk_size, &[&*signal]);
    }
}

/// A valid fitting for the given cross frequencies, every per-channel vector
/// filled to match.
pub fn parameters(cross_frequencies: &[f64]) -> Parameters {
    let channels = cross_frequencies.len() + 1;
    Parameters {
        cross_frequencies: cross_frequencies.to_vec(),
        compression_ratios: vec![1.5; channels],
        kneepoints: vec![45.0; channels],
        kneepoint_gains: vec![10.0; channels],
        broadband_output_limiting_thresholds: vec![100.0; channels],
        filter_type: FilterType::Iir,
        feedback: Feedback::On,
        attack: 5.0,
        release: 50.0,
        sample_rate: 24000.0,
        full_scale_level: 119.0,
        feedback_gain: 1.0,
        filter_estimation_forgetting_factor: 0.9,
        filter_estimation_power_threshold: 0.008,
        filter_estimation_step_size: 1e-3,
        adaptive_feedback_filter_length: 100,
        signal_whitening_filter_length: 9,
        persistent_feedback_filter_length: 0,
        hardware_latency: 0,
        save_quality_metric: false,
        window_size: 256,
        chunk_size: 32,
    }
}
