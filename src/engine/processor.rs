use log::info;

use crate::builder::{FilterType, HearingAidBuilder, Parameters};
use crate::engine::{
    DspEngine, EngineFilterbank, EngineHandle, EngineInitializer, FirFilterbank, IirFilterbank,
};
use crate::error::ConfigError;
use crate::pipeline::{AfcHearingAid, HearingAid, Pipeline};
use crate::stage::{FeedbackCanceller, Filter, SignalProcessor};

/// A prepared engine driven through one filterbank design for its whole
/// lifetime.
pub struct EngineProcessor<F> {
    filterbank: F,
    chunk_size: usize,
    channels: usize,
}

impl<F: EngineFilterbank> EngineProcessor<F> {
    pub fn new(filterbank: F, chunk_size: usize, channels: usize) -> Self {
        Self {
            filterbank,
            chunk_size,
            channels,
        }
    }

    pub const fn filter_type(&self) -> FilterType {
        F::FILTER_TYPE
    }

    pub fn engine(&self) -> &F::Engine {
        self.filterbank.engine()
    }
}

impl<F: EngineFilterbank> Filter for EngineProcessor<F> {
    #[inline]
    fn filterbank_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize) {
        self.filterbank.filterbank_analyze(signal, channels, chunk_size);
    }

    #[inline]
    fn filterbank_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize) {
        self.filterbank
            .filterbank_synthesize(channels, signal, chunk_size);
    }
}

impl<F: EngineFilterbank> SignalProcessor for EngineProcessor<F> {
    fn compress_input(&mut self, signal: &mut [f32], chunk_size: usize) {
        self.filterbank.engine_mut().agc_input(signal, chunk_size);
    }

    fn compress_channel(&mut self, channels: &mut [f32], chunk_size: usize) {
        self.filterbank.engine_mut().agc_channel(channels, chunk_size);
    }

    fn compress_output(&mut self, signal: &mut [f32], chunk_size: usize) {
        self.filterbank.engine_mut().agc_output(signal, chunk_size);
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn channels(&self) -> usize {
        self.channels
    }
}

impl<F: EngineFilterbank> FeedbackCanceller for EngineProcessor<F> {
    fn feedback_cancel_input(&mut self, signal: &mut [f32], chunk_size: usize) {
        self.filterbank.engine_mut().afc_input(signal, chunk_size);
    }

    fn feedback_cancel_output(&mut self, signal: &[f32], chunk_size: usize) {
        self.filterbank.engine_mut().afc_output(signal, chunk_size);
    }
}

/// An engine prepared for a fitting, bound to the filterbank it selects.
pub enum PreparedEngine<E: DspEngine> {
    Fir(EngineProcessor<FirFilterbank<E>>),
    Iir(EngineProcessor<IirFilterbank<E>>),
}

impl<E: DspEngine> PreparedEngine<E> {
    /// Prepares `engine` for `parameters`. On failure the engine is released
    /// and nothing usable is left behind.
    pub fn prepare(engine: E, parameters: &Parameters) -> Result<Self, ConfigError> {
        let mut engine = EngineHandle::new(engine);
        HearingAidBuilder::new(&mut EngineInitializer::new(&mut engine)).build(parameters)?;

        let chunk_size = parameters.chunk_size;
        let channels = parameters.channels();
        info!(
            "Engine prepared: {} filterbank, {channels} channels, {chunk_size} samples per chunk",
            parameters.filter_type
        );

        Ok(match parameters.filter_type {
            FilterType::Fir => Self::Fir(EngineProcessor::new(
                FirFilterbank::new(engine),
                chunk_size,
                channels,
            )),
            FilterType::Iir => Self::Iir(EngineProcessor::new(
                IirFilterbank::new(engine),
                chunk_size,
                channels,
            )),
        })
    }

    pub const fn filter_type(&self) -> FilterType {
        match self {
            Self::Fir(_) => FilterType::Fir,
            Self::Iir(_) => FilterType::Iir,
        }
    }

    pub fn engine(&self) -> &E {
        match self {
            Self::Fir(processor) => processor.engine(),
            Self::Iir(processor) => processor.engine(),
        }
    }
}

impl<E: DspEngine + 'static> PreparedEngine<E> {
    /// The chain with acoustic feedback cancellation around it.
    pub fn into_afc_hearing_aid(self) -> Box<dyn Pipeline> {
        match self {
            Self::Fir(processor) => Box::new(AfcHearingAid::new(processor)),
            Self::Iir(processor) => Box::new(AfcHearingAid::new(processor)),
        }
    }

    pub fn into_hearing_aid(self) -> Box<dyn Pipeline> {
        match self {
            Self::Fir(processor) => Box::new(HearingAid::new(processor)),
            Self::Iir(processor) => Box::new(HearingAid::new(processor)),
        }
    }
}
