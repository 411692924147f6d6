use log::debug;

use crate::builder::{
    AutomaticGainControl, FeedbackManagement, FirParameters, IirParameters, Initializer,
};
use crate::engine::{
    BroadbandCompression, DspEngine, EngineHandle, IIR_IMPULSE_DELAY_MS, IIR_ZEROS_PER_CHANNEL,
    Window,
};
use crate::error::EngineError;

/// Prepares an engine from the blocks the builder assembles, filling in the
/// engine-level constants a fitting never sets.
pub struct EngineInitializer<'a, E: DspEngine> {
    engine: &'a mut EngineHandle<E>,
}

impl<'a, E: DspEngine> EngineInitializer<'a, E> {
    pub fn new(engine: &'a mut EngineHandle<E>) -> Self {
        Self { engine }
    }
}

impl<E: DspEngine> Initializer for EngineInitializer<'_, E> {
    fn initialize_fir_filter(&mut self, parameters: &FirParameters) -> Result<(), EngineError> {
        self.engine.prepare_fir(parameters, Window::Hamming)
    }

    fn initialize_iir_filter(&mut self, parameters: &IirParameters) -> Result<(), EngineError> {
        let design =
            self.engine
                .design_iir(parameters, IIR_ZEROS_PER_CHANNEL, IIR_IMPULSE_DELAY_MS)?;
        debug!(
            "Designed IIR filterbank: {} gains, {} zeros per channel",
            design.gains.len(),
            design.zeros_per_channel
        );
        self.engine.prepare_iir(&design, parameters)
    }

    fn initialize_feedback_management(
        &mut self,
        parameters: &FeedbackManagement,
    ) -> Result<(), EngineError> {
        self.engine.prepare_afc(parameters)
    }

    fn initialize_automatic_gain_control(
        &mut self,
        parameters: &AutomaticGainControl,
    ) -> Result<(), EngineError> {
        let broadband =
            BroadbandCompression::for_fitting(parameters.sample_rate, parameters.full_scale_level);
        self.engine.prepare_agc(parameters, &broadband)
    }
}
