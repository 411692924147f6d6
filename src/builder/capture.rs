use serde::Serialize;

use crate::builder::{
    AutomaticGainControl, FeedbackManagement, FirParameters, HearingAidBuilder, IirParameters,
    Initializer, Parameters,
};
use crate::error::{ConfigError, EngineError};

/// Initializer that keeps the blocks it is handed instead of preparing an
/// engine. Used to inspect a fitting without touching any DSP state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fir_filter: Option<FirParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iir_filter: Option<IirParameters>,
    pub feedback_management: Option<FeedbackManagement>,
    pub automatic_gain_control: Option<AutomaticGainControl>,
}

impl StageConfiguration {
    /// Runs the builder against a fresh capture.
    pub fn assemble(parameters: &Parameters) -> Result<Self, ConfigError> {
        let mut configuration = Self::default();
        HearingAidBuilder::new(&mut configuration).build(parameters)?;
        Ok(configuration)
    }
}

impl Initializer for StageConfiguration {
    fn initialize_fir_filter(&mut self, parameters: &FirParameters) -> Result<(), EngineError> {
        self.fir_filter = Some(parameters.clone());
        Ok(())
    }

    fn initialize_iir_filter(&mut self, parameters: &IirParameters) -> Result<(), EngineError> {
        self.iir_filter = Some(parameters.clone());
        Ok(())
    }

    fn initialize_feedback_management(
        &mut self,
        parameters: &FeedbackManagement,
    ) -> Result<(), EngineError> {
        self.feedback_management = Some(parameters.clone());
        Ok(())
    }

    fn initialize_automatic_gain_control(
        &mut self,
        parameters: &AutomaticGainControl,
    ) -> Result<(), EngineError> {
        self.automatic_gain_control = Some(parameters.clone());
        Ok(())
    }
}
