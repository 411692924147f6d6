use log::debug;

use crate::builder::{AutomaticGainControl, FeedbackManagement, FirParameters, IirParameters};
use crate::engine::{BroadbandCompression, DspEngine, IirDesign, Window};
use crate::error::EngineError;

/// Unity-gain engine.
///
/// Analysis puts the chunk into the real parts of channel 0 and clears every
/// other value, synthesis sums the real parts of all channels. Compression and
/// feedback stages leave the signal alone. Useful to run hosts and benchmarks
/// end to end without a native engine.
#[derive(Debug, Default)]
pub struct BypassEngine {
    channels: usize,
    chunk_size: usize,
    released: bool,
}

impl BypassEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn channels(&self) -> usize {
        self.channels
    }

    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub const fn is_released(&self) -> bool {
        self.released
    }

    fn check_channels(
        stage: &'static str,
        cross_frequencies: &[f64],
        channels: usize,
    ) -> Result<(), EngineError> {
        if cross_frequencies.len() + 1 == channels {
            Ok(())
        } else {
            Err(EngineError::Malformed {
                stage,
                reason: format!(
                    "{} cross frequencies cannot split into {channels} channels",
                    cross_frequencies.len()
                ),
            })
        }
    }

    fn bind(&mut self, channels: usize, chunk_size: usize) {
        self.channels = channels;
        self.chunk_size = chunk_size;
    }

    #[inline]
    fn analyze(signal: &[f32], channels: &mut [f32], chunk_size: usize) {
        channels.fill(0.0);
        for (pair, &sample) in channels.chunks_exact_mut(2).zip(&signal[..chunk_size]) {
            pair[0] = sample;
        }
    }

    #[inline]
    fn synthesize(channels: &[f32], signal: &mut [f32], chunk_size: usize) {
        let band_len = 2 * chunk_size;
        let signal = &mut signal[..chunk_size];
        signal.fill(0.0);

        for band in channels.chunks_exact(band_len) {
            for (sample, pair) in signal.iter_mut().zip(band.chunks_exact(2)) {
                *sample += pair[0];
            }
        }
    }
}

impl DspEngine for BypassEngine {
    fn prepare_fir(
        &mut self,
        parameters: &FirParameters,
        window: Window,
    ) -> Result<(), EngineError> {
        Self::check_channels("FIR filterbank", &parameters.cross_frequencies, parameters.channels)?;
        debug!(
            "Bypass FIR filterbank: {} channels, {:?} window of {} samples",
            parameters.channels, window, parameters.window_size
        );
        self.bind(parameters.channels, parameters.chunk_size);
        Ok(())
    }

    fn design_iir(
        &self,
        parameters: &IirParameters,
        zeros_per_channel: usize,
        _impulse_delay_ms: f64,
    ) -> Result<IirDesign, EngineError> {
        Self::check_channels("IIR design", &parameters.cross_frequencies, parameters.channels)?;

        let roots = IirDesign::root_len(parameters.channels, zeros_per_channel);
        Ok(IirDesign {
            zeros: vec![0.0; roots],
            poles: vec![0.0; roots],
            gains: vec![1.0; parameters.channels],
            delays: vec![0; parameters.channels],
            zeros_per_channel,
        })
    }

    fn prepare_iir(
        &mut self,
        design: &IirDesign,
        parameters: &IirParameters,
    ) -> Result<(), EngineError> {
        let roots = IirDesign::root_len(parameters.channels, design.zeros_per_channel);
        if design.zeros.len() != roots || design.poles.len() != roots {
            return Err(EngineError::Malformed {
                stage: "IIR filterbank",
                reason: format!(
                    "expected {roots} zero and pole values, got {} and {}",
                    design.zeros.len(),
                    design.poles.len()
                ),
            });
        }
        if design.gains.len() != parameters.channels || design.delays.len() != parameters.channels
        {
            return Err(EngineError::Malformed {
                stage: "IIR filterbank",
                reason: format!("expected {} gains and delays", parameters.channels),
            });
        }

        debug!("Bypass IIR filterbank: {} channels", parameters.channels);
        self.bind(parameters.channels, parameters.chunk_size);
        Ok(())
    }

    fn prepare_afc(&mut self, parameters: &FeedbackManagement) -> Result<(), EngineError> {
        debug!(
            "Bypass feedback management: gain {}, adaptive filter length {}",
            parameters.gain, parameters.adaptive_filter_length
        );
        Ok(())
    }

    fn prepare_agc(
        &mut self,
        channels: &AutomaticGainControl,
        broadband: &BroadbandCompression,
    ) -> Result<(), EngineError> {
        Self::check_channels(
            "automatic gain control",
            &channels.cross_frequencies,
            channels.channels,
        )?;
        debug!(
            "Bypass automatic gain control: {} channels, {} dB SPL full scale",
            channels.channels, broadband.full_scale_level
        );
        Ok(())
    }

    fn afc_input(&mut self, _signal: &mut [f32], _chunk_size: usize) {}

    fn afc_output(&mut self, _signal: &[f32], _chunk_size: usize) {}

    fn agc_input(&mut self, _signal: &mut [f32], _chunk_size: usize) {}

    fn agc_channel(&mut self, _channels: &mut [f32], _chunk_size: usize) {}

    fn agc_output(&mut self, _signal: &mut [f32], _chunk_size: usize) {}

    fn fir_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize) {
        Self::analyze(signal, channels, chunk_size);
    }

    fn fir_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize) {
        Self::synthesize(channels, signal, chunk_size);
    }

    fn iir_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize) {
        Self::analyze(signal, channels, chunk_size);
    }

    fn iir_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize) {
        Self::synthesize(channels, signal, chunk_size);
    }

    fn cleanup(&mut self) {
        self.channels = 0;
        self.chunk_size = 0;
        self.released = true;
    }
}
