mod common;

use hearing_aid::builder::{
    AutomaticGainControl, FeedbackManagement, FirParameters, IirParameters,
};
use hearing_aid::engine::{
    BroadbandCompression, BypassEngine, DspEngine, EngineHandle, FirFilterbank, IirDesign,
    IirFilterbank, PreparedEngine, Window,
};
use hearing_aid::{ConfigError, EngineError, Filter, FilterType, HearingAid};
use std::sync::{Arc, Mutex};

/// What a [`RecordingEngine`] saw, shared so it survives the engine.
#[derive(Default)]
struct Journal {
    calls: Vec<&'static str>,
    window: Option<Window>,
    design: Option<(usize, f64)>,
    broadband: Option<BroadbandCompression>,
    cleanups: usize,
}

struct RecordingEngine {
    journal: Arc<Mutex<Journal>>,
    fail_at: Option<&'static str>,
}

impl RecordingEngine {
    fn new() -> (Self, Arc<Mutex<Journal>>) {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let engine = Self {
            journal: Arc::clone(&journal),
            fail_at: None,
        };
        (engine, journal)
    }

    fn failing_at(stage: &'static str) -> (Self, Arc<Mutex<Journal>>) {
        let (mut engine, journal) = Self::new();
        engine.fail_at = Some(stage);
        (engine, journal)
    }

    fn log(&self, call: &'static str) {
        self.journal.lock().unwrap().calls.push(call);
    }

    fn prepared(&self, stage: &'static str) -> Result<(), EngineError> {
        self.log(stage);
        if self.fail_at == Some(stage) {
            Err(EngineError::Prepare { stage, code: -2 })
        } else {
            Ok(())
        }
    }
}

impl DspEngine for RecordingEngine {
    fn prepare_fir(&mut self, _: &FirParameters, window: Window) -> Result<(), EngineError> {
        self.journal.lock().unwrap().window = Some(window);
        self.prepared("prepare_fir")
    }

    fn design_iir(
        &self,
        parameters: &IirParameters,
        zeros_per_channel: usize,
        impulse_delay_ms: f64,
    ) -> Result<IirDesign, EngineError> {
        self.journal.lock().unwrap().design = Some((zeros_per_channel, impulse_delay_ms));
        self.prepared("design_iir")?;
        let roots = IirDesign::root_len(parameters.channels, zeros_per_channel);
        Ok(IirDesign {
            zeros: vec![0.0; roots],
            poles: vec![0.0; roots],
            gains: vec![1.0; parameters.channels],
            delays: vec![0; parameters.channels],
            zeros_per_channel,
        })
    }

    fn prepare_iir(&mut self, _: &IirDesign, _: &IirParameters) -> Result<(), EngineError> {
        self.prepared("prepare_iir")
    }

    fn prepare_afc(&mut self, _: &FeedbackManagement) -> Result<(), EngineError> {
        self.prepared("prepare_afc")
    }

    fn prepare_agc(
        &mut self,
        _: &AutomaticGainControl,
        broadband: &BroadbandCompression,
    ) -> Result<(), EngineError> {
        self.journal.lock().unwrap().broadband = Some(broadband.clone());
        self.prepared("prepare_agc")
    }

    fn afc_input(&mut self, _: &mut [f32], _: usize) {
        self.log("afc_input");
    }

    fn afc_output(&mut self, _: &[f32], _: usize) {
        self.log("afc_output");
    }

    fn agc_input(&mut self, _: &mut [f32], _: usize) {
        self.log("agc_input");
    }

    fn agc_channel(&mut self, _: &mut [f32], _: usize) {
        self.log("agc_channel");
    }

    fn agc_output(&mut self, _: &mut [f32], _: usize) {
        self.log("agc_output");
    }

    fn fir_analyze(&mut self, _: &[f32], _: &mut [f32], _: usize) {
        self.log("fir_analyze");
    }

    fn fir_synthesize(&mut self, _: &[f32], _: &mut [f32], _: usize) {
        self.log("fir_synthesize");
    }

    fn iir_analyze(&mut self, _: &[f32], _: &mut [f32], _: usize) {
        self.log("iir_analyze");
    }

    fn iir_synthesize(&mut self, _: &[f32], _: &mut [f32], _: usize) {
        self.log("iir_synthesize");
    }

    fn cleanup(&mut self) {
        self.journal.lock().unwrap().cleanups += 1;
    }
}

fn calls(journal: &Arc<Mutex<Journal>>) -> Vec<&'static str> {
    journal.lock().unwrap().calls.clone()
}

#[test]
fn fir_fitting_prepares_and_dispatches_to_fir() -> anyhow::Result<()> {
    let (engine, journal) = RecordingEngine::new();
    let mut parameters = common::parameters(&[1000.0]);
    parameters.filter_type = FilterType::Fir;
    parameters.chunk_size = 2;

    let prepared = PreparedEngine::prepare(engine, &parameters)?;
    assert_eq!(prepared.filter_type(), FilterType::Fir);
    let mut hearing_aid = prepared.into_afc_hearing_aid();
    hearing_aid.process(&mut [0.0, 0.0]);

    assert_eq!(
        calls(&journal),
        [
            "prepare_fir",
            "prepare_afc",
            "prepare_agc",
            "afc_input",
            "agc_input",
            "fir_analyze",
            "agc_channel",
            "fir_synthesize",
            "agc_output",
            "afc_output",
        ]
    );
    assert_eq!(journal.lock().unwrap().window, Some(Window::Hamming));
    Ok(())
}

#[test]
fn iir_fitting_designs_then_dispatches_to_iir() -> anyhow::Result<()> {
    let (engine, journal) = RecordingEngine::new();
    let mut parameters = common::parameters(&[1000.0]);
    parameters.chunk_size = 2;

    let PreparedEngine::Iir(processor) = PreparedEngine::prepare(engine, &parameters)? else {
        panic!("IIR fitting prepared another filterbank");
    };
    let mut hearing_aid = HearingAid::new(processor);
    assert_eq!(hearing_aid.processor().filter_type(), FilterType::Iir);
    hearing_aid.process(&mut [0.0, 0.0]);

    assert_eq!(
        calls(&journal),
        [
            "design_iir",
            "prepare_iir",
            "prepare_afc",
            "prepare_agc",
            "agc_input",
            "iir_analyze",
            "agc_channel",
            "iir_synthesize",
            "agc_output",
        ]
    );
    assert_eq!(journal.lock().unwrap().design, Some((4, 2.5)));
    Ok(())
}

#[test]
fn broadband_compression_uses_fixed_constants() -> anyhow::Result<()> {
    let (engine, journal) = RecordingEngine::new();
    let mut parameters = common::parameters(&[1000.0]);
    parameters.sample_rate = 16000.0;
    parameters.full_scale_level = 110.0;

    let _prepared = PreparedEngine::prepare(engine, &parameters)?;

    assert_eq!(
        journal.lock().unwrap().broadband,
        Some(BroadbandCompression {
            attack: 1.0,
            release: 50.0,
            sample_rate: 16000.0,
            full_scale_level: 110.0,
            kneepoint_gain: 0.0,
            kneepoint: 105.0,
            compression_ratio: 10.0,
            limiting_threshold: 105.0,
        })
    );
    Ok(())
}

#[test]
fn dropping_the_processor_cleans_up_once() -> anyhow::Result<()> {
    let (engine, journal) = RecordingEngine::new();

    let hearing_aid =
        PreparedEngine::prepare(engine, &common::parameters(&[1000.0]))?.into_afc_hearing_aid();
    assert_eq!(journal.lock().unwrap().cleanups, 0);
    drop(hearing_aid);

    assert_eq!(journal.lock().unwrap().cleanups, 1);
    Ok(())
}

#[test]
fn failed_preparation_cleans_up_and_skips_later_stages() {
    let (engine, journal) = RecordingEngine::failing_at("prepare_afc");

    let result = PreparedEngine::prepare(engine, &common::parameters(&[1000.0]));

    assert!(matches!(
        result,
        Err(ConfigError::Engine(EngineError::Prepare {
            stage: "prepare_afc",
            code: -2
        }))
    ));
    assert_eq!(calls(&journal), ["design_iir", "prepare_iir", "prepare_afc"]);
    assert_eq!(journal.lock().unwrap().cleanups, 1);
}

#[test]
fn invalid_fitting_never_reaches_the_engine() {
    let (engine, journal) = RecordingEngine::new();
    let mut parameters = common::parameters(&[1000.0]);
    parameters.chunk_size = 0;

    let result = PreparedEngine::prepare(engine, &parameters);

    assert!(matches!(result, Err(ConfigError::EmptyChunk)));
    assert!(calls(&journal).is_empty());
    assert_eq!(journal.lock().unwrap().cleanups, 1);
}

#[test]
fn handle_cleans_up_on_drop() {
    let (engine, journal) = RecordingEngine::new();

    {
        let mut handle = EngineHandle::new(engine);
        handle.agc_input(&mut [0.0], 1);
    }

    assert_eq!(calls(&journal), ["agc_input"]);
    assert_eq!(journal.lock().unwrap().cleanups, 1);
}

#[test]
fn bypass_hearing_aid_passes_audio_through() -> anyhow::Result<()> {
    for filter_type in [FilterType::Fir, FilterType::Iir] {
        let mut parameters = common::parameters(&[500.0, 1000.0, 2000.0]);
        parameters.filter_type = filter_type;
        parameters.chunk_size = 8;

        let prepared = PreparedEngine::prepare(BypassEngine::new(), &parameters)?;
        assert_eq!(prepared.engine().channels(), 4);
        let mut hearing_aid = prepared.into_afc_hearing_aid();

        let input: Vec<f32> = (0..8).map(|i| (i as f32 * 0.7).sin()).collect();
        let mut chunk = input.clone();
        hearing_aid.process(&mut chunk);

        for (got, want) in chunk.iter().zip(&input) {
            assert!((got - want).abs() < 1e-6, "{filter_type}: {got} != {want}");
        }
    }
    Ok(())
}

#[test]
fn bypass_binds_the_fitting_geometry() -> anyhow::Result<()> {
    let parameters = common::parameters(&[1000.0]);
    let PreparedEngine::Iir(processor) = PreparedEngine::prepare(BypassEngine::new(), &parameters)?
    else {
        panic!("IIR fitting prepared another filterbank");
    };

    let mut hearing_aid = HearingAid::new(processor);
    let mut chunk = vec![0.25; parameters.chunk_size];
    hearing_aid.process(&mut chunk);

    assert_eq!(hearing_aid.processor().engine().chunk_size(), 32);
    assert!(!hearing_aid.processor().engine().is_released());
    Ok(())
}

#[test]
fn filterbanks_route_to_their_own_design() {
    let (engine, journal) = RecordingEngine::new();
    let mut fir = FirFilterbank::new(EngineHandle::new(engine));
    let mut channels = [0.0; 2];

    fir.filterbank_analyze(&[0.0], &mut channels, 1);
    fir.filterbank_synthesize(&channels, &mut [0.0], 1);
    drop(fir);

    let (engine, iir_journal) = RecordingEngine::new();
    let mut iir = IirFilterbank::new(EngineHandle::new(engine));
    iir.filterbank_analyze(&[0.0], &mut channels, 1);
    iir.filterbank_synthesize(&channels, &mut [0.0], 1);
    drop(iir);

    assert_eq!(calls(&journal), ["fir_analyze", "fir_synthesize"]);
    assert_eq!(calls(&iir_journal), ["iir_analyze", "iir_synthesize"]);
    assert_eq!(journal.lock().unwrap().cleanups, 1);
    assert_eq!(iir_journal.lock().unwrap().cleanups, 1);
}

#[test]
fn prepared_filterbank_stays_bound_across_chunks() -> anyhow::Result<()> {
    let (engine, journal) = RecordingEngine::new();
    let mut parameters = common::parameters(&[1000.0, 2000.0]);
    parameters.filter_type = FilterType::Fir;
    parameters.chunk_size = 1;

    let mut hearing_aid = PreparedEngine::prepare(engine, &parameters)?.into_hearing_aid();
    for _ in 0..4 {
        hearing_aid.process(&mut [0.5]);
    }

    let calls = calls(&journal);
    let count = |name: &str| calls.iter().filter(|&&c| c == name).count();
    assert_eq!(count("fir_analyze"), 4);
    assert_eq!(count("fir_synthesize"), 4);
    assert_eq!(count("iir_analyze") + count("iir_synthesize"), 0);
    Ok(())
}
