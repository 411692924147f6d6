use crate::builder::FilterType;
use crate::engine::{DspEngine, EngineHandle};
use crate::stage::Filter;

/// A [`Filter`] that owns the engine and always routes to the same one of its
/// filterbank designs. The design is part of the type, so picking it happens
/// once when the processor is prepared.
pub trait EngineFilterbank: Filter + Send {
    type Engine: DspEngine;

    const FILTER_TYPE: FilterType;

    fn engine(&self) -> &EngineHandle<Self::Engine>;

    fn engine_mut(&mut self) -> &mut EngineHandle<Self::Engine>;
}

pub struct FirFilterbank<E: DspEngine> {
    engine: EngineHandle<E>,
}

impl<E: DspEngine> FirFilterbank<E> {
    pub const fn new(engine: EngineHandle<E>) -> Self {
        Self { engine }
    }
}

impl<E: DspEngine> Filter for FirFilterbank<E> {
    #[inline]
    fn filterbank_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize) {
        self.engine.fir_analyze(signal, channels, chunk_size);
    }

    #[inline]
    fn filterbank_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize) {
        self.engine.fir_synthesize(channels, signal, chunk_size);
    }
}

impl<E: DspEngine> EngineFilterbank for FirFilterbank<E> {
    type Engine = E;

    const FILTER_TYPE: FilterType = FilterType::Fir;

    fn engine(&self) -> &EngineHandle<E> {
        &self.engine
    }

    fn engine_mut(&mut self) -> &mut EngineHandle<E> {
        &mut self.engine
    }
}

pub struct IirFilterbank<E: DspEngine> {
    engine: EngineHandle<E>,
}

impl<E: DspEngine> IirFilterbank<E> {
    pub const fn new(engine: EngineHandle<E>) -> Self {
        Self { engine }
    }
}

impl<E: DspEngine> Filter for IirFilterbank<E> {
    #[inline]
    fn filterbank_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize) {
        self.engine.iir_analyze(signal, channels, chunk_size);
    }

    #[inline]
    fn filterbank_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize) {
        self.engine.iir_synthesize(channels, signal, chunk_size);
    }
}

impl<E: DspEngine> EngineFilterbank for IirFilterbank<E> {
    type Engine = E;

    const FILTER_TYPE: FilterType = FilterType::Iir;

    fn engine(&self) -> &EngineHandle<E> {
        &self.engine
    }

    fn engine_mut(&mut self) -> &mut EngineHandle<E> {
        &mut self.engine
    }
}
