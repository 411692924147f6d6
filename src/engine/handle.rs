use log::debug;
use std::ops::{Deref, DerefMut};

use crate::engine::DspEngine;

/// Exclusive owner of an engine instance. The engine is cleaned up exactly
/// once, when the handle is dropped.
pub struct EngineHandle<E: DspEngine> {
    engine: E,
}

impl<E: DspEngine> EngineHandle<E> {
    pub const fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: DspEngine> Deref for EngineHandle<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.engine
    }
}

impl<E: DspEngine> DerefMut for EngineHandle<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: DspEngine> Drop for EngineHandle<E> {
    fn drop(&mut self) {
        debug!("Releasing DSP engine");
        self.engine.cleanup();
    }
}
