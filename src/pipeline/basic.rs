use crate::pipeline::Pipeline;
use crate::stage::{SignalProcessor, complex_buffer_len};

/// The compression chain without feedback management.
pub struct HearingAid<P> {
    buffer: Vec<f32>,
    processor: P,
    chunk_size: usize,
}

impl<P: SignalProcessor> HearingAid<P> {
    pub fn new(processor: P) -> Self {
        let chunk_size = processor.chunk_size();
        let channels = processor.channels();

        Self {
            buffer: vec![0.0; complex_buffer_len(channels, chunk_size)],
            processor,
            chunk_size,
        }
    }

    /// Runs compress input, analyze, compress channels, synthesize and
    /// compress output over the chunk, in that order.
    pub fn process(&mut self, signal: &mut [f32]) {
        let chunk_size = self.chunk_size;
        if signal.len() != chunk_size {
            return;
        }

        let processor = &mut self.processor;
        let buffer = self.buffer.as_mut_slice();

        processor.compress_input(signal, chunk_size);
        processor.filterbank_analyze(signal, buffer, chunk_size);
        processor.compress_channel(buffer, chunk_size);
        processor.filterbank_synthesize(buffer, signal, chunk_size);
        processor.compress_output(signal, chunk_size);
    }

    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub const fn processor(&self) -> &P {
        &self.processor
    }

    pub const fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    pub fn into_processor(self) -> P {
        self.processor
    }
}

impl<P: SignalProcessor + Send> Pipeline for HearingAid<P> {
    fn process(&mut self, chunk: &mut [f32]) {
        Self::process(self, chunk);
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}
