//! Capabilities a DSP engine exposes to the pipeline.
//!
//! Every operation works on chunk-sized buffers in place. Real-domain stages
//! receive the caller's chunk, complex-domain stages receive the pipeline's
//! intermediate buffer of `2 * channels * chunk_size` interleaved `(re, im)`
//! values. None of them can fail: anything that could go wrong is caught when
//! the engine is prepared.

/// Filterbank analysis and synthesis, split out so the filterbank design can
/// change without touching the rest of the chain.
pub trait Filter {
    /// Split `signal` into per-channel bands written to `channels`.
    fn filterbank_analyze(&mut self, signal: &[f32], channels: &mut [f32], chunk_size: usize);

    /// Recombine the bands in `channels` into `signal`.
    fn filterbank_synthesize(&mut self, channels: &[f32], signal: &mut [f32], chunk_size: usize);
}

/// The compression stages plus the fixed geometry of the chain.
pub trait SignalProcessor: Filter {
    fn compress_input(&mut self, signal: &mut [f32], chunk_size: usize);

    fn compress_channel(&mut self, channels: &mut [f32], chunk_size: usize);

    fn compress_output(&mut self, signal: &mut [f32], chunk_size: usize);

    /// Samples per chunk. Fixed once the processor is prepared.
    fn chunk_size(&self) -> usize;

    /// Number of filterbank channels. Fixed once the processor is prepared.
    fn channels(&self) -> usize;
}

/// Acoustic feedback cancellation around the compression chain.
pub trait FeedbackCanceller {
    /// Remove the estimated feedback from the incoming chunk.
    fn feedback_cancel_input(&mut self, signal: &mut [f32], chunk_size: usize);

    /// Hand the outgoing chunk to the feedback estimator. The chunk is only read.
    fn feedback_cancel_output(&mut self, signal: &[f32], chunk_size: usize);
}

/// Length of the intermediate complex buffer for a given geometry.
#[inline]
pub const fn complex_buffer_len(channels: usize, chunk_size: usize) -> usize {
    2 * channels * chunk_size
}
