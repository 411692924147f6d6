pub mod afc;
pub mod basic;

pub use afc::AfcHearingAid;
pub use basic::HearingAid;

/// What a host drives once per audio chunk.
pub trait Pipeline: Send {
    /// Process one chunk in place. Chunks of the wrong length are left untouched.
    fn process(&mut self, chunk: &mut [f32]);

    /// The only chunk length this pipeline acts on.
    fn chunk_size(&self) -> usize;
}
