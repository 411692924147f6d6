use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};
use std::path::Path;

use crate::pipeline::Pipeline;

/// A mono recording held in memory.
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Reads a mono WAV file, normalising integer samples to [-1, 1).
pub fn read_mono(path: &Path) -> Result<Recording> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        bail!(
            "{} has {} channels, only mono input is supported",
            path.display(),
            spec.channels
        );
    }

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read float samples")?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
                .context("failed to read integer samples")?
        }
    };

    debug!(
        "Read {} samples at {} Hz from {}",
        samples.len(),
        spec.sample_rate,
        path.display()
    );

    Ok(Recording {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Writes a mono 32-bit float WAV file.
pub fn write_mono(path: &Path, recording: &Recording) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: recording.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create WAV file {}", path.display()))?;
    for &sample in &recording.samples {
        writer
            .write_sample(sample)
            .context("failed to write sample")?;
    }
    writer.finalize().context("failed to finalize WAV file")?;

    info!("Wrote {} samples to {}", recording.samples.len(), path.display());
    Ok(())
}

/// Runs `samples` through `pipeline` chunk by chunk, in place.
///
/// A trailing partial chunk is zero-padded to a full chunk for processing and
/// truncated again afterwards, so the length never changes. Returns the
/// number of chunks processed.
pub fn render<P: Pipeline + ?Sized>(pipeline: &mut P, samples: &mut [f32]) -> usize {
    let chunk_size = pipeline.chunk_size();
    if chunk_size == 0 {
        return 0;
    }

    let mut chunks = 0;
    let mut blocks = samples.chunks_exact_mut(chunk_size);
    for block in &mut blocks {
        pipeline.process(block);
        chunks += 1;
    }

    let tail = blocks.into_remainder();
    if !tail.is_empty() {
        let mut padded = vec![0.0; chunk_size];
        padded[..tail.len()].copy_from_slice(tail);
        pipeline.process(&mut padded);
        let len = tail.len();
        tail.copy_from_slice(&padded[..len]);
        chunks += 1;
    }

    chunks
}
