use anyhow::{Context, Result};
use jack::{AudioIn, AudioOut, Client, Port, ProcessScope};

pub const INPUT_PORT: &str = "in_port";
pub const OUTPUT_LEFT_PORT: &str = "out_port_left";
pub const OUTPUT_RIGHT_PORT: &str = "out_port_right";

/// One microphone in, the processed signal mirrored to both ears.
pub struct Ports {
    input: Port<AudioIn>,
    output_left: Port<AudioOut>,
    output_right: Port<AudioOut>,
}

impl Ports {
    pub fn new(client: &Client) -> Result<Self> {
        Ok(Self {
            input: client
                .register_port(INPUT_PORT, AudioIn::default())
                .context("failed to register in port")?,
            output_left: client
                .register_port(OUTPUT_LEFT_PORT, AudioOut::default())
                .context("failed to register out port left")?,
            output_right: client
                .register_port(OUTPUT_RIGHT_PORT, AudioOut::default())
                .context("failed to register out port right")?,
        })
    }

    pub fn get_input<'a>(&'a self, ps: &'a ProcessScope) -> &'a [f32] {
        self.input.as_slice(ps)
    }

    pub fn write_output(&mut self, ps: &ProcessScope, samples: &[f32]) {
        let output_size = ps.n_frames() as usize;
        let frame_count = samples.len().min(output_size);
        let out_left = self.output_left.as_mut_slice(ps);
        let out_right = self.output_right.as_mut_slice(ps);

        out_left[..frame_count].copy_from_slice(&samples[..frame_count]);
        out_right[..frame_count].copy_from_slice(&samples[..frame_count]);

        out_left[frame_count..output_size].fill(0.0);
        out_right[frame_count..output_size].fill(0.0);
    }

    pub fn silence_output(&mut self, ps: &ProcessScope) {
        let output_size = ps.n_frames() as usize;
        self.output_left.as_mut_slice(ps)[..output_size].fill(0.0);
        self.output_right.as_mut_slice(ps)[..output_size].fill(0.0);
    }
}
