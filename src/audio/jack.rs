use anyhow::{Context, Result};
use jack::Client;
use log::{debug, warn};

use crate::audio::ports::Ports;
use crate::pipeline::Pipeline;

pub struct NotificationHandler;

pub struct ProcessHandler {
    ports: Ports,
    pipeline: Box<dyn Pipeline>,
    // Scratch chunk the pipeline works on, sized to the JACK period.
    buffer: Vec<f32>,
}

impl jack::NotificationHandler for NotificationHandler {
    fn sample_rate(&mut self, _: &Client, sample_rate: jack::Frames) -> jack::Control {
        debug!(">> JACK sample_rate changed to {sample_rate}");

        jack::Control::Continue
    }
}

impl ProcessHandler {
    pub fn new(client: &Client, pipeline: Box<dyn Pipeline>) -> Result<Self> {
        let ports = Ports::new(client).context("failed to create audio ports")?;
        let buffer_size = client.buffer_size() as usize;

        if buffer_size != pipeline.chunk_size() {
            warn!(
                "JACK period of {buffer_size} frames differs from the {} sample chunk size, audio will pass through unprocessed",
                pipeline.chunk_size()
            );
        }

        Ok(Self {
            ports,
            pipeline,
            buffer: vec![0.0; buffer_size],
        })
    }
}

impl jack::ProcessHandler for ProcessHandler {
    fn process(&mut self, _client: &jack::Client, ps: &jack::ProcessScope) -> jack::Control {
        let input = self.ports.get_input(ps);
        let Some(chunk) = self.buffer.get_mut(..input.len()) else {
            self.ports.silence_output(ps);
            return jack::Control::Continue;
        };

        chunk.copy_from_slice(input);
        self.pipeline.process(chunk);
        self.ports.write_output(ps, chunk);

        jack::Control::Continue
    }

    fn buffer_size(&mut self, _client: &jack::Client, frames: jack::Frames) -> jack::Control {
        debug!(">> JACK buffer_size changed to {frames} frames");

        let new_size = frames as usize;
        self.buffer.resize(new_size, 0.0);

        if new_size != self.pipeline.chunk_size() {
            warn!(
                "JACK period of {new_size} frames no longer matches the {} sample chunk size",
                self.pipeline.chunk_size()
            );
        }

        jack::Control::Continue
    }
}
