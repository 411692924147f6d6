use anyhow::{Context, Result};
use jack::{AsyncClient, Client, ClientOptions};
use log::{info, warn};

use crate::audio::jack::{NotificationHandler, ProcessHandler};
use crate::audio::ports::{INPUT_PORT, OUTPUT_LEFT_PORT, OUTPUT_RIGHT_PORT};
use crate::engine::{DspEngine, PreparedEngine};
use crate::settings::{AudioSettings, Settings};

pub const CLIENT_NAME: &str = "hearing-aid";

/// Runs the feedback-managed chain as a JACK client until dropped or stopped.
pub struct Manager {
    active_client: AsyncClient<NotificationHandler, ProcessHandler>,
}

impl Manager {
    /// Prepares `engine` for the JACK server's period and sample rate, then
    /// activates the client. Fitting errors abort before anything is activated.
    pub fn new<E: DspEngine + 'static>(settings: &Settings, engine: E) -> Result<Self> {
        let (client, _) = Client::new(CLIENT_NAME, ClientOptions::NO_START_SERVER)
            .context("failed to create JACK client")?;

        let mut fitting = settings.hearing_aid.clone();
        fitting.sample_rate = client.sample_rate() as f64;
        fitting.chunk_size = client.buffer_size() as usize;
        info!(
            "JACK server runs at {} Hz with {} frame periods",
            fitting.sample_rate, fitting.chunk_size
        );

        let hearing_aid = PreparedEngine::prepare(engine, &fitting.to_parameters())
            .context("failed to prepare DSP engine")?
            .into_afc_hearing_aid();

        let handler = ProcessHandler::new(&client, hearing_aid)
            .context("failed to create process handler")?;
        let active_client = client
            .activate_async(NotificationHandler, handler)
            .context("failed to activate async client")?;

        let manager = Self { active_client };
        manager.connect_ports(&settings.audio);

        Ok(manager)
    }

    fn connect_ports(&self, settings: &AudioSettings) {
        let client = self.active_client.as_client();
        let own = |port: &str| format!("{CLIENT_NAME}:{port}");

        let connections = [
            (settings.input_port.clone(), own(INPUT_PORT)),
            (own(OUTPUT_LEFT_PORT), settings.output_left_port.clone()),
            (own(OUTPUT_RIGHT_PORT), settings.output_right_port.clone()),
        ];

        for (source, destination) in &connections {
            if let Err(e) = client.connect_ports_by_name(source, destination) {
                warn!("Failed to connect '{source}' -> '{destination}': {e}");
            } else {
                info!("Connected {source} -> {destination}");
            }
        }
    }

    pub fn stop(self) -> Result<()> {
        self.active_client
            .deactivate()
            .context("failed to deactivate JACK client")?;
        info!("JACK client deactivated");
        Ok(())
    }
}
