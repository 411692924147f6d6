use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hearing_aid::audio::manager::Manager;
use hearing_aid::builder::StageConfiguration;
use hearing_aid::engine::{BypassEngine, PreparedEngine};
use hearing_aid::io::wav;
use hearing_aid::settings::Settings;
use log::info;
use std::path::{Path, PathBuf};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

#[derive(Parser, Debug)]
#[command(name = "hearing-aid")]
#[command(version)]
#[command(about = "A hearing-aid processing chain with feedback management.")]
struct Args {
    #[arg(
        long,
        global = true,
        env = "HEARING_AID_CONFIG",
        help = "Settings file (JSON); defaults are used when omitted"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the fitting and print the per-stage configuration it produces.
    Check,
    /// Process a mono WAV file.
    Process {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Run as a JACK client until Ctrl+C.
    Live,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    info!("hearing-aid v{}", env!("CARGO_PKG_VERSION"));
    info!("Args: {:?}", args);

    let settings = Settings::load_or_default(args.config.as_deref())?;
    info!("{settings}");

    match args.command {
        Command::Check => check(&settings),
        Command::Process { input, output } => process(&settings, &input, &output),
        Command::Live => live(&settings),
    }
}

fn check(settings: &Settings) -> Result<()> {
    let configuration = StageConfiguration::assemble(&settings.hearing_aid.to_parameters())
        .context("invalid fitting")?;
    let json = serde_json::to_string_pretty(&configuration)
        .context("failed to serialize stage configuration")?;
    println!("{json}");
    Ok(())
}

fn process(settings: &Settings, input: &Path, output: &Path) -> Result<()> {
    let mut recording = wav::read_mono(input)?;

    let mut fitting = settings.hearing_aid.clone();
    fitting.sample_rate = f64::from(recording.sample_rate);

    let mut hearing_aid = PreparedEngine::prepare(BypassEngine::new(), &fitting.to_parameters())
        .context("failed to prepare DSP engine")?
        .into_afc_hearing_aid();

    let chunks = wav::render(hearing_aid.as_mut(), &mut recording.samples);
    info!("Processed {chunks} chunks of {} samples", hearing_aid.chunk_size());

    wav::write_mono(output, &recording)
}

fn live(settings: &Settings) -> Result<()> {
    let manager =
        Manager::new(settings, BypassEngine::new()).context("failed to start JACK host")?;

    let running = Arc::new(AtomicBool::new(true));
    let shutdown_flag = Arc::clone(&running);

    ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down...");
        shutdown_flag.store(false, Ordering::SeqCst);
    })
    .context("error setting Ctrl+C handler")?;

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(250));
    }

    manager.stop()
}
