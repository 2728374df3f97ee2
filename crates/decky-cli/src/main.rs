mod config;
mod keymap_file;
mod ports;
mod terminal;

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use decky_core::{InputLoop, KeyMap, MidiSink, NoteController, PerformanceState};
use decky_device::{LoggingSink, MidirSink};

use crate::config::{DeckyConfig, PortSection};
use crate::ports::PortChoice;
use crate::terminal::TerminalKeys;

#[derive(Parser, Debug)]
#[command(name = "decky", about = "Play MIDI notes from your computer keyboard")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, env = "DECKY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Name to use for the virtual MIDI port
    #[arg(short = 'p', long = "portname", value_name = "PORT_NAME")]
    pub port_name: Option<String>,

    /// Show available MIDI ports to choose from
    #[arg(short = 's', long = "showports")]
    pub show_ports: bool,

    /// Keymap file (looked up as given, then in keymaps/)
    #[arg(short = 'f', long = "file", value_name = "MAP_FILE")]
    pub map_file: Option<PathBuf>,

    /// Starting MIDI channel (1-indexed)
    #[arg(short, long)]
    pub channel: Option<u8>,

    /// Starting octave
    #[arg(short, long)]
    pub octave: Option<i32>,

    /// Starting velocity
    #[arg(long)]
    pub velocity: Option<u8>,

    /// Log every MIDI note sent
    #[arg(short, long)]
    pub verbose: bool,

    /// Start in sustain mode
    #[arg(short = 'u', long)]
    pub sustain: bool,

    /// Start in monophony
    #[arg(short, long)]
    pub monophonic: bool,

    /// Print the effective keymap as TOML and exit
    #[arg(long)]
    pub print_keymap: bool,

    /// Don't open a MIDI port; log the messages instead
    #[arg(long)]
    pub dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => DeckyConfig::load(path).map_err(|e| {
            error!("Failed to load config {:?}: {:#}", path, e);
            e
        })?,
        None => DeckyConfig::default(),
    };
    config.apply_args(&args);

    let keymap = keymap_file::load_or_default(config.keymap.file.as_deref());

    if args.print_keymap {
        print!("{}", keymap_file::to_toml(&keymap)?);
        return Ok(());
    }

    let state = config.performance.to_state();

    if args.dry_run {
        return play(LoggingSink::new(&config.port.name), state, keymap);
    }

    let sink = open_sink(args.show_ports, &config.port).map_err(|e| {
        error!("Failed to open MIDI output: {:#}", e);
        e
    })?;
    play(sink, state, keymap)
}

fn open_sink(show_ports: bool, port: &PortSection) -> anyhow::Result<MidirSink> {
    let choice = if show_ports {
        ports::choose_port(&port.name)?
    } else {
        match port.index {
            Some(index) => PortChoice::Index(index),
            None => PortChoice::Virtual,
        }
    };

    match choice {
        PortChoice::Virtual => MidirSink::open_virtual(&port.name),
        PortChoice::Index(index) => MidirSink::open_port(index),
    }
}

fn play<S: MidiSink>(sink: S, state: PerformanceState, keymap: KeyMap) -> anyhow::Result<()> {
    info!("Initializing decky... press ESC to quit");

    let controller = NoteController::new(sink, state);
    InputLoop::new(controller, keymap).run(TerminalKeys::new())
}
