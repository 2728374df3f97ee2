//! MIDI output ports for the decky controller.
//!
//! `MidirSink` talks to the operating system's MIDI layer through midir,
//! either as a virtual port other applications can subscribe to or as a
//! connection to an existing output port. `LoggingSink` stands in for a port
//! when running without MIDI (`--dry-run`).

pub mod logging;
pub mod midir_sink;

pub use logging::LoggingSink;
pub use midir_sink::{list_output_ports, MidirSink};

/// Client name registered with the MIDI subsystem
pub const CLIENT_NAME: &str = "decky";

/// Default name for the virtual output port
pub const DEFAULT_PORT_NAME: &str = "decky MIDI-Out";
