//! midir-backed MIDI output.
//!
//! Virtual ports are only available on Unix (ALSA / CoreMIDI); elsewhere the
//! caller has to pick an existing port by index.

use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, info};

use decky_core::MidiSink;

use crate::CLIENT_NAME;

pub struct MidirSink {
    name: String,
    connection: Option<MidiOutputConnection>,
}

fn midi_output() -> anyhow::Result<MidiOutput> {
    MidiOutput::new(CLIENT_NAME)
        .map_err(|e| anyhow::anyhow!("Failed to initialize MIDI output: {}", e))
}

/// Names of the output ports currently available, in index order.
pub fn list_output_ports() -> anyhow::Result<Vec<String>> {
    let midi_out = midi_output()?;
    let names = midi_out
        .ports()
        .iter()
        .map(|port| {
            midi_out
                .port_name(port)
                .unwrap_or_else(|_| "<unknown>".to_string())
        })
        .collect();
    Ok(names)
}

impl MidirSink {
    /// Create a virtual output port named `port_name`.
    #[cfg(unix)]
    pub fn open_virtual(port_name: &str) -> anyhow::Result<Self> {
        use midir::os::unix::VirtualOutput;

        let connection = midi_output()?
            .create_virtual(port_name)
            .map_err(|e| anyhow::anyhow!("Failed to create virtual port '{}': {}", port_name, e))?;

        info!(port = %port_name, "Virtual MIDI port created");

        Ok(Self {
            name: port_name.to_string(),
            connection: Some(connection),
        })
    }

    #[cfg(not(unix))]
    pub fn open_virtual(port_name: &str) -> anyhow::Result<Self> {
        anyhow::bail!(
            "Virtual MIDI ports are not supported on this platform ('{}'); pick an existing port with --showports",
            port_name
        )
    }

    /// Connect to the output port at `index` in `list_output_ports()`.
    pub fn open_port(index: usize) -> anyhow::Result<Self> {
        let midi_out = midi_output()?;
        let ports = midi_out.ports();
        let port = ports.get(index).ok_or_else(|| {
            anyhow::anyhow!("No MIDI output port at index {} ({} available)", index, ports.len())
        })?;

        let name = midi_out
            .port_name(port)
            .map_err(|e| anyhow::anyhow!("Failed to read port name: {}", e))?;

        let connection = midi_out
            .connect(port, CLIENT_NAME)
            .map_err(|e| anyhow::anyhow!("Failed to connect to '{}': {}", name, e))?;

        info!(port = %name, index, "Connected to MIDI output port");

        Ok(Self {
            name,
            connection: Some(connection),
        })
    }
}

impl MidiSink for MidirSink {
    fn send(&mut self, message: [u8; 3]) -> anyhow::Result<()> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("MIDI port '{}' is closed", self.name))?;

        connection
            .send(&message)
            .map_err(|e| anyhow::anyhow!("Failed to send MIDI message: {}", e))?;

        debug!(bytes = ?message, "Sent MIDI");
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.close();
            info!(port = %self.name, "MIDI port closed");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
