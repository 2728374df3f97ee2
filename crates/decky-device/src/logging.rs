//! Sink that only logs what would have been sent.

use tracing::info;

use decky_core::message;
use decky_core::MidiSink;

pub struct LoggingSink {
    name: String,
    sent: usize,
    closed: bool,
}

impl LoggingSink {
    pub fn new(name: &str) -> Self {
        info!(port = %name, "Dry run: no MIDI port opened");
        Self {
            name: name.to_string(),
            sent: 0,
            closed: false,
        }
    }
}

impl MidiSink for LoggingSink {
    fn send(&mut self, message: [u8; 3]) -> anyhow::Result<()> {
        if self.closed {
            anyhow::bail!("Dry-run port '{}' is closed", self.name);
        }

        match message::decode(message) {
            Some((channel, pitch, 0)) => info!(channel = channel + 1, pitch, "MIDI note off"),
            Some((channel, pitch, velocity)) => {
                info!(channel = channel + 1, pitch, velocity, "MIDI note on")
            }
            None => info!(bytes = ?message, "MIDI"),
        }

        self.sent += 1;
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.closed = true;
        info!(port = %self.name, messages = self.sent, "Dry run finished");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
