//! Output side of the controller.
//!
//! The controller only needs to push 3-byte messages and to close the port
//! when it is done. Real ports live in `decky-device`; `RecordingSink` keeps
//! everything in memory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Trait for anything that can receive the controller's MIDI messages.
pub trait MidiSink {
    /// Send one message: `[status, data1, data2]`.
    fn send(&mut self, message: [u8; 3]) -> anyhow::Result<()>;

    /// Release the port. Called exactly once, after the final flush.
    fn close(&mut self) -> anyhow::Result<()>;

    /// Port name, for logs.
    fn name(&self) -> &str;
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send(&mut self, message: [u8; 3]) -> anyhow::Result<()> {
        (**self).send(message)
    }

    fn close(&mut self) -> anyhow::Result<()> {
        (**self).close()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[derive(Debug, Default)]
struct Recording {
    sent: Vec<[u8; 3]>,
    close_count: usize,
}

/// In-memory sink. Clones share the same log, so a test can keep one handle
/// while the controller owns (and eventually closes) the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored; the log itself is never left half-written.
    fn recording(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every message sent so far, in order.
    pub fn sent(&self) -> Vec<[u8; 3]> {
        self.recording().sent.clone()
    }

    /// Forget the messages sent so far.
    pub fn clear(&self) {
        self.recording().sent.clear();
    }

    /// How many times `close()` was called.
    pub fn close_count(&self) -> usize {
        self.recording().close_count
    }
}

impl MidiSink for RecordingSink {
    fn send(&mut self, message: [u8; 3]) -> anyhow::Result<()> {
        let mut r = self.recording();
        if r.close_count > 0 {
            anyhow::bail!("send on closed recording sink");
        }
        r.sent.push(message);
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.recording().close_count += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
