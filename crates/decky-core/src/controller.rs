//! Note-state controller.
//!
//! Owns the MIDI sink, the performance settings and the set of notes that are
//! currently sounding. Every message the program emits goes through here, so
//! the active set is always the truth about what has to be turned off.
//!
//! The controller has no "closed" state to check: `close()` takes it by value,
//! so once it is closed there is nothing left to call.

use tracing::{debug, info};

use crate::active_notes::{ActiveNote, ActiveNoteSet};
use crate::keymap::Action;
use crate::message::{self, clamp_channel, clamp_data};
use crate::sink::MidiSink;
use crate::state::{clamp_octave, PerformanceState};
use crate::{PITCHES_PER_OCTAVE, VELOCITY_STEP};

pub struct NoteController<S: MidiSink> {
    sink: S,
    state: PerformanceState,
    active: ActiveNoteSet,
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

impl<S: MidiSink> NoteController<S> {
    pub fn new(sink: S, state: PerformanceState) -> Self {
        let state = state.clamped();

        info!(
            port = %sink.name(),
            channel = state.channel + 1,
            sustain = on_off(state.sustain),
            monophony = on_off(state.monophonic),
            octave = state.octave,
            velocity = state.velocity,
            "Controller created"
        );

        Self {
            sink,
            state,
            active: ActiveNoteSet::new(),
        }
    }

    pub fn state(&self) -> &PerformanceState {
        &self.state
    }

    pub fn active_notes(&self) -> &ActiveNoteSet {
        &self.active
    }

    // ── Notes ────────────────────────────────────────────────────────────

    /// Start a note. Out-of-range arguments are clamped.
    ///
    /// With `monophonic` set, every note on `channel` is turned off first.
    /// Without `sustain`, the note is turned off again right away.
    pub fn note_on(
        &mut self,
        channel: i32,
        pitch: i32,
        velocity: i32,
        sustain: bool,
        monophonic: bool,
    ) -> anyhow::Result<()> {
        let channel = clamp_channel(channel);
        let pitch = clamp_data(pitch);
        let velocity = clamp_data(velocity);

        if monophonic {
            self.flush_channel(channel)?;
        }

        self.sink.send(message::note_on(channel, pitch, velocity))?;

        let note = ActiveNote::new(channel, pitch);
        self.active.insert(note);
        self.log_note("Note on", note, velocity);

        if !sustain {
            self.release(note)?;
        }

        Ok(())
    }

    /// Stop a note. Stopping a note that isn't sounding still sends the
    /// message but is otherwise a no-op.
    pub fn note_off(&mut self, channel: i32, pitch: i32) -> anyhow::Result<()> {
        let note = ActiveNote::new(clamp_channel(channel), clamp_data(pitch));
        self.release(note)?;
        Ok(())
    }

    /// Play the key at `offset` semitones above the current octave using the
    /// current channel, velocity, sustain and monophony.
    pub fn play(&mut self, offset: i32) -> anyhow::Result<()> {
        let s = self.state;
        let pitch = (s.octave * PITCHES_PER_OCTAVE).saturating_add(offset);
        self.note_on(
            s.channel as i32,
            pitch,
            s.velocity as i32,
            s.sustain,
            s.monophonic,
        )
    }

    /// Turn off every sounding note. Returns how many were turned off.
    pub fn flush(&mut self) -> anyhow::Result<usize> {
        self.release_all(None)
    }

    /// Turn off every sounding note on one channel.
    pub fn flush_channel(&mut self, channel: u8) -> anyhow::Result<usize> {
        self.release_all(Some(clamp_channel(channel as i32)))
    }

    /// Turn off the note that has been sounding longest, optionally only
    /// looking at one channel. Nothing happens if there is no such note.
    pub fn steal_oldest(&mut self, channel: Option<u8>) -> anyhow::Result<Option<ActiveNote>> {
        let victim = self.active.oldest(channel);
        self.steal(victim)
    }

    /// Turn off the most recently started note, optionally only looking at
    /// one channel.
    pub fn steal_newest(&mut self, channel: Option<u8>) -> anyhow::Result<Option<ActiveNote>> {
        let victim = self.active.newest(channel);
        self.steal(victim)
    }

    fn steal(&mut self, victim: Option<ActiveNote>) -> anyhow::Result<Option<ActiveNote>> {
        if let Some(note) = victim {
            self.release(note)?;
        }
        Ok(victim)
    }

    fn release_all(&mut self, channel: Option<u8>) -> anyhow::Result<usize> {
        // Work from a copy: release() shrinks the live set
        let notes = self.active.snapshot(channel);
        for &note in &notes {
            self.release(note)?;
        }
        Ok(notes.len())
    }

    /// Send the Note Off and drop the note from the active set.
    /// Returns whether the note was being tracked.
    fn release(&mut self, note: ActiveNote) -> anyhow::Result<bool> {
        self.sink.send(message::note_off(note.channel, note.pitch))?;
        let tracked = self.active.remove(note);
        self.log_note("Note off", note, 0);
        Ok(tracked)
    }

    fn log_note(&self, what: &str, note: ActiveNote, velocity: u8) {
        if self.state.verbose {
            info!(
                channel = note.channel + 1,
                pitch = note.pitch,
                velocity,
                "{}",
                what
            );
        } else {
            debug!(
                channel = note.channel + 1,
                pitch = note.pitch,
                velocity,
                "{}",
                what
            );
        }
    }

    // ── Toggles ──────────────────────────────────────────────────────────

    pub fn toggle_sustain(&mut self) -> bool {
        self.state.sustain = !self.state.sustain;
        info!("Sustain {}", on_off(self.state.sustain));
        self.state.sustain
    }

    pub fn toggle_monophonic(&mut self) -> bool {
        self.state.monophonic = !self.state.monophonic;
        info!("Monophony {}", on_off(self.state.monophonic));
        self.state.monophonic
    }

    pub fn toggle_verbose(&mut self) -> bool {
        self.state.verbose = !self.state.verbose;
        info!("Verbose {}", on_off(self.state.verbose));
        self.state.verbose
    }

    // ── Adjustments ──────────────────────────────────────────────────────

    pub fn octave_up(&mut self) -> i32 {
        self.set_octave(self.state.octave + 1)
    }

    pub fn octave_down(&mut self) -> i32 {
        self.set_octave(self.state.octave - 1)
    }

    fn set_octave(&mut self, octave: i32) -> i32 {
        self.state.octave = clamp_octave(octave);
        info!("Octave {}", self.state.octave);
        self.state.octave
    }

    pub fn velocity_up(&mut self) -> u8 {
        self.set_velocity(self.state.velocity as i32 + VELOCITY_STEP)
    }

    pub fn velocity_down(&mut self) -> u8 {
        self.set_velocity(self.state.velocity as i32 - VELOCITY_STEP)
    }

    fn set_velocity(&mut self, velocity: i32) -> u8 {
        self.state.velocity = clamp_data(velocity);
        info!("Velocity {}", self.state.velocity);
        self.state.velocity
    }

    pub fn channel_up(&mut self) -> u8 {
        self.set_channel(self.state.channel as i32 + 1)
    }

    pub fn channel_down(&mut self) -> u8 {
        self.set_channel(self.state.channel as i32 - 1)
    }

    fn set_channel(&mut self, channel: i32) -> u8 {
        self.state.channel = clamp_channel(channel);
        info!("Using channel {}", self.state.channel + 1);
        self.state.channel
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    /// Run a control action against the current settings.
    pub fn perform(&mut self, action: Action) -> anyhow::Result<()> {
        let channel = self.state.channel;

        match action {
            Action::Flush => {
                self.flush()?;
            }
            Action::FlushChannel => {
                self.flush_channel(channel)?;
            }
            Action::ToggleSustain => {
                self.toggle_sustain();
            }
            Action::ToggleMonophonic => {
                self.toggle_monophonic();
            }
            Action::ToggleVerbose => {
                self.toggle_verbose();
            }
            Action::OctaveUp => {
                self.octave_up();
            }
            Action::OctaveDown => {
                self.octave_down();
            }
            Action::VelocityUp => {
                self.velocity_up();
            }
            Action::VelocityDown => {
                self.velocity_down();
            }
            Action::ChannelUp => {
                self.channel_up();
            }
            Action::ChannelDown => {
                self.channel_down();
            }
            Action::StealOldest => {
                self.steal_oldest(None)?;
            }
            Action::StealOldestChannel => {
                self.steal_oldest(Some(channel))?;
            }
            Action::StealNewest => {
                self.steal_newest(None)?;
            }
            Action::StealNewestChannel => {
                self.steal_newest(Some(channel))?;
            }
        }

        Ok(())
    }

    // ── Shutdown ─────────────────────────────────────────────────────────

    /// Turn everything off and release the port. The port is closed even if
    /// the flush fails part-way; the first error is returned.
    pub fn close(mut self) -> anyhow::Result<()> {
        let flushed = self.flush();
        let closed = self.sink.close();

        let count = flushed?;
        closed?;

        info!(port = %self.sink.name(), flushed = count, "Controller closed");
        Ok(())
    }
}
