//! Wire encoding for the only message the controller emits.
//! Note Off is sent as Note On with velocity 0, so every message is
//! `[0x90 | channel, pitch, velocity]`.

use crate::{DATA_BYTE_MAX, NOTE_ON, NUM_CHANNELS};

/// Clamp any integer into a MIDI channel (0-15).
pub fn clamp_channel(channel: i32) -> u8 {
    channel.clamp(0, NUM_CHANNELS as i32 - 1) as u8
}

/// Clamp any integer into a MIDI data byte (0-127). Used for pitch and velocity.
pub fn clamp_data(value: i32) -> u8 {
    value.clamp(0, DATA_BYTE_MAX as i32) as u8
}

/// Build a Note On message. Inputs are assumed already clamped.
pub fn note_on(channel: u8, pitch: u8, velocity: u8) -> [u8; 3] {
    [NOTE_ON | (channel & 0x0F), pitch & 0x7F, velocity & 0x7F]
}

/// Build a Note Off message (Note On, velocity 0).
pub fn note_off(channel: u8, pitch: u8) -> [u8; 3] {
    note_on(channel, pitch, 0)
}

/// Split a message back into (channel, pitch, velocity).
/// Returns None for anything that isn't a Note On.
pub fn decode(message: [u8; 3]) -> Option<(u8, u8, u8)> {
    if message[0] & 0xF0 != NOTE_ON {
        return None;
    }
    Some((message[0] & 0x0F, message[1], message[2]))
}
