//! Live performance settings owned by the controller.

use crate::message::{clamp_channel, clamp_data};
use crate::{DATA_BYTE_MAX, MAX_OCTAVE, MIN_OCTAVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceState {
    /// Current channel, 0-indexed (0-15)
    pub channel: u8,
    /// Current octave (0-10); pitch = octave * 12 + key offset
    pub octave: i32,
    /// Velocity used for new notes (0-127)
    pub velocity: u8,
    /// Keep notes sounding until they are explicitly turned off
    pub sustain: bool,
    /// Silence the channel before every new note
    pub monophonic: bool,
    /// Log every note on/off
    pub verbose: bool,
}

impl Default for PerformanceState {
    fn default() -> Self {
        Self {
            channel: 0,
            octave: 4,
            velocity: DATA_BYTE_MAX,
            sustain: false,
            monophonic: false,
            verbose: false,
        }
    }
}

impl PerformanceState {
    /// Bring every field back into its legal range.
    pub fn clamped(self) -> Self {
        Self {
            channel: clamp_channel(self.channel as i32),
            octave: clamp_octave(self.octave),
            velocity: clamp_data(self.velocity as i32),
            ..self
        }
    }
}

pub fn clamp_octave(octave: i32) -> i32 {
    octave.clamp(MIN_OCTAVE, MAX_OCTAVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = PerformanceState::default();
        assert_eq!(state.channel, 0);
        assert_eq!(state.octave, 4);
        assert_eq!(state.velocity, 127);
        assert!(!state.sustain);
        assert!(!state.monophonic);
        assert!(!state.verbose);
    }

    #[test]
    fn test_clamped() {
        let state = PerformanceState {
            channel: 20,
            octave: -2,
            velocity: 200,
            sustain: true,
            ..Default::default()
        }
        .clamped();

        assert_eq!(state.channel, 15);
        assert_eq!(state.octave, 0);
        assert_eq!(state.velocity, 127);
        assert!(state.sustain);
    }

    #[test]
    fn test_clamp_octave() {
        assert_eq!(clamp_octave(11), 10);
        assert_eq!(clamp_octave(5), 5);
    }
}
