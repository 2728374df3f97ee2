pub mod active_notes;
pub mod controller;
pub mod input_loop;
pub mod keymap;
pub mod message;
pub mod sink;
pub mod state;

/// Note On status byte (channel in the low nibble)
pub const NOTE_ON: u8 = 0x90;

/// Largest value a MIDI data byte may carry
pub const DATA_BYTE_MAX: u8 = 127;

/// Number of MIDI channels
pub const NUM_CHANNELS: u8 = 16;

/// Semitones per octave, used to turn an octave + key offset into a pitch
pub const PITCHES_PER_OCTAVE: i32 = 12;

/// Octave range accepted by the controller
pub const MIN_OCTAVE: i32 = 0;
pub const MAX_OCTAVE: i32 = 10;

/// Amount velocityUp / velocityDown move the velocity by
pub const VELOCITY_STEP: i32 = 16;

/// Key that ends the input loop (ASCII ESC)
pub const ESC: char = '\u{1b}';

pub use active_notes::{ActiveNote, ActiveNoteSet};
pub use controller::NoteController;
pub use input_loop::{InputLoop, KeyEventSource};
pub use keymap::{Action, Binding, KeyMap};
pub use sink::{MidiSink, RecordingSink};
pub use state::PerformanceState;
