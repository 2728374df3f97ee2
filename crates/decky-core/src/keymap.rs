//! Key bindings: which keys play pitches and which keys run control actions.
//!
//! A `KeyMap` is built once (from the defaults or from a keymap file by the
//! caller) and never changes afterwards. Action names are resolved into the
//! closed `Action` enum when the map is built, so a bad name is rejected up
//! front instead of being looked up on every key press.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Control actions a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    Flush,
    FlushChannel,
    ToggleSustain,
    ToggleMonophonic,
    ToggleVerbose,
    OctaveUp,
    OctaveDown,
    VelocityUp,
    VelocityDown,
    ChannelUp,
    ChannelDown,
    /// Turn off the oldest sounding note on any channel
    StealOldest,
    /// Turn off the oldest sounding note on the current channel
    StealOldestChannel,
    /// Turn off the newest sounding note on any channel
    StealNewest,
    /// Turn off the newest sounding note on the current channel
    StealNewestChannel,
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::Flush,
        Action::FlushChannel,
        Action::ToggleSustain,
        Action::ToggleMonophonic,
        Action::ToggleVerbose,
        Action::OctaveUp,
        Action::OctaveDown,
        Action::VelocityUp,
        Action::VelocityDown,
        Action::ChannelUp,
        Action::ChannelDown,
        Action::StealOldest,
        Action::StealOldestChannel,
        Action::StealNewest,
        Action::StealNewestChannel,
    ];

    /// Name used in keymap files.
    pub fn name(self) -> &'static str {
        match self {
            Action::Flush => "flush",
            Action::FlushChannel => "flushChannel",
            Action::ToggleSustain => "toggleSustain",
            Action::ToggleMonophonic => "toggleMonophonic",
            Action::ToggleVerbose => "toggleVerbose",
            Action::OctaveUp => "octaveUp",
            Action::OctaveDown => "octaveDown",
            Action::VelocityUp => "velocityUp",
            Action::VelocityDown => "velocityDown",
            Action::ChannelUp => "channelUp",
            Action::ChannelDown => "channelDown",
            Action::StealOldest => "stealOldest",
            Action::StealOldestChannel => "stealOldestChannel",
            Action::StealNewest => "stealNewest",
            Action::StealNewestChannel => "stealNewestChannel",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(action) = Action::ALL.iter().find(|a| a.name() == s) {
            return Ok(*action);
        }

        // Older keymaps call the steal actions "noteOff..."
        match s {
            "noteOffOldest" => Ok(Action::StealOldest),
            "noteOffOldestChannel" => Ok(Action::StealOldestChannel),
            "noteOffNewest" => Ok(Action::StealNewest),
            "noteOffNewestChannel" => Ok(Action::StealNewestChannel),
            _ => Err(format!("unknown action '{}'", s)),
        }
    }
}

impl TryFrom<String> for Action {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.name().to_string()
    }
}

/// What a key resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Semitone offset from the start of the current octave
    Pitch(i32),
    Action(Action),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyMap {
    pitches: HashMap<char, i32>,
    actions: HashMap<char, Action>,
}

impl KeyMap {
    pub fn new(pitches: HashMap<char, i32>, actions: HashMap<char, Action>) -> Self {
        Self { pitches, actions }
    }

    /// Resolve a key. Pitch bindings win over action bindings.
    pub fn resolve(&self, key: char) -> Option<Binding> {
        self.pitch_offset(key)
            .map(Binding::Pitch)
            .or_else(|| self.action(key).map(Binding::Action))
    }

    pub fn pitch_offset(&self, key: char) -> Option<i32> {
        self.pitches.get(&key).copied()
    }

    pub fn action(&self, key: char) -> Option<Action> {
        self.actions.get(&key).copied()
    }

    pub fn pitches(&self) -> &HashMap<char, i32> {
        &self.pitches
    }

    pub fn actions(&self) -> &HashMap<char, Action> {
        &self.actions
    }

    /// Keys bound in both tables. These always play their pitch.
    pub fn shadowed_actions(&self) -> Vec<char> {
        let mut keys: Vec<char> = self
            .actions
            .keys()
            .filter(|k| self.pitches.contains_key(k))
            .copied()
            .collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for KeyMap {
    /// Two piano rows: z-row starting at C of the current octave, q-row one
    /// octave up. Controls sit on the punctuation keys.
    fn default() -> Self {
        let pitches = [
            ('z', 0),
            ('s', 1),
            ('x', 2),
            ('d', 3),
            ('c', 4),
            ('v', 5),
            ('g', 6),
            ('b', 7),
            ('h', 8),
            ('n', 9),
            ('j', 10),
            ('m', 11),
            (',', 12),
            ('l', 13),
            ('.', 14),
            (';', 15),
            ('/', 16),
            ('q', 12),
            ('2', 13),
            ('w', 14),
            ('3', 15),
            ('e', 16),
            ('r', 17),
            ('5', 18),
            ('t', 19),
            ('6', 20),
            ('y', 21),
            ('7', 22),
            ('u', 23),
            ('i', 24),
            ('9', 25),
            ('o', 26),
            ('0', 27),
            ('p', 28),
        ];

        let actions = [
            ('\t', Action::Flush),
            ('\'', Action::ToggleSustain),
            ('"', Action::ToggleMonophonic),
            ('`', Action::ToggleVerbose),
            ('[', Action::StealNewest),
            (']', Action::StealOldest),
            ('<', Action::StealNewestChannel),
            ('>', Action::StealOldestChannel),
            ('\\', Action::FlushChannel),
            ('-', Action::OctaveDown),
            ('=', Action::OctaveUp),
            ('{', Action::VelocityDown),
            ('}', Action::VelocityUp),
            ('_', Action::ChannelDown),
            ('+', Action::ChannelUp),
        ];

        Self::new(
            pitches.into_iter().collect(),
            actions.into_iter().collect(),
        )
    }
}
