//! On-disk configuration and how command-line flags layer over it.
//!
//! Precedence: built-in defaults, then the config file, then flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use decky_core::message::clamp_channel;
use decky_core::PerformanceState;
use decky_device::DEFAULT_PORT_NAME;

use crate::Args;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckyConfig {
    #[serde(default)]
    pub port: PortSection,
    #[serde(default)]
    pub performance: PerformanceSection,
    #[serde(default)]
    pub keymap: KeymapSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortSection {
    /// Virtual port name
    #[serde(default = "default_port_name")]
    pub name: String,
    /// Connect to this existing output port instead of creating a virtual one
    #[serde(default)]
    pub index: Option<usize>,
}

impl Default for PortSection {
    fn default() -> Self {
        Self {
            name: default_port_name(),
            index: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceSection {
    /// 1-indexed, as printed on hardware
    #[serde(default = "default_channel")]
    pub channel: u8,
    #[serde(default = "default_octave")]
    pub octave: i32,
    #[serde(default = "default_velocity")]
    pub velocity: u8,
    #[serde(default)]
    pub sustain: bool,
    #[serde(default)]
    pub monophonic: bool,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for PerformanceSection {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            octave: default_octave(),
            velocity: default_velocity(),
            sustain: false,
            monophonic: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeymapSection {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// Default value functions
fn default_port_name() -> String { DEFAULT_PORT_NAME.to_string() }
fn default_channel() -> u8 { 1 }
fn default_octave() -> i32 { 4 }
fn default_velocity() -> u8 { 127 }

impl DeckyConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Let command-line flags override what the file said.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(name) = &args.port_name {
            self.port.name = name.clone();
        }
        if let Some(file) = &args.map_file {
            self.keymap.file = Some(file.clone());
        }

        let perf = &mut self.performance;
        if let Some(channel) = args.channel {
            perf.channel = channel;
        }
        if let Some(octave) = args.octave {
            perf.octave = octave;
        }
        if let Some(velocity) = args.velocity {
            perf.velocity = velocity;
        }
        // Switches can only turn a mode on
        perf.sustain |= args.sustain;
        perf.monophonic |= args.monophonic;
        perf.verbose |= args.verbose;
    }
}

impl PerformanceSection {
    /// Controller settings, with the channel converted to 0-indexed and
    /// everything clamped into range.
    pub fn to_state(&self) -> PerformanceState {
        PerformanceState {
            channel: clamp_channel(self.channel as i32 - 1),
            octave: self.octave,
            velocity: self.velocity,
            sustain: self.sustain,
            monophonic: self.monophonic,
            verbose: self.verbose,
        }
        .clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = DeckyConfig::from_toml_str("").unwrap();
        assert_eq!(config.port.name, "decky MIDI-Out");
        assert_eq!(config.port.index, None);
        assert!(config.keymap.file.is_none());
        assert_eq!(config.performance.to_state(), PerformanceState::default());
    }

    #[test]
    fn test_full_file() {
        let config = DeckyConfig::from_toml_str(
            r#"
            [port]
            name = "Stage Keys"
            index = 2

            [performance]
            channel = 10
            octave = 3
            velocity = 90
            sustain = true
            monophonic = true

            [keymap]
            file = "keymaps/piano.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.port.name, "Stage Keys");
        assert_eq!(config.port.index, Some(2));
        assert_eq!(config.keymap.file, Some(PathBuf::from("keymaps/piano.toml")));

        let state = config.performance.to_state();
        assert_eq!(state.channel, 9);
        assert_eq!(state.octave, 3);
        assert_eq!(state.velocity, 90);
        assert!(state.sustain);
        assert!(state.monophonic);
        assert!(!state.verbose);
    }

    #[test]
    fn test_bad_type_rejected() {
        assert!(DeckyConfig::from_toml_str("[performance]\noctave = \"high\"").is_err());
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let config = DeckyConfig::from_toml_str(
            "[performance]\nchannel = 0\noctave = 42\nvelocity = 200",
        )
        .unwrap();
        let state = config.performance.to_state();
        assert_eq!(state.channel, 0);
        assert_eq!(state.octave, 10);
        assert_eq!(state.velocity, 127);
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = DeckyConfig::from_toml_str(
            "[port]\nname = \"From File\"\n[performance]\nchannel = 3\noctave = 2",
        )
        .unwrap();
        let args = Args::parse_from(["decky", "-p", "From Flag", "-c", "5", "-u", "-f", "jazz.toml"]);

        config.apply_args(&args);

        assert_eq!(config.port.name, "From Flag");
        assert_eq!(config.keymap.file, Some(PathBuf::from("jazz.toml")));
        let state = config.performance.to_state();
        assert_eq!(state.channel, 4);
        // Not given on the command line, so the file wins
        assert_eq!(state.octave, 2);
        assert!(state.sustain);
        assert!(!state.monophonic);
    }
}
