//! Keymap files.
//!
//! A keymap file has a `[pitch]` table (key -> semitone offset) and an
//! `[actions]` table (key -> action name). Keys are one-character strings.
//! TOML by default; `.json` files are read as JSON with the same shape.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use decky_core::{Action, KeyMap, ESC};

/// Directory searched for keymap files given by bare name
pub const KEYMAP_DIR: &str = "keymaps";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeymapFile {
    #[serde(default)]
    pub pitch: BTreeMap<String, i32>,
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
}

fn key_char(key: &str) -> anyhow::Result<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => anyhow::bail!(
            "keymap key \"{}\" must be exactly one character",
            key.escape_debug()
        ),
    }
}

impl KeymapFile {
    pub fn into_keymap(self) -> anyhow::Result<KeyMap> {
        let pitches = self
            .pitch
            .iter()
            .map(|(k, &offset)| -> anyhow::Result<(char, i32)> { Ok((key_char(k)?, offset)) })
            .collect::<anyhow::Result<HashMap<_, _>>>()?;

        let actions = self
            .actions
            .iter()
            .map(|(k, &action)| -> anyhow::Result<(char, Action)> { Ok((key_char(k)?, action)) })
            .collect::<anyhow::Result<HashMap<_, _>>>()?;

        let keymap = KeyMap::new(pitches, actions);

        for key in keymap.shadowed_actions() {
            warn!(key = ?key, "Key is bound to both a pitch and an action; the pitch wins");
        }
        if keymap.resolve(ESC).is_some() {
            warn!("ESC is bound in the keymap but always quits");
        }

        Ok(keymap)
    }

    pub fn from_keymap(keymap: &KeyMap) -> Self {
        Self {
            pitch: keymap
                .pitches()
                .iter()
                .map(|(k, &v)| (k.to_string(), v))
                .collect(),
            actions: keymap
                .actions()
                .iter()
                .map(|(k, &v)| (k.to_string(), v))
                .collect(),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

/// Parse keymap file contents; `json` picks the format.
pub fn parse(contents: &str, json: bool) -> anyhow::Result<KeyMap> {
    let file: KeymapFile = if json {
        serde_json::from_str(contents)?
    } else {
        toml::from_str(contents)?
    };
    file.into_keymap()
}

/// Find a keymap file: the path as given, then under `keymaps/` in the
/// working directory, then under `keymaps/` next to the executable.
pub fn find(name: &Path) -> Option<PathBuf> {
    if name.is_file() {
        return Some(name.to_path_buf());
    }

    let mut candidates = vec![Path::new(KEYMAP_DIR).join(name)];
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(KEYMAP_DIR).join(name));
    }

    candidates.into_iter().find(|p| p.is_file())
}

pub fn load(name: &Path) -> anyhow::Result<KeyMap> {
    let path = find(name)
        .ok_or_else(|| anyhow::anyhow!("could not find {}", name.display()))?;
    let contents = std::fs::read_to_string(&path)?;
    let keymap = parse(&contents, is_json(&path))?;

    info!(
        path = %path.display(),
        pitches = keymap.pitches().len(),
        actions = keymap.actions().len(),
        "Keymap loaded"
    );
    Ok(keymap)
}

/// Load the named keymap, falling back to the built-in one if there is no
/// name or the file can't be used.
pub fn load_or_default(name: Option<&Path>) -> KeyMap {
    let Some(name) = name else {
        return KeyMap::default();
    };

    match load(name) {
        Ok(keymap) => keymap,
        Err(e) => {
            warn!("Error loading keymap {}: {:#}. Using defaults...", name.display(), e);
            KeyMap::default()
        }
    }
}

/// Render a keymap in the TOML file format.
pub fn to_toml(keymap: &KeyMap) -> anyhow::Result<String> {
    Ok(toml::to_string(&KeymapFile::from_keymap(keymap))?)
}
