//! Per-keystroke dispatch: read a key, resolve it, drive the controller.

use tracing::{debug, info};

use crate::controller::NoteController;
use crate::keymap::{Binding, KeyMap};
use crate::sink::MidiSink;
use crate::ESC;

/// Source of key presses. `read_key` blocks until a key is available.
pub trait KeyEventSource {
    fn read_key(&mut self) -> anyhow::Result<char>;
}

impl<K: KeyEventSource + ?Sized> KeyEventSource for &mut K {
    fn read_key(&mut self) -> anyhow::Result<char> {
        (**self).read_key()
    }
}

pub struct InputLoop<S: MidiSink> {
    controller: NoteController<S>,
    keymap: KeyMap,
}

impl<S: MidiSink> InputLoop<S> {
    pub fn new(controller: NoteController<S>, keymap: KeyMap) -> Self {
        Self { controller, keymap }
    }

    pub fn controller(&self) -> &NoteController<S> {
        &self.controller
    }

    /// Handle one key. Returns false when the key ends the session.
    pub fn handle_key(&mut self, key: char) -> anyhow::Result<bool> {
        if key == ESC {
            return Ok(false);
        }

        match self.keymap.resolve(key) {
            Some(Binding::Pitch(offset)) => self.controller.play(offset)?,
            Some(Binding::Action(action)) => {
                debug!(key = ?key, %action, "Action");
                self.controller.perform(action)?;
            }
            None => debug!(key = ?key, "Unbound key"),
        }

        Ok(true)
    }

    /// Read and handle keys until ESC, then close the controller.
    ///
    /// The controller is closed exactly once, also when reading a key or
    /// sending a message fails; that error is returned after the close.
    pub fn run<K: KeyEventSource>(mut self, mut keys: K) -> anyhow::Result<()> {
        info!("Controller is ready");

        let result = loop {
            let key = match keys.read_key() {
                Ok(key) => key,
                Err(e) => break Err(e),
            };
            match self.handle_key(key) {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        let closed = self.controller.close();
        result?;
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Action;
    use crate::sink::RecordingSink;
    use crate::state::PerformanceState;
    use std::collections::VecDeque;

    struct Keys(VecDeque<char>);

    impl KeyEventSource for Keys {
        fn read_key(&mut self) -> anyhow::Result<char> {
            self.0
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("out of keys"))
        }
    }

    fn keys(s: &str) -> Keys {
        Keys(s.chars().collect())
    }

    fn input_loop(state: PerformanceState) -> (InputLoop<RecordingSink>, RecordingSink) {
        let probe = RecordingSink::new();
        let ctl = NoteController::new(probe.clone(), state);
        (InputLoop::new(ctl, KeyMap::default()), probe)
    }

    #[test]
    fn test_pitch_key_plays_at_octave() {
        let (mut lp, probe) = input_loop(PerformanceState::default());
        assert!(lp.handle_key('q').unwrap());
        // q = offset 12, octave 4 -> 60
        assert_eq!(probe.sent(), vec![[0x90, 60, 127], [0x90, 60, 0]]);
    }

    #[test]
    fn test_action_key_runs_action() {
        let (mut lp, _) = input_loop(PerformanceState::default());
        lp.handle_key('=').unwrap();
        lp.handle_key('\'').unwrap();
        assert_eq!(lp.controller().state().octave, 5);
        assert!(lp.controller().state().sustain);
    }

    #[test]
    fn test_unbound_key_ignored() {
        let (mut lp, probe) = input_loop(PerformanceState::default());
        assert!(lp.handle_key('a').unwrap());
        assert!(probe.sent().is_empty());
    }

    #[test]
    fn test_escape_stops() {
        let (mut lp, _) = input_loop(PerformanceState::default());
        assert!(!lp.handle_key(ESC).unwrap());
    }

    #[test]
    fn test_run_closes_once_on_escape() {
        let (lp, probe) = input_loop(PerformanceState::default());
        lp.run(keys("zs\u{1b}")).unwrap();
        assert_eq!(probe.close_count(), 1);
        assert_eq!(probe.sent().len(), 4);
    }

    #[test]
    fn test_run_closes_on_read_error() {
        let (lp, probe) = input_loop(PerformanceState {
            sustain: true,
            ..Default::default()
        });

        // No ESC: the source runs dry and errors
        assert!(lp.run(keys("z")).is_err());
        assert_eq!(probe.close_count(), 1);
        assert_eq!(probe.sent(), vec![[0x90, 48, 127], [0x90, 48, 0]]);
    }

    #[test]
    fn test_pitch_binding_shadows_action() {
        let probe = RecordingSink::new();
        let ctl = NoteController::new(probe.clone(), PerformanceState::default());
        let keymap = KeyMap::new(
            [('k', 0)].into_iter().collect(),
            [('k', Action::OctaveUp)].into_iter().collect(),
        );
        let mut lp = InputLoop::new(ctl, keymap);

        lp.handle_key('k').unwrap();
        assert_eq!(lp.controller().state().octave, 4);
        assert_eq!(probe.sent().len(), 2);
    }
}
