//! Tracking of notes that are currently sounding.
//!
//! Identity is (channel, pitch) only; velocity is not part of it. The set keeps
//! insertion order so that "oldest" and "newest" are well defined. A repeated
//! insert of a note that is already tracked keeps its original position.

/// A sounding note on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveNote {
    /// MIDI channel, 0-15
    pub channel: u8,
    /// MIDI pitch, 0-127
    pub pitch: u8,
}

impl ActiveNote {
    pub fn new(channel: u8, pitch: u8) -> Self {
        Self { channel, pitch }
    }
}

/// Insertion-ordered set of active notes. At most 16 * 128 entries, so a
/// plain vector with linear lookups is plenty.
#[derive(Debug, Clone, Default)]
pub struct ActiveNoteSet {
    notes: Vec<ActiveNote>,
}

impl ActiveNoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note. Returns false if it was already tracked.
    pub fn insert(&mut self, note: ActiveNote) -> bool {
        if self.contains(note) {
            return false;
        }
        self.notes.push(note);
        true
    }

    /// Remove a note. Returns false if it wasn't tracked.
    pub fn remove(&mut self, note: ActiveNote) -> bool {
        match self.notes.iter().position(|&n| n == note) {
            Some(index) => {
                self.notes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, note: ActiveNote) -> bool {
        self.notes.contains(&note)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Copy of the current entries, oldest first, optionally limited to one
    /// channel. Callers that turn notes off while walking use this instead of
    /// iterating the live set.
    pub fn snapshot(&self, channel: Option<u8>) -> Vec<ActiveNote> {
        self.notes
            .iter()
            .filter(|n| channel.map_or(true, |c| n.channel == c))
            .copied()
            .collect()
    }

    /// Oldest tracked note, optionally on a given channel.
    pub fn oldest(&self, channel: Option<u8>) -> Option<ActiveNote> {
        self.notes
            .iter()
            .find(|n| channel.map_or(true, |c| n.channel == c))
            .copied()
    }

    /// Newest tracked note, optionally on a given channel.
    pub fn newest(&self, channel: Option<u8>) -> Option<ActiveNote> {
        self.notes
            .iter()
            .rev()
            .find(|n| channel.map_or(true, |c| n.channel == c))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(channel: u8, pitch: u8) -> ActiveNote {
        ActiveNote::new(channel, pitch)
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = ActiveNoteSet::new();
        assert!(set.insert(n(0, 60)));
        assert!(!set.insert(n(0, 60)));
        // Same pitch on another channel is a different note
        assert!(set.insert(n(1, 60)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut set = ActiveNoteSet::new();
        set.insert(n(0, 60));
        assert!(!set.remove(n(0, 61)));
        assert!(set.remove(n(0, 60)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_oldest_newest_global() {
        let mut set = ActiveNoteSet::new();
        set.insert(n(0, 48));
        set.insert(n(1, 50));
        set.insert(n(0, 52));

        assert_eq!(set.oldest(None), Some(n(0, 48)));
        assert_eq!(set.newest(None), Some(n(0, 52)));
    }

    #[test]
    fn test_oldest_newest_per_channel() {
        let mut set = ActiveNoteSet::new();
        set.insert(n(1, 40));
        set.insert(n(0, 48));
        set.insert(n(1, 45));
        set.insert(n(0, 52));

        assert_eq!(set.oldest(Some(1)), Some(n(1, 40)));
        assert_eq!(set.newest(Some(1)), Some(n(1, 45)));
        assert_eq!(set.oldest(Some(9)), None);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut set = ActiveNoteSet::new();
        set.insert(n(0, 48));
        set.insert(n(0, 49));
        set.insert(n(0, 48));
        assert_eq!(set.oldest(None), Some(n(0, 48)));
        assert_eq!(set.newest(None), Some(n(0, 49)));
    }

    #[test]
    fn test_snapshot_filters_channel() {
        let mut set = ActiveNoteSet::new();
        set.insert(n(0, 48));
        set.insert(n(2, 50));
        set.insert(n(0, 52));

        assert_eq!(set.snapshot(Some(0)), vec![n(0, 48), n(0, 52)]);
        assert_eq!(set.snapshot(None).len(), 3);
        assert_eq!(set.snapshot(Some(2)), vec![n(2, 50)]);
    }
}
