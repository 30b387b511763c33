use crate::types::PlayerName;
use std::collections::HashSet;

/// Players who have completed the current round's action
#[derive(Debug, Clone, Default)]
pub struct LockInTracker {
    locked_in: HashSet<PlayerName>,
}

impl LockInTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lock-in. Returns false if the player was already locked in.
    pub fn lock_in(&mut self, name: &str) -> bool {
        self.locked_in.insert(name.to_string())
    }

    pub fn already_locked_in(&self, name: &str) -> bool {
        self.locked_in.contains(name)
    }

    /// Everyone eligible has acted
    pub fn is_round_complete(&self, eligible_players: usize) -> bool {
        self.locked_in.len() == eligible_players
    }

    pub fn len(&self) -> usize {
        self.locked_in.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked_in.is_empty()
    }

    /// Locked-in names, sorted for stable output
    pub fn names(&self) -> Vec<PlayerName> {
        let mut names: Vec<_> = self.locked_in.iter().cloned().collect();
        names.sort();
        names
    }

    pub fn reset(&mut self) {
        self.locked_in.clear();
    }
}
