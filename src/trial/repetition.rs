//! Sets of hashes seen during a game, for repetition rules.

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

use crate::core::{RepetitionKind, RepetitionRule, RepetitionScope};

type HashSet = im::HashSet<u64, BuildHasherDefault<FxHasher>>;

/// Positional and situational hashes, game-long and since the last change
/// of mover.
///
/// Persistent sets, so temporary trials and undo snapshots share storage.
#[derive(Clone, Debug, Default)]
pub struct RepetitionHistory {
    positional: HashSet,
    situational: HashSet,
    positional_in_turn: HashSet,
    situational_in_turn: HashSet,
}

impl RepetitionHistory {
    /// Record a reached state. `new_turn` starts a fresh in-turn history.
    pub fn record(&mut self, state_hash: u64, full_hash: u64, new_turn: bool) {
        if new_turn {
            self.positional_in_turn = HashSet::default();
            self.situational_in_turn = HashSet::default();
        }
        self.positional.insert(state_hash);
        self.situational.insert(full_hash);
        self.positional_in_turn.insert(state_hash);
        self.situational_in_turn.insert(full_hash);
    }

    /// True if the state with these hashes repeats under `rule`.
    #[must_use]
    pub fn contains(&self, rule: RepetitionRule, state_hash: u64, full_hash: u64) -> bool {
        match (rule.kind, rule.scope) {
            (RepetitionKind::Positional, RepetitionScope::Game) => self.positional.contains(&state_hash),
            (RepetitionKind::Situational, RepetitionScope::Game) => self.situational.contains(&full_hash),
            (RepetitionKind::Positional, RepetitionScope::Turn) => {
                self.positional_in_turn.contains(&state_hash)
            }
            (RepetitionKind::Situational, RepetitionScope::Turn) => {
                self.situational_in_turn.contains(&full_hash)
            }
        }
    }

    /// Number of distinct positions seen this game.
    #[must_use]
    pub fn positions_seen(&self) -> usize {
        self.positional.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_and_turn_scopes() {
        let mut history = RepetitionHistory::default();
        history.record(1, 10, true);
        history.record(2, 20, false);
        history.record(3, 30, true);

        let positional = RepetitionRule::positional();
        assert!(history.contains(positional, 1, 0));
        assert!(!history.contains(positional.in_turn(), 1, 0));
        assert!(history.contains(positional.in_turn(), 3, 0));

        let situational = RepetitionRule::situational();
        assert!(history.contains(situational, 0, 20));
        assert!(!history.contains(situational, 20, 0));
        assert_eq!(history.positions_seen(), 3);
    }

    #[test]
    fn test_clones_are_independent() {
        let mut a = RepetitionHistory::default();
        a.record(1, 1, true);
        let mut b = a.clone();
        b.record(2, 2, false);

        assert!(!a.contains(RepetitionRule::positional(), 2, 2));
        assert!(b.contains(RepetitionRule::positional(), 1, 1));
    }
}
