//! Persisted trial format.
//!
//! A [`TrialRecord`] stores the RNG checkpoint the game started from, the
//! number of setup moves, every move as a list of actions, and the
//! `state_hash` reached after each one. Replaying the record against a
//! fresh context must reproduce every hash.
//!
//! The binary encoding is `bincode` over the serde derive, so it is
//! bit-exact for a given crate version.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{Action, Context, EngineError, GameRngState, Move, PlayerId, Result};
use crate::rules::Game;

use super::Trial;

/// One recorded move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub mover: PlayerId,
    pub decision: bool,
    pub from: Option<usize>,
    pub to: Option<usize>,
    pub actions: Vec<Action>,
}

impl From<&Move> for MoveRecord {
    fn from(mv: &Move) -> Self {
        Self {
            mover: mv.mover,
            decision: mv.decision,
            from: mv.from,
            to: mv.to,
            actions: mv.actions.to_vec(),
        }
    }
}

impl MoveRecord {
    /// Rebuild the move.
    #[must_use]
    pub fn to_move(&self) -> Move {
        let mut mv = Move::from_actions(self.mover, self.actions.iter().cloned());
        mv.decision = self.decision;
        mv.from = self.from;
        mv.to = self.to;
        mv
    }
}

/// Serializable history of one trial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub rng_start: GameRngState,
    pub num_setup_moves: usize,
    pub moves: Vec<MoveRecord>,
    pub hashes: Vec<u64>,
}

impl TrialRecord {
    /// Capture a trial.
    #[must_use]
    pub fn from_trial(trial: &Trial) -> Self {
        Self {
            rng_start: trial.rng_start().clone(),
            num_setup_moves: trial.num_setup_moves(),
            moves: trial
                .generate_complete_moves_list()
                .iter()
                .map(MoveRecord::from)
                .collect(),
            hashes: trial.state_hashes().iter().copied().collect(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Replay against a fresh context, checking every recorded hash.
    ///
    /// Setup moves are produced by the game's start rules and only their
    /// hashes are checked.
    pub fn replay(&self, game: &Arc<Game>) -> Result<Context> {
        let mut ctx = Context::from_rng_state(Arc::clone(game), &self.rng_start);
        ctx.trial.null_undo_data();

        if ctx.trial.num_setup_moves() != self.num_setup_moves {
            return Err(EngineError::InvalidGame(format!(
                "record has {} setup moves, game start produced {}",
                self.num_setup_moves,
                ctx.trial.num_setup_moves()
            )));
        }
        for (index, expected) in self.hashes.iter().take(self.num_setup_moves).enumerate() {
            check_hash(index, *expected, ctx.trial.state_hashes()[index])?;
        }

        for (index, record) in self.moves.iter().enumerate().skip(self.num_setup_moves) {
            game.apply(&mut ctx, record.to_move())?;
            let expected = self.hashes.get(index).copied().unwrap_or_default();
            check_hash(index, expected, ctx.state.state_hash())?;
        }
        Ok(ctx)
    }
}

fn check_hash(index: usize, expected: u64, actual: u64) -> Result<()> {
    if expected == actual {
        return Ok(());
    }
    warn!(index, expected, actual, "replay diverged");
    Err(EngineError::ReplayDiverged {
        index,
        expected,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameRng;

    #[test]
    fn test_move_record_conversion() {
        let p2 = PlayerId::new(2);
        let mut mv = Move::add(p2, 7, p2, 1).decided();
        mv.from = Some(3);

        let record = MoveRecord::from(&mv);
        assert_eq!(record.actions.len(), 1);
        assert_eq!(record.to_move(), mv);
    }

    #[test]
    fn test_bytes_round_trip() {
        let p1 = PlayerId::new(1);
        let mut trial = Trial::new(GameRng::new(4).state());
        trial.add_move(Move::add(p1, 0, p1, 1).decided(), 99);

        let record = TrialRecord::from_trial(&trial);
        let bytes = record.to_bytes().unwrap();
        assert_eq!(TrialRecord::from_bytes(&bytes).unwrap(), record);
    }

    #[test]
    fn test_truncated_bytes_are_a_codec_error() {
        let record = TrialRecord::from_trial(&Trial::new(GameRng::new(4).state()));
        let bytes = record.to_bytes().unwrap();

        let err = TrialRecord::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, EngineError::Codec(_)));
    }
}
