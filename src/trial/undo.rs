//! Per-ply undo snapshots.

use crate::core::{Context, GameRngState, Move, State};

use super::{RepetitionHistory, Status};

/// Everything needed to take back one ply.
#[derive(Clone, Debug)]
pub struct UndoData {
    state: State,
    rng: GameRngState,
    status: Option<Status>,
    legal_moves: Option<Vec<Move>>,
    repetition: RepetitionHistory,
    consecutive_passes: usize,
}

impl UndoData {
    /// Snapshot `ctx` before a move is applied.
    #[must_use]
    pub fn capture(ctx: &Context) -> Self {
        Self {
            state: ctx.state.clone(),
            rng: ctx.rng().state(),
            status: ctx.trial.status().copied(),
            legal_moves: ctx.trial.legal_moves().map(<[Move]>::to_vec),
            repetition: ctx.trial.repetition().clone(),
            consecutive_passes: ctx.trial.consecutive_passes(),
        }
    }

    /// Put the snapshot back into `ctx`. The move list is left alone.
    pub fn restore(self, ctx: &mut Context) {
        ctx.state = self.state;
        ctx.restore_rng(&self.rng);
        ctx.trial.restore_status(self.status);
        match self.legal_moves {
            Some(moves) => ctx.trial.install_legal_moves(moves),
            None => ctx.trial.clear_legal_moves(),
        }
        *ctx.trial.repetition_mut() = self.repetition;
        ctx.trial.set_consecutive_passes(self.consecutive_passes);
    }

    /// Hash of the snapshotted state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.state.state_hash()
    }
}
