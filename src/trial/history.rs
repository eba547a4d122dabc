//! The trial: move history, legal-move cache, repetition sets and undo
//! stack of one game instance.

use std::sync::Arc;

use im::Vector;

use crate::core::{Context, GameRngState, Move, Result};
use crate::rules::Game;

use super::{RepetitionHistory, Status, UndoData};

/// History of a single play-through.
///
/// The move sequence is a persistent vector, so [`Trial::temporary`]
/// copies share it with their parent until one side appends.
#[derive(Clone, Debug)]
pub struct Trial {
    moves: Vector<Move>,
    /// `state_hash` after each move, parallel to `moves`.
    hashes: Vector<u64>,
    num_setup_moves: usize,
    status: Option<Status>,
    legal_moves: Option<Vec<Move>>,
    repetition: RepetitionHistory,
    undo: Option<Vec<UndoData>>,
    rng_start: GameRngState,
    consecutive_passes: usize,
    temporary: bool,
}

impl Trial {
    /// Create an empty trial whose context RNG started at `rng_start`.
    #[must_use]
    pub fn new(rng_start: GameRngState) -> Self {
        Self {
            moves: Vector::new(),
            hashes: Vector::new(),
            num_setup_moves: 0,
            status: None,
            legal_moves: None,
            repetition: RepetitionHistory::default(),
            undo: Some(Vec::new()),
            rng_start,
            consecutive_passes: 0,
            temporary: false,
        }
    }

    /// Branch a look-ahead copy.
    ///
    /// Shares the move sequence and repetition sets with `self`, and keeps
    /// neither undo data nor the legal-move cache.
    #[must_use]
    pub fn temporary(&self) -> Self {
        Self {
            moves: self.moves.clone(),
            hashes: self.hashes.clone(),
            num_setup_moves: self.num_setup_moves,
            status: self.status,
            legal_moves: None,
            repetition: self.repetition.clone(),
            undo: None,
            rng_start: self.rng_start.clone(),
            consecutive_passes: self.consecutive_passes,
            temporary: true,
        }
    }

    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    // === Moves ===

    /// Number of moves, including setup moves.
    #[must_use]
    pub fn num_moves(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn num_setup_moves(&self) -> usize {
        self.num_setup_moves
    }

    /// Number of moves made by players.
    #[must_use]
    pub fn num_decisions(&self) -> usize {
        self.moves.len() - self.num_setup_moves
    }

    #[must_use]
    pub fn moves(&self) -> &Vector<Move> {
        &self.moves
    }

    #[must_use]
    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// `state_hash` recorded after each move.
    #[must_use]
    pub fn state_hashes(&self) -> &Vector<u64> {
        &self.hashes
    }

    /// Append a setup move made before any player decision.
    pub fn add_setup_move(&mut self, mv: Move, state_hash: u64) {
        assert_eq!(
            self.num_setup_moves,
            self.moves.len(),
            "setup moves must precede decisions"
        );
        self.add_move(mv, state_hash);
        self.num_setup_moves += 1;
    }

    /// Append a move and the hash it led to.
    pub fn add_move(&mut self, mv: Move, state_hash: u64) {
        self.moves.push_back(mv);
        self.hashes.push_back(state_hash);
    }

    /// Drop the last move.
    pub fn remove_last_move(&mut self) -> Option<Move> {
        self.hashes.pop_back();
        let removed = self.moves.pop_back();
        self.num_setup_moves = self.num_setup_moves.min(self.moves.len());
        removed
    }

    /// Overwrite the last move in place.
    pub fn replace_last_move(&mut self, mv: Move) {
        assert!(!self.moves.is_empty(), "replace_last_move on an empty trial");
        let last = self.moves.len() - 1;
        self.moves.set(last, mv);
    }

    /// Every move in order, consequences included.
    ///
    /// Consequence actions are folded into their move when it is applied,
    /// so each entry is self-contained.
    #[must_use]
    pub fn generate_complete_moves_list(&self) -> Vec<Move> {
        self.moves
            .iter()
            .map(|mv| {
                let mut mv = mv.clone();
                mv.then.clear();
                mv
            })
            .collect()
    }

    // === Status ===

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn over(&self) -> bool {
        self.status.is_some()
    }

    /// End the game. A status, once set, never changes.
    pub fn set_status(&mut self, status: Status) {
        assert!(
            self.status.is_none(),
            "trial already ended with {:?}",
            self.status
        );
        self.status = Some(status);
    }

    pub(crate) fn restore_status(&mut self, status: Option<Status>) {
        self.status = status;
    }

    // === Legal moves ===

    /// Legal moves for the position about to be played, if computed.
    #[must_use]
    pub fn legal_moves(&self) -> Option<&[Move]> {
        self.legal_moves.as_deref()
    }

    /// Install the already-filtered legal moves. Callers go through
    /// `Context::set_legal_moves`.
    pub(crate) fn install_legal_moves(&mut self, moves: Vec<Move>) {
        self.legal_moves = Some(moves);
    }

    pub(crate) fn clear_legal_moves(&mut self) {
        self.legal_moves = None;
    }

    // === Repetition ===

    #[must_use]
    pub fn repetition(&self) -> &RepetitionHistory {
        &self.repetition
    }

    pub fn repetition_mut(&mut self) -> &mut RepetitionHistory {
        &mut self.repetition
    }

    /// Passes made in a row by consecutive movers.
    #[must_use]
    pub fn consecutive_passes(&self) -> usize {
        self.consecutive_passes
    }

    pub(crate) fn set_consecutive_passes(&mut self, passes: usize) {
        self.consecutive_passes = passes;
    }

    // === Undo ===

    /// True while undo snapshots are being kept.
    #[must_use]
    pub fn keeps_undo_data(&self) -> bool {
        self.undo.is_some()
    }

    pub fn push_undo(&mut self, data: UndoData) {
        if let Some(undo) = &mut self.undo {
            undo.push(data);
        }
    }

    pub fn pop_undo(&mut self) -> Option<UndoData> {
        self.undo.as_mut()?.pop()
    }

    /// Number of plies that can be taken back.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.as_ref().map_or(0, Vec::len)
    }

    /// Release the undo stack and stop recording it.
    pub fn null_undo_data(&mut self) {
        self.undo = None;
    }

    // === Lifecycle ===

    /// RNG checkpoint taken when the game started.
    #[must_use]
    pub fn rng_start(&self) -> &GameRngState {
        &self.rng_start
    }

    /// Clear everything for a fresh play-through.
    pub fn reset(&mut self, rng_start: GameRngState) {
        *self = Self {
            temporary: self.temporary,
            undo: (!self.temporary).then(Vec::new),
            ..Self::new(rng_start)
        };
    }

    // === Diagnostics ===

    /// Number of past positions where the mover had at least two legal
    /// moves. Replays the trial from the start.
    pub fn num_logical_decisions(&self, game: &Arc<Game>) -> Result<usize> {
        self.replay_counting(game, |_, legal| Ok(legal.len() >= 2))
    }

    /// Number of past positions where the mover had at least two legal
    /// moves that do not lose on the spot. Replays the trial from the start.
    pub fn num_plausible_decisions(&self, game: &Arc<Game>) -> Result<usize> {
        self.replay_counting(game, |ctx, legal| {
            let mover = ctx.mover();
            let mut plausible = 0;
            for mv in legal {
                let mut temp = ctx.temp_copy();
                game.apply(&mut temp, mv.clone())?;
                if !temp.trial.status().is_some_and(|s| s.is_loss_for(mover)) {
                    plausible += 1;
                    if plausible >= 2 {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        })
    }

    fn replay_counting(
        &self,
        game: &Arc<Game>,
        mut classify: impl FnMut(&Context, &[Move]) -> Result<bool>,
    ) -> Result<usize> {
        let mut ctx = Context::from_rng_state(Arc::clone(game), &self.rng_start);
        ctx.trial.null_undo_data();

        let mut count = 0;
        for mv in self.moves.iter().skip(self.num_setup_moves) {
            let legal = game.moves(&mut ctx)?;
            if classify(&ctx, &legal)? {
                count += 1;
            }
            game.apply(&mut ctx, mv.clone())?;
        }
        Ok(count)
    }
}
