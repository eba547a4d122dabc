//! Move selection policies and agents.
//!
//! - `MoveSelector`: picks one move from a candidate list during playouts
//!   (uniform, heuristic-weighted)
//! - `Agent`: an external decision maker consulted for a player's moves

use crate::core::{Context, GameRng, Move, PlayerId, Result};
use crate::rules::Game;

// =============================================================================
// Move Selector
// =============================================================================

/// Policy choosing the move to play from a candidate list.
///
/// `recheck` confirms that a sampled candidate is really legal; the fast
/// playout path defers its filters to it. A selector must only return moves
/// for which `recheck` returned true, and `None` when nothing passes.
pub trait MoveSelector: Send {
    fn select_move(
        &mut self,
        ctx: &Context,
        candidates: Vec<Move>,
        player: PlayerId,
        rng: &mut GameRng,
        recheck: &mut dyn FnMut(&Move) -> Result<bool>,
    ) -> Result<Option<Move>>;
}

/// Uniform random selection, resampling without replacement until a
/// candidate passes the recheck.
#[derive(Clone, Debug, Default)]
pub struct UniformSelector;

impl MoveSelector for UniformSelector {
    fn select_move(
        &mut self,
        _ctx: &Context,
        mut candidates: Vec<Move>,
        _player: PlayerId,
        rng: &mut GameRng,
        recheck: &mut dyn FnMut(&Move) -> Result<bool>,
    ) -> Result<Option<Move>> {
        while !candidates.is_empty() {
            let idx = rng.gen_range_usize(0..candidates.len());
            let mv = candidates.swap_remove(idx);
            if recheck(&mv)? {
                return Ok(Some(mv));
            }
        }
        Ok(None)
    }
}

/// Heuristic scoring of a candidate for the given player.
pub type Heuristic = Box<dyn Fn(&Context, &Move, PlayerId) -> f32 + Send>;

/// Selection proportional to a heuristic weight. Candidates with no
/// positive weight are drawn uniformly once the weighted ones are used up.
pub struct WeightedSelector {
    heuristic: Heuristic,
}

impl WeightedSelector {
    pub fn new(heuristic: impl Fn(&Context, &Move, PlayerId) -> f32 + Send + 'static) -> Self {
        Self {
            heuristic: Box::new(heuristic),
        }
    }
}

impl std::fmt::Debug for WeightedSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedSelector").finish_non_exhaustive()
    }
}

impl MoveSelector for WeightedSelector {
    fn select_move(
        &mut self,
        ctx: &Context,
        mut candidates: Vec<Move>,
        player: PlayerId,
        rng: &mut GameRng,
        recheck: &mut dyn FnMut(&Move) -> Result<bool>,
    ) -> Result<Option<Move>> {
        let mut weights: Vec<f32> = candidates
            .iter()
            .map(|mv| (self.heuristic)(ctx, mv, player))
            .collect();

        while !candidates.is_empty() {
            let idx = rng
                .choose_weighted(&weights)
                .unwrap_or_else(|| rng.gen_range_usize(0..candidates.len()));
            weights.swap_remove(idx);
            let mv = candidates.swap_remove(idx);
            if recheck(&mv)? {
                return Ok(Some(mv));
            }
        }
        Ok(None)
    }
}

// =============================================================================
// Agent
// =============================================================================

/// External decision maker for one player.
///
/// Receives its own copy of the context; limits are advisory and enforced
/// by the agent.
pub trait Agent: Send {
    fn select_action(
        &mut self,
        game: &Game,
        ctx: Context,
        thinking_time: f64,
        max_iterations: Option<usize>,
        max_depth: Option<usize>,
    ) -> Result<Option<Move>>;
}

/// Agent playing uniformly random legal moves.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: GameRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn select_action(
        &mut self,
        game: &Game,
        mut ctx: Context,
        _thinking_time: f64,
        _max_iterations: Option<usize>,
        _max_depth: Option<usize>,
    ) -> Result<Option<Move>> {
        let moves = game.moves(&mut ctx)?;
        Ok(self.rng.choose(&moves).cloned())
    }
}
