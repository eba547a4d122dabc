//! Meta-rule predicates applied by the legal-move gate.
//!
//! Both predicates apply the candidate to a throwaway copy of the context
//! and inspect the result. Passes and swaps are never filtered.

use crate::core::{Context, Move, RepetitionRule, Result};

use super::Game;

/// True if `mv` survives the game's no-repeat and no-suicide rules.
pub fn is_allowed(game: &Game, ctx: &Context, mv: &Move) -> Result<bool> {
    let meta = &game.config().meta;
    if mv.is_pass() || mv.is_swap() || (meta.no_repeat.is_none() && !meta.no_suicide) {
        return Ok(true);
    }

    let mut temp = ctx.temp_copy();
    game.apply(&mut temp, mv.clone())?;

    if let Some(rule) = meta.no_repeat {
        if repeats(ctx, &temp, rule) {
            return Ok(false);
        }
    }
    if meta.no_suicide && temp.trial.status().is_some_and(|s| s.is_loss_for(mv.mover)) {
        return Ok(false);
    }
    Ok(true)
}

/// True if the state reached in `after` was already seen in `before`'s
/// history under `rule`.
#[must_use]
pub fn repeats(before: &Context, after: &Context, rule: RepetitionRule) -> bool {
    before
        .trial
        .repetition()
        .contains(rule, after.state.state_hash(), after.state.full_hash())
}
