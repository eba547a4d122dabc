//! Sequencing with a post-move filter.

use std::sync::Arc;

use crate::core::{Context, GameFlags, Move, RepetitionRule, Result};
use crate::rules::{meta, Condition};
use crate::topology::Topology;

use super::Moves;

/// Evaluate `prior`; for each prior move, evaluate `next` on a copy where
/// it has been applied and prepend its actions. The combined moves are then
/// kept only if, after being played, `after` holds and the reached state is
/// not a repetition under `repetition`.
///
/// Without `next`, the prior moves themselves are filtered.
#[derive(Clone, Debug)]
pub struct Do {
    pub prior: Box<Moves>,
    pub next: Option<Box<Moves>>,
    pub after: Option<Condition>,
    pub repetition: Option<RepetitionRule>,
}

impl Do {
    pub fn new(prior: impl Into<Moves>) -> Self {
        Self {
            prior: Box::new(prior.into()),
            next: None,
            after: None,
            repetition: None,
        }
    }

    #[must_use]
    pub fn with_next(mut self, next: impl Into<Moves>) -> Self {
        self.next = Some(Box::new(next.into()));
        self
    }

    /// Keep only moves after which `condition` holds.
    #[must_use]
    pub fn with_after(mut self, condition: Condition) -> Self {
        self.after = Some(condition);
        self
    }

    /// Drop moves leading to a state already seen under `rule`.
    #[must_use]
    pub fn with_repetition(mut self, rule: RepetitionRule) -> Self {
        self.repetition = Some(rule);
        self
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        let candidates = self.generate(ctx)?;
        if !self.filters() {
            return Ok(candidates);
        }
        let mut kept = Vec::with_capacity(candidates.len());
        for mv in candidates {
            if self.accepts(ctx, &mv)? {
                kept.push(mv);
            }
        }
        Ok(kept)
    }

    /// Combined moves before filtering.
    pub fn generate(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        let prior = self.prior.eval(ctx)?;
        let Some(next) = &self.next else {
            return Ok(prior);
        };

        let game = Arc::clone(ctx.game());
        let mut moves = Vec::new();
        for first in prior {
            let mut temp = ctx.temp_copy();
            let first = game.apply_actions(&mut temp, first)?;
            for mut second in next.eval(&mut temp)? {
                let mut actions = first.actions.clone();
                actions.extend(second.actions.drain(..));
                second.actions = actions;
                second.from = second.from.or(first.from);
                second.to = second.to.or(first.to);
                if second.mover.is_none() {
                    second.mover = first.mover;
                }
                moves.push(second);
            }
        }
        Ok(moves)
    }

    /// True if candidates need the speculative check.
    #[must_use]
    pub fn filters(&self) -> bool {
        self.after.is_some() || self.repetition.is_some()
    }

    /// Play `mv` on a copy of `ctx` and test the after condition and the
    /// repetition rule on the result.
    pub fn accepts(&self, ctx: &Context, mv: &Move) -> Result<bool> {
        if !self.filters() {
            return Ok(true);
        }
        let game = Arc::clone(ctx.game());
        let mut temp = ctx.temp_copy();
        if ctx.trial.over() {
            game.apply_actions(&mut temp, mv.clone())?;
        } else {
            game.apply(&mut temp, mv.clone())?;
        }

        if let Some(rule) = self.repetition {
            if meta::repeats(ctx, &temp, rule) {
                return Ok(false);
            }
        }

        let Some(after) = &self.after else {
            return Ok(true);
        };
        // A player never moves twice through this check.
        if temp.state.mover() == temp.state.next() {
            let prev = temp.state.prev();
            temp.state.set_next(prev);
        }
        Ok(after.eval(&temp))
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.prior.is_static()
            && self.next.as_ref().map_or(true, |n| n.is_static())
            && self.after.as_ref().map_or(true, Condition::is_static)
            && self.repetition.is_none()
    }

    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        let mut flags = self.prior.game_flags();
        if let Some(next) = &self.next {
            flags |= next.game_flags();
        }
        if let Some(after) = &self.after {
            flags |= after.game_flags();
        }
        if self.repetition.is_some() {
            flags |= GameFlags::REPETITION;
        }
        flags
    }

    pub fn preprocess(&self, topology: &dyn Topology) -> Result<()> {
        self.prior.preprocess(topology)?;
        if let Some(next) = &self.next {
            next.preprocess(topology)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, GameConfig, PlayerId};
    use crate::hash::Level;
    use crate::rules::{GameBuilder, Phase};
    use crate::topology::SquareBoard;

    fn line_game(moves: impl Into<Moves>) -> Arc<crate::rules::Game> {
        GameBuilder::new(GameConfig::new("Line", 2), SquareBoard::new(4, 1))
            .with_phase(Phase::new("Main", moves))
            .build()
            .unwrap()
    }

    #[test]
    fn test_next_sees_prior_applied() {
        let game = line_game(Do::new(Moves::add_at(vec![0], 1)).with_next(Moves::add_empty(2)));
        let mut ctx = Context::new(Arc::clone(&game), 1);

        let Moves::Do(d) = &game.phase(0).moves else {
            panic!("expected Do");
        };
        let moves = d.eval(&mut ctx).unwrap();

        // Site 0 is taken by the prior move, leaving three.
        assert_eq!(moves.len(), 3);
        for mv in &moves {
            assert_eq!(mv.actions.len(), 2);
            assert!(matches!(mv.actions[0], Action::Add { site: 0, .. }));
            assert!(matches!(mv.actions[1], Action::Add { what: 2, .. }));
        }
        assert!(ctx.state.is_empty(0));
    }

    #[test]
    fn test_after_condition_filters() {
        let d = Do::new(Moves::add_empty(1)).with_after(Condition::IsEmpty(2));
        let game = line_game(d.clone());
        let mut ctx = Context::new(game, 1);

        let moves = d.eval(&mut ctx).unwrap();
        assert_eq!(moves.len(), 3);
        assert!(moves.iter().all(|m| m.to != Some(2)));
    }

    #[test]
    fn test_repetition_filter() {
        let d = Do::new(Moves::add_empty(1)).with_repetition(RepetitionRule::positional());
        let game = line_game(d.clone());
        let mut ctx = Context::new(game, 1);

        // Seed the history with the position reached by placing on site 3.
        let mut seen = ctx.temp_copy();
        seen.state.place(3, Level::piece(1, 1));
        let (state_hash, full_hash) = (seen.state.state_hash(), seen.state.full_hash());
        ctx.trial.repetition_mut().record(state_hash, full_hash, true);

        let moves = d.eval(&mut ctx).unwrap();
        assert_eq!(moves.len(), 3);
        assert!(moves.iter().all(|m| m.to != Some(3)));
        assert!(d.game_flags().contains(GameFlags::REPETITION));
    }

    #[test]
    fn test_after_condition_holds_on_replay() {
        let d = Do::new(Moves::add_empty(1)).with_after(Condition::IsEmpty(0));
        let game = line_game(d.clone());
        let mut ctx = Context::new(Arc::clone(&game), 1);

        for mv in d.eval(&mut ctx).unwrap() {
            let mut replay = ctx.temp_copy();
            game.apply(&mut replay, mv).unwrap();
            assert!(replay.state.is_empty(0));
        }
        assert_eq!(ctx.mover(), PlayerId::new(1));
    }

    #[test]
    fn test_static_flags() {
        assert!(Do::new(Moves::Pass).is_static());
        assert!(!Do::new(Moves::add_empty(1)).is_static());
        assert!(!Do::new(Moves::Pass)
            .with_repetition(RepetitionRule::situational())
            .is_static());
    }
}
