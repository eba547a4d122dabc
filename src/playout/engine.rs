//! Playout loop.

use std::sync::{Arc, PoisonError};
use std::time::Instant;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::core::{Context, EngineError, GameRng, Move, PlayerId, Result};
use crate::rules::Game;
use crate::trial::Status;

use super::config::PlayoutConfig;
use super::fast::FastShape;
use super::policy::{Agent, MoveSelector, UniformSelector};
use super::stats::PlayoutStats;

/// Plays games to the end (or the ply budget) from a context.
///
/// Owns the selection RNG, the move selector, per-player agents and the
/// statistics. One engine can run any number of playouts on any contexts.
pub struct PlayoutEngine {
    config: PlayoutConfig,
    rng: GameRng,
    selector: Box<dyn MoveSelector>,
    agents: FxHashMap<PlayerId, Box<dyn Agent>>,
    stats: PlayoutStats,
}

impl PlayoutEngine {
    pub fn new(config: PlayoutConfig) -> Self {
        Self {
            rng: GameRng::new(config.seed),
            config,
            selector: Box::new(UniformSelector),
            agents: FxHashMap::default(),
            stats: PlayoutStats::default(),
        }
    }

    /// Replace uniform sampling with a custom selector.
    pub fn with_selector<S: MoveSelector + 'static>(mut self, selector: S) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Let `agent` choose the moves of `player`.
    pub fn with_agent<A: Agent + 'static>(mut self, player: PlayerId, agent: A) -> Self {
        self.agents.insert(player, Box::new(agent));
        self
    }

    #[must_use]
    pub fn config(&self) -> &PlayoutConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &PlayoutStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // === Strategies ===

    /// Play out using the full rule tree every ply.
    ///
    /// Unless [`PlayoutConfig::keep_undo`] is set, the context's undo stack
    /// is released first, so the playout cannot be taken back.
    pub fn run(&mut self, ctx: &mut Context) -> Result<Option<Status>> {
        self.release_undo(ctx);
        let start = Instant::now();
        let game = Arc::clone(ctx.game());
        let result = self.general_loop(&game, ctx, 0);
        self.finish(start);
        result?;
        Ok(ctx.trial.status().copied())
    }

    /// Play out with the fast path of the current phase's rule shape.
    ///
    /// Fails with [`EngineError::UnsupportedPlayout`] before any move is
    /// applied if the game or shape is not supported. If the phase changes
    /// during the playout the rest is played on the general path.
    pub fn run_fast(&mut self, ctx: &mut Context) -> Result<Option<Status>> {
        let game = Arc::clone(ctx.game());
        let phase = ctx.state.phase(ctx.mover());
        let shape = self.fast_shape(&game, phase)?;
        debug!(game = %game.config().name, shape = shape.name(), "fast playout");

        self.release_undo(ctx);
        let start = Instant::now();
        let result = self.fast_loop(&game, ctx, phase, shape);
        self.finish(start);
        result?;
        Ok(ctx.trial.status().copied())
    }

    /// Fast path when supported, general path otherwise.
    pub fn run_auto(&mut self, ctx: &mut Context) -> Result<Option<Status>> {
        let game = Arc::clone(ctx.game());
        match self.fast_shape(&game, ctx.state.phase(ctx.mover())) {
            Ok(_) => self.run_fast(ctx),
            Err(EngineError::UnsupportedPlayout { reason, .. }) => {
                debug!(%reason, "using general playout");
                self.run(ctx)
            }
            Err(err) => Err(err),
        }
    }

    fn fast_shape<'g>(&self, game: &'g Game, phase: usize) -> Result<FastShape<'g>> {
        let unsupported = |reason: &str| EngineError::UnsupportedPlayout {
            phase: game.phase_name(phase).to_string(),
            reason: reason.to_string(),
        };
        if !game.config().is_alternating() {
            return Err(unsupported("moves are not alternating"));
        }
        if !self.agents.is_empty() {
            return Err(unsupported("agents are configured"));
        }
        FastShape::detect(&game.phase(phase).moves)
            .ok_or_else(|| unsupported("move rule is not Do, If/Do or Or[Do, Pass]"))
    }

    fn release_undo(&self, ctx: &mut Context) {
        if !self.config.keep_undo {
            ctx.trial.null_undo_data();
        }
    }

    fn finish(&mut self, start: Instant) {
        self.stats.playouts += 1;
        self.stats.time_us += start.elapsed().as_micros() as u64;
    }

    // === General path ===

    fn general_loop(&mut self, game: &Game, ctx: &mut Context, mut plies: usize) -> Result<()> {
        while !ctx.trial.over() && self.config.within_budget(plies) {
            self.general_ply(game, ctx)?;
            plies += 1;
        }
        Ok(())
    }

    fn general_ply(&mut self, game: &Game, ctx: &mut Context) -> Result<()> {
        let lock = ctx.lock();
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mover = ctx.mover();

        let legal = game.moves(ctx)?;
        if ctx.state.is_stalemated(mover) {
            self.stats.passes_inserted += 1;
        }

        let chosen = match self.agents.get_mut(&mover) {
            Some(agent) => agent
                .select_action(
                    game,
                    ctx.temp_copy(),
                    self.config.thinking_time,
                    self.config.max_iterations,
                    self.config.max_depth,
                )?
                .filter(|mv| {
                    let ok = legal.contains(mv);
                    if !ok {
                        debug!(%mover, ?mv, "agent move is not legal, selecting instead");
                    }
                    ok
                }),
            None => None,
        };
        let mv = match chosen {
            Some(mv) => mv,
            None => self
                .selector
                .select_move(ctx, legal, mover, &mut self.rng, &mut |_| Ok(true))?
                .unwrap_or_else(|| Move::pass(mover)),
        };

        game.apply(ctx, mv)?;
        self.stats.plies += 1;
        self.stats.general_plies += 1;
        Ok(())
    }

    // === Fast path ===

    fn fast_loop(
        &mut self,
        game: &Game,
        ctx: &mut Context,
        phase: usize,
        shape: FastShape<'_>,
    ) -> Result<()> {
        let mut plies = 0;
        while !ctx.trial.over() && self.config.within_budget(plies) {
            if ctx.state.phase(ctx.mover()) != phase {
                debug!(
                    from = game.phase_name(phase),
                    to = game.phase_name(ctx.state.phase(ctx.mover())),
                    "phase changed, continuing on the general path"
                );
                return self.general_loop(game, ctx, plies);
            }
            self.fast_ply(game, ctx, shape)?;
            plies += 1;
        }
        Ok(())
    }

    fn fast_ply(&mut self, game: &Game, ctx: &mut Context, shape: FastShape<'_>) -> Result<()> {
        let lock = ctx.lock();
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mover = ctx.mover();

        let (body, mut candidates) = shape.candidates(ctx)?;
        // Swap joins the candidates before any pass fallback.
        game.finish_candidates(ctx, &mut candidates);

        let view: &Context = ctx;
        let chosen = self.selector.select_move(
            view,
            candidates,
            mover,
            &mut self.rng,
            &mut |mv| shape.recheck(game, view, body, mv),
        )?;

        let stalemated = chosen.is_none();
        ctx.state.set_stalemated(mover, stalemated);
        let mv = chosen.unwrap_or_else(|| {
            trace!(%mover, "no legal move, passing");
            Move::pass(mover)
        });
        if stalemated {
            self.stats.passes_inserted += 1;
        }

        game.apply(ctx, mv)?;
        self.stats.plies += 1;
        self.stats.fast_plies += 1;
        Ok(())
    }
}

impl std::fmt::Debug for PlayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayoutEngine")
            .field("config", &self.config)
            .field("agents", &self.agents.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{RuleShape, TicTacToe, TrackFill};
    use crate::playout::RandomAgent;

    #[test]
    fn test_general_playout_finishes() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);
        let mut engine = PlayoutEngine::new(PlayoutConfig::default());

        let status = engine.run(&mut ctx).unwrap();
        assert!(status.is_some());
        assert!(ctx.trial.over());
        assert_eq!(engine.stats().playouts, 1);
        assert_eq!(engine.stats().general_plies as usize, ctx.trial.num_moves());
        assert_eq!(engine.stats().fast_plies, 0);
    }

    #[test]
    fn test_budget_stops_playout() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);
        let mut engine = PlayoutEngine::new(PlayoutConfig::default().with_max_actions(2));

        assert!(engine.run(&mut ctx).unwrap().is_none());
        assert_eq!(ctx.trial.num_moves(), 2);
    }

    #[test]
    fn test_fast_playout_uses_fast_plies() {
        let game = TicTacToe::new().shape(RuleShape::Do).build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);
        let mut engine = PlayoutEngine::new(PlayoutConfig::default());

        engine.run_fast(&mut ctx).unwrap();
        assert!(ctx.trial.over());
        assert_eq!(engine.stats().fast_plies as usize, ctx.trial.num_moves());
    }

    #[test]
    fn test_unsupported_shapes() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);
        let mut engine = PlayoutEngine::new(PlayoutConfig::default());

        let err = engine.run_fast(&mut ctx).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedPlayout { ref phase, .. } if phase == "Play"));
        assert_eq!(ctx.trial.num_moves(), 0);

        // run_auto falls back to the general path.
        engine.run_auto(&mut ctx).unwrap();
        assert!(ctx.trial.over());
    }

    #[test]
    fn test_agents_disable_fast_path() {
        let game = TicTacToe::new().shape(RuleShape::Do).build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);
        let mut engine = PlayoutEngine::new(PlayoutConfig::default())
            .with_agent(PlayerId::new(2), RandomAgent::new(3));

        assert!(engine.run_fast(&mut ctx).is_err());
        engine.run(&mut ctx).unwrap();
        assert!(ctx.trial.over());
    }

    /// Always claims the centre, legal or not.
    struct CentreAgent;

    impl Agent for CentreAgent {
        fn select_action(
            &mut self,
            _game: &Game,
            ctx: Context,
            _thinking_time: f64,
            _max_iterations: Option<usize>,
            _max_depth: Option<usize>,
        ) -> Result<Option<Move>> {
            let mover = ctx.mover();
            Ok(Some(Move::add(mover, 4, mover, 1).decided()))
        }
    }

    #[test]
    fn test_illegal_agent_move_falls_back_to_selector() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);
        let mut engine = PlayoutEngine::new(PlayoutConfig::default())
            .with_agent(PlayerId::new(1), CentreAgent)
            .with_agent(PlayerId::new(2), CentreAgent);

        engine.run(&mut ctx).unwrap();
        assert!(ctx.trial.over());

        let mut replay = Context::new(Arc::clone(&game), 1);
        for mv in ctx.trial.moves().iter() {
            let legal = game.moves(&mut replay).unwrap();
            assert!(legal.contains(mv), "{mv:?}");
            game.apply(&mut replay, mv.clone()).unwrap();
        }
        let first = ctx.trial.moves()[0].clone();
        assert_eq!(first.to, Some(4));
        assert_eq!(ctx.trial.moves().iter().filter(|m| m.to == Some(4)).count(), 1);
    }

    #[test]
    fn test_undo_released_unless_kept() {
        let game = TicTacToe::new().build().unwrap();

        let mut ctx = Context::new(Arc::clone(&game), 1);
        PlayoutEngine::new(PlayoutConfig::default().with_max_actions(3))
            .run(&mut ctx)
            .unwrap();
        assert_eq!(ctx.trial.undo_depth(), 0);

        let mut ctx = Context::new(Arc::clone(&game), 1);
        let config = PlayoutConfig::default().with_max_actions(3).with_undo();
        PlayoutEngine::new(config).run(&mut ctx).unwrap();
        assert_eq!(ctx.trial.undo_depth(), 3);
        assert!(game.undo(&mut ctx));
        assert_eq!(ctx.trial.num_moves(), 2);
    }

    #[test]
    fn test_phase_change_falls_back() {
        let game = TrackFill::new().length(5).opening().build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);
        let mut engine = PlayoutEngine::new(PlayoutConfig::default());

        engine.run_fast(&mut ctx).unwrap();
        assert!(ctx.trial.over());
        assert_eq!(engine.stats().fast_plies, 1);
        assert_eq!(engine.stats().general_plies, 4);
    }
}
