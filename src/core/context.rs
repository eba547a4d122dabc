//! Evaluation context: game, state, trial and scratch values.
//!
//! A `Context` owns its `State` and `Trial`; the compiled game and its hash
//! tables are shared read-only. Speculative evaluation never touches the
//! caller's context: it works on a [`Context::temp_copy`] that is mutated and
//! dropped.
//!
//! ## Lock
//!
//! Each context carries an advisory lock. Callers that drive one logical
//! turn across several contexts (match-style games) hold it for the
//! duration of a single apply or move generation, never across plies.
//! Copies get their own lock.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::rules::{meta, Game};
use crate::trial::Trial;

use super::action::Move;
use super::error::Result;
use super::player::PlayerId;
use super::rng::{GameRng, GameRngState};
use super::state::State;

/// Mutable view of one game instance.
#[derive(Debug)]
pub struct Context {
    game: Arc<Game>,
    pub state: State,
    pub trial: Trial,
    rng: GameRng,
    site: Option<usize>,
    lock: Arc<Mutex<()>>,
}

impl Context {
    /// Start a new game with a context RNG seeded from `seed`.
    #[must_use]
    pub fn new(game: Arc<Game>, seed: u64) -> Self {
        Self::from_rng_state(game, &GameRng::new(seed).state())
    }

    /// Start a new game from an RNG checkpoint.
    #[must_use]
    pub fn from_rng_state(game: Arc<Game>, rng_state: &GameRngState) -> Self {
        let rng = GameRng::from_state(rng_state);
        let mut ctx = Self {
            state: State::new(Arc::clone(game.tables())),
            trial: Trial::new(rng.state()),
            rng,
            site: None,
            lock: Arc::new(Mutex::new(())),
            game,
        };
        let game = Arc::clone(&ctx.game);
        game.start(&mut ctx);
        ctx
    }

    /// Restart from the original RNG checkpoint.
    pub fn reset(&mut self) {
        let rng_start = self.trial.rng_start().clone();
        self.state = State::new(Arc::clone(self.game.tables()));
        self.trial.reset(rng_start.clone());
        self.rng = GameRng::from_state(&rng_start);
        self.site = None;
        let game = Arc::clone(&self.game);
        game.start(self);
    }

    /// Independent copy for look-ahead.
    ///
    /// The trial is a temporary branch sharing the move sequence; no undo
    /// data is kept.
    #[must_use]
    pub fn temp_copy(&self) -> Self {
        Self {
            game: Arc::clone(&self.game),
            state: self.state.clone(),
            trial: self.trial.temporary(),
            rng: self.rng.clone(),
            site: self.site,
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn game(&self) -> &Arc<Game> {
        &self.game
    }

    #[must_use]
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    pub(crate) fn restore_rng(&mut self, state: &GameRngState) {
        self.rng = GameRng::from_state(state);
    }

    /// Handle to the advisory lock.
    #[must_use]
    pub fn lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.lock)
    }

    #[must_use]
    pub fn mover(&self) -> PlayerId {
        self.state.mover()
    }

    /// Current site pointer, used by site-relative generators.
    #[must_use]
    pub fn site(&self) -> Option<usize> {
        self.site
    }

    pub fn set_site(&mut self, site: Option<usize>) {
        self.site = site;
    }

    /// Install the legal moves for the position about to be played.
    ///
    /// Moves breaking the no-repeat or no-suicide meta rules are dropped.
    /// If nothing survives in an alternating game, a pass is inserted and
    /// the mover is flagged as stalemated.
    pub fn set_legal_moves(&mut self, moves: Vec<Move>) -> Result<()> {
        let game = Arc::clone(&self.game);
        let mover = self.mover();

        let mut legal = Vec::with_capacity(moves.len());
        for mv in moves {
            if meta::is_allowed(&game, self, &mv)? {
                legal.push(mv);
            }
        }

        let stalemated = legal.is_empty();
        if stalemated && game.config().is_alternating() {
            debug!(%mover, "no legal move, inserting pass");
            legal.push(Move::pass(mover));
        }
        self.state.set_stalemated(mover, stalemated);
        self.trial.install_legal_moves(legal);
        Ok(())
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            game: Arc::clone(&self.game),
            state: self.state.clone(),
            trial: self.trial.clone(),
            rng: self.rng.clone(),
            site: self.site,
            lock: Arc::new(Mutex::new(())),
        }
    }
}
