//! Compiled game: configuration, topology, phases and end rules.
//!
//! ## Ply
//!
//! [`Game::apply`] is the only way a move enters a trial:
//!
//! 1. snapshot undo data (unless released),
//! 2. apply the move's actions and fold in its consequences,
//! 3. record the move and the resulting `state_hash`,
//! 4. evaluate end rules from the mover's point of view, then the
//!    all-passed and move-limit draws,
//! 5. follow the first phase transition whose condition holds,
//! 6. advance the turn (`prev = mover`, `mover = next`),
//! 7. record the new state in the repetition history.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::core::{Action, Context, EngineError, GameConfig, GameFlags, Move, PlayerId, Result};
use crate::hash::ZobristTables;
use crate::moves::Moves;
use crate::topology::Topology;
use crate::trial::{EndType, Status, UndoData};

use super::Condition;

/// Move to phase `target` when `condition` holds after a move.
#[derive(Clone, Debug)]
pub struct Transition {
    pub condition: Condition,
    pub target: usize,
}

/// A named stage of the game with its own move rules.
#[derive(Clone, Debug)]
pub struct Phase {
    pub name: String,
    pub moves: Moves,
    pub transitions: Vec<Transition>,
}

impl Phase {
    pub fn new(name: impl Into<String>, moves: impl Into<Moves>) -> Self {
        Self {
            name: name.into(),
            moves: moves.into(),
            transitions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transition(mut self, condition: Condition, target: usize) -> Self {
        self.transitions.push(Transition { condition, target });
        self
    }
}

/// Outcome of an end rule, relative to the player who just moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndResult {
    MoverWins,
    /// The mover loses; the next active player after them in turn order
    /// wins, whatever the move did to the turn.
    MoverLoses,
    Draw,
}

/// Ends the game when `condition` holds after a move.
#[derive(Clone, Debug)]
pub struct EndRule {
    pub condition: Condition,
    pub result: EndResult,
}

impl EndRule {
    #[must_use]
    pub fn new(condition: Condition, result: EndResult) -> Self {
        Self { condition, result }
    }
}

/// A compiled, immutable game shared by every context playing it.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    topology: Arc<dyn Topology>,
    tables: Arc<ZobristTables>,
    phases: Vec<Phase>,
    end: Vec<EndRule>,
    start: Vec<Action>,
    flags: GameFlags,
}

/// Builder for [`Game`]. `build` validates the rule tree against the
/// topology.
pub struct GameBuilder {
    config: GameConfig,
    topology: Arc<dyn Topology>,
    phases: Vec<Phase>,
    end: Vec<EndRule>,
    start: Vec<Action>,
}

impl GameBuilder {
    pub fn new(config: GameConfig, topology: impl Topology + 'static) -> Self {
        Self {
            config,
            topology: Arc::new(topology),
            phases: Vec::new(),
            end: Vec::new(),
            start: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    #[must_use]
    pub fn with_end(mut self, rule: EndRule) -> Self {
        self.end.push(rule);
        self
    }

    /// Add an action applied once, as a setup move, when a game starts.
    #[must_use]
    pub fn with_start(mut self, action: Action) -> Self {
        self.start.push(action);
        self
    }

    pub fn build(self) -> Result<Arc<Game>> {
        if self.phases.is_empty() {
            return Err(EngineError::InvalidGame(format!(
                "`{}` has no phases",
                self.config.name
            )));
        }

        let mut flags = self.config.flags();
        for phase in &self.phases {
            phase.moves.preprocess(self.topology.as_ref())?;
            flags |= phase.moves.game_flags();
            for transition in &phase.transitions {
                if transition.target >= self.phases.len() {
                    return Err(EngineError::InvalidGame(format!(
                        "phase `{}` transitions to missing phase {}",
                        phase.name, transition.target
                    )));
                }
                flags |= transition.condition.game_flags();
            }
        }
        for rule in &self.end {
            flags |= rule.condition.game_flags();
        }
        flags.set(GameFlags::PHASES, self.phases.len() > 1);

        let tables = ZobristTables::generate(
            &self.config,
            self.topology.num_sites(),
            self.phases.len(),
        );
        debug!(game = %self.config.name, ?flags, "compiled game");

        Ok(Arc::new(Game {
            config: self.config,
            topology: self.topology,
            tables: Arc::new(tables),
            phases: self.phases,
            end: self.end,
            start: self.start,
            flags,
        }))
    }
}

impl Game {
    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn topology(&self) -> &dyn Topology {
        self.topology.as_ref()
    }

    #[must_use]
    pub fn tables(&self) -> &Arc<ZobristTables> {
        &self.tables
    }

    #[must_use]
    pub fn flags(&self) -> GameFlags {
        self.flags
    }

    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self, index: usize) -> &Phase {
        &self.phases[index]
    }

    #[must_use]
    pub fn phase_name(&self, index: usize) -> &str {
        self.phases.get(index).map_or("?", |p| p.name.as_str())
    }

    /// Phase the mover of `ctx` is in.
    #[must_use]
    pub fn current_phase(&self, ctx: &Context) -> &Phase {
        &self.phases[ctx.state.phase(ctx.mover())]
    }

    // === Lifecycle ===

    /// Apply the start rules to a fresh context.
    pub fn start(&self, ctx: &mut Context) {
        if !self.start.is_empty() {
            let setup = Move::from_actions(PlayerId::NONE, self.start.iter().cloned());
            setup.apply_actions(&mut ctx.state);
            let hash = ctx.state.state_hash();
            ctx.trial.add_setup_move(setup, hash);
        }
        let (state_hash, full_hash) = (ctx.state.state_hash(), ctx.state.full_hash());
        ctx.trial.repetition_mut().record(state_hash, full_hash, true);
    }

    // === Move generation ===

    /// Legal moves for the mover, installed in the trial's cache.
    ///
    /// Empty only when the game is over, or for simultaneous games with
    /// nothing to do.
    pub fn moves(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        if ctx.trial.over() {
            ctx.trial.install_legal_moves(Vec::new());
            return Ok(Vec::new());
        }
        let mut candidates = self.current_phase(ctx).moves.eval(ctx)?;
        self.finish_candidates(ctx, &mut candidates);
        ctx.set_legal_moves(candidates)?;
        Ok(ctx.trial.legal_moves().map(<[Move]>::to_vec).unwrap_or_default())
    }

    /// Mark generated moves as decisions and add the swap move when
    /// eligible. Shared by the general and fast playout paths.
    pub(crate) fn finish_candidates(&self, ctx: &Context, moves: &mut Vec<Move>) {
        let mover = ctx.mover();
        for mv in moves.iter_mut() {
            mv.decision = true;
            if mv.mover.is_none() {
                mv.mover = mover;
            }
        }
        if self.swap_eligible(ctx) {
            trace!(%mover, "swap available");
            moves.push(Move::swap(mover));
        }
    }

    /// True when the mover may swap sides instead of moving: second
    /// decision of a two-player alternating game with the swap rule.
    #[must_use]
    pub fn swap_eligible(&self, ctx: &Context) -> bool {
        self.config.meta.swap
            && self.config.player_count == 2
            && self.config.is_alternating()
            && ctx.trial.num_decisions() == 1
            && ctx.mover() == PlayerId::new(2)
    }

    // === Application ===

    /// Apply a move and advance the game by one ply. Returns the move as
    /// recorded, consequences folded in.
    pub fn apply(&self, ctx: &mut Context, mv: Move) -> Result<Move> {
        if ctx.trial.over() {
            return Err(EngineError::TrialOver);
        }
        if ctx.trial.keeps_undo_data() {
            let undo = UndoData::capture(ctx);
            ctx.trial.push_undo(undo);
        }

        let mover = ctx.mover();
        let applied = self.apply_actions(ctx, mv)?;
        ctx.state.increment_counter();

        let passes = if applied.is_pass() {
            ctx.trial.consecutive_passes() + 1
        } else {
            0
        };
        ctx.trial.set_consecutive_passes(passes);
        let hash = ctx.state.state_hash();
        ctx.trial.add_move(applied.clone(), hash);
        ctx.trial.clear_legal_moves();

        self.check_end(ctx, mover);
        if !ctx.trial.over() {
            self.follow_transitions(ctx, mover);
        }

        let next = ctx.state.next();
        ctx.state.set_prev(mover);
        ctx.state.set_mover(next);
        ctx.state.set_next(ctx.state.next_active_after(next));

        let full_hash = ctx.state.full_hash();
        ctx.trial.repetition_mut().record(hash, full_hash, next != mover);

        debug_assert_eq!(
            ctx.state.state_hash(),
            ctx.state.recompute_hash(),
            "state hash out of sync after {applied:?}"
        );
        Ok(applied)
    }

    /// Apply a move's actions and consequences without advancing the turn.
    ///
    /// Consequences are evaluated with the site pointer at the move's
    /// destination; the actions they produce are appended to the returned
    /// move.
    pub fn apply_actions(&self, ctx: &mut Context, mut mv: Move) -> Result<Move> {
        mv.apply_actions(&mut ctx.state);
        let consequences = std::mem::take(&mut mv.then);
        if consequences.is_empty() {
            return Ok(mv);
        }

        let saved = ctx.site();
        ctx.set_site(mv.to.or(saved));
        let folded = self.fold_consequences(ctx, &mut mv, &consequences);
        ctx.set_site(saved);
        folded?;
        Ok(mv)
    }

    fn fold_consequences(&self, ctx: &mut Context, mv: &mut Move, consequences: &[Arc<Moves>]) -> Result<()> {
        for consequence in consequences {
            for produced in consequence.eval(ctx)? {
                let produced = self.apply_actions(ctx, produced)?;
                mv.actions.extend(produced.actions);
            }
        }
        Ok(())
    }

    fn check_end(&self, ctx: &mut Context, mover: PlayerId) {
        let status = self
            .end
            .iter()
            .find(|rule| rule.condition.eval(ctx))
            .map(|rule| match rule.result {
                EndResult::MoverWins => Status::win(mover),
                EndResult::MoverLoses => match ctx.state.next_active_after(mover) {
                    winner if winner != mover => Status::win(winner),
                    _ => Status::loss(mover),
                },
                EndResult::Draw => Status::draw(EndType::Rules),
            })
            .or_else(|| {
                (ctx.trial.consecutive_passes() >= ctx.state.num_active())
                    .then(|| Status::draw(EndType::AllPassed))
            })
            .or_else(|| {
                self.config
                    .max_moves
                    .is_some_and(|max| ctx.trial.num_decisions() >= max)
                    .then(|| Status::draw(EndType::MoveLimit))
            });

        if let Some(status) = status {
            debug!(?status, moves = ctx.trial.num_moves(), "game over");
            ctx.trial.set_status(status);
        }
    }

    fn follow_transitions(&self, ctx: &mut Context, mover: PlayerId) {
        let current = ctx.state.phase(mover);
        let Some(target) = self.phases[current]
            .transitions
            .iter()
            .find(|t| t.condition.eval(ctx))
            .map(|t| t.target)
        else {
            return;
        };
        debug!(
            from = self.phase_name(current),
            to = self.phase_name(target),
            "phase transition"
        );
        for player in PlayerId::all(self.config.player_count) {
            ctx.state.set_phase(player, target);
        }
    }

    /// Take back the last ply. Returns false when no undo data is left.
    pub fn undo(&self, ctx: &mut Context) -> bool {
        let Some(data) = ctx.trial.pop_undo() else {
            return false;
        };
        data.restore(ctx);
        ctx.trial.remove_last_move();
        true
    }
}
