//! Game configuration types.
//!
//! The compiled game carries a `GameConfig` describing everything the core
//! needs to size its hash ledgers and apply meta rules:
//! - player count and turn mode
//! - value ranges for per-site data (piece types, local state, rotation, value)
//! - stacking and hidden-information switches
//! - meta rules (no-repeat, no-suicide, swap)
//! - safety limits (loop iteration cap, move limit)

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::player::MAX_PLAYERS;

/// Default hard cap on iterations of a conditional loop combinator.
pub const DEFAULT_LOOP_CAP: usize = 1000;

/// Default seed for the Zobrist term generator.
pub const DEFAULT_HASH_SEED: u64 = 0x2F6B_1D0C_5EED_A11C;

/// How turns are taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeType {
    /// One mover per ply, cycling through players.
    #[default]
    Alternating,
    /// All players decide each ply. Playouts treat these like alternating
    /// games but never insert passes through the legal-move gate.
    Simultaneous,
}

/// Which hash identifies a repeated position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepetitionKind {
    /// Board contents only (`State::state_hash`).
    Positional,
    /// Board contents plus mover and phases (`State::full_hash`).
    Situational,
}

/// Over which history a repetition is checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepetitionScope {
    /// Every state seen since the start of the game.
    Game,
    /// States seen since the last change of mover.
    Turn,
}

/// A repetition prohibition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepetitionRule {
    pub kind: RepetitionKind,
    pub scope: RepetitionScope,
}

impl RepetitionRule {
    /// Positional repetition over the whole game.
    #[must_use]
    pub const fn positional() -> Self {
        Self {
            kind: RepetitionKind::Positional,
            scope: RepetitionScope::Game,
        }
    }

    /// Situational repetition over the whole game.
    #[must_use]
    pub const fn situational() -> Self {
        Self {
            kind: RepetitionKind::Situational,
            scope: RepetitionScope::Game,
        }
    }

    /// Restrict the rule to the current turn.
    #[must_use]
    pub const fn in_turn(mut self) -> Self {
        self.scope = RepetitionScope::Turn;
        self
    }
}

/// Game-wide rules applied on top of the phase move generators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRules {
    /// Moves leading to a repeated state are illegal.
    pub no_repeat: Option<RepetitionRule>,
    /// Moves after which the mover has lost are illegal.
    pub no_suicide: bool,
    /// The second player may swap sides instead of making their first move.
    pub swap: bool,
}

bitflags! {
    /// Features a game or rule node uses.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GameFlags: u64 {
        const STOCHASTIC = 1;
        const HIDDEN_INFO = 1 << 1;
        const STACKING = 1 << 2;
        const SWAP_RULE = 1 << 3;
        const REPETITION = 1 << 4;
        const LOOPS = 1 << 5;
        const TRACKS = 1 << 6;
        const PHASES = 1 << 7;
        const SIMULTANEOUS = 1 << 8;
        const CONSEQUENCES = 1 << 9;
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Human-readable game name.
    pub name: String,

    /// Number of players (1-16).
    pub player_count: usize,

    /// Turn mode.
    pub mode: ModeType,

    /// Meta rules.
    pub meta: MetaRules,

    /// Number of piece types (piece ids are `1..=piece_types`).
    pub piece_types: u32,

    /// Largest per-site local state value.
    pub max_site_state: u32,

    /// Number of distinct rotations.
    pub rotations: u32,

    /// Largest per-site value.
    pub max_site_value: u32,

    /// Sites hold ordered stacks of pieces.
    pub stacking: bool,

    /// Stack height covered by distinct hash terms.
    pub max_stack_height: usize,

    /// Per-player hidden-information bitsets are tracked.
    pub hidden_info: bool,

    /// Hard cap on iterations of conditional loops.
    pub max_loop_iterations: usize,

    /// Number of decision moves after which the game is a draw.
    pub max_moves: Option<usize>,

    /// Seed for the Zobrist term generator.
    pub hash_seed: u64,
}

impl GameConfig {
    /// Create a configuration with defaults for `player_count` players.
    pub fn new(name: impl Into<String>, player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(
            player_count <= MAX_PLAYERS,
            "At most {MAX_PLAYERS} players supported"
        );

        Self {
            name: name.into(),
            player_count,
            mode: ModeType::Alternating,
            meta: MetaRules::default(),
            piece_types: 1,
            max_site_state: 0,
            rotations: 1,
            max_site_value: 0,
            stacking: false,
            max_stack_height: 32,
            hidden_info: false,
            max_loop_iterations: DEFAULT_LOOP_CAP,
            max_moves: None,
            hash_seed: DEFAULT_HASH_SEED,
        }
    }

    /// Set the turn mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ModeType) -> Self {
        self.mode = mode;
        self
    }

    /// Set the meta rules.
    #[must_use]
    pub fn with_meta(mut self, meta: MetaRules) -> Self {
        self.meta = meta;
        self
    }

    /// Set the number of piece types.
    #[must_use]
    pub fn with_piece_types(mut self, count: u32) -> Self {
        self.piece_types = count.max(1);
        self
    }

    /// Set the per-site state, rotation and value ranges.
    #[must_use]
    pub fn with_site_ranges(mut self, max_state: u32, rotations: u32, max_value: u32) -> Self {
        self.max_site_state = max_state;
        self.rotations = rotations.max(1);
        self.max_site_value = max_value;
        self
    }

    /// Enable stacking.
    #[must_use]
    pub fn with_stacking(mut self, max_height: usize) -> Self {
        self.stacking = true;
        self.max_stack_height = max_height.max(1);
        self
    }

    /// Enable hidden-information tracking.
    #[must_use]
    pub fn with_hidden_info(mut self) -> Self {
        self.hidden_info = true;
        self
    }

    /// Set the loop iteration cap.
    #[must_use]
    pub fn with_loop_cap(mut self, cap: usize) -> Self {
        self.max_loop_iterations = cap;
        self
    }

    /// Declare a draw after `max` decision moves.
    #[must_use]
    pub fn with_max_moves(mut self, max: usize) -> Self {
        self.max_moves = Some(max);
        self
    }

    /// Set the Zobrist seed.
    #[must_use]
    pub fn with_hash_seed(mut self, seed: u64) -> Self {
        self.hash_seed = seed;
        self
    }

    /// True for alternating-move games.
    #[must_use]
    pub fn is_alternating(&self) -> bool {
        self.mode == ModeType::Alternating
    }

    /// Flags implied by the configuration alone.
    #[must_use]
    pub fn flags(&self) -> GameFlags {
        let mut flags = GameFlags::empty();
        flags.set(GameFlags::STACKING, self.stacking);
        flags.set(GameFlags::HIDDEN_INFO, self.hidden_info);
        flags.set(GameFlags::SWAP_RULE, self.meta.swap);
        flags.set(GameFlags::REPETITION, self.meta.no_repeat.is_some());
        flags.set(GameFlags::SIMULTANEOUS, self.mode == ModeType::Simultaneous);
        flags
    }
}
