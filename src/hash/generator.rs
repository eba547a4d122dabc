//! Deterministic generation of Zobrist term tables.

use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::GameConfig;

use super::stack::StackTerms;

/// Number of distinct score (and amount) terms per player.
///
/// Values are reduced modulo this before lookup; colliding scores are
/// accepted as a Zobrist trade-off.
pub const SCORE_TERMS: usize = 1024;

/// Seeded source of non-zero 64-bit terms.
///
/// ChaCha8 output is specified bit-for-bit, so a fixed seed yields the same
/// tables on every platform.
pub struct ZobristGenerator {
    rng: ChaCha8Rng,
}

impl ZobristGenerator {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next non-zero term.
    pub fn next_term(&mut self) -> u64 {
        loop {
            let term = self.rng.next_u64();
            if term != 0 {
                return term;
            }
        }
    }

    /// Generate a `positions × values` table whose value-0 column is zero.
    pub fn table(&mut self, positions: usize, values: usize) -> TermTable {
        let values = values.max(1);
        let mut terms = Vec::with_capacity(positions * values);
        for _ in 0..positions {
            terms.push(0);
            for _ in 1..values {
                terms.push(self.next_term());
            }
        }
        TermTable {
            positions,
            values,
            terms: terms.into(),
        }
    }

    /// Generate one term per position.
    pub fn flags(&mut self, positions: usize) -> Arc<[u64]> {
        (0..positions).map(|_| self.next_term()).collect()
    }
}

/// Immutable table of terms indexed by (position, value).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermTable {
    positions: usize,
    values: usize,
    terms: Arc<[u64]>,
}

impl TermTable {
    /// Number of positions.
    #[must_use]
    pub fn positions(&self) -> usize {
        self.positions
    }

    /// Number of values per position (including 0).
    #[must_use]
    pub fn values(&self) -> usize {
        self.values
    }

    /// Term for `value` at `pos`. Value 0 is always the zero term.
    #[inline]
    #[must_use]
    pub fn term(&self, pos: usize, value: u32) -> u64 {
        let value = value as usize;
        assert!(
            value < self.values && pos < self.positions,
            "hash term ({pos}, {value}) outside a {}x{} table",
            self.positions,
            self.values
        );
        self.terms[pos * self.values + value]
    }
}

/// Every term table a game's state needs.
///
/// Built once per compiled game and shared read-only by all of its
/// contexts.
#[derive(Debug)]
pub struct ZobristTables {
    pub num_sites: usize,
    pub player_count: usize,
    pub who: TermTable,
    pub what: TermTable,
    pub site_state: TermTable,
    pub rotation: TermTable,
    pub value: TermTable,
    pub stack: Option<Arc<StackTerms>>,
    pub hidden: Vec<Arc<[u64]>>,
    pub score: TermTable,
    pub amount: TermTable,
    pub mover: TermTable,
    pub phase: TermTable,
    pub order: TermTable,
}

impl ZobristTables {
    /// Generate all tables for a configuration, a site count and a phase
    /// count. Generation order is fixed.
    #[must_use]
    pub fn generate(config: &GameConfig, num_sites: usize, num_phases: usize) -> Self {
        let mut gen = ZobristGenerator::new(config.hash_seed);
        let players = config.player_count;

        let who = gen.table(num_sites, players + 1);
        let what = gen.table(num_sites, config.piece_types as usize + 1);
        let site_state = gen.table(num_sites, config.max_site_state as usize + 1);
        let rotation = gen.table(num_sites, config.rotations as usize);
        let value = gen.table(num_sites, config.max_site_value as usize + 1);

        let stack = config
            .stacking
            .then(|| Arc::new(StackTerms::generate(&mut gen, config, num_sites)));

        let hidden = if config.hidden_info {
            (0..players).map(|_| gen.flags(num_sites)).collect()
        } else {
            Vec::new()
        };

        let score = gen.table(players + 1, SCORE_TERMS);
        let amount = gen.table(players + 1, SCORE_TERMS);
        let mover = gen.table(1, players + 1);
        let phase = gen.table(players + 1, num_phases.max(1));
        let order = gen.table(players + 1, players + 1);

        Self {
            num_sites,
            player_count: players,
            who,
            what,
            site_state,
            rotation,
            value,
            stack,
            hidden,
            score,
            amount,
            mover,
            phase,
            order,
        }
    }
}
