//! Incremental Zobrist hashing of game state.
//!
//! Every hashed feature of a `State` lives in a ledger that owns a table of
//! pre-generated 64-bit terms. Mutating a ledger entry computes
//! `delta = old_term ^ new_term` and XORs it into the owning state's hash
//! through [`HashSink`], so the state hash always equals the XOR of every
//! term currently "on".
//!
//! Three ledger shapes share that contract:
//!
//! - [`HashedBitSet`]: one term per boolean flag per position.
//! - [`HashedChunkSet`]: one term per (position, value) for small-range
//!   values packed into fixed-width chunks.
//! - [`HashedStack`]: per-level terms plus a size term for a site holding an
//!   ordered stack of pieces, with a local shadow hash.
//!
//! Value 0 always maps to the zero term, so an empty ledger contributes 0.
//! Collisions are accepted, as with any Zobrist scheme.
//!
//! Term tables come from [`ZobristGenerator`], a ChaCha8 stream with a fixed
//! seed: two runs over the same topology and configuration produce
//! byte-identical tables on every platform. Tables are immutable after
//! construction and shared between contexts through `Arc`.

mod bits;
mod chunks;
mod generator;
mod stack;

pub use bits::HashedBitSet;
pub use chunks::{ChunkSet, HashedChunkSet};
pub use generator::{TermTable, ZobristGenerator, ZobristTables, SCORE_TERMS};
pub use stack::{HashedStack, Level, StackTerms};

/// Receiver of hash deltas.
pub trait HashSink {
    /// XOR `delta` into the running hash.
    fn update_hash(&mut self, delta: u64);
}

/// A running XOR accumulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StateHash(u64);

impl StateHash {
    /// Current value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl HashSink for StateHash {
    #[inline]
    fn update_hash(&mut self, delta: u64) {
        self.0 ^= delta;
    }
}

/// Resolve a position through an optional site permutation.
#[inline]
pub(crate) fn remap_site(site_remap: Option<&[usize]>, pos: usize) -> usize {
    site_remap.map_or(pos, |remap| remap[pos])
}

/// Resolve a value through an optional value permutation.
#[inline]
pub(crate) fn remap_value(value_remap: Option<&[u32]>, value: u32) -> u32 {
    match value_remap {
        Some(remap) if (value as usize) < remap.len() => remap[value as usize],
        _ => value,
    }
}
