//! Playout configuration.

use serde::{Deserialize, Serialize};

/// Playout engine parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayoutConfig {
    /// Ply budget per playout (`None` = play to the end).
    /// Checked once per ply.
    pub max_actions: Option<usize>,

    /// Seed for the selection RNG.
    pub seed: u64,

    /// Thinking time handed to agents, in seconds. Advisory.
    pub thinking_time: f64,

    /// Iteration limit handed to agents.
    pub max_iterations: Option<usize>,

    /// Search depth limit handed to agents.
    pub max_depth: Option<usize>,

    /// Keep recording undo data during playouts. Off by default: each
    /// recorded ply holds a full state snapshot.
    #[serde(default)]
    pub keep_undo: bool,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self {
            max_actions: None,
            seed: 42,
            thinking_time: 1.0,
            max_iterations: None,
            max_depth: None,
            keep_undo: false,
        }
    }
}

impl PlayoutConfig {
    pub fn with_max_actions(mut self, max: usize) -> Self {
        self.max_actions = Some(max);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_thinking_time(mut self, seconds: f64) -> Self {
        self.thinking_time = seconds;
        self
    }

    /// Leave the context's undo stack in place so playouts can be taken
    /// back.
    pub fn with_undo(mut self) -> Self {
        self.keep_undo = true;
        self
    }

    /// True while `plies` is inside the budget.
    #[must_use]
    pub fn within_budget(&self, plies: usize) -> bool {
        self.max_actions.map_or(true, |max| plies < max)
    }
}
