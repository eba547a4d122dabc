//! Boolean rule nodes.
//!
//! The engine ships the handful of predicates it needs itself (site
//! occupancy, mover checks, board full) plus combinators. Anything else a
//! game needs comes in through [`BooleanFunction`] as `Condition::Custom`.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::core::{Context, GameFlags, PlayerId};

/// Externally defined boolean rule node.
pub trait BooleanFunction: Debug + Send + Sync {
    /// Evaluate against a context.
    fn eval(&self, ctx: &Context) -> bool;

    /// True if the result never depends on the context.
    fn is_static(&self) -> bool {
        false
    }

    /// Features the node relies on.
    fn game_flags(&self) -> GameFlags {
        GameFlags::empty()
    }
}

/// A condition evaluated against a context.
#[derive(Clone, Debug)]
pub enum Condition {
    // === Constants ===
    True,
    False,

    // === Sites ===
    /// No piece at the site.
    IsEmpty(usize),

    /// A piece at the site.
    IsOccupied(usize),

    /// Every site is occupied.
    BoardFull,

    // === Players ===
    /// The given player is to move.
    IsMover(PlayerId),

    /// The mover has no legal move recorded.
    MoverStalemated,

    // === Combinators ===
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),

    // === Special ===
    Custom(Arc<dyn BooleanFunction>),
}

impl Condition {
    /// Wrap a closure as a custom condition.
    pub fn custom(f: impl Fn(&Context) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(FnCondition(Box::new(f))))
    }

    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate against `ctx`.
    #[must_use]
    pub fn eval(&self, ctx: &Context) -> bool {
        match self {
            Condition::True => true,
            Condition::False => false,
            Condition::IsEmpty(site) => ctx.state.is_empty(*site),
            Condition::IsOccupied(site) => !ctx.state.is_empty(*site),
            Condition::BoardFull => ctx.state.is_full(),
            Condition::IsMover(player) => ctx.mover() == *player,
            Condition::MoverStalemated => ctx.state.is_stalemated(ctx.mover()),
            Condition::All(conditions) => conditions.iter().all(|c| c.eval(ctx)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.eval(ctx)),
            Condition::Not(inner) => !inner.eval(ctx),
            Condition::Custom(f) => f.eval(ctx),
        }
    }

    /// True if the result never depends on the context.
    #[must_use]
    pub fn is_static(&self) -> bool {
        match self {
            Condition::True | Condition::False => true,
            Condition::All(conditions) | Condition::Any(conditions) => {
                conditions.iter().all(Condition::is_static)
            }
            Condition::Not(inner) => inner.is_static(),
            Condition::Custom(f) => f.is_static(),
            _ => false,
        }
    }

    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        match self {
            Condition::All(conditions) | Condition::Any(conditions) => conditions
                .iter()
                .fold(GameFlags::empty(), |flags, c| flags | c.game_flags()),
            Condition::Not(inner) => inner.game_flags(),
            Condition::Custom(f) => f.game_flags(),
            _ => GameFlags::empty(),
        }
    }
}

struct FnCondition(Box<dyn Fn(&Context) -> bool + Send + Sync>);

impl Debug for FnCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCondition")
    }
}

impl BooleanFunction for FnCondition {
    fn eval(&self, ctx: &Context) -> bool {
        (self.0)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::TicTacToe;

    #[test]
    fn test_site_conditions() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = Context::new(game, 1);
        let p1 = PlayerId::new(1);
        ctx.state.place(4, crate::hash::Level::piece(1, 1));

        assert!(Condition::IsOccupied(4).eval(&ctx));
        assert!(Condition::IsEmpty(0).eval(&ctx));
        assert!(!Condition::BoardFull.eval(&ctx));
        assert!(Condition::IsMover(p1).eval(&ctx));
    }

    #[test]
    fn test_combinators() {
        let game = TicTacToe::new().build().unwrap();
        let ctx = Context::new(game, 1);

        assert!(Condition::all([Condition::True, Condition::IsEmpty(0)]).eval(&ctx));
        assert!(!Condition::any([Condition::False, Condition::IsOccupied(0)]).eval(&ctx));
        assert!(Condition::False.negate().eval(&ctx));
        assert!(Condition::custom(|ctx| ctx.state.var() == 0).eval(&ctx));
    }

    #[test]
    fn test_static_analysis() {
        assert!(Condition::all([Condition::True, Condition::False.negate()]).is_static());
        assert!(!Condition::any([Condition::True, Condition::BoardFull]).is_static());
        assert!(!Condition::custom(|_| true).is_static());
    }
}
