//! Rule shapes the fast playout path can replay.

use crate::core::{Context, Move, Result};
use crate::moves::{Do, Moves};
use crate::rules::{meta, Condition, Game};

/// Top-level move rule of a phase, in a form the fast path understands.
#[derive(Clone, Copy, Debug)]
pub enum FastShape<'a> {
    /// A bare `Do`.
    Do(&'a Do),
    /// `If condition Do else otherwise`.
    IfElseDo {
        condition: &'a Condition,
        body: &'a Do,
        otherwise: Option<&'a Moves>,
    },
    /// `Or [Do, Pass]`, in either order.
    OrDoPass { body: &'a Do, pass_first: bool },
}

impl<'a> FastShape<'a> {
    /// Recognise the shape of a phase's move rule.
    #[must_use]
    pub fn detect(moves: &'a Moves) -> Option<Self> {
        match moves {
            Moves::Do(body) => Some(Self::Do(body)),
            Moves::If(branch) => match &*branch.then {
                Moves::Do(body) => Some(Self::IfElseDo {
                    condition: &branch.condition,
                    body,
                    otherwise: branch.otherwise.as_deref(),
                }),
                _ => None,
            },
            Moves::Or(list) => match list.as_slice() {
                [Moves::Do(body), Moves::Pass] => Some(Self::OrDoPass {
                    body,
                    pass_first: false,
                }),
                [Moves::Pass, Moves::Do(body)] => Some(Self::OrDoPass {
                    body,
                    pass_first: true,
                }),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Do(_) => "Do",
            Self::IfElseDo { .. } => "If/Do",
            Self::OrDoPass { .. } => "Or[Do, Pass]",
        }
    }

    /// Unfiltered candidates for the mover and the `Do` whose filters still
    /// apply to them. Prior moves are generated once; the after condition
    /// and repetition checks are left to [`FastShape::recheck`].
    pub fn candidates(&self, ctx: &mut Context) -> Result<(Option<&'a Do>, Vec<Move>)> {
        match *self {
            Self::Do(body) => Ok((Some(body), body.generate(ctx)?)),
            Self::IfElseDo {
                condition,
                body,
                otherwise,
            } => {
                if condition.eval(ctx) {
                    Ok((Some(body), body.generate(ctx)?))
                } else {
                    let moves = match otherwise {
                        Some(otherwise) => otherwise.eval(ctx)?,
                        None => Vec::new(),
                    };
                    Ok((None, moves))
                }
            }
            Self::OrDoPass { body, pass_first } => {
                let mut moves = body.generate(ctx)?;
                let pass = Move::pass(ctx.mover());
                if pass_first {
                    moves.insert(0, pass);
                } else {
                    moves.push(pass);
                }
                Ok((Some(body), moves))
            }
        }
    }

    /// True if a sampled candidate is legal under the general path: it
    /// passes the `Do` filters (unless injected) and the meta rules.
    pub fn recheck(&self, game: &Game, ctx: &Context, body: Option<&Do>, mv: &Move) -> Result<bool> {
        if mv.is_swap() || (mv.is_pass() && matches!(self, Self::OrDoPass { .. })) {
            return Ok(true);
        }
        if let Some(body) = body {
            if !body.accepts(ctx, mv)? {
                return Ok(false);
            }
        }
        meta::is_allowed(game, ctx, mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{RuleShape, TicTacToe};

    #[test]
    fn test_detects_reference_shapes() {
        for (shape, name) in [
            (RuleShape::Do, Some("Do")),
            (RuleShape::IfElseDo, Some("If/Do")),
            (RuleShape::OrDoPass, Some("Or[Do, Pass]")),
            (RuleShape::Plain, None),
        ] {
            let game = TicTacToe::new().shape(shape).build().unwrap();
            let detected = FastShape::detect(&game.phase(0).moves);
            assert_eq!(detected.map(|s| s.name()), name, "{shape:?}");
        }
    }

    #[test]
    fn test_pass_first_order() {
        let moves = Moves::or([Moves::Pass, Do::new(Moves::add_empty(1)).into()]);
        assert!(matches!(
            FastShape::detect(&moves),
            Some(FastShape::OrDoPass { pass_first: true, .. })
        ));
        assert!(FastShape::detect(&Moves::or([Moves::Pass])).is_none());
    }
}
