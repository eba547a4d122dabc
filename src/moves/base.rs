//! Placement generator.

use crate::core::{Context, Move};

/// Where `Add` may place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Region {
    /// Every empty site.
    Empty,
    /// The listed sites, when empty.
    Sites(Vec<usize>),
    /// The context's site pointer, when set and empty.
    CurrentSite,
}

/// Place a piece of the mover's role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Add {
    pub region: Region,
    pub what: u32,
}

impl Add {
    #[must_use]
    pub fn new(region: Region, what: u32) -> Self {
        Self { region, what }
    }

    pub(crate) fn eval(&self, ctx: &Context) -> Vec<Move> {
        let mover = ctx.mover();
        let role = ctx.state.role_of(mover);
        let place = |site| Move::add(mover, site, role, self.what);

        match &self.region {
            Region::Empty => ctx.state.empty_sites().map(place).collect(),
            Region::Sites(sites) => sites
                .iter()
                .copied()
                .filter(|site| ctx.state.is_empty(*site))
                .map(place)
                .collect(),
            Region::CurrentSite => ctx
                .site()
                .filter(|site| ctx.state.is_empty(*site))
                .map(place)
                .into_iter()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;
    use crate::games::TicTacToe;
    use crate::hash::Level;

    #[test]
    fn test_regions() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = crate::core::Context::new(game, 1);
        ctx.state.place(2, Level::piece(2, 1));

        assert_eq!(Add::new(Region::Empty, 1).eval(&ctx).len(), 8);
        assert_eq!(Add::new(Region::Sites(vec![1, 2, 3]), 1).eval(&ctx).len(), 2);
        assert!(Add::new(Region::CurrentSite, 1).eval(&ctx).is_empty());

        ctx.set_site(Some(5));
        let moves = Add::new(Region::CurrentSite, 1).eval(&ctx);
        assert_eq!(moves, vec![Move::add(PlayerId::new(1), 5, PlayerId::new(1), 1)]);
    }

    #[test]
    fn test_places_mover_role() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = crate::core::Context::new(game, 1);
        ctx.state.swap_players(PlayerId::new(1), PlayerId::new(2));

        let moves = Add::new(Region::Sites(vec![0]), 1).eval(&ctx);
        assert_eq!(moves[0].mover, PlayerId::new(1));
        assert_eq!(
            moves[0].actions[0],
            crate::core::Action::Add {
                site: 0,
                who: PlayerId::new(2),
                what: 1
            }
        );
    }
}
