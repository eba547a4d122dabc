//! Rectangular grid topology.

use super::{Topology, Track};

/// `width × height` grid, sites numbered row by row from 0.
///
/// ```
/// use ludeme_sim::topology::{SquareBoard, Topology};
///
/// let board = SquareBoard::new(3, 3);
/// assert_eq!(board.num_sites(), 9);
/// assert_eq!(board.neighbours(4), &[1, 3, 5, 7]);
/// assert_eq!(board.symmetries().len(), 7);
/// ```
#[derive(Clone, Debug)]
pub struct SquareBoard {
    width: usize,
    height: usize,
    neighbours: Vec<Vec<usize>>,
    tracks: Vec<Track>,
}

impl SquareBoard {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let neighbours = (0..width * height)
            .map(|site| {
                let (x, y) = (site % width, site / width);
                let mut adj = Vec::with_capacity(4);
                if y > 0 {
                    adj.push(site - width);
                }
                if x > 0 {
                    adj.push(site - 1);
                }
                if x + 1 < width {
                    adj.push(site + 1);
                }
                if y + 1 < height {
                    adj.push(site + width);
                }
                adj
            })
            .collect();

        Self {
            width,
            height,
            neighbours,
            tracks: Vec::new(),
        }
    }

    /// Add a track.
    #[must_use]
    pub fn with_track(mut self, track: Track) -> Self {
        assert!(
            track.sites.iter().all(|s| *s < self.width * self.height),
            "track `{}` leaves the board",
            track.name
        );
        self.tracks.push(track);
        self
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn map(&self, f: impl Fn(usize, usize) -> (usize, usize)) -> Vec<usize> {
        (0..self.num_sites())
            .map(|site| {
                let (x, y) = f(site % self.width, site / self.width);
                y * self.width + x
            })
            .collect()
    }
}

impl Topology for SquareBoard {
    fn num_sites(&self) -> usize {
        self.width * self.height
    }

    fn neighbours(&self, site: usize) -> &[usize] {
        &self.neighbours[site]
    }

    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Reflections always; rotations only on square boards.
    fn symmetries(&self) -> Vec<Vec<usize>> {
        let (w, h) = (self.width - 1, self.height - 1);
        let mut syms = vec![
            self.map(|x, y| (w - x, y)),
            self.map(|x, y| (x, h - y)),
            self.map(|x, y| (w - x, h - y)),
        ];
        if self.width == self.height {
            syms.push(self.map(|x, y| (y, x)));
            syms.push(self.map(|x, y| (w - y, h - x)));
            syms.push(self.map(|x, y| (w - y, x)));
            syms.push(self.map(|x, y| (y, h - x)));
        }
        syms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_neighbours() {
        let board = SquareBoard::new(3, 2);
        assert_eq!(board.neighbours(0), &[1, 3]);
        assert_eq!(board.neighbours(5), &[2, 4]);
    }

    #[test]
    fn test_symmetries_are_permutations() {
        for board in [SquareBoard::new(3, 3), SquareBoard::new(4, 2)] {
            for sym in board.symmetries() {
                let mut sorted = sym.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, (0..board.num_sites()).collect::<Vec<_>>());
            }
        }
        assert_eq!(SquareBoard::new(4, 2).symmetries().len(), 3);
    }

    #[test]
    fn test_line_mirror() {
        let board = SquareBoard::new(4, 1);
        assert_eq!(board.symmetries()[0], vec![3, 2, 1, 0]);
    }

    #[test]
    #[should_panic(expected = "leaves the board")]
    fn test_track_off_board_panics() {
        let _ = SquareBoard::new(2, 2).with_track(Track::new("Bad", vec![4]));
    }
}
