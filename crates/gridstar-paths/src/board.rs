//! [`Board`] — the square grid of [`Spot`]s that searches run on.

use gridstar_core::{Point, Range};

use crate::spot::{Spot, SpotState};
#[cfg(feature = "serde")]
use crate::error::LayoutError;

/// A `rows × rows` grid of [`Spot`]s stored in row-major order.
///
/// Spots are created once by [`Board::new`] and never move; a cell's
/// identity is its position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BoardRepr")
)]
pub struct Board {
    rows: i32,
    spots: Vec<Spot>,
}

/// Unchecked wire form of a [`Board`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct BoardRepr {
    rows: i32,
    spots: Vec<Spot>,
}

#[cfg(feature = "serde")]
impl TryFrom<BoardRepr> for Board {
    type Error = LayoutError;

    fn try_from(repr: BoardRepr) -> Result<Self, LayoutError> {
        let BoardRepr { rows, spots } = repr;
        if rows < 0 {
            return Err(LayoutError::NegativeRows { rows });
        }
        let expected = rows as usize * rows as usize;
        if spots.len() != expected {
            return Err(LayoutError::SpotCount {
                rows,
                expected,
                found: spots.len(),
            });
        }
        let board = Self { rows, spots };
        for (index, spot) in board.spots.iter().enumerate() {
            let want = board.point(index);
            if spot.pos() != want {
                return Err(LayoutError::Misplaced {
                    index,
                    expected: want,
                    found: spot.pos(),
                });
            }
            if spot.total_rows() != rows {
                return Err(LayoutError::RowCount {
                    pos: spot.pos(),
                    rows,
                    found: spot.total_rows(),
                });
            }
        }
        Ok(board)
    }
}

impl Board {
    /// Create a board of `rows × rows` empty spots.
    pub fn new(rows: i32) -> Self {
        let rows = rows.max(0);
        let spots = (0..rows)
            .flat_map(|row| (0..rows).map(move |col| Spot::new(row, col, rows)))
            .collect();
        Self { rows, spots }
    }

    /// Number of rows (and columns).
    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Total number of spots.
    #[inline]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// The board rectangle, `(0, 0)` to `(rows, rows)`.
    #[inline]
    pub fn range(&self) -> Range {
        Range::square(self.rows)
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.range().contains(p)
    }

    /// Flat index of `p`, or `None` if out of bounds.
    #[inline]
    pub fn idx(&self, p: Point) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        Some((p.y * self.rows + p.x) as usize)
    }

    /// Position of flat index `idx`.
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        let rows = self.rows as usize;
        Point::new((idx % rows) as i32, (idx / rows) as i32)
    }

    pub fn at(&self, p: Point) -> Option<&Spot> {
        self.idx(p).map(|i| &self.spots[i])
    }

    pub fn at_mut(&mut self, p: Point) -> Option<&mut Spot> {
        self.idx(p).map(|i| &mut self.spots[i])
    }

    /// State of the spot at `p`, or `None` if out of bounds.
    pub fn state(&self, p: Point) -> Option<SpotState> {
        self.at(p).map(Spot::state)
    }

    #[inline]
    pub(crate) fn spot(&self, idx: usize) -> &Spot {
        &self.spots[idx]
    }

    #[inline]
    pub(crate) fn spot_mut(&mut self, idx: usize) -> &mut Spot {
        &mut self.spots[idx]
    }

    /// Recompute the neighbor list of the spot at `p` from the current
    /// barrier layout. No-op if `p` is out of bounds.
    pub fn neighbor_update(&mut self, p: Point) {
        let Some(i) = self.idx(p) else {
            return;
        };
        let mut buf = self.spots[i].take_neighbors();
        buf.clear();
        self.spots[i].collect_neighbors(self, &mut buf);
        self.spots[i].set_neighbors(buf);
    }

    /// Recompute the neighbor list of every spot.
    pub fn update_neighbors(&mut self) {
        for i in 0..self.spots.len() {
            let p = self.spots[i].pos();
            self.neighbor_update(p);
        }
    }

    /// Turn every Open, Closed and Path spot back into Empty, keeping start,
    /// end and barriers.
    pub fn clear_search_marks(&mut self) {
        for s in &mut self.spots {
            if matches!(
                s.state(),
                SpotState::Open | SpotState::Closed | SpotState::Path
            ) {
                s.reset();
            }
        }
    }

    /// Number of spots currently in `state`.
    pub fn count(&self, state: SpotState) -> usize {
        self.spots.iter().filter(|s| s.state() == state).count()
    }

    /// Row-major iterator over all spots.
    pub fn iter(&self) -> std::slice::Iter<'_, Spot> {
        self.spots.iter()
    }
}

impl<'a> IntoIterator for &'a Board {
    type Item = &'a Spot;
    type IntoIter = std::slice::Iter<'a, Spot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Map a pointer position in pixels to the board cell under it.
///
/// The board is `width` pixels wide and tall, split into `rows` cells of
/// `width / rows` pixels each (integer division). Returns `None` when the
/// pointer lies outside the board or the cell size is zero.
pub fn clicked_pos(pointer: Point, rows: i32, width: i32) -> Option<Point> {
    if rows <= 0 {
        return None;
    }
    let gap = width / rows;
    if gap <= 0 || pointer.x < 0 || pointer.y < 0 {
        return None;
    }
    let p = pointer / gap;
    Range::square(rows).contains(p).then_some(p)
}
