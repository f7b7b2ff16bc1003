//! [`Spot`] — one cell of the search [`Board`](crate::Board).

use gridstar_core::Point;

use crate::Board;

/// The mutually exclusive state of a [`Spot`].
///
/// Every classification predicate on `Spot` is derived from this value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpotState {
    #[default]
    Empty,
    Start,
    End,
    Barrier,
    /// Discovered, waiting in the open set.
    Open,
    /// Expanded.
    Closed,
    /// Part of the reconstructed path.
    Path,
}

/// A board cell: its position, state, and cached traversable neighbors.
///
/// `pos.y` is the row and `pos.x` the column. The neighbor list is only as
/// fresh as the last [`Board::neighbor_update`] / [`Board::update_neighbors`]
/// call; barrier changes do not refresh it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spot {
    pos: Point,
    total_rows: i32,
    state: SpotState,
    #[cfg_attr(feature = "serde", serde(skip))]
    neighbors: Vec<Point>,
}

impl Spot {
    pub(crate) fn new(row: i32, col: i32, total_rows: i32) -> Self {
        Self {
            pos: Point::new(col, row),
            total_rows,
            state: SpotState::Empty,
            neighbors: Vec::with_capacity(4),
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Row count of the board this spot was created for.
    #[cfg(feature = "serde")]
    #[inline]
    pub(crate) fn total_rows(&self) -> i32 {
        self.total_rows
    }

    #[inline]
    pub fn row(&self) -> i32 {
        self.pos.y
    }

    #[inline]
    pub fn col(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub fn state(&self) -> SpotState {
        self.state
    }

    /// Traversable neighbors as of the last refresh, in down, up, right,
    /// left order.
    #[inline]
    pub fn neighbors(&self) -> &[Point] {
        &self.neighbors
    }

    // --- predicates ---

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state == SpotState::Empty
    }

    #[inline]
    pub fn is_start(&self) -> bool {
        self.state == SpotState::Start
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.state == SpotState::End
    }

    #[inline]
    pub fn is_barrier(&self) -> bool {
        self.state == SpotState::Barrier
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == SpotState::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state == SpotState::Closed
    }

    #[inline]
    pub fn is_path(&self) -> bool {
        self.state == SpotState::Path
    }

    // --- mutators (unconditional overwrite) ---

    #[inline]
    pub fn reset(&mut self) {
        self.state = SpotState::Empty;
    }

    #[inline]
    pub fn make_start(&mut self) {
        self.state = SpotState::Start;
    }

    #[inline]
    pub fn make_end(&mut self) {
        self.state = SpotState::End;
    }

    #[inline]
    pub fn make_barrier(&mut self) {
        self.state = SpotState::Barrier;
    }

    #[inline]
    pub fn make_open(&mut self) {
        self.state = SpotState::Open;
    }

    #[inline]
    pub fn make_closed(&mut self) {
        self.state = SpotState::Closed;
    }

    #[inline]
    pub fn make_path(&mut self) {
        self.state = SpotState::Path;
    }

    /// Append the in-bounds, non-barrier cardinal neighbors of this spot to
    /// `buf`, in down, up, right, left order.
    pub fn collect_neighbors(&self, board: &Board, buf: &mut Vec<Point>) {
        const DIRS: [Point; 4] = [
            Point::new(0, 1),
            Point::new(0, -1),
            Point::new(1, 0),
            Point::new(-1, 0),
        ];
        for d in DIRS {
            let n = self.pos + d;
            if n.x < 0 || n.y < 0 || n.x >= self.total_rows || n.y >= self.total_rows {
                continue;
            }
            if board.at(n).is_some_and(|s| !s.is_barrier()) {
                buf.push(n);
            }
        }
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<Point>) {
        self.neighbors = neighbors;
    }

    pub(crate) fn take_neighbors(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.neighbors)
    }
}
