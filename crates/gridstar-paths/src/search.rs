//! A* search over a [`Board`], driven one step at a time.
//!
//! [`Search`] owns all per-run bookkeeping (scores, predecessors, the open
//! set) and marks spots on the board as it goes: discovered spots become
//! Open, expanded spots Closed, and on success the cells between start and
//! end become Path. The caller decides the pace: [`Search::step`] performs a
//! single expansion or path mark, [`Search::run`] loops until completion and
//! reports to a [`SearchObserver`] after each step.

use std::collections::BinaryHeap;

use gridstar_core::Point;
use log::debug;

use crate::board::Board;
use crate::distance::manhattan;
use crate::error::{Endpoint, Result, SearchError};

/// Sentinel score for cells not reached yet.
pub const UNREACHABLE: i32 = i32::MAX;

const NO_PARENT: usize = usize::MAX;

/// Final result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A shortest path, from start to end inclusive.
    Found(Vec<Point>),
    /// The open set ran dry without reaching the end.
    NotFound,
    /// Stopped by [`SearchObserver::should_abort`] or [`Search::cancel`].
    Cancelled,
}

impl Outcome {
    /// Number of moves along a found path.
    pub fn steps(&self) -> Option<usize> {
        match self {
            Outcome::Found(path) => Some(path.len().saturating_sub(1)),
            _ => None,
        }
    }
}

/// What a single [`Search::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Popped and expanded the cell at this position.
    Expanded(Point),
    /// Marked this cell as part of the path.
    Traced(Point),
    /// The search is over; further steps return the same value.
    Done(Outcome),
}

/// Hooks a running search reports to.
///
/// Rendering and cancellation are separate concerns: `on_step` must only
/// observe, `should_abort` is polled before each pop of the open set.
pub trait SearchObserver {
    /// Called after every expansion and after every path mark.
    fn on_step(&mut self, board: &Board);

    /// Whether to stop before the next pop. Never polled while tracing.
    fn should_abort(&mut self) -> bool {
        false
    }
}

impl<F: FnMut(&Board)> SearchObserver for F {
    fn on_step(&mut self, board: &Board) {
        self(board)
    }
}

/// Open-set entry, ordered so that `BinaryHeap` pops the lowest `f` first
/// and, among equal `f`, the earliest insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry {
    f: i32,
    seq: u64,
    idx: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
enum Phase {
    Searching,
    /// Walking predecessors back from the end; `cursor` is the last cell
    /// added to `path`.
    Tracing,
    Done(Outcome),
}

/// One A* run from a start cell to an end cell.
///
/// A `Search` is tied to the board it was created on: every call to
/// [`step`](Search::step) or [`run`](Search::run) must pass that same board.
#[derive(Debug)]
pub struct Search {
    start: usize,
    end: usize,
    goal: Point,
    rows: i32,
    len: usize,
    g_score: Vec<i32>,
    f_score: Vec<i32>,
    came_from: Vec<usize>,
    open: BinaryHeap<OpenEntry>,
    open_membership: Vec<bool>,
    seq: u64,
    expanded: usize,
    phase: Phase,
    cursor: usize,
    path: Vec<Point>,
    nbuf: Vec<Point>,
}

impl Search {
    /// Prepare a search from `start` to `end`.
    ///
    /// Refreshes every neighbor list on `board` first, so the search always
    /// sees the current barrier layout.
    pub fn new(board: &mut Board, start: Point, end: Point) -> Result<Self> {
        let rows = board.rows();
        let start_idx = board.idx(start).ok_or(SearchError::OutOfBounds {
            role: Endpoint::Start,
            pos: start,
            rows,
        })?;
        let end_idx = board.idx(end).ok_or(SearchError::OutOfBounds {
            role: Endpoint::End,
            pos: end,
            rows,
        })?;
        if start_idx == end_idx {
            return Err(SearchError::SameEndpoints { pos: start });
        }

        board.update_neighbors();

        let len = board.len();
        let mut search = Self {
            start: start_idx,
            end: end_idx,
            goal: end,
            rows,
            len,
            g_score: vec![UNREACHABLE; len],
            f_score: vec![UNREACHABLE; len],
            came_from: vec![NO_PARENT; len],
            open: BinaryHeap::new(),
            open_membership: vec![false; len],
            seq: 0,
            expanded: 0,
            phase: Phase::Searching,
            cursor: end_idx,
            path: Vec::new(),
            nbuf: Vec::with_capacity(4),
        };
        search.g_score[start_idx] = 0;
        search.f_score[start_idx] = manhattan(start, end);
        search.push(start_idx);
        search.open_membership[start_idx] = true;

        debug!("astar: {start} -> {end} on a {rows}x{rows} board");
        Ok(search)
    }

    /// Advance the search by one expansion or one path mark.
    ///
    /// `board` must be the board passed to [`Search::new`], with an
    /// unchanged barrier layout.
    pub fn step(&mut self, board: &mut Board) -> Step {
        debug_assert_eq!(board.len(), self.len, "search stepped on a different board");
        match self.phase {
            Phase::Searching => self.expand(board),
            Phase::Tracing => self.trace(board),
            Phase::Done(ref outcome) => Step::Done(outcome.clone()),
        }
    }

    /// Step until done, calling `observer.on_step` after every step that
    /// did not finish the search.
    pub fn run<O: SearchObserver + ?Sized>(
        &mut self,
        board: &mut Board,
        observer: &mut O,
    ) -> Outcome {
        loop {
            if matches!(self.phase, Phase::Searching) && observer.should_abort() {
                self.cancel();
            }
            match self.step(board) {
                Step::Done(outcome) => return outcome,
                Step::Expanded(_) | Step::Traced(_) => observer.on_step(board),
            }
        }
    }

    /// Stop the search where it is. Marks already made stay on the board.
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            debug!("astar: cancelled after {} expansions", self.expanded);
            self.phase = Phase::Done(Outcome::Cancelled);
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    /// The final outcome, once finished.
    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Number of cells popped and expanded so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Recorded predecessor of `p`, if any.
    pub fn came_from(&self, p: Point) -> Option<Point> {
        let i = self.idx(p)?;
        let parent = self.came_from[i];
        (parent != NO_PARENT).then(|| self.point(parent))
    }

    /// Best known cost from start to `p`, or `None` while unreached.
    pub fn g_score(&self, p: Point) -> Option<i32> {
        let i = self.idx(p)?;
        let g = self.g_score[i];
        (g != UNREACHABLE).then_some(g)
    }

    /// Number of cells waiting in the open set.
    pub fn pending(&self) -> usize {
        self.open_membership.iter().filter(|&&m| m).count()
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.rows || p.y >= self.rows {
            return None;
        }
        Some((p.y * self.rows + p.x) as usize)
    }

    #[inline]
    fn point(&self, idx: usize) -> Point {
        let rows = self.rows as usize;
        Point::new((idx % rows) as i32, (idx / rows) as i32)
    }

    fn push(&mut self, idx: usize) {
        self.open.push(OpenEntry {
            f: self.f_score[idx],
            seq: self.seq,
            idx,
        });
        self.seq += 1;
    }

    fn finish(&mut self, outcome: Outcome) -> Step {
        self.phase = Phase::Done(outcome.clone());
        Step::Done(outcome)
    }

    fn expand(&mut self, board: &mut Board) -> Step {
        let Some(OpenEntry { idx: current, .. }) = self.open.pop() else {
            debug!("astar: no path after {} expansions", self.expanded);
            return self.finish(Outcome::NotFound);
        };
        self.open_membership[current] = false;
        self.expanded += 1;

        if current == self.end {
            self.phase = Phase::Tracing;
            self.cursor = self.end;
            self.path.clear();
            self.path.push(self.goal);
            return self.trace(board);
        }

        let mut nbuf = std::mem::take(&mut self.nbuf);
        nbuf.clear();
        nbuf.extend_from_slice(board.spot(current).neighbors());

        let tentative_g = self.g_score[current] + 1;
        for &np in nbuf.iter() {
            if let Some(ni) = self.idx(np) {
                self.relax(board, current, ni, tentative_g);
            }
        }
        self.nbuf = nbuf;

        if current != self.start {
            board.spot_mut(current).make_closed();
        }
        Step::Expanded(self.point(current))
    }

    /// Record `current` as the predecessor of `ni` if it offers a cheaper
    /// route. Only a cell's first discovery enters the open set; a cell that
    /// is already pending keeps its heap entry and the key it was pushed with.
    fn relax(&mut self, board: &mut Board, current: usize, ni: usize, tentative_g: i32) {
        if tentative_g >= self.g_score[ni] {
            return;
        }
        self.came_from[ni] = current;
        self.g_score[ni] = tentative_g;
        self.f_score[ni] = tentative_g + manhattan(self.point(ni), self.goal);
        if !self.open_membership[ni] {
            self.push(ni);
            self.open_membership[ni] = true;
            if ni != self.end {
                board.spot_mut(ni).make_open();
            }
        }
    }

    fn trace(&mut self, board: &mut Board) -> Step {
        let prev = self.came_from[self.cursor];
        if prev == NO_PARENT || self.came_from[prev] == NO_PARENT {
            // `prev` is the root of the tree: the start cell.
            if prev != NO_PARENT {
                self.path.push(self.point(prev));
            }
            let mut path = std::mem::take(&mut self.path);
            path.reverse();
            debug!(
                "astar: found a {}-step path after {} expansions",
                path.len().saturating_sub(1),
                self.expanded
            );
            return self.finish(Outcome::Found(path));
        }
        board.spot_mut(prev).make_path();
        let p = self.point(prev);
        self.path.push(p);
        self.cursor = prev;
        Step::Traced(p)
    }
}

/// Run A* from `start` to `end` to completion.
///
/// Neighbor lists are refreshed first. On success the cells strictly
/// between start and end are marked Path; start and end keep their marks.
pub fn search<O: SearchObserver + ?Sized>(
    board: &mut Board,
    start: Point,
    end: Point,
    observer: &mut O,
) -> Result<Outcome> {
    let mut s = Search::new(board, start, end)?;
    Ok(s.run(board, observer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_entry_pops_lowest_f_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry { f: 5, seq: 0, idx: 0 });
        heap.push(OpenEntry { f: 3, seq: 2, idx: 1 });
        heap.push(OpenEntry { f: 3, seq: 1, idx: 2 });
        heap.push(OpenEntry { f: 4, seq: 3, idx: 3 });
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.idx)).collect();
        assert_eq!(order, vec![2, 1, 3, 0]);
    }

    #[test]
    fn new_validates_endpoints() {
        let mut board = Board::new(3);
        let err = Search::new(&mut board, Point::new(0, 0), Point::new(3, 0)).unwrap_err();
        assert!(matches!(err, SearchError::OutOfBounds { role: Endpoint::End, .. }));
        let err = Search::new(&mut board, Point::new(-1, 0), Point::new(1, 0)).unwrap_err();
        assert!(matches!(err, SearchError::OutOfBounds { role: Endpoint::Start, .. }));
        let err = Search::new(&mut board, Point::new(1, 1), Point::new(1, 1)).unwrap_err();
        assert_eq!(err, SearchError::SameEndpoints { pos: Point::new(1, 1) });
    }

    #[test]
    fn new_seeds_open_set_with_start() {
        let mut board = Board::new(3);
        let s = Search::new(&mut board, Point::new(0, 0), Point::new(2, 2)).unwrap();
        assert_eq!(s.g_score(Point::new(0, 0)), Some(0));
        assert_eq!(s.g_score(Point::new(1, 0)), None);
        assert_eq!(s.pending(), 1);
        assert!(!s.is_finished());
        // neighbor lists were refreshed
        assert_eq!(board.at(Point::new(1, 1)).unwrap().neighbors().len(), 4);
    }

    #[test]
    fn adjacent_endpoints_need_no_path_marks() {
        let mut board = Board::new(2);
        let (start, end) = (Point::new(0, 0), Point::new(1, 0));
        let mut s = Search::new(&mut board, start, end).unwrap();
        assert_eq!(s.step(&mut board), Step::Expanded(start));
        assert_eq!(s.step(&mut board), Step::Done(Outcome::Found(vec![start, end])));
        assert_eq!(s.step(&mut board), Step::Done(Outcome::Found(vec![start, end])));
        assert_eq!(s.expanded(), 2);
    }

    #[test]
    fn cancel_keeps_marks() {
        let mut board = Board::new(5);
        let mut s = Search::new(&mut board, Point::new(0, 0), Point::new(4, 4)).unwrap();
        s.step(&mut board);
        s.step(&mut board);
        let open_before = board.count(crate::SpotState::Open);
        s.cancel();
        assert!(s.is_finished());
        assert_eq!(s.outcome(), Some(&Outcome::Cancelled));
        assert_eq!(s.step(&mut board), Step::Done(Outcome::Cancelled));
        assert_eq!(board.count(crate::SpotState::Open), open_before);
    }

    #[test]
    fn pending_cell_keeps_its_heap_entry() {
        let mut board = Board::new(3);
        let (start, end) = (Point::new(0, 0), Point::new(2, 2));
        let mut s = Search::new(&mut board, start, end).unwrap();
        let n = Point::new(1, 0);
        let ni = board.idx(n).unwrap();

        s.relax(&mut board, 0, ni, 5);
        assert_eq!(s.open.len(), 2);
        assert_eq!(board.state(n), Some(crate::SpotState::Open));

        // a cheaper route updates the scores but does not re-queue the cell
        s.relax(&mut board, 0, ni, 1);
        assert_eq!(s.open.len(), 2);
        assert_eq!(s.pending(), 2);
        assert_eq!(s.g_score(n), Some(1));
        assert_eq!(s.f_score[ni], 1 + manhattan(n, end));
        let stale = s.open.iter().find(|e| e.idx == ni).unwrap();
        assert_eq!(stale.f, 5 + manhattan(n, end));

        // a route that is not cheaper changes nothing
        s.relax(&mut board, 0, ni, 3);
        assert_eq!(s.g_score(n), Some(1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "different board")]
    fn stepping_another_board_is_rejected() {
        let mut board = Board::new(4);
        let mut s = Search::new(&mut board, Point::new(0, 0), Point::new(3, 3)).unwrap();
        let mut other = Board::new(2);
        s.step(&mut other);
    }
}
