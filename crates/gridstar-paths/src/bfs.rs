use std::collections::VecDeque;

use gridstar_core::Point;

use crate::board::Board;

/// Length of the shortest 4-connected route from `from` to `to` avoiding
/// barriers, by breadth-first search.
///
/// Reads barrier states directly rather than the cached neighbor lists, so
/// it is an independent reference for A* results. Returns `None` when `to`
/// is unreachable or either point is out of bounds.
pub fn bfs_distance(board: &Board, from: Point, to: Point) -> Option<i32> {
    let si = board.idx(from)?;
    let ti = board.idx(to)?;
    let mut dist = vec![-1; board.len()];
    let mut queue = VecDeque::new();
    dist[si] = 0;
    queue.push_back(from);

    while let Some(p) = queue.pop_front() {
        let d = dist[board.idx(p)?];
        if p == to {
            return Some(d);
        }
        for n in [p.shift(0, 1), p.shift(0, -1), p.shift(1, 0), p.shift(-1, 0)] {
            let Some(ni) = board.idx(n) else {
                continue;
            };
            if dist[ni] >= 0 || board.spot(ni).is_barrier() {
                continue;
            }
            dist[ni] = d + 1;
            queue.push_back(n);
        }
    }
    (dist[ti] >= 0).then_some(dist[ti])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_board_distance_is_manhattan() {
        let b = Board::new(5);
        assert_eq!(bfs_distance(&b, Point::new(0, 0), Point::new(4, 3)), Some(7));
        assert_eq!(bfs_distance(&b, Point::new(2, 2), Point::new(2, 2)), Some(0));
    }

    #[test]
    fn walled_off_is_none() {
        let mut b = Board::new(3);
        for p in [Point::new(1, 0), Point::new(1, 1), Point::new(1, 2)] {
            b.at_mut(p).unwrap().make_barrier();
        }
        assert_eq!(bfs_distance(&b, Point::new(0, 0), Point::new(2, 2)), None);
        assert_eq!(bfs_distance(&b, Point::new(0, 0), Point::new(9, 9)), None);
    }
}
