use gridstar_core::Point;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use gridstar_paths::{
    Board, Outcome, Search, SearchObserver, SpotState, Step, bfs_distance, manhattan, search,
};
use rstest::rstest;

/// Build a board from rows of text: `S` start, `E` end, `#` barrier,
/// anything else empty.
fn board_from(rows: &[&str]) -> (Board, Point, Point) {
    let mut board = Board::new(rows.len() as i32);
    let (mut start, mut end) = (None, None);
    for (y, line) in rows.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            let p = Point::new(x as i32, y as i32);
            let spot = board.at_mut(p).unwrap();
            match ch {
                'S' => {
                    spot.make_start();
                    start = Some(p);
                }
                'E' => {
                    spot.make_end();
                    end = Some(p);
                }
                '#' => spot.make_barrier(),
                _ => {}
            }
        }
    }
    (board, start.unwrap(), end.unwrap())
}

#[derive(Default)]
struct Counting {
    steps: usize,
    abort_after: Option<usize>,
}

impl SearchObserver for Counting {
    fn on_step(&mut self, _board: &Board) {
        self.steps += 1;
    }

    fn should_abort(&mut self) -> bool {
        self.abort_after.is_some_and(|n| self.steps >= n)
    }
}

#[test]
fn open_three_by_three() {
    let (mut board, start, end) = board_from(&["S..", "...", "..E"]);
    let outcome = search(&mut board, start, end, &mut |_: &Board| {}).unwrap();

    assert_eq!(outcome.steps(), Some(4));
    assert_eq!(board.count(SpotState::Path), 3);
    let Outcome::Found(path) = outcome else {
        panic!("expected a path");
    };
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&end));
    for w in path.windows(2) {
        assert_eq!(gridstar_paths::manhattan(w[0], w[1]), 1);
    }
}

#[test]
fn detours_around_barrier() {
    let (mut board, start, end) = board_from(&["S#E", "...", "..."]);
    let outcome = search(&mut board, start, end, &mut |_: &Board| {}).unwrap();

    assert_eq!(outcome.steps(), Some(4));
    let Outcome::Found(path) = outcome else {
        panic!("expected a path");
    };
    assert!(!path.contains(&Point::new(1, 0)));
    assert!(path.iter().any(|p| p.y == 1));
}

#[test]
fn walled_in_start_finds_nothing() {
    let (mut board, start, end) = board_from(&[".#.", "#S#", ".#E"]);
    let mut s = Search::new(&mut board, start, end).unwrap();
    let mut obs = Counting::default();
    let outcome = s.run(&mut board, &mut obs);

    assert_eq!(outcome, Outcome::NotFound);
    assert_eq!(s.expanded(), 1);
    assert_eq!(obs.steps, 1);
    assert_eq!(s.came_from(end), None);
    assert_eq!(board.count(SpotState::Path), 0);
}

#[test]
fn walled_off_end_has_no_predecessor() {
    let (mut board, start, end) = board_from(&[
        "S.....", //
        "......", //
        "...###", //
        "...#..", //
        "...#.E", //
        "...#..",
    ]);
    let mut s = Search::new(&mut board, start, end).unwrap();
    assert_eq!(s.run(&mut board, &mut |_: &Board| {}), Outcome::NotFound);
    assert_eq!(s.came_from(end), None);
    assert_eq!(s.g_score(end), None);
    // every reachable cell was finalized; nothing is left pending
    assert_eq!(s.pending(), 0);
    assert_eq!(board.count(SpotState::Open), 0);
}

#[rstest]
#[case::open(&["S....", ".....", ".....", ".....", "....E"])]
#[case::corridor(&["S#...", ".#.#.", ".#.#.", ".#.#.", "...#E"])]
#[case::wall_with_gap(&["S....", "####.", ".....", ".####", "....E"])]
#[case::end_in_pocket(&[".....", ".###.", ".#E#.", ".#.#.", "S...."])]
#[case::u_trap(&["......", ".####.", "....#.", "S...#E", "....#.", ".####."])]
fn path_length_matches_bfs(#[case] rows: &[&str]) {
    let (mut board, start, end) = board_from(rows);
    let expected = bfs_distance(&board, start, end);
    let outcome = search(&mut board, start, end, &mut |_: &Board| {}).unwrap();
    assert_eq!(outcome.steps().map(|n| n as i32), expected);
}

/// Small deterministic generator for reproducible barrier layouts.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn random_layouts_are_optimal() {
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let rows = 4 + (rng.next() % 9) as i32;
        let mut board = Board::new(rows);
        for p in board.range() {
            if rng.next() % 100 < 30 {
                board.at_mut(p).unwrap().make_barrier();
            }
        }
        let start = Point::new((rng.next() % rows as u64) as i32, 0);
        let end = Point::new((rng.next() % rows as u64) as i32, rows - 1);
        board.at_mut(start).unwrap().make_start();
        board.at_mut(end).unwrap().make_end();

        let expected = bfs_distance(&board, start, end);
        let outcome = search(&mut board, start, end, &mut |_: &Board| {}).unwrap();
        assert_eq!(outcome.steps().map(|n| n as i32), expected, "rows={rows}");

        // endpoints keep their marks whatever the outcome
        assert_eq!(board.state(start), Some(SpotState::Start));
        assert_eq!(board.state(end), Some(SpotState::End));
        if let Outcome::Found(path) = outcome {
            assert_eq!(board.count(SpotState::Path), path.len() - 2);
        }
    }
}

/// Plain open-set loop over barrier states: a neighbor is pushed only when
/// it is not already pending. Returns the pop order and how many times a
/// pending cell was given a cheaper route.
fn reference_expansions(board: &Board, start: Point, end: Point) -> (Vec<Point>, usize) {
    let rows = board.rows();
    let idx = |p: Point| (p.y * rows + p.x) as usize;
    let mut g = vec![i32::MAX; board.len()];
    let mut open = BinaryHeap::new();
    let mut pending = HashSet::new();
    let mut count = 0u64;
    g[idx(start)] = 0;
    open.push(Reverse((manhattan(start, end), count, start)));
    pending.insert(start);

    let (mut order, mut improved) = (Vec::new(), 0);
    while let Some(Reverse((_, _, cur))) = open.pop() {
        pending.remove(&cur);
        order.push(cur);
        if cur == end {
            break;
        }
        for nb in [cur.shift(0, 1), cur.shift(0, -1), cur.shift(1, 0), cur.shift(-1, 0)] {
            if !board.at(nb).is_some_and(|s| !s.is_barrier()) {
                continue;
            }
            let tentative = g[idx(cur)] + 1;
            if tentative >= g[idx(nb)] {
                continue;
            }
            if pending.contains(&nb) {
                improved += 1;
            }
            g[idx(nb)] = tentative;
            if pending.insert(nb) {
                count += 1;
                open.push(Reverse((tentative + manhattan(nb, end), count, nb)));
            }
        }
    }
    (order, improved)
}

#[test]
fn expansion_order_matches_reference_loop() {
    let mut rng = Lcg(11);
    let mut improved_total = 0;
    for _ in 0..500 {
        let rows = 4 + (rng.next() % 12) as i32;
        let mut board = Board::new(rows);
        for p in board.range() {
            if rng.next() % 100 < 30 {
                board.at_mut(p).unwrap().make_barrier();
            }
        }
        let start = Point::new((rng.next() % rows as u64) as i32, 0);
        let end = Point::new((rng.next() % rows as u64) as i32, rows - 1);
        board.at_mut(start).unwrap().make_start();
        board.at_mut(end).unwrap().make_end();

        let (expected, improved) = reference_expansions(&board, start, end);
        improved_total += improved;

        let mut s = Search::new(&mut board, start, end).unwrap();
        let mut order = Vec::new();
        let outcome = loop {
            match s.step(&mut board) {
                Step::Expanded(p) => order.push(p),
                Step::Traced(_) => {}
                Step::Done(outcome) => break outcome,
            }
        };
        if let Outcome::Found(_) = outcome {
            order.push(end);
        }
        assert_eq!(order, expected, "rows={rows} start={start} end={end}");
        assert_eq!(s.expanded(), expected.len());
    }
    // the sweep must include layouts where a pending cell is re-scored
    assert!(improved_total > 0);
}

#[test]
fn repeated_runs_are_identical() {
    let rows = ["S.....", "..##..", "......", ".#..#.", ".#....", "....E."];

    let trace = || {
        let (mut board, start, end) = board_from(&rows);
        let mut s = Search::new(&mut board, start, end).unwrap();
        let mut steps = Vec::new();
        loop {
            match s.step(&mut board) {
                Step::Done(outcome) => {
                    let tree: Vec<_> = board.range().iter().map(|p| s.came_from(p)).collect();
                    return (steps, tree, outcome, board);
                }
                step => steps.push(step),
            }
        }
    };

    let first = trace();
    let second = trace();
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
    assert_eq!(first.3, second.3);
}

#[test]
fn endpoints_keep_their_marks() {
    let (mut board, start, end) = board_from(&["S...", "....", "....", "...E"]);
    let mut s = Search::new(&mut board, start, end).unwrap();
    while !s.is_finished() {
        s.step(&mut board);
        assert_eq!(board.state(start), Some(SpotState::Start));
        assert_eq!(board.state(end), Some(SpotState::End));
    }
}

#[test]
fn observer_sees_every_expansion_and_path_mark() {
    let (mut board, start, end) = board_from(&["S..", "...", "..E"]);
    let mut s = Search::new(&mut board, start, end).unwrap();
    let mut obs = Counting::default();
    s.run(&mut board, &mut obs);
    // the pop of the end cell goes straight to tracing
    assert_eq!(obs.steps, s.expanded() - 1 + 3);
}

#[test]
fn abort_stops_between_pops() {
    let (mut board, start, end) = board_from(&[
        "S.......", //
        "........", //
        "........", //
        "........", //
        "........", //
        "........", //
        "........", //
        ".......E",
    ]);
    let mut obs = Counting {
        abort_after: Some(2),
        ..Counting::default()
    };
    let mut s = Search::new(&mut board, start, end).unwrap();
    let outcome = s.run(&mut board, &mut obs);

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(s.expanded(), 2);
    assert_eq!(board.count(SpotState::Path), 0);
    assert!(board.count(SpotState::Open) > 0);
}

#[test]
fn search_refreshes_stale_neighbors() {
    let (mut board, start, end) = board_from(&["S.E", "...", "..."]);
    board.update_neighbors();
    // a barrier painted after the refresh must still be honored
    board.at_mut(Point::new(1, 0)).unwrap().make_barrier();
    assert!(board.at(start).unwrap().neighbors().contains(&Point::new(1, 0)));

    let outcome = search(&mut board, start, end, &mut |_: &Board| {}).unwrap();
    assert_eq!(outcome.steps(), Some(4));
}

#[test]
fn neighbors_are_cardinal_and_traversable() {
    let (mut board, _, _) = board_from(&["S#.", "...", "..E"]);
    board.update_neighbors();

    let at = |p: Point| board.at(p).unwrap().neighbors().to_vec();
    // down, right, left; up is the barrier
    assert_eq!(at(Point::new(1, 1)), vec![
        Point::new(1, 2),
        Point::new(2, 1),
        Point::new(0, 1),
    ]);
    assert_eq!(at(Point::new(1, 2)), vec![
        Point::new(1, 1),
        Point::new(2, 2),
        Point::new(0, 2),
    ]);
    assert_eq!(at(Point::new(0, 0)), vec![Point::new(0, 1)]);
    assert_eq!(at(Point::new(0, 1)), vec![
        Point::new(0, 2),
        Point::new(0, 0),
        Point::new(1, 1),
    ]);
    assert_eq!(at(Point::new(2, 2)), vec![Point::new(2, 1), Point::new(1, 2)]);

    for spot in &board {
        for &n in spot.neighbors() {
            assert_ne!(n, spot.pos());
            assert_eq!(gridstar_paths::manhattan(n, spot.pos()), 1);
            assert!(!board.at(n).unwrap().is_barrier());
        }
    }
}

#[test]
fn single_neighbor_update_leaves_others_alone() {
    let mut board = Board::new(3);
    board.neighbor_update(Point::new(1, 1));
    assert_eq!(board.at(Point::new(1, 1)).unwrap().neighbors().len(), 4);
    assert!(board.at(Point::new(0, 0)).unwrap().neighbors().is_empty());
}
