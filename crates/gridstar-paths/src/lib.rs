//! A* pathfinding on a paintable square grid.
//!
//! A [`Board`] holds `rows × rows` [`Spot`]s, each Empty, Start, End,
//! Barrier, or one of the search marks Open, Closed and Path. A [`Search`]
//! runs A* from the start to the end spot with unit step cost, 4-connected
//! movement and the [`manhattan`] heuristic, marking spots as it explores so
//! a front end can animate the run.
//!
//! ```
//! use gridstar_core::Point;
//! use gridstar_paths::{Board, Outcome, search};
//!
//! let mut board = Board::new(3);
//! let (start, end) = (Point::new(0, 0), Point::new(2, 2));
//! board.at_mut(start).unwrap().make_start();
//! board.at_mut(end).unwrap().make_end();
//!
//! let outcome = search(&mut board, start, end, &mut |_: &Board| {}).unwrap();
//! assert_eq!(outcome.steps(), Some(4));
//! assert!(matches!(outcome, Outcome::Found(_)));
//! ```

mod bfs;
mod board;
mod distance;
mod error;
mod search;
mod spot;

pub use bfs::bfs_distance;
pub use board::{Board, clicked_pos};
pub use distance::manhattan;
pub use error::{Endpoint, LayoutError, Result, SearchError};
pub use search::{Outcome, Search, SearchObserver, Step, UNREACHABLE, search};
pub use spot::{Spot, SpotState};
