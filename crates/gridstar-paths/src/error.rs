use std::fmt;

use gridstar_core::Point;
use thiserror::Error;

/// Convenient result alias for search set-up.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Which endpoint of a search an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::Start => "start",
            Endpoint::End => "end",
        })
    }
}

/// Precondition violations detected before a search runs.
///
/// An unreachable end is not an error: it is reported as
/// [`Outcome::NotFound`](crate::Outcome::NotFound).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The endpoint has not been placed on the board.
    #[error("no {role} cell has been placed")]
    MissingEndpoint { role: Endpoint },

    /// The endpoint lies outside the board.
    #[error("{role} {pos} is outside the {rows}x{rows} board")]
    OutOfBounds { role: Endpoint, pos: Point, rows: i32 },

    /// Start and end designate the same cell.
    #[error("start and end are the same cell {pos}")]
    SameEndpoints { pos: Point },
}

/// Inconsistencies in a saved [`Board`](crate::Board) layout, reported
/// while loading it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("negative row count {rows}")]
    NegativeRows { rows: i32 },

    #[error("a {rows}x{rows} board needs {expected} spots, found {found}")]
    SpotCount {
        rows: i32,
        expected: usize,
        found: usize,
    },

    /// Spots must be stored in row-major order.
    #[error("spot {index} is at {found}, expected {expected}")]
    Misplaced {
        index: usize,
        expected: Point,
        found: Point,
    },

    #[error("spot {pos} belongs to a {found}-row board, not {rows}")]
    RowCount { pos: Point, rows: i32, found: i32 },
}
