//! **gridstar-core** — display and application-loop types for the gridstar
//! visualizer.
//!
//! This crate provides geometry primitives, styled display cells, a
//! screen-sized display grid with frame diffing, input events, and the
//! Elm-architecture application loop that back-end drivers plug into.

pub mod app;
pub mod cell;
pub mod geom;
pub mod grid;
pub mod messages;
pub mod style;

pub use app::{App, AppConfig, Context, Driver, Effect, Model};
pub use cell::Cell;
pub use geom::{Point, Range};
pub use grid::{Frame, FrameCell, Grid};
pub use messages::*;
pub use style::{AttrMask, Color, Style};
