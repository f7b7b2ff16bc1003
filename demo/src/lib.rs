//! The interactive A* visualizer model.
//!
//! Left click places the start, then the end, then barriers; right click
//! erases. Space runs the search, animated one expansion per tick; `c`
//! clears the board and `q` / Esc quits.

use std::time::Duration;

use gridstar_core::{
    Cell, Point, Range,
    app::{Effect, Model},
    grid::Grid,
    messages::{Key, ModMask, MouseAction, Msg},
    style::{AttrMask, Color, Style},
};
use gridstar_paths::{
    Board, Endpoint, Outcome, Search, SearchError, SpotState, Step, bfs_distance, clicked_pos,
};
use log::{debug, info};

pub const TITLE: &str = "A* PATH FINDING";

const HELP_TEXT: &str = "left: start/end/wall  right: erase  space: run  c: clear  q: quit";

// Colours
const COL_EMPTY: Color = Color::WHITE;
const COL_START: Color = Color::from_rgb(255, 165, 0);
const COL_END: Color = Color::from_rgb(0, 225, 225);
const COL_BARRIER: Color = Color::BLACK;
const COL_OPEN: Color = Color::from_rgb(128, 0, 128);
const COL_CLOSED: Color = Color::from_rgb(255, 0, 0);
const COL_PATH: Color = Color::from_rgb(0, 255, 0);
const COL_GRID: Color = Color::from_rgb(128, 128, 128);
const COL_TEXT: Color = Color::from_rgb(200, 200, 200);
const COL_ERROR: Color = Color::from_rgb(255, 120, 120);

/// Terminal columns per board cell column, so cells come out roughly square.
const COLS_PER_CELL: i32 = 2;

/// Fill colour of a board spot.
pub fn spot_color(state: SpotState) -> Color {
    match state {
        SpotState::Empty => COL_EMPTY,
        SpotState::Start => COL_START,
        SpotState::End => COL_END,
        SpotState::Barrier => COL_BARRIER,
        SpotState::Open => COL_OPEN,
        SpotState::Closed => COL_CLOSED,
        SpotState::Path => COL_PATH,
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Board and animation settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualizerConfig {
    /// Rows (and columns) of the board.
    pub rows: i32,
    /// Terminal lines per board cell.
    pub cell_size: i32,
    /// Delay between two animation ticks.
    pub step_delay: Duration,
    /// Search steps performed per tick.
    pub steps_per_tick: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cell_size: 1,
            step_delay: Duration::from_millis(10),
            steps_per_tick: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Visualizer
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
enum Status {
    Info(String),
    Error(String),
}

pub struct Visualizer {
    config: VisualizerConfig,
    board: Board,
    start: Option<Point>,
    end: Option<Point>,
    /// The running search; `Some` doubles as the busy flag.
    search: Option<Search>,
    last_outcome: Option<Outcome>,
    status: Status,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            config,
            board: Board::new(config.rows),
            start: None,
            end: None,
            search: None,
            last_outcome: None,
            status: Status::Info("Place the start cell.".into()),
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    /// Whether a search is running.
    pub fn is_busy(&self) -> bool {
        self.search.is_some()
    }

    /// Outcome of the last finished search.
    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Current status line text.
    pub fn status(&self) -> &str {
        match &self.status {
            Status::Info(s) | Status::Error(s) => s,
        }
    }

    /// Board side length in "pixels", i.e. terminal lines.
    fn board_width(&self) -> i32 {
        self.config.rows * self.config.cell_size
    }

    /// Where the board is drawn on screen: below the title line.
    pub fn board_range(&self) -> Range {
        let w = self.board_width();
        Range::new(0, 1, w * COLS_PER_CELL, 1 + w)
    }

    /// Screen size needed for title, board, status and help lines.
    pub fn screen_size(&self) -> Point {
        let r = self.board_range();
        let width = r.width().max(HELP_TEXT.len() as i32).max(TITLE.len() as i32);
        Point::new(width, r.max.y + 2)
    }

    /// Board cell under a board-relative terminal position.
    pub fn cell_at(&self, pos: Point) -> Option<Point> {
        let pixel = Point::new(pos.x.div_euclid(COLS_PER_CELL), pos.y);
        clicked_pos(pixel, self.config.rows, self.board_width())
    }

    // --- user commands ---

    /// Left click: place start, then end, then barriers.
    pub fn paint(&mut self, p: Point) {
        if self.is_busy() {
            return;
        }
        let Some(spot) = self.board.at_mut(p) else {
            return;
        };
        if self.start.is_none() && self.end != Some(p) {
            spot.make_start();
            self.start = Some(p);
            debug!("start placed at {p}");
            self.status = Status::Info("Place the end cell.".into());
        } else if self.end.is_none() && self.start != Some(p) {
            spot.make_end();
            self.end = Some(p);
            debug!("end placed at {p}");
            self.status = Status::Info("Draw walls, then press space.".into());
        } else if self.start != Some(p) && self.end != Some(p) {
            spot.make_barrier();
        }
    }

    /// Right click: revert a cell to empty, dropping a start or end
    /// designation.
    pub fn erase(&mut self, p: Point) {
        if self.is_busy() {
            return;
        }
        let Some(spot) = self.board.at_mut(p) else {
            return;
        };
        spot.reset();
        if self.start == Some(p) {
            self.start = None;
            debug!("start removed");
        } else if self.end == Some(p) {
            self.end = None;
            debug!("end removed");
        }
    }

    /// Begin an animated search from start to end.
    ///
    /// Marks from a previous run are wiped first. Does nothing while a search
    /// is already running.
    pub fn start_search(&mut self) -> Result<(), SearchError> {
        if self.is_busy() {
            return Ok(());
        }
        let start = self.start.ok_or(SearchError::MissingEndpoint {
            role: Endpoint::Start,
        })?;
        let end = self.end.ok_or(SearchError::MissingEndpoint { role: Endpoint::End })?;

        self.board.clear_search_marks();
        let search = Search::new(&mut self.board, start, end)?;
        info!("search started: {start} -> {end}");
        self.search = Some(search);
        self.last_outcome = None;
        self.status = Status::Info("Searching...".into());
        Ok(())
    }

    /// Advance the running search by one tick's worth of steps.
    pub fn advance(&mut self) {
        for _ in 0..self.config.steps_per_tick.max(1) {
            let Some(search) = self.search.as_mut() else {
                return;
            };
            if let Step::Done(outcome) = search.step(&mut self.board) {
                let expanded = search.expanded();
                self.search = None;
                self.report(outcome, expanded);
            }
        }
    }

    /// Stop a running search, keeping its marks on the board.
    pub fn cancel(&mut self) {
        if let Some(mut search) = self.search.take() {
            search.cancel();
            let expanded = search.expanded();
            if let Some(outcome) = search.outcome().cloned() {
                self.report(outcome, expanded);
            }
        }
    }

    /// Throw the board away and start over.
    pub fn clear(&mut self) {
        self.cancel();
        self.board = Board::new(self.config.rows);
        self.start = None;
        self.end = None;
        self.last_outcome = None;
        self.status = Status::Info("Board cleared. Place the start cell.".into());
        info!("board cleared");
    }

    fn report(&mut self, outcome: Outcome, expanded: usize) {
        let text = match &outcome {
            Outcome::Found(_) => {
                let steps = outcome.steps().unwrap_or_default();
                let optimum = match (self.start, self.end) {
                    (Some(s), Some(e)) => bfs_distance(&self.board, s, e),
                    _ => None,
                };
                match optimum {
                    Some(best) => format!(
                        "Path found: {steps} steps (shortest possible {best}), {expanded} cells expanded."
                    ),
                    None => format!("Path found: {steps} steps, {expanded} cells expanded."),
                }
            }
            Outcome::NotFound => format!("No path: the end is unreachable ({expanded} cells expanded)."),
            Outcome::Cancelled => "Search cancelled.".to_string(),
        };
        info!("{text}");
        self.status = Status::Info(text);
        self.last_outcome = Some(outcome);
    }

    fn on_key(&mut self, key: Key, modifiers: ModMask) -> Option<Effect> {
        match key {
            Key::Escape | Key::Char('q') | Key::Char('Q') => return Some(self.quit()),
            Key::Char('c') if modifiers.contains(ModMask::CTRL) => return Some(self.quit()),
            Key::Char('c') | Key::Char('C') => self.clear(),
            Key::Space => {
                if let Err(e) = self.start_search() {
                    debug!("search refused: {e}");
                    self.status = Status::Error(format!("Cannot search: {e}."));
                }
            }
            _ => {}
        }
        None
    }

    fn on_mouse(&mut self, action: MouseAction, pos: Point) {
        let Some(p) = self.cell_at(pos) else {
            return;
        };
        match action {
            MouseAction::Main | MouseAction::DragMain => self.paint(p),
            MouseAction::Secondary | MouseAction::DragSecondary => self.erase(p),
            _ => {}
        }
    }

    fn quit(&mut self) -> Effect {
        self.cancel();
        Effect::End
    }

    fn draw_board(&self, grid: &mut Grid) {
        let origin = self.board_range().min;
        let cs = self.config.cell_size;
        for spot in &self.board {
            let state = spot.state();
            let style = Style::default().with_fg(COL_GRID).with_bg(spot_color(state));
            let top_left = origin + Point::new(spot.col() * cs * COLS_PER_CELL, spot.row() * cs);
            let block = Range::new(
                top_left.x,
                top_left.y,
                top_left.x + cs * COLS_PER_CELL,
                top_left.y + cs,
            );
            grid.fill_range(block, Cell::new(' ', style));
            if state == SpotState::Empty {
                grid.set(top_left, Cell::new('·', style));
            }
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new(VisualizerConfig::default())
    }
}

impl Model for Visualizer {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::Init | Msg::Screen { .. } => None,
            Msg::Quit => Some(self.quit()),
            Msg::Tick => {
                self.advance();
                None
            }
            Msg::KeyDown { key, modifiers, .. } => self.on_key(key, modifiers),
            Msg::Mouse { .. } => {
                if let Msg::Mouse { action, pos, .. } = self.board_range().rel_msg(msg) {
                    self.on_mouse(action, pos);
                }
                None
            }
        }
    }

    fn draw(&self, grid: &mut Grid) {
        grid.fill(Cell::default());

        let title = Style::default().with_fg(COL_TEXT).with_attrs(AttrMask::BOLD);
        grid.set_text(Point::ZERO, TITLE, title);

        self.draw_board(grid);

        let y = self.board_range().max.y;
        let status = match self.status {
            Status::Info(_) => Style::default().with_fg(COL_TEXT),
            Status::Error(_) => Style::default().with_fg(COL_ERROR),
        };
        grid.set_text(Point::new(0, y), self.status(), status);
        let help = Style::default().with_fg(COL_GRID).with_attrs(AttrMask::DIM);
        grid.set_text(Point::new(0, y + 1), HELP_TEXT, help);
    }

    fn wants_tick(&self) -> bool {
        self.is_busy()
    }
}
