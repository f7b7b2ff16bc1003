//! Crossterm terminal driver for gridstar.
//!
//! Provides a [`CrosstermDriver`] that implements [`gridstar_core::Driver`]:
//! raw mode on an alternate screen with mouse capture, input translated into
//! [`Msg`]s, and diff frames written with true-colour escapes.

use std::io::{self, Write};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind},
    execute, queue,
    style::{self, Attribute, Color as CtColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::debug;

use gridstar_core::{
    Point,
    app::{Context, Driver},
    grid::Frame,
    messages::{Key, ModMask, MouseAction, Msg},
    style::{AttrMask, Color},
};

/// Maps a [`gridstar_core::Color`] to a [`crossterm::style::Color`].
fn to_ct_color(c: Color) -> CtColor {
    if c.is_default() {
        CtColor::Reset
    } else {
        CtColor::Rgb {
            r: c.r(),
            g: c.g(),
            b: c.b(),
        }
    }
}

/// Maps crossterm key modifiers to gridstar's [`ModMask`].
fn to_mod_mask(mods: KeyModifiers) -> ModMask {
    let mut m = ModMask::NONE;
    if mods.contains(KeyModifiers::SHIFT) {
        m = m | ModMask::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        m = m | ModMask::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        m = m | ModMask::ALT;
    }
    m
}

/// Maps a crossterm [`KeyCode`] to a gridstar [`Key`].
fn to_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Delete => Some(Key::Delete),
        _ => None,
    }
}

/// Maps a crossterm mouse event kind to a gridstar [`MouseAction`].
fn to_mouse_action(kind: MouseEventKind) -> Option<MouseAction> {
    match kind {
        MouseEventKind::Down(MouseButton::Left) => Some(MouseAction::Main),
        MouseEventKind::Down(MouseButton::Right) => Some(MouseAction::Secondary),
        MouseEventKind::Down(MouseButton::Middle) => Some(MouseAction::Auxiliary),
        MouseEventKind::Drag(MouseButton::Left) => Some(MouseAction::DragMain),
        MouseEventKind::Drag(MouseButton::Right) => Some(MouseAction::DragSecondary),
        MouseEventKind::Up(_) => Some(MouseAction::Release),
        MouseEventKind::Moved => Some(MouseAction::Move),
        _ => None,
    }
}

/// Translate one terminal event, or `None` for events gridstar ignores.
fn to_msg(ev: Event) -> Option<Msg> {
    match ev {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) if kind != KeyEventKind::Release => Some(Msg::KeyDown {
            key: to_key(code)?,
            modifiers: to_mod_mask(modifiers),
            time: Instant::now(),
        }),
        Event::Mouse(me) => Some(Msg::Mouse {
            action: to_mouse_action(me.kind)?,
            pos: Point::new(me.column as i32, me.row as i32),
            modifiers: to_mod_mask(me.modifiers),
            time: Instant::now(),
        }),
        Event::Resize(w, h) => Some(Msg::Screen {
            width: w as i32,
            height: h as i32,
            time: Instant::now(),
        }),
        _ => None,
    }
}

/// A terminal back-end for gridstar using crossterm.
pub struct CrosstermDriver {
    mouse_enabled: bool,
    poll_timeout: Duration,
}

impl CrosstermDriver {
    /// Create a new driver with mouse capture on.
    pub fn new() -> Self {
        Self {
            mouse_enabled: true,
            poll_timeout: Duration::from_millis(16),
        }
    }

    /// Configure whether mouse events are captured.
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse_enabled = enabled;
        self
    }

    /// Longest time a single [`Driver::poll_msgs`] call waits for input.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}

impl Default for CrosstermDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for CrosstermDriver {
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        if self.mouse_enabled {
            execute!(stdout, event::EnableMouseCapture)?;
        }
        debug!("crossterm driver initialised (mouse: {})", self.mouse_enabled);
        Ok(())
    }

    fn poll_msgs(
        &mut self,
        ctx: &Context,
        tx: Sender<Msg>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !event::poll(self.poll_timeout)? {
            return Ok(());
        }

        while event::poll(Duration::ZERO)? {
            if ctx.is_done() {
                return Ok(());
            }
            if let Some(msg) = to_msg(event::read()?) {
                tx.send(msg).ok();
            }
        }

        Ok(())
    }

    fn flush(&mut self, frame: Frame) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = io::stdout().lock();

        for fc in &frame.cells {
            let cell = &fc.cell;
            queue!(
                stdout,
                cursor::MoveTo(fc.pos.x as u16, fc.pos.y as u16),
                SetForegroundColor(to_ct_color(cell.style.fg)),
                SetBackgroundColor(to_ct_color(cell.style.bg))
            )?;

            let attrs = cell.style.attrs;
            if attrs.contains(AttrMask::BOLD) {
                queue!(stdout, style::SetAttribute(Attribute::Bold))?;
            }
            if attrs.contains(AttrMask::REVERSE) {
                queue!(stdout, style::SetAttribute(Attribute::Reverse))?;
            }
            if attrs.contains(AttrMask::DIM) {
                queue!(stdout, style::SetAttribute(Attribute::Dim))?;
            }

            write!(stdout, "{}", cell.ch)?;

            if !attrs.is_empty() {
                queue!(stdout, style::SetAttribute(Attribute::Reset))?;
            }
        }

        queue!(stdout, style::ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = execute!(stdout, event::DisableMouseCapture);
        }
        let _ = execute!(stdout, style::ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    #[test]
    fn space_is_its_own_key() {
        assert_eq!(to_key(KeyCode::Char(' ')), Some(Key::Space));
        assert_eq!(to_key(KeyCode::Char('c')), Some(Key::Char('c')));
        assert_eq!(to_key(KeyCode::F(1)), None);
    }

    #[test]
    fn default_color_resets() {
        assert_eq!(to_ct_color(Color::DEFAULT), CtColor::Reset);
        assert_eq!(to_ct_color(Color::BLACK), CtColor::Rgb { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn mouse_buttons_and_drags() {
        let ev = |kind| {
            Event::Mouse(MouseEvent {
                kind,
                column: 7,
                row: 3,
                modifiers: KeyModifiers::NONE,
            })
        };
        match to_msg(ev(MouseEventKind::Down(MouseButton::Right))) {
            Some(Msg::Mouse { action, pos, .. }) => {
                assert_eq!(action, MouseAction::Secondary);
                assert_eq!(pos, Point::new(7, 3));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            to_msg(ev(MouseEventKind::Drag(MouseButton::Left))),
            Some(Msg::Mouse {
                action: MouseAction::DragMain,
                ..
            })
        ));
        assert!(to_msg(ev(MouseEventKind::ScrollUp)).is_none());
    }

    #[test]
    fn key_release_is_ignored() {
        let ev = Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert!(to_msg(ev).is_none());

        let ev = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        match to_msg(ev) {
            Some(Msg::KeyDown { key, modifiers, .. }) => {
                assert_eq!(key, Key::Char('c'));
                assert!(modifiers.contains(ModMask::CTRL));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
