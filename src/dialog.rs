//! Two-button feedback dialog
//!
//! The bisect loop only sees [`FeedbackDialog`]. Three implementations
//! exist: [`WindowDialog`](crate::window::WindowDialog) opens a desktop
//! window, [`TerminalDialog`] draws a popup box with two buttons using
//! crossterm, and [`PlainDialog`] asks a y/n question on a line-based reader.
//!
//! Where the dialog goes is kept in a [`DialogSession`] that the caller
//! threads through every call, so it reappears where it was last shown
//! instead of re-centering.

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::bisect::{Probe, Response};
use crate::color_replacer::SENTINEL_COLOR;
use crate::interrupt::{self, Interrupted};

/// How often a waiting dialog wakes up to check for interrupts
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Title of the dialog, shown on the window and the popup border
pub const DIALOG_TITLE: &str = "Binary search";

const NO_LABEL: &str = "[ Original ]";
const YES_LABEL: &str = "[ Changed ]";
const BUTTON_GAP: u16 = 2;

/// Something that can ask the user whether the last probe changed anything
pub trait FeedbackDialog {
    /// Block until the user picks one of the two answers
    ///
    /// Fails with [`Interrupted`] if the user aborts instead.
    fn ask(&mut self, probe: &Probe, session: &mut DialogSession) -> Result<Response>;
}

/// Per-run presentation state shared by every dialog call
///
/// Coordinates are in whatever unit the active dialog uses: pixels for
/// the window, cells for the terminal popup. Only one kind of dialog is
/// active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSession {
    /// Top-left corner of the dialog once it has been shown
    position: Option<(i32, i32)>,
    /// Horizontal shift for the first placement
    x_offset: i32,
}

impl DialogSession {
    pub fn new(x_offset: i32) -> Self {
        Self {
            position: None,
            x_offset,
        }
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.position
    }

    pub fn x_offset(&self) -> i32 {
        self.x_offset
    }

    /// Record where the user left the dialog
    pub fn remember(&mut self, position: (i32, i32)) {
        tracing::debug!(?position, "dialog position recorded");
        self.position = Some(position);
    }

    /// Drop a remembered position, e.g. when switching to another kind of dialog
    pub fn forget_position(&mut self) {
        self.position = None;
    }

    /// Corner that centers `size` on `screen`, shifted right by the x-offset
    ///
    /// The result is not clamped: a large offset may put a window on
    /// another monitor.
    pub fn centered(&self, screen: (i32, i32), size: (i32, i32)) -> (i32, i32) {
        (
            (screen.0 - size.0) / 2 + self.x_offset,
            (screen.1 - size.1) / 2,
        )
    }

    /// Where to draw a box of `size` on a terminal of `screen` cells
    ///
    /// The first call centers the box, shifts it by the x-offset, and
    /// remembers the result clamped to the screen. Later calls reuse the
    /// remembered corner, clamped so the box stays on screen.
    pub fn place(&mut self, screen: (u16, u16), size: (u16, u16)) -> (u16, u16) {
        let max_x = screen.0.saturating_sub(size.0);
        let max_y = screen.1.saturating_sub(size.1);

        let (x, y) = match self.position {
            Some(position) => position,
            None => {
                let (x, y) = self.centered(
                    (i32::from(screen.0), i32::from(screen.1)),
                    (i32::from(size.0), i32::from(size.1)),
                );
                let position = (i32::from(clamp_cell(x, max_x)), i32::from(clamp_cell(y, max_y)));
                self.remember(position);
                position
            }
        };

        (clamp_cell(x, max_x), clamp_cell(y, max_y))
    }
}

fn clamp_cell(value: i32, max: u16) -> u16 {
    // Clamped into 0..=max, so the cast cannot truncate
    value.clamp(0, i32::from(max)) as u16
}

/// Prompt text for a probe
pub fn question(probe: &Probe) -> String {
    format!(
        "Colors on {} are now {}. Any visible change?",
        probe, SENTINEL_COLOR
    )
}

/// Geometry of the popup box, relative to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

impl Layout {
    const HEIGHT: u16 = 5;

    fn size_for(text: &str) -> (u16, u16) {
        let buttons = label_width(NO_LABEL) + BUTTON_GAP + label_width(YES_LABEL);
        let width = label_width(text).max(buttons) + 4;
        (width, Self::HEIGHT)
    }

    fn buttons_row(&self) -> u16 {
        self.y + 3
    }

    /// Columns covered by each button, `[start, end)`
    fn button_spans(&self) -> [(Response, u16, u16); 2] {
        let total = label_width(NO_LABEL) + BUTTON_GAP + label_width(YES_LABEL);
        let no_start = self.x + self.width.saturating_sub(total) / 2;
        let no_end = no_start + label_width(NO_LABEL);
        let yes_start = no_end + BUTTON_GAP;
        let yes_end = yes_start + label_width(YES_LABEL);
        [
            (Response::NoVisibleChange, no_start, no_end),
            (Response::VisibleChange, yes_start, yes_end),
        ]
    }

    fn button_at(&self, column: u16, row: u16) -> Option<Response> {
        if row != self.buttons_row() {
            return None;
        }
        self.button_spans()
            .into_iter()
            .find(|(_, start, end)| column >= *start && column < *end)
            .map(|(response, _, _)| response)
    }
}

fn label_width(text: &str) -> u16 {
    u16::try_from(text.chars().count()).unwrap_or(u16::MAX)
}

/// What a key press means while the popup is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Focus(Response),
    Select(Response),
    Interrupt,
    Ignore,
}

fn other(response: Response) -> Response {
    match response {
        Response::NoVisibleChange => Response::VisibleChange,
        Response::VisibleChange => Response::NoVisibleChange,
    }
}

fn key_action(focused: Response, key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Interrupt,
        KeyCode::Esc => KeyAction::Interrupt,
        KeyCode::Left => KeyAction::Focus(Response::NoVisibleChange),
        KeyCode::Right => KeyAction::Focus(Response::VisibleChange),
        KeyCode::Tab | KeyCode::BackTab => KeyAction::Focus(other(focused)),
        KeyCode::Enter | KeyCode::Char(' ') => KeyAction::Select(focused),
        KeyCode::Char('n' | 'N' | 'o' | 'O') => KeyAction::Select(Response::NoVisibleChange),
        KeyCode::Char('y' | 'Y' | 'c' | 'C') => KeyAction::Select(Response::VisibleChange),
        _ => KeyAction::Ignore,
    }
}

/// Popup dialog drawn in the terminal
#[derive(Debug, Default)]
pub struct TerminalDialog;

impl TerminalDialog {
    pub fn new() -> Self {
        Self
    }

    fn draw(out: &mut impl Write, layout: &Layout, text: &str, focused: Response) -> Result<()> {
        let inner = usize::from(layout.width.saturating_sub(2));
        let horizontal = "─".repeat(inner);

        let blank = format!("│{}│", " ".repeat(inner));
        let message = format!("│ {:<width$} │", text, width = inner.saturating_sub(2));

        queue!(out, terminal::Clear(ClearType::All))?;
        let title = format!(" {} ", DIALOG_TITLE);
        let top = if title.chars().count() + 2 <= inner {
            format!("┌─{}{}┐", title, "─".repeat(inner - 1 - title.chars().count()))
        } else {
            format!("┌{}┐", horizontal)
        };
        queue!(out, cursor::MoveTo(layout.x, layout.y), Print(top))?;
        queue!(out, cursor::MoveTo(layout.x, layout.y + 1), Print(&message))?;
        for row in layout.y + 2..layout.y + layout.height - 1 {
            queue!(out, cursor::MoveTo(layout.x, row), Print(&blank))?;
        }
        queue!(
            out,
            cursor::MoveTo(layout.x, layout.y + layout.height - 1),
            Print(format!("└{}┘", horizontal))
        )?;

        for (response, start, _) in layout.button_spans() {
            let label = match response {
                Response::NoVisibleChange => NO_LABEL,
                Response::VisibleChange => YES_LABEL,
            };
            queue!(out, cursor::MoveTo(start, layout.buttons_row()))?;
            if response == focused {
                queue!(
                    out,
                    SetAttribute(Attribute::Reverse),
                    Print(label),
                    SetAttribute(Attribute::Reset)
                )?;
            } else {
                queue!(out, Print(label))?;
            }
        }

        out.flush()?;
        Ok(())
    }

    fn wait_for_answer(out: &mut impl Write, layout: &Layout, text: &str) -> Result<Response> {
        let mut focused = Response::NoVisibleChange;
        Self::draw(out, layout, text, focused)?;

        loop {
            interrupt::check()?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }

            match event::read()? {
                Event::Key(key) => match key_action(focused, &key) {
                    KeyAction::Select(response) => return Ok(response),
                    KeyAction::Interrupt => return Err(Interrupted.into()),
                    KeyAction::Focus(response) => {
                        focused = response;
                        Self::draw(out, layout, text, focused)?;
                    }
                    KeyAction::Ignore => {}
                },
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(response) = layout.button_at(mouse.column, mouse.row) {
                        return Ok(response);
                    }
                }
                Event::Resize(..) => Self::draw(out, layout, text, focused)?,
                _ => {}
            }
        }
    }
}

/// Puts the terminal back the way it was, even on error
struct ScreenGuard;

impl ScreenGuard {
    fn enter(out: &mut impl Write) -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to put terminal in raw mode")?;
        let guard = Self;
        execute!(out, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)
            .context("Failed to prepare terminal for dialog")?;
        Ok(guard)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = execute!(out, cursor::Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl FeedbackDialog for TerminalDialog {
    fn ask(&mut self, probe: &Probe, session: &mut DialogSession) -> Result<Response> {
        let text = question(probe);
        let screen = terminal::size().context("Failed to read terminal size")?;
        let size = Layout::size_for(&text);
        let (x, y) = session.place(screen, size);
        let layout = Layout {
            x,
            y,
            width: size.0,
            height: size.1,
        };

        let mut out = io::stdout();
        let _guard = ScreenGuard::enter(&mut out)?;
        Self::wait_for_answer(&mut out, &layout, &text)
    }
}

/// Line-based y/n prompt
///
/// Lines are read on a helper thread so the wait can still notice Ctrl-C.
pub struct PlainDialog {
    lines: Receiver<io::Result<String>>,
}

impl PlainDialog {
    pub fn new<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (sender, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in reader.lines() {
                if sender.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines }
    }

    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }

    fn next_line(&self) -> Result<String> {
        loop {
            interrupt::check()?;
            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => return line.context("Failed to read answer"),
                Err(RecvTimeoutError::Timeout) => continue,
                // Input closed before an answer
                Err(RecvTimeoutError::Disconnected) => return Err(Interrupted.into()),
            }
        }
    }
}

/// Interpret one line of plain-prompt input
pub fn parse_answer(input: &str) -> Option<Response> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "c" | "changed" => Some(Response::VisibleChange),
        "n" | "no" | "o" | "original" => Some(Response::NoVisibleChange),
        _ => None,
    }
}

impl FeedbackDialog for PlainDialog {
    fn ask(&mut self, probe: &Probe, _session: &mut DialogSession) -> Result<Response> {
        loop {
            print!("{} [y/n] ", question(probe));
            io::stdout().flush()?;

            let line = self.next_line()?;
            match parse_answer(&line) {
                Some(response) => return Ok(response),
                None => println!("Please answer 'y' (changed) or 'n' (original)."),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_first_placement_is_centered() {
        let mut session = DialogSession::new(0);
        assert_eq!(session.place((80, 24), (40, 5)), (20, 9));
        assert_eq!(session.position(), Some((20, 9)));
    }

    #[test]
    fn test_first_placement_applies_offset() {
        let mut session = DialogSession::new(7);
        assert_eq!(session.place((80, 24), (40, 5)), (27, 9));

        let mut session = DialogSession::new(-100);
        assert_eq!(session.place((80, 24), (40, 5)), (0, 9));

        let mut session = DialogSession::new(100);
        assert_eq!(session.place((80, 24), (40, 5)), (40, 9));
    }

    #[test]
    fn test_later_placements_reuse_position() {
        let mut session = DialogSession::new(5);
        let first = session.place((80, 24), (40, 5));
        // A wider prompt must not re-center the box
        assert_eq!(session.place((80, 24), (44, 5)), first);
        assert_eq!(session.position(), Some((25, 9)));
    }

    #[test]
    fn test_remembered_position_clamped_to_smaller_screen() {
        let mut session = DialogSession::new(0);
        session.place((200, 50), (40, 5));
        assert_eq!(session.place((60, 10), (40, 5)), (20, 5));
        // The remembered corner itself is untouched
        assert_eq!(session.position(), Some((80, 22)));
    }

    #[test]
    fn test_centered_is_not_clamped() {
        let session = DialogSession::new(1920);
        assert_eq!(session.centered((1920, 1080), (400, 200)), (2680, 440));

        let session = DialogSession::new(-2000);
        assert_eq!(session.centered((1920, 1080), (400, 200)), (-1240, 440));
    }

    #[test]
    fn test_remember_and_forget() {
        let mut session = DialogSession::new(0);
        session.remember((300, 120));
        assert_eq!(session.place((80, 24), (40, 5)), (40, 19));
        session.forget_position();
        assert_eq!(session.position(), None);
        assert_eq!(session.place((80, 24), (40, 5)), (20, 9));
    }

    #[test]
    fn test_box_larger_than_screen() {
        let mut session = DialogSession::new(3);
        assert_eq!(session.place((10, 3), (40, 5)), (0, 0));
    }

    #[test]
    fn test_question_mentions_lines_and_sentinel() {
        let text = question(&Probe { first: 0, last: 9 });
        assert!(text.contains("lines 1-10"));
        assert!(text.contains("#ff0000"));
    }

    #[test]
    fn test_layout_fits_text_and_buttons() {
        let (width, height) = Layout::size_for("short");
        let buttons = label_width(NO_LABEL) + BUTTON_GAP + label_width(YES_LABEL);
        assert_eq!(width, buttons + 4);
        assert_eq!(height, 5);

        let long = "x".repeat(100);
        assert_eq!(Layout::size_for(&long).0, 104);
    }

    #[test]
    fn test_button_hit_testing() {
        let (width, height) = Layout::size_for("Any visible change?");
        let layout = Layout { x: 10, y: 4, width, height };
        let [(no, no_start, no_end), (yes, yes_start, yes_end)] = layout.button_spans();

        assert_eq!(no, Response::NoVisibleChange);
        assert_eq!(yes, Response::VisibleChange);
        assert_eq!(layout.button_at(no_start, 7), Some(Response::NoVisibleChange));
        assert_eq!(layout.button_at(no_end - 1, 7), Some(Response::NoVisibleChange));
        assert_eq!(layout.button_at(no_end, 7), None);
        assert_eq!(layout.button_at(yes_start, 7), Some(Response::VisibleChange));
        assert_eq!(layout.button_at(yes_end, 7), None);
        assert_eq!(layout.button_at(yes_start, 6), None);
    }

    #[test]
    fn test_key_actions() {
        let focused = Response::NoVisibleChange;
        assert_eq!(
            key_action(focused, &key(KeyCode::Enter, KeyModifiers::NONE)),
            KeyAction::Select(Response::NoVisibleChange)
        );
        assert_eq!(
            key_action(focused, &key(KeyCode::Tab, KeyModifiers::NONE)),
            KeyAction::Focus(Response::VisibleChange)
        );
        assert_eq!(
            key_action(focused, &key(KeyCode::Char('y'), KeyModifiers::NONE)),
            KeyAction::Select(Response::VisibleChange)
        );
        assert_eq!(
            key_action(focused, &key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Interrupt
        );
        assert_eq!(
            key_action(focused, &key(KeyCode::Char('c'), KeyModifiers::NONE)),
            KeyAction::Select(Response::VisibleChange)
        );
        assert_eq!(
            key_action(focused, &key(KeyCode::Char('o'), KeyModifiers::NONE)),
            KeyAction::Select(Response::NoVisibleChange)
        );
        assert_eq!(
            key_action(focused, &key(KeyCode::Char('x'), KeyModifiers::NONE)),
            KeyAction::Ignore
        );
        assert_eq!(
            key_action(Response::VisibleChange, &key(KeyCode::Left, KeyModifiers::NONE)),
            KeyAction::Focus(Response::NoVisibleChange)
        );
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Some(Response::VisibleChange));
        assert_eq!(parse_answer("  YES "), Some(Response::VisibleChange));
        assert_eq!(parse_answer("n"), Some(Response::NoVisibleChange));
        assert_eq!(parse_answer("No"), Some(Response::NoVisibleChange));
        assert_eq!(parse_answer("Changed"), Some(Response::VisibleChange));
        assert_eq!(parse_answer("original"), Some(Response::NoVisibleChange));
        assert_eq!(parse_answer("maybe"), None);
        assert_eq!(parse_answer(""), None);
    }

    #[test]
    fn test_plain_dialog_skips_invalid_answers() {
        let mut dialog = PlainDialog::new(Cursor::new(b"what\n\ny\nn\n".to_vec()));
        let mut session = DialogSession::new(0);
        let probe = Probe { first: 0, last: 3 };

        assert_eq!(dialog.ask(&probe, &mut session).unwrap(), Response::VisibleChange);
        assert_eq!(dialog.ask(&probe, &mut session).unwrap(), Response::NoVisibleChange);
    }

    #[test]
    fn test_plain_dialog_eof_is_interruption() {
        let mut dialog = PlainDialog::new(Cursor::new(Vec::new()));
        let mut session = DialogSession::new(0);
        let err = dialog
            .ask(&Probe { first: 0, last: 0 }, &mut session)
            .unwrap_err();
        assert!(err.downcast_ref::<Interrupted>().is_some());
    }
}
