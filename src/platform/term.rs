//! Terminal-backed graphics and console.
//!
//! Raw mode plus the alternate screen stand in for the graphics context, a
//! text pane on each half of the terminal stands in for the two physical
//! screens, and a fixed-rate timer tick is the vblank signal.  Everything
//! draws to stderr so stdout stays clean.

use std::cell::RefCell;
use std::io::{self, stderr, Stderr};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use thiserror::Error;
use tokio::time::{interval, Interval, MissedTickBehavior};

use super::{Console, Gfx};

/// Failure to acquire the terminal.  Always fatal — there is no fallback
/// display to degrade to.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to enter raw mode: {0}")]
    RawMode(#[source] io::Error),
    #[error("failed to enter the alternate screen: {0}")]
    AltScreen(#[source] io::Error),
}

// ───────────────────────────────────────── session ───────────

/// Scoped ownership of the terminal modes.
///
/// `init` acquires raw mode and the alternate screen; `Drop` restores both
/// (and the cursor), so teardown runs on every exit path, including early
/// returns and unwinding.  Declare the session before anything that draws:
/// drops run in reverse order, so the restore happens last.
pub struct TermSession {
    _private: (),
}

impl TermSession {
    pub fn init() -> Result<Self, PlatformError> {
        enable_raw_mode().map_err(PlatformError::RawMode)?;
        if let Err(e) = execute!(stderr(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(PlatformError::AltScreen(e));
        }
        Ok(Self { _private: () })
    }
}

impl Drop for TermSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stderr(), LeaveAlternateScreen, cursor::Show);
    }
}

// ───────────────────────────────────────── screen model ──────

/// Which physical screen a console is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSide {
    Top,
    Bottom,
}

/// Per-side line buffers, written by consoles and read by the renderer.
/// Shared single-threaded behind `Rc<RefCell<_>>`.
#[derive(Debug, Default)]
pub struct ScreenModel {
    top: Vec<String>,
    bottom: Vec<String>,
}

impl ScreenModel {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn push_line(&mut self, side: ScreenSide, line: &str) {
        self.lines_mut(side).push(line.to_string());
    }

    pub fn lines(&self, side: ScreenSide) -> &[String] {
        match side {
            ScreenSide::Top => &self.top,
            ScreenSide::Bottom => &self.bottom,
        }
    }

    fn lines_mut(&mut self, side: ScreenSide) -> &mut Vec<String> {
        match side {
            ScreenSide::Top => &mut self.top,
            ScreenSide::Bottom => &mut self.bottom,
        }
    }

    /// Tail of a side's buffer that fits in `rows` — consoles scroll up.
    pub fn tail(&self, side: ScreenSide, rows: usize) -> &[String] {
        let lines = self.lines(side);
        let skip = lines.len().saturating_sub(rows);
        &lines[skip..]
    }
}

// ───────────────────────────────────────── console ───────────

/// Line console bound to one screen side at init.
pub struct TermConsole {
    screen: Rc<RefCell<ScreenModel>>,
    side: ScreenSide,
}

impl TermConsole {
    pub fn init(side: ScreenSide, screen: Rc<RefCell<ScreenModel>>) -> Self {
        Self { screen, side }
    }
}

impl Console for TermConsole {
    fn print(&mut self, line: &str) {
        self.screen.borrow_mut().push_line(self.side, line);
    }
}

// ───────────────────────────────────────── graphics ──────────

/// Terminal graphics context: draws the screen model on flush and paces
/// frames with an interval tick standing in for the vblank interrupt.
pub struct TermGfx {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    screen: Rc<RefCell<ScreenModel>>,
    vblank: Interval,
    frame: u64,
}

impl TermGfx {
    pub fn new(screen: Rc<RefCell<ScreenModel>>, fps: u32) -> Result<Self> {
        let backend = CrosstermBackend::new(stderr());
        let terminal = Terminal::new(backend)?;
        let mut vblank = interval(Duration::from_secs_f64(1.0 / f64::from(fps.max(1))));
        // A missed vblank is gone; don't burst to catch up.
        vblank.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Ok(Self {
            terminal,
            screen,
            vblank,
            frame: 0,
        })
    }
}

impl Gfx for TermGfx {
    fn flush_buffers(&mut self) -> Result<()> {
        let screen = Rc::clone(&self.screen);
        self.terminal.draw(|frame| {
            let [top_area, bottom_area] =
                Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(frame.area());
            let screen = screen.borrow();

            let top_rows = top_area.height.saturating_sub(2) as usize;
            let top = Paragraph::new(screen.tail(ScreenSide::Top, top_rows).join("\n"))
                .block(Block::default().title(" top screen ").borders(Borders::ALL));
            frame.render_widget(top, top_area);

            let bottom_rows = bottom_area.height.saturating_sub(2) as usize;
            let bottom = Paragraph::new(screen.tail(ScreenSide::Bottom, bottom_rows).join("\n"))
                .block(Block::default().title(" bottom screen ").borders(Borders::ALL));
            frame.render_widget(bottom, bottom_area);
        })?;
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<()> {
        // The draw above already presented the diffed back buffer; this step
        // just advances the frame counter so flush and swap stay distinct.
        self.frame = self.frame.wrapping_add(1);
        tracing::trace!(frame = self.frame, "buffer swap");
        Ok(())
    }

    async fn wait_vblank(&mut self) -> Result<()> {
        self.vblank.tick().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_land_on_the_bound_side() {
        let screen = ScreenModel::shared();
        let mut console = TermConsole::init(ScreenSide::Top, Rc::clone(&screen));
        console.print("Hello from the frame loop!");
        console.print("Press B to exit.");

        let screen = screen.borrow();
        assert_eq!(
            screen.lines(ScreenSide::Top),
            ["Hello from the frame loop!", "Press B to exit."]
        );
        assert!(screen.lines(ScreenSide::Bottom).is_empty());
    }

    #[test]
    fn tail_keeps_the_most_recent_lines() {
        let mut screen = ScreenModel::default();
        for i in 0..5 {
            screen.push_line(ScreenSide::Top, &format!("line {i}"));
        }
        assert_eq!(screen.tail(ScreenSide::Top, 2), ["line 3", "line 4"]);
        assert_eq!(screen.tail(ScreenSide::Top, 10).len(), 5);
        assert!(screen.tail(ScreenSide::Top, 0).is_empty());
    }
}
