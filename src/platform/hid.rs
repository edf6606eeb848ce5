//! Input subsystem — keys-down snapshots over a background event reader.
//!
//! A background task polls the terminal for key presses and forwards them
//! over a channel so `scan_input` never blocks the frame loop.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use super::keys;
use super::Hid;

/// Spawns a background task that polls the terminal for key presses and
/// sends them through the returned channel.
pub fn spawn_event_reader(poll_timeout: Duration) -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            if tx.is_closed() {
                break;
            }
            // Poll with a timeout so the task notices a dropped receiver
            // even when no keys arrive.
            let has_event = event::poll(poll_timeout).unwrap_or(false);
            if !has_event {
                continue;
            }
            if let Ok(CtEvent::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue; // ignore Release/Repeat on supporting terminals
                }
                if tx.send(k).is_err() {
                    break; // receiver dropped
                }
            }
        }
    });

    rx
}

/// Per-frame keys-down snapshots drained from the reader channel.
///
/// `scan_input` rebuilds the mask from whatever arrived since the last scan;
/// `keys_down` reads that snapshot without touching the channel, so repeated
/// reads within one frame agree.  Ctrl+C or a closed channel marks the host
/// as gone.
pub struct TermHid {
    events: mpsc::UnboundedReceiver<KeyEvent>,
    keys_down: u32,
    active: bool,
}

impl TermHid {
    pub fn new(events: mpsc::UnboundedReceiver<KeyEvent>) -> Self {
        Self {
            events,
            keys_down: 0,
            active: true,
        }
    }

    fn is_host_quit(key: KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
    }
}

impl Hid for TermHid {
    fn scan_input(&mut self) {
        self.keys_down = 0;
        loop {
            match self.events.try_recv() {
                Ok(key) if Self::is_host_quit(key) => self.active = false,
                Ok(key) => self.keys_down |= keys::key_bit(key),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.active = false;
                    break;
                }
            }
        }
    }

    fn keys_down(&self) -> u32 {
        self.keys_down
    }

    fn main_loop_active(&self) -> bool {
        self.active
    }
}
