//! Button bits for the keys-down mask.
//!
//! The bit layout mirrors a handheld pad: face buttons, SELECT/START, d-pad
//! and shoulders in the low bits of a 32-bit mask.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub const KEY_A: u32 = 1 << 0;
pub const KEY_B: u32 = 1 << 1;
pub const KEY_SELECT: u32 = 1 << 2;
pub const KEY_START: u32 = 1 << 3;
pub const KEY_DRIGHT: u32 = 1 << 4;
pub const KEY_DLEFT: u32 = 1 << 5;
pub const KEY_DUP: u32 = 1 << 6;
pub const KEY_DDOWN: u32 = 1 << 7;
pub const KEY_R: u32 = 1 << 8;
pub const KEY_L: u32 = 1 << 9;
pub const KEY_X: u32 = 1 << 10;
pub const KEY_Y: u32 = 1 << 11;

/// Map a terminal key event onto its pad bit.
///
/// Letters cover the face and shoulder buttons, arrows the d-pad, Enter is
/// START and Tab is SELECT.  Returns 0 for keys with no pad equivalent and
/// for Ctrl/Alt chords — those belong to the host, not the pad.
pub fn key_bit(event: KeyEvent) -> u32 {
    if event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return 0;
    }
    match event.code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => KEY_A,
            'b' => KEY_B,
            'x' => KEY_X,
            'y' => KEY_Y,
            'l' => KEY_L,
            'r' => KEY_R,
            _ => 0,
        },
        KeyCode::Right => KEY_DRIGHT,
        KeyCode::Left => KEY_DLEFT,
        KeyCode::Up => KEY_DUP,
        KeyCode::Down => KEY_DDOWN,
        KeyCode::Enter => KEY_START,
        KeyCode::Tab => KEY_SELECT,
        _ => 0,
    }
}
