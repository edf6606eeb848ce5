//! A handheld-style "hello world" frame loop on the terminal.
//!
//! Initializes a display session and a top-screen console, prints a greeting,
//! then runs a frame loop that polls the pad bitmask once per vblank tick and
//! exits when B is pressed (or the host asks us to stop).

mod platform;
mod runner;

use std::io;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use crate::platform::hid::{spawn_event_reader, TermHid};
use crate::platform::keys::KEY_B;
use crate::platform::term::{ScreenModel, ScreenSide, TermConsole, TermGfx, TermSession};
use crate::runner::FrameLoop;

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Frame-loop hello world")]
struct Cli {
    /// Vblank rate in frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Stop after this many rendered frames (smoke-run aid).
    #[arg(long)]
    max_frames: Option<u64>,
}

/// How long the event-reader task waits per poll before rechecking whether
/// its receiver is gone.
const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    // ── display + console setup ───────────────────────────────
    // The session is declared first so its Drop (terminal restore) runs
    // after everything that draws has been released.
    let _session = TermSession::init()?;
    let screen = ScreenModel::shared();
    let gfx = TermGfx::new(Rc::clone(&screen), cli.fps)?;
    let console = TermConsole::init(ScreenSide::Top, Rc::clone(&screen));
    let hid = TermHid::new(spawn_event_reader(EVENT_POLL_TIMEOUT));

    // ── frame loop ────────────────────────────────────────────
    let mut frame_loop = FrameLoop::new(gfx, console, hid, KEY_B).with_frame_limit(cli.max_frames);
    frame_loop.print("Hello from the frame loop!");
    frame_loop.print("Press B to exit.");

    let reason = frame_loop.run().await?;
    tracing::info!(frames = frame_loop.frames(), %reason, "loop finished");

    Ok(())
}
