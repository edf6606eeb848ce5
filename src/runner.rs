//! The frame loop — scan input, test the exit button, render, wait.

use std::fmt;

use anyhow::Result;

use crate::platform::{Console, Gfx, Hid};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The designated exit button was pressed.
    ExitKey,
    /// The hosting environment asked us to stop (Ctrl+C or a closed event
    /// source).
    HostShutdown,
    /// The optional frame budget ran out.
    FrameLimit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::ExitKey => write!(f, "exit button"),
            ExitReason::HostShutdown => write!(f, "host shutdown"),
            ExitReason::FrameLimit => write!(f, "frame limit"),
        }
    }
}

/// Drives one cooperative loop over the three platform collaborators: poll
/// input, swap display buffers, block on the vblank tick — once per frame —
/// until told to stop.
pub struct FrameLoop<G, C, H> {
    gfx: G,
    console: C,
    hid: H,
    exit_mask: u32,
    max_frames: Option<u64>,
    frames: u64,
}

impl<G: Gfx, C: Console, H: Hid> FrameLoop<G, C, H> {
    pub fn new(gfx: G, console: C, hid: H, exit_mask: u32) -> Self {
        Self {
            gfx,
            console,
            hid,
            exit_mask,
            max_frames: None,
            frames: 0,
        }
    }

    /// Stop after at most `frames` rendered frames.  Useful for smoke runs.
    pub fn with_frame_limit(mut self, frames: Option<u64>) -> Self {
        self.max_frames = frames;
        self
    }

    /// Print a line through the console collaborator.  Shows on the next
    /// buffer flush.
    pub fn print(&mut self, line: &str) {
        self.console.print(line);
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Does the current frame's keys-down snapshot request an exit?  Pure
    /// read — asking twice within one frame gives the same answer.
    fn exit_requested(&self) -> bool {
        self.hid.keys_down() & self.exit_mask != 0
    }

    /// Flush, swap, then block until the next vblank tick.
    async fn render_frame(&mut self) -> Result<()> {
        self.gfx.flush_buffers()?;
        self.gfx.swap_buffers()?;
        self.gfx.wait_vblank().await?;
        self.frames += 1;
        Ok(())
    }

    /// Run until the exit button is pressed, the host shuts us down, or the
    /// frame budget runs out.  Exit is tested before the frame's render, so
    /// a press never costs an extra frame.
    pub async fn run(&mut self) -> Result<ExitReason> {
        while self.hid.main_loop_active() {
            self.hid.scan_input();
            if self.exit_requested() {
                tracing::debug!(frames = self.frames, "exit button pressed");
                return Ok(ExitReason::ExitKey);
            }
            self.render_frame().await?;
            if let Some(limit) = self.max_frames {
                if self.frames >= limit {
                    return Ok(ExitReason::FrameLimit);
                }
            }
        }
        Ok(ExitReason::HostShutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::keys::{KEY_A, KEY_B};

    #[derive(Default)]
    struct CountingGfx {
        flushes: u32,
        swaps: u32,
        vblanks: u32,
    }

    impl Gfx for CountingGfx {
        fn flush_buffers(&mut self) -> Result<()> {
            self.flushes += 1;
            Ok(())
        }

        fn swap_buffers(&mut self) -> Result<()> {
            self.swaps += 1;
            Ok(())
        }

        async fn wait_vblank(&mut self) -> Result<()> {
            self.vblanks += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingConsole {
        lines: Vec<String>,
    }

    impl Console for RecordingConsole {
        fn print(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }
    }

    /// Replays a fixed sequence of per-frame masks; the host stays active
    /// until the script runs out.
    struct ScriptedHid {
        masks: Vec<u32>,
        cursor: usize,
        current: u32,
    }

    impl ScriptedHid {
        fn new(masks: &[u32]) -> Self {
            Self {
                masks: masks.to_vec(),
                cursor: 0,
                current: 0,
            }
        }
    }

    impl Hid for ScriptedHid {
        fn scan_input(&mut self) {
            self.current = self.masks.get(self.cursor).copied().unwrap_or(0);
            self.cursor += 1;
        }

        fn keys_down(&self) -> u32 {
            self.current
        }

        fn main_loop_active(&self) -> bool {
            self.cursor < self.masks.len()
        }
    }

    fn frame_loop(masks: &[u32]) -> FrameLoop<CountingGfx, RecordingConsole, ScriptedHid> {
        FrameLoop::new(
            CountingGfx::default(),
            RecordingConsole::default(),
            ScriptedHid::new(masks),
            KEY_B,
        )
    }

    #[tokio::test]
    async fn two_clear_frames_then_exit_button() {
        let mut fl = frame_loop(&[0, 0, KEY_B]);
        let reason = fl.run().await.unwrap();

        assert_eq!(reason, ExitReason::ExitKey);
        assert_eq!(fl.frames(), 2);
        assert_eq!(fl.gfx.flushes, 2);
        assert_eq!(fl.gfx.swaps, 2);
        assert_eq!(fl.gfx.vblanks, 2);
    }

    #[tokio::test]
    async fn exit_on_the_first_frame_renders_nothing() {
        let mut fl = frame_loop(&[KEY_B]);
        let reason = fl.run().await.unwrap();

        assert_eq!(reason, ExitReason::ExitKey);
        assert_eq!(fl.frames(), 0);
        assert_eq!(fl.gfx.flushes, 0);
    }

    #[tokio::test]
    async fn exit_bit_is_tested_as_a_bit_not_for_equality() {
        // Other buttons held alongside the exit button still exit.
        let mut fl = frame_loop(&[KEY_A | KEY_B]);
        assert_eq!(fl.run().await.unwrap(), ExitReason::ExitKey);

        // A non-exit button alone does not.
        let mut fl = frame_loop(&[KEY_A]);
        assert_eq!(fl.run().await.unwrap(), ExitReason::HostShutdown);
        assert_eq!(fl.frames(), 1);
    }

    #[tokio::test]
    async fn host_shutdown_ends_the_loop_after_the_script() {
        let mut fl = frame_loop(&[0, 0]);
        let reason = fl.run().await.unwrap();

        assert_eq!(reason, ExitReason::HostShutdown);
        assert_eq!(fl.frames(), 2);
    }

    #[tokio::test]
    async fn frame_limit_stops_an_otherwise_idle_loop() {
        let mut fl = frame_loop(&[0; 10]).with_frame_limit(Some(3));
        let reason = fl.run().await.unwrap();

        assert_eq!(reason, ExitReason::FrameLimit);
        assert_eq!(fl.frames(), 3);
    }

    #[tokio::test]
    async fn exit_check_is_idempotent_within_a_frame() {
        let mut fl = frame_loop(&[KEY_B]);
        fl.hid.scan_input();
        assert_eq!(fl.exit_requested(), fl.exit_requested());
        assert!(fl.exit_requested());
    }

    #[tokio::test]
    async fn prints_reach_the_console_collaborator() {
        let mut fl = frame_loop(&[]);
        fl.print("Hello from the frame loop!");
        fl.print("Press B to exit.");

        assert_eq!(
            fl.console.lines,
            ["Hello from the frame loop!", "Press B to exit."]
        );
    }
}
