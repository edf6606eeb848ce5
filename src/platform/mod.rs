//! Collaborator seams for the frame loop.
//!
//! The loop drives three subsystems it does not implement: a double-buffered
//! graphics context, a line console, and input polling.  Each is a trait so
//! the loop runs the same against the real terminal or scripted test doubles.

use anyhow::Result;

pub mod hid;
pub mod keys;
pub mod term;

/// Graphics subsystem — buffer management plus the vblank pacer.
#[allow(async_fn_in_trait)]
pub trait Gfx {
    /// Flush pending draw commands into the back buffer.
    fn flush_buffers(&mut self) -> Result<()>;

    /// Swap front/back buffers, making the drawn frame visible.
    fn swap_buffers(&mut self) -> Result<()>;

    /// Block until the display signals readiness for the next frame.
    /// This is the frame loop's sole suspension point.
    async fn wait_vblank(&mut self) -> Result<()>;
}

/// Text console bound to one screen side at init.  Printed lines become
/// visible on the next buffer flush.
pub trait Console {
    fn print(&mut self, line: &str);
}

/// Input subsystem — per-frame keys-down snapshots plus the host lifecycle
/// gate.
pub trait Hid {
    /// Refresh the per-frame input snapshot.  Called once per loop iteration.
    fn scan_input(&mut self);

    /// Bitmask of buttons newly pressed this frame (see [`keys`]).  Pure
    /// read of the snapshot taken by the last `scan_input`.
    fn keys_down(&self) -> u32;

    /// False once the hosting environment has asked the loop to stop.
    fn main_loop_active(&self) -> bool;
}
