//! Capabilities the detection loop consumes from the remote desktop.

use async_trait::async_trait;
use winpick_core::{Frame, Result};

/// Supplies full-screen frames of the remote desktop.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Capture the current screen. `Ok(None)` means no frame is available
    /// right now; the caller skips the round instead of failing.
    async fn capture(&self) -> Result<Option<Frame>>;
}

/// Brings the next window to the front (the remote equivalent of Alt+Tab).
///
/// Implementations perform the switch only; callers wait out the settle
/// delay themselves.
#[async_trait]
pub trait Cycler: Send + Sync {
    /// Switch to the next window once.
    async fn advance(&self) -> Result<()>;
}
