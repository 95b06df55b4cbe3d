//! Status display abstraction

use crate::status::StatusSnapshot;

/// Consumer of [`StatusSnapshot`]s
///
/// Rendering must not block the control cycle. A renderer that cannot draw
/// reports an error; the controller logs it and keeps running.
pub trait StatusRenderer {
    /// Error reported by `render`
    type Error: core::fmt::Debug;

    /// Draw `snapshot`
    fn render(&mut self, snapshot: &StatusSnapshot) -> Result<(), Self::Error>;
}

/// Renderer that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl StatusRenderer for NullRenderer {
    type Error = core::convert::Infallible;

    fn render(&mut self, _snapshot: &StatusSnapshot) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Renderer keeping the last snapshot it was given
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    /// Last snapshot drawn
    pub last: Option<StatusSnapshot>,
    /// Number of successful renders
    pub renders: u32,
    /// Make every render fail
    pub fail: bool,
}

/// Error returned by [`RecordingRenderer`] when `fail` is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRejected;

impl StatusRenderer for RecordingRenderer {
    type Error = RenderRejected;

    fn render(&mut self, snapshot: &StatusSnapshot) -> Result<(), Self::Error> {
        if self.fail {
            return Err(RenderRejected);
        }
        self.last = Some(*snapshot);
        self.renders += 1;
        Ok(())
    }
}
