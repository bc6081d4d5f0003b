// juliabrot-ui/src/render_state.rs

use serde::{Deserialize, Serialize};

/// Which rasterizer draws a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    #[default]
    Gpu,
    Cpu,
}

/// Per-surface render bookkeeping.
///
/// `dirty` is set by every mutation and cleared when a render captures its
/// snapshot. `rendering` is the guard against overlapping CPU renders.
/// `queued` records a request that arrived while throttled or while the
/// guard was set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderState {
    pub dirty: bool,
    pub rendering: bool,
    pub queued: bool,
    pub backend: Backend,
}

impl RenderState {
    pub fn new(backend: Backend) -> Self {
        Self {
            // First frame is owed.
            dirty: true,
            rendering: false,
            queued: false,
            backend,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Try to take the guard for a new render.
    ///
    /// Returns `false` and sets `queued` if a render is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.rendering {
            self.queued = true;
            return false;
        }
        self.rendering = true;
        self.dirty = false;
        self.queued = false;
        true
    }

    /// Release the guard.
    pub fn finish(&mut self) {
        self.rendering = false;
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(Backend::default())
    }
}
