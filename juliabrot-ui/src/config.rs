//! Runtime settings for scheduling and interaction.
//!
//! The backend preference lives for the session only; nothing is persisted.

use crate::render_state::Backend;
use std::cell::Cell;

thread_local! {
    /// Backend chosen by the user this session. None = not chosen yet.
    static BACKEND_PREFERENCE: Cell<Option<Backend>> = const { Cell::new(None) };
}

/// Backend new surfaces should start on.
pub fn preferred_backend() -> Backend {
    BACKEND_PREFERENCE.with(|cell| cell.get().unwrap_or_default())
}

pub fn set_preferred_backend(backend: Backend) {
    BACKEND_PREFERENCE.with(|cell| cell.set(Some(backend)));
}

/// Render loop throttling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Minimum time between two draws of the same surface.
    pub min_frame_interval_ms: f64,
    /// CPU rows are batched for this long before yielding to the event loop.
    pub cpu_slice_ms: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_frame_interval_ms: 1000.0 / 120.0,
            cpu_slice_ms: 12.0,
        }
    }
}

/// Pointer gesture thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionConfig {
    /// Zoom level factor per wheel notch.
    pub wheel_zoom_step: f64,
    /// Maximum time between the two clicks of a double-click.
    pub double_click_ms: f64,
    /// Maximum pointer travel between the two clicks of a double-click.
    pub double_click_max_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            wheel_zoom_step: 1.1,
            double_click_ms: 500.0,
            double_click_max_px: 2.0,
        }
    }
}
