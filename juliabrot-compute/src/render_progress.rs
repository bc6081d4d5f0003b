/// Progress information for an ongoing CPU render.
///
/// Steps are pixel rows. The remaining-time estimate is a linear
/// extrapolation of the elapsed time per completed row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderProgress {
    pub completed_rows: u32,
    pub total_rows: u32,
    pub elapsed_ms: f64,
    pub is_complete: bool,
}

impl RenderProgress {
    /// Create new progress tracker.
    pub fn new(total_rows: u32) -> Self {
        Self {
            completed_rows: 0,
            total_rows,
            elapsed_ms: 0.0,
            is_complete: total_rows == 0,
        }
    }

    /// Fraction of rows completed (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.total_rows == 0 {
            1.0
        } else {
            self.completed_rows as f64 / self.total_rows as f64
        }
    }

    /// Calculate completion percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f32 {
        (self.fraction() * 100.0) as f32
    }

    /// Estimated time to finish, or `None` before the first row completes.
    pub fn estimated_remaining_ms(&self) -> Option<f64> {
        if self.is_complete {
            return Some(0.0);
        }
        if self.completed_rows == 0 {
            return None;
        }
        let per_row = self.elapsed_ms / self.completed_rows as f64;
        Some(per_row * (self.total_rows - self.completed_rows) as f64)
    }
}
