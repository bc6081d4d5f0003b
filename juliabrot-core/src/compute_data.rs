// juliabrot-core/src/compute_data.rs

use serde::{Deserialize, Serialize};

/// Outcome of evaluating one point of the complex plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscapeData {
    /// 0-based iteration at which |z|² first exceeded the escape radius,
    /// or the iteration cap for interior points.
    pub iterations: u32,
    pub iteration_cap: u32,
    /// Whether the point escaped.
    pub escaped: bool,
    /// Continuous escape value. Interior points store the iteration cap.
    #[serde(default)]
    pub smoothed: f64,
    /// |z|² at escape. Interior points store 0.0.
    #[serde(default)]
    pub final_z_norm_sq: f64,
}

impl EscapeData {
    /// Escaped point, sanitizing NaN/Infinity so the record stays JSON-safe.
    pub fn escaped(iterations: u32, iteration_cap: u32, smoothed: f64, z_norm_sq: f64) -> Self {
        Self {
            iterations,
            iteration_cap,
            escaped: true,
            smoothed: Self::sanitize(smoothed, iterations as f64),
            final_z_norm_sq: Self::sanitize(z_norm_sq, 0.0),
        }
    }

    pub fn inside(iteration_cap: u32) -> Self {
        Self {
            iterations: iteration_cap,
            iteration_cap,
            escaped: false,
            smoothed: iteration_cap as f64,
            final_z_norm_sq: 0.0,
        }
    }

    /// Replace NaN or Infinity with a default value.
    #[inline]
    fn sanitize(value: f64, default: f64) -> f64 {
        if value.is_finite() {
            value
        } else {
            default
        }
    }
}

impl Default for EscapeData {
    fn default() -> Self {
        Self::inside(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_sanitizes_non_finite_values() {
        let data = EscapeData::escaped(7, 100, f64::NAN, f64::INFINITY);
        assert_eq!(data.smoothed, 7.0);
        assert_eq!(data.final_z_norm_sq, 0.0);
        assert!(serde_json::to_string(&data).is_ok());
    }

    #[test]
    fn inside_reports_cap() {
        let data = EscapeData::inside(250);
        assert!(!data.escaped);
        assert_eq!(data.iterations, 250);
        assert_eq!(data.smoothed, 250.0);
    }
}
