//! Linear interpolation between two views, for animation and video frames.
//!
//! Every numeric field follows `a·(1 - t) + b·t`, which is exact at both
//! `t = 0` and `t = 1`. Rounding is left to [`ParameterBundle::rounded`].

use crate::{ColorSettings, ParameterBundle, COLOR_BASIS_COUNT};

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[inline]
fn lerp_pair(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (lerp(a.0, b.0, t), lerp(a.1, b.1, t))
}

/// `n` intermediate states at `t = (i + 1) / n`; the last one equals `goal`.
/// Returns an empty sequence for `n == 0`.
pub fn interpolate(start: &ParameterBundle, goal: &ParameterBundle, n: usize) -> Vec<ParameterBundle> {
    (0..n)
        .map(|i| interpolate_at_time(start, goal, (i + 1) as f64 / n as f64))
        .collect()
}

/// Single intermediate state at `t`, clamped to `[0, 1]`.
pub fn interpolate_at_time(start: &ParameterBundle, goal: &ParameterBundle, t: f64) -> ParameterBundle {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    let mut weights = [0.0; COLOR_BASIS_COUNT];
    for (i, w) in weights.iter_mut().enumerate() {
        *w = lerp(start.color_settings.weight(i), goal.color_settings.weight(i), t);
    }

    ParameterBundle {
        mode: if t >= 1.0 { goal.mode } else { start.mode },
        color: [
            lerp(start.color[0], goal.color[0], t),
            lerp(start.color[1], goal.color[1], t),
            lerp(start.color[2], goal.color[2], t),
        ],
        color_settings: ColorSettings(weights),
        exponent: lerp(start.exponent, goal.exponent, t),
        escape_radius: lerp(start.escape_radius, goal.escape_radius, t),
        iteration_cap: lerp(start.iteration_cap, goal.iteration_cap, t),
        julia_seed: lerp_pair(start.julia_seed, goal.julia_seed, t),
        center: lerp_pair(start.center, goal.center, t),
        zoom_level: lerp(start.zoom_level, goal.zoom_level, t),
    }
}
