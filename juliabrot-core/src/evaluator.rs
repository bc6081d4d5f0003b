//! Escape-time evaluation for a single point (CPU form).
//!
//! The WGSL fragment shader in `juliabrot-gpu` implements the same algorithm
//! in f32. Any change here must be mirrored there; the comparison suite in
//! `juliabrot-gpu/tests/cpu_gpu_comparison.rs` checks they agree.

use crate::{EscapeData, FractalMode, FractalParameters};
use std::f64::consts::TAU;

/// Per-channel phase offsets of the cosine palette.
pub const COSINE_PHASES: [f64; 3] = [0.0, 2.094, 4.188];
/// Frequency of the cosine palette in smoothed iterations.
pub const COSINE_FREQUENCY: f64 = 0.15;
/// Frequency of the sine palette in smoothed iterations.
pub const SINE_FREQUENCY: f64 = 0.05;

/// Largest whole exponent raised by repeated multiplication.
pub const MAX_INTEGER_EXPONENT: f64 = 16.0;

/// `z^exponent`.
///
/// Whole exponents in `1..=MAX_INTEGER_EXPONENT` multiply `z` out, which
/// only rounds like the shader does. Anything else goes through polar form,
/// `r' = r^e`, `θ' = e·θ`, where zero modulus maps to 0 (or 1 when the
/// exponent is 0) instead of relying on `0^e` and `atan2(0, 0)`.
#[inline]
pub fn complex_pow(x: f64, y: f64, exponent: f64) -> (f64, f64) {
    if exponent.fract() == 0.0 && (1.0..=MAX_INTEGER_EXPONENT).contains(&exponent) {
        return complex_powi(x, y, exponent as u32);
    }
    let r_sq = x * x + y * y;
    if r_sq == 0.0 {
        return if exponent == 0.0 { (1.0, 0.0) } else { (0.0, 0.0) };
    }
    let r = r_sq.powf(exponent * 0.5);
    let theta = y.atan2(x) * exponent;
    (r * theta.cos(), r * theta.sin())
}

#[inline]
fn complex_powi(x: f64, y: f64, n: u32) -> (f64, f64) {
    let (mut wx, mut wy) = (x, y);
    for _ in 1..n {
        (wx, wy) = (wx * x - wy * y, wx * y + wy * x);
    }
    (wx, wy)
}

/// Normalized iteration count `i - log2(log2(|z|²)/log2(R)) / log2(e)`.
///
/// Falls back to `i` when the exponent or escape radius make a log denominator non-positive.
#[inline]
pub fn smoothed_escape(iteration: u32, z_norm_sq: f64, escape_radius: f64, exponent: f64) -> f64 {
    let i = iteration as f64;
    if exponent <= 1.0 || escape_radius <= 1.0 || z_norm_sq <= 1.0 {
        return i;
    }
    let ratio = z_norm_sq.log2() / escape_radius.log2();
    i - ratio.log2() / exponent.log2()
}

/// Pure escape-time evaluator over a parameter snapshot.
#[derive(Clone, Debug)]
pub struct EscapeTimeEvaluator {
    params: FractalParameters,
}

impl EscapeTimeEvaluator {
    pub fn new(params: FractalParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FractalParameters {
        &self.params
    }

    /// Iterate the recurrence for the point `(x, y)`.
    pub fn evaluate(&self, x: f64, y: f64) -> EscapeData {
        let p = &self.params;
        let (mut zx, mut zy, cx, cy) = match p.mode {
            FractalMode::Mandelbrot => (0.0, 0.0, x, y),
            FractalMode::Julia => (x, y, p.julia_seed.0, p.julia_seed.1),
        };

        for i in 0..p.iteration_cap {
            let (px, py) = complex_pow(zx, zy, p.exponent);
            zx = px + cx;
            zy = py + cy;

            let z_norm_sq = zx * zx + zy * zy;
            if z_norm_sq > p.escape_radius {
                let smoothed = smoothed_escape(i, z_norm_sq, p.escape_radius, p.exponent);
                return EscapeData::escaped(i, p.iteration_cap, smoothed, z_norm_sq);
            }
        }

        EscapeData::inside(p.iteration_cap)
    }

    /// Blend the five color basis functions for an evaluated point.
    /// Interior points are black.
    pub fn color(&self, data: &EscapeData) -> [f64; 3] {
        if !data.escaped {
            return [0.0; 3];
        }

        let p = &self.params;
        let s = data.smoothed;
        let n = if p.iteration_cap == 0 {
            0.0
        } else {
            (s / p.iteration_cap as f64).clamp(0.0, 1.0)
        };
        let w = &p.color_settings.0;

        let mut rgb = [0.0; 3];
        for (ch, out) in rgb.iter_mut().enumerate() {
            let c = p.color[ch];
            let grayscale = n;
            let ramp = n * c;
            let cosine = (0.5 + 0.5 * (COSINE_FREQUENCY * s + COSINE_PHASES[ch]).cos()) * c;
            let sine = (0.5 + 0.5 * (SINE_FREQUENCY * s + TAU * c).sin()) * c;
            let inverse = (1.0 - n) * c;

            let v = w[0] * grayscale + w[1] * ramp + w[2] * cosine + w[3] * sine + w[4] * inverse;
            *out = v.clamp(0.0, 1.0);
        }
        rgb
    }

    /// Evaluate and color in one step.
    pub fn shade(&self, x: f64, y: f64) -> [f64; 3] {
        self.color(&self.evaluate(x, y))
    }
}

/// Quantize a normalized color to opaque RGBA8.
#[inline]
pub fn to_rgba8(rgb: [f64; 3]) -> [u8; 4] {
    let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(rgb[0]), q(rgb[1]), q(rgb[2]), 255]
}
