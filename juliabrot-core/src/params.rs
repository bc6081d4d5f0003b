// juliabrot-core/src/params.rs

use serde::{Deserialize, Serialize};

/// Number of color basis functions blended by [`ColorSettings`].
pub const COLOR_BASIS_COUNT: usize = 5;

/// Selects how the starting value and the constant of the recurrence are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractalMode {
    /// `c` is the pixel, `z0 = 0`.
    #[default]
    Mandelbrot,
    /// `c` is the Julia seed, `z0` is the pixel.
    Julia,
}

impl FractalMode {
    /// Numeric tag shared with the shader uniforms.
    pub fn as_u32(self) -> u32 {
        match self {
            FractalMode::Mandelbrot => 0,
            FractalMode::Julia => 1,
        }
    }
}

/// Blend weights for the color basis functions, in order:
/// grayscale ramp, color ramp, cosine palette, sine palette, inverse ramp.
///
/// Weights are real scalars and several may be non-zero at once.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorSettings(pub [f64; COLOR_BASIS_COUNT]);

impl ColorSettings {
    pub fn weight(&self, index: usize) -> f64 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    /// Set one weight. Out-of-range indices are ignored.
    pub fn set_weight(&mut self, index: usize, weight: f64) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = weight;
        }
    }
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self([0.0, 0.0, 1.0, 0.0, 0.0])
    }
}

/// Per-surface fractal parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractalParameters {
    pub mode: FractalMode,
    /// Divergence threshold, compared against |z|².
    pub escape_radius: f64,
    /// Real exponent of the recurrence `z -> z^exponent + c`.
    pub exponent: f64,
    pub iteration_cap: u32,
    /// Normalized RGB in [0, 1].
    pub color: [f64; 3],
    pub color_settings: ColorSettings,
    /// Only read in Julia mode.
    pub julia_seed: (f64, f64),
}

impl FractalParameters {
    pub fn mandelbrot() -> Self {
        Self::default()
    }

    pub fn julia(seed: (f64, f64)) -> Self {
        Self {
            mode: FractalMode::Julia,
            julia_seed: seed,
            ..Self::default()
        }
    }
}

impl Default for FractalParameters {
    fn default() -> Self {
        Self {
            mode: FractalMode::Mandelbrot,
            escape_radius: 4.0,
            exponent: 2.0,
            iteration_cap: 100,
            color: [1.0, 0.6, 0.2],
            color_settings: ColorSettings::default(),
            julia_seed: (-0.8, 0.156),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_quadratic_mandelbrot() {
        let params = FractalParameters::default();
        assert_eq!(params.mode, FractalMode::Mandelbrot);
        assert_eq!(params.exponent, 2.0);
        assert_eq!(params.escape_radius, 4.0);
    }

    #[test]
    fn julia_constructor_sets_seed_and_mode() {
        let params = FractalParameters::julia((0.285, 0.01));
        assert_eq!(params.mode, FractalMode::Julia);
        assert_eq!(params.julia_seed, (0.285, 0.01));
    }

    #[test]
    fn color_weights_are_independent() {
        let mut settings = ColorSettings([0.0; COLOR_BASIS_COUNT]);
        settings.set_weight(0, 0.25);
        settings.set_weight(3, 0.75);

        assert_eq!(settings.weight(0), 0.25);
        assert_eq!(settings.weight(3), 0.75);
        assert_eq!(settings.weight(1), 0.0);
    }

    #[test]
    fn out_of_range_weight_is_ignored() {
        let mut settings = ColorSettings::default();
        let before = settings;
        settings.set_weight(COLOR_BASIS_COUNT, 1.0);

        assert_eq!(settings, before);
        assert_eq!(settings.weight(99), 0.0);
    }

    #[test]
    fn mode_tags_are_stable() {
        assert_eq!(FractalMode::Mandelbrot.as_u32(), 0);
        assert_eq!(FractalMode::Julia.as_u32(), 1);
    }
}
