//! Fractal configuration registry.
//!
//! Defines the available fractal types with their default bounds and
//! parameters. Used by both the UI surfaces and the renderers.

use crate::{FractalMode, FractalParameters, Viewport};

/// Configuration for a fractal type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalConfig {
    /// Unique identifier
    pub id: &'static str,
    /// Human-readable name for UI display
    pub display_name: &'static str,
    pub mode: FractalMode,
    /// Default vertical extent `(y_min, y_max)`; zoom level 1.0 corresponds to this.
    pub default_y_range: (f64, f64),
    /// Default logical center.
    pub default_center: (f64, f64),
    pub default_iteration_cap: u32,
    pub default_escape_radius: f64,
    /// Seed used when a Julia surface is created without one.
    pub default_julia_seed: (f64, f64),
}

impl FractalConfig {
    /// Vertical extent at zoom level 1.0.
    pub fn default_height(&self) -> f64 {
        self.default_y_range.1 - self.default_y_range.0
    }

    /// Default viewport for a surface of the given pixel size.
    pub fn default_viewport(&self, width: u32, height: u32, screen_origin: (f64, f64)) -> Viewport {
        let mut viewport = Viewport::new(width, height, screen_origin);
        viewport.set_bounds(self.default_y_range.0, self.default_y_range.1, 0.0);
        viewport.set_center_to(self.default_center.0, self.default_center.1);
        viewport
    }

    pub fn default_parameters(&self) -> FractalParameters {
        FractalParameters {
            mode: self.mode,
            iteration_cap: self.default_iteration_cap,
            escape_radius: self.default_escape_radius,
            julia_seed: self.default_julia_seed,
            ..FractalParameters::default()
        }
    }
}

/// Registry of available fractal configurations.
pub static FRACTAL_CONFIGS: &[FractalConfig] = &[
    FractalConfig {
        id: "mandelbrot",
        display_name: "Mandelbrot Set",
        mode: FractalMode::Mandelbrot,
        default_y_range: (-2.0, 2.0),
        default_center: (-0.5, 0.0),
        default_iteration_cap: 100,
        default_escape_radius: 4.0,
        default_julia_seed: (0.0, 0.0),
    },
    FractalConfig {
        id: "julia",
        display_name: "Julia Set",
        mode: FractalMode::Julia,
        default_y_range: (-2.0, 2.0),
        default_center: (0.0, 0.0),
        default_iteration_cap: 100,
        default_escape_radius: 4.0,
        default_julia_seed: (-0.8, 0.156),
    },
];

/// Look up a fractal configuration by ID.
pub fn get_config(id: &str) -> Option<&'static FractalConfig> {
    FRACTAL_CONFIGS.iter().find(|c| c.id == id)
}

/// Configuration for a mode.
pub fn config_for_mode(mode: FractalMode) -> &'static FractalConfig {
    match mode {
        FractalMode::Mandelbrot => &FRACTAL_CONFIGS[0],
        FractalMode::Julia => &FRACTAL_CONFIGS[1],
    }
}

/// Get the default fractal configuration.
pub fn default_config() -> &'static FractalConfig {
    config_for_mode(FractalMode::Mandelbrot)
}
