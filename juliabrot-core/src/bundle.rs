// juliabrot-core/src/bundle.rs

use crate::{ColorSettings, FractalMode, FractalParameters};
use serde::{Deserialize, Serialize};

/// Plain record of everything needed to reproduce a view.
///
/// This is the import/export format for collaborators that encode views
/// into filenames or sync them over HTTP. `iteration_cap` and `color` may
/// hold fractional values while interpolating; [`ParameterBundle::rounded`]
/// is the separate step that snaps them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterBundle {
    pub mode: FractalMode,
    pub color: [f64; 3],
    pub color_settings: ColorSettings,
    pub exponent: f64,
    pub escape_radius: f64,
    pub iteration_cap: f64,
    pub julia_seed: (f64, f64),
    pub center: (f64, f64),
    pub zoom_level: f64,
}

impl ParameterBundle {
    pub fn from_parameters(params: &FractalParameters, center: (f64, f64), zoom_level: f64) -> Self {
        Self {
            mode: params.mode,
            color: params.color,
            color_settings: params.color_settings,
            exponent: params.exponent,
            escape_radius: params.escape_radius,
            iteration_cap: params.iteration_cap as f64,
            julia_seed: params.julia_seed,
            center,
            zoom_level,
        }
    }

    /// Snap the iteration cap to a whole number (at least 1) and color
    /// channels to 8-bit steps.
    pub fn rounded(&self) -> Self {
        let snap = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() / 255.0;
        Self {
            iteration_cap: self.iteration_cap.round().max(1.0),
            color: [snap(self.color[0]), snap(self.color[1]), snap(self.color[2])],
            ..self.clone()
        }
    }

    /// Parameters carried by this bundle, with the iteration cap rounded.
    pub fn to_parameters(&self) -> FractalParameters {
        FractalParameters {
            mode: self.mode,
            escape_radius: self.escape_radius,
            exponent: self.exponent,
            iteration_cap: self.iteration_cap.round().max(1.0) as u32,
            color: self.color,
            color_settings: self.color_settings,
            julia_seed: self.julia_seed,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
