pub mod bundle;
pub mod compute_data;
pub mod config;
pub mod evaluator;
pub mod interpolate;
pub mod params;
pub mod viewport;

pub use bundle::ParameterBundle;
pub use compute_data::EscapeData;
pub use config::{config_for_mode, default_config, get_config, FractalConfig, FRACTAL_CONFIGS};
pub use evaluator::{
    complex_pow, smoothed_escape, to_rgba8, EscapeTimeEvaluator, MAX_INTEGER_EXPONENT,
};
pub use interpolate::{interpolate, interpolate_at_time};
pub use params::{ColorSettings, FractalMode, FractalParameters, COLOR_BASIS_COUNT};
pub use viewport::Viewport;
