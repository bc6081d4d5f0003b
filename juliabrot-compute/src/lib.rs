pub mod pixel_buffer;
pub mod rasterizer;
pub mod render_progress;
pub mod timing;

pub use pixel_buffer::PixelBuffer;
pub use rasterizer::CpuRasterizer;
pub use render_progress::RenderProgress;
pub use timing::now_ms;

// Re-export core types for convenience
pub use juliabrot_core::*;
