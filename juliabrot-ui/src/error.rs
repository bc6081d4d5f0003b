//! Rendering error types.

use crate::render_state::Backend;
use juliabrot_gpu::GpuError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("{0:?} backend is not available on this surface")]
    BackendUnavailable(Backend),
}
