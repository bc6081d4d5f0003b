//! Interactive surfaces: render state, scheduling, gestures, and the browser host.

pub mod config;
pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod host;
pub mod interaction;
pub mod render_state;
pub mod scheduler;
pub mod surface;

pub use config::{preferred_backend, set_preferred_backend, InteractionConfig, SchedulerConfig};
pub use error::RenderError;
pub use interaction::{Gesture, GestureQueue, InteractionController, InteractionOutcome};
pub use render_state::{Backend, RenderState};
pub use scheduler::{RenderScheduler, SchedulerState, TickAction};
pub use surface::{FractalSurface, RenderJob, SurfaceRole, SurfaceSnapshot};

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::host::SurfaceHost;
    use crate::surface::{FractalSurface, SurfaceRole};
    use juliabrot_core::default_config;
    use juliabrot_gpu::GpuRenderer;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    #[wasm_bindgen]
    pub fn init() {
        console_error_panic_hook::set_once();
        _ = console_log::init_with_level(log::Level::Debug);
    }

    /// Mount the main Mandelbrot surface on `canvas` and start its loop.
    ///
    /// Fails if no GPU device or shader can be created.
    #[wasm_bindgen]
    pub async fn start(canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let gpu = GpuRenderer::create()
            .await
            .map_err(|e| JsValue::from_str(&format!("GPU startup failed: {e}")))?;

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        let rect = canvas.get_bounding_client_rect();

        let mut surface =
            FractalSurface::new(SurfaceRole::Main, default_config(), width, height, Some(gpu));
        surface.resize_canvas(
            rect.left(),
            rect.left() + width as f64,
            rect.top() + height as f64,
            rect.top(),
        );
        surface.on_progress(|p| {
            log::debug!(
                "CPU render {:.0}% ({}/{} rows), ~{:.0} ms left",
                p.percentage(),
                p.completed_rows,
                p.total_rows,
                p.estimated_remaining_ms().unwrap_or(0.0)
            );
        });

        let host = SurfaceHost::new(surface, canvas);
        host.attach_interaction()?;
        host.start_loop()?;
        log::info!("Surface mounted at {width}x{height}");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{init, start};
