//! A rendering surface: viewport, parameters, render state, and both backends.

use crate::config::{preferred_backend, set_preferred_backend};
use crate::error::RenderError;
use crate::render_state::{Backend, RenderState};
use juliabrot_compute::{CpuRasterizer, PixelBuffer, RenderProgress};
use juliabrot_core::{
    config_for_mode, ColorSettings, FractalConfig, FractalMode, FractalParameters, ParameterBundle,
    Viewport,
};
use juliabrot_gpu::{GpuRenderer, PendingSnapshot};
use std::cell::RefCell;
use std::future::Future;

/// Scheduling policy of a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfaceRole {
    /// Continuous render loop; gestures only mark dirty.
    #[default]
    Main,
    /// On-demand rendering for export framing; gestures draw immediately.
    Preview,
}

/// Work produced by [`FractalSurface::begin_render`].
pub enum RenderJob {
    /// The GPU frame was drawn synchronously.
    Drawn,
    /// A CPU scan over a captured snapshot, to be driven by the caller.
    Cpu(CpuRasterizer),
}

/// Pixels of the last frame, possibly still on their way back from the GPU.
///
/// Holds no borrow of the surface, so it can be awaited while the surface
/// keeps taking gestures.
pub enum SurfaceSnapshot {
    Ready(PixelBuffer),
    Pending(PendingSnapshot),
}

impl SurfaceSnapshot {
    pub async fn resolve(self) -> Result<PixelBuffer, RenderError> {
        match self {
            SurfaceSnapshot::Ready(pixels) => Ok(pixels),
            SurfaceSnapshot::Pending(pending) => Ok(pending.finish().await?),
        }
    }
}

type MovedListener = Box<dyn FnMut(&Viewport)>;
type ProgressListener = Box<dyn FnMut(&RenderProgress)>;

/// One interactive fractal view.
///
/// Every parameter setter marks the surface dirty. Bound changes also notify
/// `on_moved` listeners. `zoom_level` only changes through [`Self::zoom`] and
/// [`Self::set_zoom`]; direct bound edits leave it alone.
pub struct FractalSurface {
    role: SurfaceRole,
    config: &'static FractalConfig,
    viewport: Viewport,
    params: FractalParameters,
    zoom_level: f64,
    state: RenderState,
    gpu: Option<GpuRenderer>,
    cpu_pixels: PixelBuffer,
    progress: RenderProgress,
    listeners: Vec<MovedListener>,
    progress_listeners: Vec<ProgressListener>,
}

impl FractalSurface {
    /// Create a surface at the config's default view.
    ///
    /// Without a GPU renderer the surface is CPU-only regardless of the
    /// session's backend preference.
    pub fn new(
        role: SurfaceRole,
        config: &'static FractalConfig,
        width: u32,
        height: u32,
        gpu: Option<GpuRenderer>,
    ) -> Self {
        let mut backend = preferred_backend();
        if backend == Backend::Gpu && gpu.is_none() {
            log::warn!("No GPU renderer for {} surface, using CPU", config.id);
            backend = Backend::Cpu;
        }

        let mut gpu = gpu;
        if let Some(renderer) = gpu.as_mut() {
            renderer.resize(width, height);
        }

        Self {
            role,
            config,
            viewport: config.default_viewport(width, height, (0.0, 0.0)),
            params: config.default_parameters(),
            zoom_level: 1.0,
            state: RenderState::new(backend),
            gpu,
            cpu_pixels: PixelBuffer::new(width, height),
            progress: RenderProgress::new(height),
            listeners: Vec::new(),
            progress_listeners: Vec::new(),
        }
    }

    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    pub fn config(&self) -> &'static FractalConfig {
        self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn params(&self) -> &FractalParameters {
        &self.params
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Mutable render state for the scheduler.
    pub fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    pub fn backend(&self) -> Backend {
        self.state.backend
    }

    pub fn progress(&self) -> RenderProgress {
        self.progress
    }

    /// Last frame drawn by the CPU path.
    pub fn cpu_pixels(&self) -> &PixelBuffer {
        &self.cpu_pixels
    }

    pub fn gpu(&self) -> Option<&GpuRenderer> {
        self.gpu.as_ref()
    }

    // =========================================================================
    // Parameter setters
    // =========================================================================

    pub fn set_color(&mut self, color: [f64; 3]) {
        self.params.color = color;
        self.state.mark_dirty();
    }

    pub fn set_exponent(&mut self, exponent: f64) {
        self.params.exponent = exponent;
        self.state.mark_dirty();
    }

    pub fn set_escape_radius(&mut self, escape_radius: f64) {
        self.params.escape_radius = escape_radius;
        self.state.mark_dirty();
    }

    pub fn set_iteration_cap(&mut self, iteration_cap: u32) {
        self.params.iteration_cap = iteration_cap;
        self.state.mark_dirty();
    }

    pub fn set_color_settings(&mut self, settings: ColorSettings) {
        self.params.color_settings = settings;
        self.state.mark_dirty();
    }

    pub fn set_color_weight(&mut self, index: usize, weight: f64) {
        self.params.color_settings.set_weight(index, weight);
        self.state.mark_dirty();
    }

    pub fn set_julia_seed(&mut self, seed: (f64, f64)) {
        self.params.julia_seed = seed;
        self.state.mark_dirty();
    }

    pub fn set_mode(&mut self, mode: FractalMode) {
        self.params.mode = mode;
        self.state.mark_dirty();
    }

    /// Switch the visible backend. Both targets are always sized, so this is immediate.
    ///
    /// The choice becomes the session's preference for surfaces created later.
    pub fn set_backend(&mut self, backend: Backend) -> Result<(), RenderError> {
        if backend == Backend::Gpu && self.gpu.is_none() {
            return Err(RenderError::BackendUnavailable(backend));
        }
        set_preferred_backend(backend);
        if self.state.backend != backend {
            log::info!("{} surface switched to {backend:?}", self.config.id);
            self.state.backend = backend;
            self.state.mark_dirty();
        }
        Ok(())
    }

    // =========================================================================
    // Bounds
    // =========================================================================

    pub fn get_current_center(&self) -> (f64, f64) {
        self.viewport.center()
    }

    pub fn set_center_to(&mut self, x: f64, y: f64) {
        self.viewport.set_center_to(x, y);
        self.moved();
    }

    /// Scale the visible extent about `(cx, cy)` by the bound factor `z`.
    ///
    /// `z = 0.5` halves the extent and doubles the zoom level. Non-positive or
    /// non-finite factors are ignored.
    pub fn zoom(&mut self, cx: f64, cy: f64, z: f64) {
        if !(z.is_finite() && z > 0.0) {
            log::warn!("zoom: ignoring factor {z}");
            return;
        }
        self.viewport.zoom_about(cx, cy, z);
        self.zoom_level /= z;
        self.moved();
    }

    /// Set an absolute zoom level about the focal point `(x, y)`.
    pub fn set_zoom(&mut self, x: f64, y: f64, new_zoom_level: f64) {
        if !(new_zoom_level.is_finite() && new_zoom_level > 0.0) {
            log::warn!("set_zoom: ignoring zoom level {new_zoom_level}");
            return;
        }
        self.zoom(x, y, self.zoom_level / new_zoom_level);
        self.zoom_level = new_zoom_level;
    }

    /// Drag the logical point `start` under the pointer now reading `current`.
    pub fn pan(&mut self, start: (f64, f64), current: (f64, f64)) {
        self.viewport.pan(start, current);
        self.moved();
    }

    /// Reposition and resize the surface to the given screen-space edges.
    ///
    /// The vertical extent and left edge are kept; both backend targets are
    /// resized together.
    pub fn resize_canvas(&mut self, left: f64, right: f64, bottom: f64, top: f64) {
        let width = (right - left).max(0.0).round() as u32;
        let height = (bottom - top).max(0.0).round() as u32;

        self.viewport.screen_origin = (left, top);
        self.viewport.resize(width, height);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(width, height);
        }
        self.cpu_pixels = PixelBuffer::new(width, height);
        self.progress = RenderProgress::new(height);
        self.moved();
    }

    /// Register a listener fired after every bound change.
    pub fn on_moved(&mut self, listener: impl FnMut(&Viewport) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Register a listener fired as CPU rows complete.
    pub fn on_progress(&mut self, listener: impl FnMut(&RenderProgress) + 'static) {
        self.progress_listeners.push(Box::new(listener));
    }

    fn report_progress(&mut self, progress: RenderProgress) {
        self.progress = progress;
        for listener in &mut self.progress_listeners {
            listener(&self.progress);
        }
    }

    fn moved(&mut self) {
        self.state.mark_dirty();
        for listener in &mut self.listeners {
            listener(&self.viewport);
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Take the guard and capture a snapshot for a new render.
    ///
    /// The GPU path uploads the snapshot and draws before returning. Returns
    /// `None` if a render is already in flight; the request is then queued.
    pub fn begin_render(&mut self) -> Option<RenderJob> {
        if !self.state.begin() {
            log::debug!("Render already in flight, queued");
            return None;
        }

        match (self.state.backend, self.gpu.as_mut()) {
            (Backend::Gpu, Some(gpu)) => {
                gpu.render(&self.viewport, &self.params);
                self.state.finish();
                Some(RenderJob::Drawn)
            }
            _ => {
                self.progress = RenderProgress::new(self.viewport.height);
                Some(RenderJob::Cpu(CpuRasterizer::new(&self.viewport, &self.params)))
            }
        }
    }

    /// Store a finished CPU frame and release the guard.
    ///
    /// A frame whose size no longer matches the surface is dropped; the
    /// resize already marked the surface dirty.
    pub fn finish_cpu_render(&mut self, pixels: PixelBuffer) {
        if (pixels.width, pixels.height) == (self.viewport.width, self.viewport.height) {
            self.cpu_pixels = pixels;
        }
        self.state.finish();
    }

    /// Render to completion without yielding. Returns `false` if queued behind
    /// an in-flight render.
    pub fn render_now(&mut self) -> bool {
        match self.begin_render() {
            None => false,
            Some(RenderJob::Drawn) => true,
            Some(RenderJob::Cpu(raster)) => {
                let mut progress = self.progress;
                let pixels = raster.render_all();
                progress.completed_rows = progress.total_rows;
                progress.is_complete = true;
                self.report_progress(progress);
                self.finish_cpu_render(pixels);
                true
            }
        }
    }

    /// Render a shared surface, awaiting `yield_now` after every `slice_ms`
    /// of CPU work.
    ///
    /// No borrow is held across an await, so setters may run while a CPU
    /// render is in flight; they affect the next render only. Resolves to
    /// `true` once pixels are drawn, `false` if the request was queued.
    pub async fn render<Y, F>(surface: &RefCell<Self>, slice_ms: f64, yield_now: Y) -> bool
    where
        Y: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let job = surface.borrow_mut().begin_render();
        match job {
            None => false,
            Some(RenderJob::Drawn) => true,
            Some(RenderJob::Cpu(raster)) => {
                let pixels = raster
                    .render_yielding(slice_ms, yield_now, |progress| {
                        if let Ok(mut s) = surface.try_borrow_mut() {
                            s.report_progress(*progress);
                        }
                    })
                    .await;
                surface.borrow_mut().finish_cpu_render(pixels);
                true
            }
        }
    }

    /// Pixels of the last drawn frame from the active backend.
    pub async fn snapshot(&self) -> Result<PixelBuffer, RenderError> {
        self.begin_snapshot()?.resolve().await
    }

    /// Start reading the last frame back without keeping `self` borrowed.
    pub fn begin_snapshot(&self) -> Result<SurfaceSnapshot, RenderError> {
        match (self.state.backend, self.gpu.as_ref()) {
            (Backend::Gpu, Some(gpu)) => Ok(SurfaceSnapshot::Pending(gpu.begin_snapshot()?)),
            (Backend::Gpu, None) => Err(RenderError::BackendUnavailable(Backend::Gpu)),
            (Backend::Cpu, _) => Ok(SurfaceSnapshot::Ready(self.cpu_pixels.clone())),
        }
    }

    // =========================================================================
    // Parameter bundles
    // =========================================================================

    pub fn export_bundle(&self) -> ParameterBundle {
        ParameterBundle::from_parameters(&self.params, self.viewport.center(), self.zoom_level)
    }

    /// Apply a bundle: parameters, then zoom level and center.
    ///
    /// The vertical extent becomes the mode's default height divided by the
    /// zoom level. A non-positive zoom level resets to 1.0.
    pub fn import_bundle(&mut self, bundle: &ParameterBundle) {
        self.params = bundle.to_parameters();
        self.config = config_for_mode(bundle.mode);

        self.zoom_level = if bundle.zoom_level.is_finite() && bundle.zoom_level > 0.0 {
            bundle.zoom_level
        } else {
            log::warn!("import_bundle: zoom level {} reset to 1", bundle.zoom_level);
            1.0
        };

        let half = self.config.default_height() / self.zoom_level / 2.0;
        self.viewport.set_bounds(-half, half, 0.0);
        self.viewport.set_center_to(bundle.center.0, bundle.center.1);
        self.moved();
    }
}
