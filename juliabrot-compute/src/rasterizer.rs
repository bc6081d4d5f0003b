use crate::{now_ms, PixelBuffer, RenderProgress};
use juliabrot_core::{to_rgba8, EscapeTimeEvaluator, FractalParameters, Viewport};
use std::future::Future;

/// Sequential CPU rasterizer over a viewport/parameter snapshot.
///
/// The snapshot is captured at construction; later edits to the surface
/// that created it do not affect this render. Rows are produced one at a
/// time so a host event loop can interleave between them.
///
/// Pixel `(px, py)` samples the logical coordinate of its top-left corner,
/// matching the fragment shader.
pub struct CpuRasterizer {
    evaluator: EscapeTimeEvaluator,
    viewport: Viewport,
    buffer: PixelBuffer,
    next_row: u32,
    progress: RenderProgress,
    start_ms: f64,
}

impl CpuRasterizer {
    pub fn new(viewport: &Viewport, params: &FractalParameters) -> Self {
        Self {
            evaluator: EscapeTimeEvaluator::new(params.clone()),
            viewport: viewport.clone(),
            buffer: PixelBuffer::new(viewport.width, viewport.height),
            next_row: 0,
            progress: RenderProgress::new(viewport.height),
            start_ms: now_ms(),
        }
    }

    pub fn progress(&self) -> RenderProgress {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.next_row >= self.viewport.height
    }

    /// Render the next row. Returns `false` once every row is done.
    pub fn render_row(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }

        let row = self.next_row;
        let width = self.viewport.width;
        let evaluator = &self.evaluator;
        let viewport = &self.viewport;
        let out = self.buffer.row_mut(row);

        for px in 0..width {
            let (x, y) = viewport.surface_pixel_to_coord(px as f64, row as f64);
            let rgba = to_rgba8(evaluator.shade(x, y));
            let i = px as usize * 4;
            out[i..i + 4].copy_from_slice(&rgba);
        }

        self.next_row += 1;
        self.progress.completed_rows = self.next_row;
        self.progress.elapsed_ms = now_ms() - self.start_ms;
        self.progress.is_complete = self.is_complete();

        !self.progress.is_complete
    }

    /// Render every remaining row without yielding.
    pub fn render_all(mut self) -> PixelBuffer {
        while self.render_row() {}
        self.finish()
    }

    /// Render in time slices, awaiting `yield_now` between them.
    ///
    /// Rows are batched until `slice_ms` has elapsed since the last yield;
    /// a non-positive slice yields after every row. Progress is reported at
    /// each yield and once more on completion.
    pub async fn render_yielding<Y, F, P>(
        mut self,
        slice_ms: f64,
        mut yield_now: Y,
        mut on_progress: P,
    ) -> PixelBuffer
    where
        Y: FnMut() -> F,
        F: Future<Output = ()>,
        P: FnMut(&RenderProgress),
    {
        let mut slice_start = now_ms();
        while self.render_row() {
            if slice_ms > 0.0 && now_ms() - slice_start < slice_ms {
                continue;
            }
            on_progress(&self.progress);
            yield_now().await;
            slice_start = now_ms();
        }
        on_progress(&self.progress);
        self.finish()
    }

    fn finish(self) -> PixelBuffer {
        log::debug!(
            "CPU render {}x{} finished in {:.1} ms",
            self.viewport.width,
            self.viewport.height,
            self.progress.elapsed_ms
        );
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(width: u32, height: u32) -> (Viewport, FractalParameters) {
        (Viewport::new(width, height, (0.0, 0.0)), FractalParameters::default())
    }

    #[test]
    fn render_produces_correct_size() {
        let (vp, params) = snapshot(40, 30);
        let buffer = CpuRasterizer::new(&vp, &params).render_all();
        assert_eq!(buffer.width, 40);
        assert_eq!(buffer.height, 30);
        assert_eq!(buffer.data.len(), 40 * 30 * 4);
    }

    #[test]
    fn rows_advance_progress() {
        let (vp, params) = snapshot(8, 4);
        let mut raster = CpuRasterizer::new(&vp, &params);

        assert!(raster.render_row());
        assert_eq!(raster.progress().completed_rows, 1);
        assert!(raster.render_row());
        assert!(raster.render_row());
        assert!(!raster.render_row());
        assert!(raster.progress().is_complete);
        assert!(!raster.render_row());
    }

    #[test]
    fn pixels_match_evaluator() {
        let (vp, params) = snapshot(32, 24);
        let buffer = CpuRasterizer::new(&vp, &params).render_all();
        let evaluator = EscapeTimeEvaluator::new(params);

        for &(px, py) in &[(0, 0), (16, 12), (31, 23), (5, 19)] {
            let (x, y) = vp.surface_pixel_to_coord(px as f64, py as f64);
            let expected = to_rgba8(evaluator.shade(x, y));
            assert_eq!(buffer.pixel(px, py), Some(expected));
        }
    }

    #[test]
    fn snapshot_is_isolated_from_later_edits() {
        let (mut vp, mut params) = snapshot(16, 16);
        let raster = CpuRasterizer::new(&vp, &params);
        let expected = CpuRasterizer::new(&vp, &params).render_all();

        vp.zoom_about(0.0, 0.0, 0.1);
        params.iteration_cap = 3;

        assert_eq!(raster.render_all(), expected);
    }

    #[test]
    fn empty_surface_renders_nothing() {
        let (vp, params) = snapshot(10, 0);
        let mut raster = CpuRasterizer::new(&vp, &params);
        assert!(raster.is_complete());
        assert!(!raster.render_row());
        assert!(raster.render_all().data.is_empty());
    }
}
