use serde::{Deserialize, Serialize};

/// Default logical bounds: the vertical extent is `[-2, 2]`, left edge at `-2`.
pub const DEFAULT_Y_MIN: f64 = -2.0;
pub const DEFAULT_Y_MAX: f64 = 2.0;
pub const DEFAULT_X_MIN: f64 = -2.0;

/// Bidirectional mapping between screen pixels and the complex plane.
///
/// The vertical extent is the independent variable: `x_max` is always
/// recomputed from `y_max - y_min` and the pixel aspect ratio, so the
/// image is never stretched. Pixel row 0 maps to `y_max`.
///
/// `screen_origin` is the screen-space position of the surface's top-left
/// pixel. `pixel_to_coord` / `coord_to_pixel` work in screen space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub screen_origin: (f64, f64),
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Viewport {
    /// Create a viewport with the default bounds.
    pub fn new(width: u32, height: u32, screen_origin: (f64, f64)) -> Self {
        let mut viewport = Self {
            width,
            height,
            screen_origin,
            x_min: DEFAULT_X_MIN,
            x_max: 0.0,
            y_min: DEFAULT_Y_MIN,
            y_max: DEFAULT_Y_MAX,
        };
        viewport.set_bounds(DEFAULT_Y_MIN, DEFAULT_Y_MAX, DEFAULT_X_MIN);
        viewport
    }

    /// Width over height. A zero height yields 1.0 rather than dividing by zero.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Logical (x, y) extent of the visible region.
    pub fn extent(&self) -> (f64, f64) {
        (self.x_max - self.x_min, self.y_max - self.y_min)
    }

    /// Set the vertical extent and left edge; `x_max` follows from the aspect ratio.
    pub fn set_bounds(&mut self, y_min: f64, y_max: f64, x_min: f64) {
        self.y_min = y_min;
        self.y_max = y_max;
        self.x_min = x_min;
        self.x_max = x_min + (y_max - y_min) * self.aspect_ratio();
    }

    /// Change pixel dimensions. The vertical extent and left edge stay put,
    /// so more or less of the plane becomes visible to the right.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.set_bounds(self.y_min, self.y_max, self.x_min);
    }

    /// Map a pixel on the surface (origin excluded) to a logical coordinate.
    pub fn surface_pixel_to_coord(&self, px: f64, py: f64) -> (f64, f64) {
        let (w, h) = self.pixel_dims();
        let x = self.x_min + px / w * (self.x_max - self.x_min);
        let y = self.y_max - py / h * (self.y_max - self.y_min);
        (x, y)
    }

    /// Map a screen pixel to a logical coordinate.
    pub fn pixel_to_coord(&self, px: f64, py: f64) -> (f64, f64) {
        self.surface_pixel_to_coord(px - self.screen_origin.0, py - self.screen_origin.1)
    }

    /// Map a logical coordinate to a screen pixel.
    pub fn coord_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let (w, h) = self.pixel_dims();
        let px = (x - self.x_min) / (self.x_max - self.x_min) * w;
        let py = (self.y_max - y) / (self.y_max - self.y_min) * h;
        (px + self.screen_origin.0, py + self.screen_origin.1)
    }

    /// Logical center of the visible region.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Recenter on `(x, y)` keeping the extent.
    ///
    /// A NaN offset on either axis is treated as zero so malformed input
    /// cannot poison the bounds.
    pub fn set_center_to(&mut self, x: f64, y: f64) {
        let (cx, cy) = self.center();
        let mut dx = x - cx;
        let mut dy = y - cy;
        if dx.is_nan() {
            log::warn!("set_center_to: ignoring NaN x offset");
            dx = 0.0;
        }
        if dy.is_nan() {
            log::warn!("set_center_to: ignoring NaN y offset");
            dy = 0.0;
        }
        self.translate(dx, dy);
    }

    /// Scale the bounds about `(cx, cy)` by `z`: `v' = v·z - z·c + c`.
    ///
    /// `z < 1` shrinks the visible extent (zooms in). The focal point keeps
    /// its pixel position.
    pub fn zoom_about(&mut self, cx: f64, cy: f64, z: f64) {
        let scale = |v: f64, c: f64| v * z - z * c + c;
        let y_min = scale(self.y_min, cy);
        let y_max = scale(self.y_max, cy);
        let x_min = scale(self.x_min, cx);
        self.set_bounds(y_min, y_max, x_min);
    }

    /// Shift the bounds so the logical point `start`, grabbed earlier, ends
    /// up under the pointer that now reads `current`.
    pub fn pan(&mut self, start: (f64, f64), current: (f64, f64)) {
        self.translate(start.0 - current.0, start.1 - current.1);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.x_min += dx;
        self.x_max += dx;
        self.y_min += dy;
        self.y_max += dy;
    }

    fn pixel_dims(&self) -> (f64, f64) {
        (self.width.max(1) as f64, self.height.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{a} != {b}");
    }

    // ============================================================================
    // Construction and bounds
    // ============================================================================

    #[test]
    fn default_bounds_follow_aspect_ratio() {
        let vp = Viewport::new(800, 600, (0.0, 0.0));

        assert_close(vp.y_min, -2.0);
        assert_close(vp.y_max, 2.0);
        assert_close(vp.x_min, -2.0);
        assert_close(vp.x_max, 800.0 / 600.0 * 4.0 - 2.0);
    }

    #[test]
    fn center_pixel_maps_to_expected_coordinate() {
        let vp = Viewport::new(800, 600, (0.0, 0.0));
        let (x, y) = vp.pixel_to_coord(400.0, 300.0);

        assert!((x - 0.6667).abs() < 1e-3);
        assert_close(y, 0.0);
    }

    #[test]
    fn row_zero_is_y_max() {
        let vp = Viewport::new(100, 50, (0.0, 0.0));
        let (_, top) = vp.pixel_to_coord(0.0, 0.0);
        let (_, bottom) = vp.pixel_to_coord(0.0, 50.0);

        assert_close(top, vp.y_max);
        assert_close(bottom, vp.y_min);
    }

    #[test]
    fn set_bounds_recomputes_x_max() {
        let mut vp = Viewport::new(300, 100, (0.0, 0.0));
        vp.set_bounds(-1.0, 1.0, 0.5);

        assert_close(vp.x_max, 0.5 + 2.0 * 3.0);
        let (w, h) = vp.extent();
        assert_close(w / h, vp.aspect_ratio());
    }

    #[test]
    fn resize_keeps_vertical_extent_and_left_edge() {
        let mut vp = Viewport::new(800, 600, (0.0, 0.0));
        vp.resize(400, 400);

        assert_close(vp.y_min, -2.0);
        assert_close(vp.y_max, 2.0);
        assert_close(vp.x_min, -2.0);
        assert_close(vp.x_max, 2.0);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let mut vp = Viewport::new(800, 600, (0.0, 0.0));
        vp.resize(800, 0);

        assert!(vp.x_max.is_finite());
        assert!(vp.pixel_to_coord(10.0, 10.0).0.is_finite());
    }

    // ============================================================================
    // Round trips
    // ============================================================================

    #[test]
    fn pixel_coord_round_trip_with_screen_origin() {
        let mut vp = Viewport::new(640, 480, (120.0, 35.0));
        vp.set_bounds(-0.3, 0.1, -1.2);

        for py in (0..480).step_by(37) {
            for px in (0..640).step_by(53) {
                let sx = px as f64 + 120.0;
                let sy = py as f64 + 35.0;
                let (x, y) = vp.pixel_to_coord(sx, sy);
                let (bx, by) = vp.coord_to_pixel(x, y);
                assert!((bx - sx).abs() < 1e-6, "x: {bx} vs {sx}");
                assert!((by - sy).abs() < 1e-6, "y: {by} vs {sy}");
            }
        }
    }

    // ============================================================================
    // Center, zoom, pan
    // ============================================================================

    #[test]
    fn set_center_to_preserves_extent() {
        let mut vp = Viewport::new(800, 600, (0.0, 0.0));
        let before = vp.extent();
        vp.set_center_to(-0.75, 0.1);

        let (cx, cy) = vp.center();
        assert_close(cx, -0.75);
        assert_close(cy, 0.1);
        assert_close(vp.extent().0, before.0);
        assert_close(vp.extent().1, before.1);
    }

    #[test]
    fn set_center_to_treats_nan_as_zero_offset() {
        let mut vp = Viewport::new(800, 600, (0.0, 0.0));
        let (cx, _) = vp.center();
        vp.set_center_to(f64::NAN, 1.0);

        assert_close(vp.center().0, cx);
        assert_close(vp.center().1, 1.0);
        assert!(vp.x_min.is_finite() && vp.x_max.is_finite());
    }

    #[test]
    fn zoom_about_origin_halves_extent() {
        let mut vp = Viewport::new(800, 600, (0.0, 0.0));
        vp.zoom_about(0.0, 0.0, 0.5);

        assert_close(vp.y_min, -1.0);
        assert_close(vp.y_max, 1.0);
        assert_close(vp.x_min, -1.0);
        assert_close(vp.x_max, -1.0 + 2.0 * 800.0 / 600.0);
    }

    #[test]
    fn zoom_about_point_keeps_focal_pixel() {
        let mut vp = Viewport::new(800, 600, (10.0, 20.0));
        let focal = (0.3, -0.4);
        let pixel_before = vp.coord_to_pixel(focal.0, focal.1);

        for z in [0.1, 0.5, 0.9, 1.7, 4.0] {
            vp.zoom_about(focal.0, focal.1, z);
            let (x, y) = vp.pixel_to_coord(pixel_before.0, pixel_before.1);
            assert!((x - focal.0).abs() < 1e-9, "z={z}: x {x}");
            assert!((y - focal.1).abs() < 1e-9, "z={z}: y {y}");
        }
    }

    #[test]
    fn pan_there_and_back_restores_bounds() {
        let mut vp = Viewport::new(800, 600, (0.0, 0.0));
        vp.zoom_about(-0.5, 0.2, 0.01);
        let original = vp.clone();

        let a = (100.0, 150.0);
        let b = (420.0, 380.0);

        let start = vp.pixel_to_coord(a.0, a.1);
        let current = vp.pixel_to_coord(b.0, b.1);
        vp.pan(start, current);

        let start = vp.pixel_to_coord(b.0, b.1);
        let current = vp.pixel_to_coord(a.0, a.1);
        vp.pan(start, current);

        assert!((vp.x_min - original.x_min).abs() < 1e-12);
        assert!((vp.x_max - original.x_max).abs() < 1e-12);
        assert!((vp.y_min - original.y_min).abs() < 1e-12);
        assert!((vp.y_max - original.y_max).abs() < 1e-12);
    }

    #[test]
    fn pan_moves_grabbed_point_under_cursor() {
        let mut vp = Viewport::new(400, 400, (0.0, 0.0));
        let start = vp.pixel_to_coord(100.0, 100.0);
        let current = vp.pixel_to_coord(250.0, 175.0);
        vp.pan(start, current);

        let (x, y) = vp.pixel_to_coord(250.0, 175.0);
        assert_close(x, start.0);
        assert_close(y, start.1);
    }

    // ============================================================================
    // Serialization
    // ============================================================================

    #[test]
    fn serialization_roundtrip_preserves_bounds() {
        let mut original = Viewport::new(1024, 768, (5.0, 6.0));
        original.zoom_about(-0.7, 0.3, 0.25);

        let json = serde_json::to_string(&original).unwrap();
        let restored: Viewport = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, original);
    }
}
