//! Pointer and wheel gestures translated into surface bound updates.
//!
//! All positions are screen pixels; the surface's viewport maps them to
//! logical coordinates, so a surface offset on the page is handled by its
//! `screen_origin`.

use crate::config::InteractionConfig;
use crate::surface::{FractalSurface, SurfaceRole};
use std::collections::VecDeque;

/// Result of handling one input event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionOutcome {
    /// Bounds changed; the surface is dirty.
    pub changed: bool,
    /// The host should draw immediately instead of waiting for the loop.
    pub render_now: bool,
}

impl InteractionOutcome {
    fn changed(role: SurfaceRole) -> Self {
        Self {
            changed: true,
            render_now: role == SurfaceRole::Preview,
        }
    }

    /// Combined outcome of two events handled back to back.
    pub fn merge(self, other: Self) -> Self {
        Self {
            changed: self.changed || other.changed,
            render_now: self.render_now || other.render_now,
        }
    }
}

/// One raw input event, in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Wheel { px: f64, py: f64, delta_y: f64 },
    PointerDown { px: f64, py: f64 },
    PointerMove { px: f64, py: f64 },
    PointerUp,
    Click { time_ms: f64, px: f64, py: f64 },
}

/// Gestures that arrived while their surface was borrowed elsewhere.
///
/// Applied in arrival order on the next drain, so a pointer down followed
/// by moves still pans.
#[derive(Debug, Default)]
pub struct GestureQueue {
    pending: VecDeque<Gesture>,
}

impl GestureQueue {
    pub fn push(&mut self, gesture: Gesture) {
        self.pending.push_back(gesture);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending gesture and return the merged outcome.
    pub fn drain(
        &mut self,
        controller: &mut InteractionController,
        surface: &mut FractalSurface,
    ) -> InteractionOutcome {
        let mut outcome = InteractionOutcome::default();
        while let Some(gesture) = self.pending.pop_front() {
            outcome = outcome.merge(controller.apply(surface, gesture));
        }
        outcome
    }
}

#[derive(Clone, Copy, Debug)]
struct Click {
    time_ms: f64,
    px: f64,
    py: f64,
}

pub struct InteractionController {
    config: InteractionConfig,
    /// Logical coordinate grabbed at pointer down; `Some` while panning.
    drag_start: Option<(f64, f64)>,
    last_click: Option<Click>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            drag_start: None,
            last_click: None,
        }
    }

    pub fn is_panning(&self) -> bool {
        self.drag_start.is_some()
    }

    pub fn apply(&mut self, surface: &mut FractalSurface, gesture: Gesture) -> InteractionOutcome {
        match gesture {
            Gesture::Wheel { px, py, delta_y } => self.on_wheel(surface, px, py, delta_y),
            Gesture::PointerDown { px, py } => {
                self.on_pointer_down(surface, px, py);
                InteractionOutcome::default()
            }
            Gesture::PointerMove { px, py } => self.on_pointer_move(surface, px, py),
            Gesture::PointerUp => {
                self.on_pointer_up();
                InteractionOutcome::default()
            }
            Gesture::Click { time_ms, px, py } => self.on_click(surface, time_ms, px, py),
        }
    }

    /// Zoom about the pointer. Negative `delta_y` zooms in.
    pub fn on_wheel(
        &mut self,
        surface: &mut FractalSurface,
        px: f64,
        py: f64,
        delta_y: f64,
    ) -> InteractionOutcome {
        if delta_y == 0.0 || delta_y.is_nan() {
            return InteractionOutcome::default();
        }

        let (x, y) = surface.viewport().pixel_to_coord(px, py);
        let step = self.config.wheel_zoom_step;
        let level = if delta_y < 0.0 {
            surface.zoom_level() * step
        } else {
            surface.zoom_level() / step
        };
        surface.set_zoom(x, y, level);

        InteractionOutcome::changed(surface.role())
    }

    pub fn on_pointer_down(&mut self, surface: &FractalSurface, px: f64, py: f64) {
        self.drag_start = Some(surface.viewport().pixel_to_coord(px, py));
    }

    /// While panning, shift the bounds so the grabbed point stays under the pointer.
    pub fn on_pointer_move(
        &mut self,
        surface: &mut FractalSurface,
        px: f64,
        py: f64,
    ) -> InteractionOutcome {
        let Some(start) = self.drag_start else {
            return InteractionOutcome::default();
        };
        let current = surface.viewport().pixel_to_coord(px, py);
        if current == start {
            return InteractionOutcome::default();
        }
        surface.pan(start, current);
        InteractionOutcome::changed(surface.role())
    }

    pub fn on_pointer_up(&mut self) {
        self.drag_start = None;
    }

    /// Recenter on the second of two nearby, quick clicks. Zoom is unchanged.
    pub fn on_click(
        &mut self,
        surface: &mut FractalSurface,
        time_ms: f64,
        px: f64,
        py: f64,
    ) -> InteractionOutcome {
        let click = Click { time_ms, px, py };

        let is_double = self.last_click.is_some_and(|prev| {
            let dt = click.time_ms - prev.time_ms;
            let distance = (click.px - prev.px).hypot(click.py - prev.py);
            (0.0..=self.config.double_click_ms).contains(&dt)
                && distance <= self.config.double_click_max_px
        });

        if !is_double {
            self.last_click = Some(click);
            return InteractionOutcome::default();
        }

        self.last_click = None;
        let (x, y) = surface.viewport().pixel_to_coord(px, py);
        surface.set_center_to(x, y);
        InteractionOutcome::changed(surface.role())
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juliabrot_core::default_config;

    fn surface(role: SurfaceRole) -> FractalSurface {
        FractalSurface::new(role, default_config(), 400, 300, None)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // =========================================================================
    // Wheel
    // =========================================================================

    #[test]
    fn wheel_up_zooms_in_about_pointer() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();
        let under_pointer = s.viewport().pixel_to_coord(100.0, 50.0);

        let outcome = ctl.on_wheel(&mut s, 100.0, 50.0, -120.0);

        assert!(outcome.changed);
        assert!(!outcome.render_now);
        assert!(approx(s.zoom_level(), 1.1));
        let after = s.viewport().pixel_to_coord(100.0, 50.0);
        assert!(approx(after.0, under_pointer.0));
        assert!(approx(after.1, under_pointer.1));
        assert!(s.viewport().extent().1 < 4.0);
    }

    #[test]
    fn wheel_down_zooms_out() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();
        ctl.on_wheel(&mut s, 200.0, 150.0, 3.0);
        assert!(approx(s.zoom_level(), 1.0 / 1.1));
        assert!(s.viewport().extent().1 > 4.0);
    }

    #[test]
    fn zero_wheel_delta_is_ignored() {
        let mut s = surface(SurfaceRole::Main);
        let before = s.viewport().clone();
        let mut ctl = InteractionController::default();
        assert_eq!(ctl.on_wheel(&mut s, 0.0, 0.0, 0.0), InteractionOutcome::default());
        assert_eq!(s.viewport(), &before);
    }

    #[test]
    fn preview_surface_renders_immediately() {
        let mut s = surface(SurfaceRole::Preview);
        let mut ctl = InteractionController::default();
        let outcome = ctl.on_wheel(&mut s, 10.0, 10.0, -1.0);
        assert!(outcome.render_now);
    }

    // =========================================================================
    // Drag
    // =========================================================================

    #[test]
    fn drag_keeps_grabbed_point_under_pointer() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();
        let grabbed = s.viewport().pixel_to_coord(50.0, 60.0);

        ctl.on_pointer_down(&s, 50.0, 60.0);
        assert!(ctl.is_panning());
        ctl.on_pointer_move(&mut s, 120.0, 90.0);
        let outcome = ctl.on_pointer_move(&mut s, 150.0, 100.0);

        assert!(outcome.changed);
        let now_under = s.viewport().pixel_to_coord(150.0, 100.0);
        assert!(approx(now_under.0, grabbed.0));
        assert!(approx(now_under.1, grabbed.1));
        assert!(approx(s.zoom_level(), 1.0));
    }

    #[test]
    fn pan_there_and_back_restores_bounds() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();
        let original = s.viewport().clone();

        ctl.on_pointer_down(&s, 30.0, 40.0);
        ctl.on_pointer_move(&mut s, 210.0, 170.0);
        ctl.on_pointer_up();
        ctl.on_pointer_down(&s, 210.0, 170.0);
        ctl.on_pointer_move(&mut s, 30.0, 40.0);
        ctl.on_pointer_up();

        let vp = s.viewport();
        assert!(approx(vp.x_min, original.x_min));
        assert!(approx(vp.x_max, original.x_max));
        assert!(approx(vp.y_min, original.y_min));
        assert!(approx(vp.y_max, original.y_max));
    }

    #[test]
    fn move_without_drag_does_nothing() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();
        let before = s.viewport().clone();

        assert!(!ctl.on_pointer_move(&mut s, 10.0, 10.0).changed);
        ctl.on_pointer_down(&s, 0.0, 0.0);
        ctl.on_pointer_up();
        assert!(!ctl.on_pointer_move(&mut s, 50.0, 50.0).changed);
        assert_eq!(s.viewport(), &before);
    }

    // =========================================================================
    // Double-click
    // =========================================================================

    #[test]
    fn double_click_recenters_without_zoom() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();
        let target = s.viewport().pixel_to_coord(301.0, 75.5);

        assert!(!ctl.on_click(&mut s, 1000.0, 300.0, 75.0).changed);
        let outcome = ctl.on_click(&mut s, 1200.0, 301.0, 75.5);

        assert!(outcome.changed);
        let (cx, cy) = s.get_current_center();
        assert!(approx(cx, target.0));
        assert!(approx(cy, target.1));
        assert!(approx(s.zoom_level(), 1.0));
        assert!(approx(s.viewport().extent().1, 4.0));
    }

    #[test]
    fn slow_clicks_are_not_a_double_click() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();
        let before = s.viewport().clone();

        ctl.on_click(&mut s, 0.0, 100.0, 100.0);
        assert!(!ctl.on_click(&mut s, 700.0, 100.0, 100.0).changed);
        assert_eq!(s.viewport(), &before);
    }

    #[test]
    fn distant_clicks_are_not_a_double_click() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();

        ctl.on_click(&mut s, 0.0, 100.0, 100.0);
        assert!(!ctl.on_click(&mut s, 100.0, 110.0, 100.0).changed);
    }

    #[test]
    fn triple_click_recenters_once() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();

        ctl.on_click(&mut s, 0.0, 100.0, 100.0);
        assert!(ctl.on_click(&mut s, 100.0, 100.0, 100.0).changed);
        assert!(!ctl.on_click(&mut s, 200.0, 100.0, 100.0).changed);
    }

    // =========================================================================
    // Queued gestures
    // =========================================================================

    #[test]
    fn queued_drag_and_wheel_match_direct_handling() {
        let gestures = [
            Gesture::PointerDown { px: 40.0, py: 30.0 },
            Gesture::PointerMove { px: 90.0, py: 60.0 },
            Gesture::PointerMove { px: 140.0, py: 80.0 },
            Gesture::PointerUp,
            Gesture::Wheel { px: 200.0, py: 100.0, delta_y: -1.0 },
            Gesture::PointerMove { px: 10.0, py: 10.0 },
        ];

        let mut direct = surface(SurfaceRole::Main);
        let mut direct_ctl = InteractionController::default();
        for gesture in gestures {
            direct_ctl.apply(&mut direct, gesture);
        }

        let mut queued = surface(SurfaceRole::Main);
        let mut queued_ctl = InteractionController::default();
        let mut queue = GestureQueue::default();
        for gesture in gestures {
            queue.push(gesture);
        }
        assert_eq!(queue.len(), gestures.len());
        let outcome = queue.drain(&mut queued_ctl, &mut queued);

        assert!(queue.is_empty());
        assert!(outcome.changed);
        assert!(!outcome.render_now);
        assert_eq!(queued.viewport(), direct.viewport());
        assert_eq!(queued.zoom_level(), direct.zoom_level());
        assert!(!queued_ctl.is_panning());
    }

    #[test]
    fn pointer_down_queued_behind_busy_surface_still_pans() {
        let mut s = surface(SurfaceRole::Preview);
        let mut ctl = InteractionController::default();
        let mut queue = GestureQueue::default();
        let before = s.viewport().clone();

        queue.push(Gesture::PointerDown { px: 10.0, py: 10.0 });
        queue.push(Gesture::PointerMove { px: 60.0, py: 10.0 });
        let outcome = queue.drain(&mut ctl, &mut s);

        assert!(outcome.render_now);
        assert!(ctl.is_panning());
        assert!(s.viewport().x_min < before.x_min);
    }

    #[test]
    fn draining_an_empty_queue_changes_nothing() {
        let mut s = surface(SurfaceRole::Main);
        let mut ctl = InteractionController::default();
        let outcome = GestureQueue::default().drain(&mut ctl, &mut s);
        assert_eq!(outcome, InteractionOutcome::default());
    }
}
