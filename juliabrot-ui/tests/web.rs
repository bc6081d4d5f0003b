//! Browser tests for the CPU render path. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use juliabrot_core::default_config;
use juliabrot_ui::host::yield_to_browser;
use juliabrot_ui::{Backend, FractalSurface, RenderScheduler, SurfaceRole, TickAction};
use std::cell::RefCell;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn cpu_render_yields_to_browser_and_completes() {
    let surface = RefCell::new(FractalSurface::new(
        SurfaceRole::Main,
        default_config(),
        32,
        16,
        None,
    ));
    assert_eq!(surface.borrow().backend(), Backend::Cpu);

    let drawn = FractalSurface::render(&surface, 0.0, yield_to_browser).await;

    assert!(drawn);
    let s = surface.borrow();
    assert!(s.progress().is_complete);
    assert!(!s.state().dirty);
    assert_eq!(s.cpu_pixels().data.len(), 32 * 16 * 4);
}

#[wasm_bindgen_test]
fn loop_tick_renders_dirty_surface() {
    let mut surface = FractalSurface::new(SurfaceRole::Main, default_config(), 8, 8, None);
    let mut scheduler = RenderScheduler::default();
    scheduler.start_loop();

    let action = scheduler.on_tick(0.0, surface.state_mut());
    assert_eq!(action, TickAction::Render);
    assert!(surface.render_now());
}
