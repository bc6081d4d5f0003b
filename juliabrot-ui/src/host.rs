//! Browser host: animation-frame loop, deferred draws, canvas presentation,
//! and pointer wiring for one surface.

use crate::interaction::{Gesture, GestureQueue, InteractionController};
use crate::scheduler::{RenderScheduler, TickAction};
use crate::surface::{FractalSurface, SurfaceRole};
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use juliabrot_compute::{now_ms, PixelBuffer};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, MouseEvent, WheelEvent};

/// Yield to the browser event loop through a zero-delay timer.
///
/// A macrotask lets input events run between CPU slices without waiting
/// for the next animation frame.
pub fn yield_to_browser() -> TimeoutFuture {
    TimeoutFuture::new(0)
}

fn request_animation_frame(callback: &js_sys::Function) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window"))?
        .request_animation_frame(callback)
}

/// Get 2D rendering context from canvas.
pub fn get_2d_context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("No 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// Draw a full frame at the canvas origin, resizing the canvas to match.
pub fn draw_pixels_to_canvas(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
    pixels: &PixelBuffer,
) -> Result<(), JsValue> {
    if pixels.width == 0 || pixels.height == 0 {
        return Ok(());
    }
    if canvas.width() != pixels.width || canvas.height() != pixels.height {
        canvas.set_width(pixels.width);
        canvas.set_height(pixels.height);
    }
    let image_data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(pixels.data.as_slice()),
        pixels.width,
        pixels.height,
    )?;
    ctx.put_image_data(&image_data, 0.0, 0.0)
}

/// Everything the browser callbacks of one surface share.
pub struct SurfaceHost {
    pub surface: Rc<RefCell<FractalSurface>>,
    scheduler: RefCell<RenderScheduler>,
    controller: RefCell<InteractionController>,
    gestures: RefCell<GestureQueue>,
    canvas: HtmlCanvasElement,
}

impl SurfaceHost {
    pub fn new(surface: FractalSurface, canvas: HtmlCanvasElement) -> Rc<Self> {
        Rc::new(Self {
            surface: Rc::new(RefCell::new(surface)),
            scheduler: RefCell::new(RenderScheduler::default()),
            controller: RefCell::new(InteractionController::default()),
            gestures: RefCell::new(GestureQueue::default()),
            canvas,
        })
    }

    /// Start the continuous loop. A second call is a no-op.
    pub fn start_loop(self: &Rc<Self>) -> Result<(), JsValue> {
        if !self.scheduler.borrow_mut().start_loop() {
            return Ok(());
        }

        let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let next = frame.clone();
        let host = self.clone();

        *frame.borrow_mut() = Some(Closure::new(move || {
            host.flush_gestures();
            let action = match host.surface.try_borrow_mut() {
                Ok(mut surface) => host
                    .scheduler
                    .borrow_mut()
                    .on_tick(now_ms(), surface.state_mut()),
                // Surface busy; the dirty flag is still set next frame.
                Err(_) => TickAction::Skip,
            };

            match action {
                TickAction::Stop => {
                    let _ = next.borrow_mut().take();
                    return;
                }
                TickAction::Skip => {}
                TickAction::Render => host.spawn_render(),
                TickAction::Defer { delay_ms } => host.schedule_deferred(delay_ms),
            }

            if let Some(callback) = next.borrow().as_ref() {
                if let Err(e) = request_animation_frame(callback.as_ref().unchecked_ref()) {
                    log::error!("Failed to schedule frame: {e:?}");
                }
            }
        }));

        let first = frame.borrow();
        match first.as_ref() {
            Some(callback) => request_animation_frame(callback.as_ref().unchecked_ref()).map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn stop_loop(&self) {
        self.scheduler.borrow_mut().stop_loop();
    }

    /// One-shot draw, throttled like the loop.
    pub fn request_render(self: &Rc<Self>) {
        let action = match self.surface.try_borrow_mut() {
            Ok(mut surface) => self
                .scheduler
                .borrow_mut()
                .request_render(now_ms(), surface.state_mut()),
            Err(_) => self.scheduler.borrow_mut().request_while_busy(),
        };
        match action {
            TickAction::Render => self.spawn_render(),
            TickAction::Defer { delay_ms } => self.schedule_deferred(delay_ms),
            TickAction::Skip | TickAction::Stop => {}
        }
    }

    fn schedule_deferred(self: &Rc<Self>, delay_ms: f64) {
        let host = self.clone();
        Timeout::new(delay_ms.ceil() as u32, move || {
            let fire = match host.surface.try_borrow_mut() {
                Ok(mut surface) => host
                    .scheduler
                    .borrow_mut()
                    .on_deferred(now_ms(), surface.state_mut()),
                Err(_) => {
                    host.schedule_deferred(1.0);
                    return;
                }
            };
            if fire {
                host.spawn_render();
            }
        })
        .forget();
    }

    fn spawn_render(self: &Rc<Self>) {
        let host = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let slice_ms = host.scheduler.borrow().config().cpu_slice_ms;
            if !FractalSurface::render(&host.surface, slice_ms, yield_to_browser).await {
                return;
            }
            if let Err(e) = host.present().await {
                log::error!("Failed to present frame: {e:?}");
            }

            // Preview surfaces have no loop to pick up a request queued mid-render.
            let replay = {
                let surface = host.surface.borrow();
                surface.role() == SurfaceRole::Preview && surface.state().queued
            };
            if replay {
                host.request_render();
            }
        });
    }

    async fn present(&self) -> Result<(), JsValue> {
        let ctx = get_2d_context(&self.canvas)?;
        let pending = self
            .surface
            .borrow()
            .begin_snapshot()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let pixels = pending
            .resolve()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        draw_pixels_to_canvas(&self.canvas, &ctx, &pixels)
    }

    fn handle(self: &Rc<Self>, gesture: Gesture) {
        self.gestures.borrow_mut().push(gesture);
        self.flush_gestures();
    }

    /// Apply queued gestures if the surface is free; otherwise they wait
    /// for the next event or frame.
    fn flush_gestures(self: &Rc<Self>) {
        if self.gestures.borrow().is_empty() {
            return;
        }
        let outcome = {
            let Ok(mut surface) = self.surface.try_borrow_mut() else {
                return;
            };
            let mut controller = self.controller.borrow_mut();
            self.gestures.borrow_mut().drain(&mut controller, &mut surface)
        };
        if outcome.render_now {
            self.request_render();
        }
    }

    /// Install wheel, drag, and double-click listeners on the canvas.
    pub fn attach_interaction(self: &Rc<Self>) -> Result<(), JsValue> {
        let target: &web_sys::EventTarget = self.canvas.as_ref();

        let host = self.clone();
        let on_wheel = Closure::<dyn FnMut(WheelEvent)>::new(move |e: WheelEvent| {
            e.prevent_default();
            let (px, py) = (e.client_x() as f64, e.client_y() as f64);
            host.handle(Gesture::Wheel {
                px,
                py,
                delta_y: e.delta_y(),
            });
        });
        target.add_event_listener_with_callback("wheel", on_wheel.as_ref().unchecked_ref())?;
        on_wheel.forget();

        let host = self.clone();
        let on_down = Closure::<dyn FnMut(MouseEvent)>::new(move |e: MouseEvent| {
            let (px, py) = (e.client_x() as f64, e.client_y() as f64);
            host.handle(Gesture::PointerDown { px, py });
        });
        target.add_event_listener_with_callback("mousedown", on_down.as_ref().unchecked_ref())?;
        on_down.forget();

        let host = self.clone();
        let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |e: MouseEvent| {
            let (px, py) = (e.client_x() as f64, e.client_y() as f64);
            host.handle(Gesture::PointerMove { px, py });
        });
        target.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
        on_move.forget();

        let host = self.clone();
        let on_up = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
            host.handle(Gesture::PointerUp);
        });
        target.add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref())?;
        target.add_event_listener_with_callback("mouseleave", on_up.as_ref().unchecked_ref())?;
        on_up.forget();

        let host = self.clone();
        let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |e: MouseEvent| {
            let (px, py) = (e.client_x() as f64, e.client_y() as f64);
            let time_ms = e.time_stamp();
            host.handle(Gesture::Click { time_ms, px, py });
        });
        target.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();

        Ok(())
    }
}
