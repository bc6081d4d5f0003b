//! Throttled render loop as an explicit state machine.
//!
//! The host drives it: every animation frame calls [`RenderScheduler::on_tick`]
//! and acts on the returned [`TickAction`]; a `Defer` is answered with a
//! timer that calls [`RenderScheduler::on_deferred`] directly.

use crate::config::SchedulerConfig;
use crate::render_state::RenderState;

/// Delay before retrying a request whose surface was busy.
const RETRY_DELAY_MS: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SchedulerState {
    Idle,
    Looping,
    /// A draw is owed and will be issued by the deferred callback at `resume_at`.
    ThrottledWait { resume_at: f64 },
}

/// What the host should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickAction {
    /// Loop stopped; do not schedule another frame.
    Stop,
    /// Nothing to draw; schedule the next frame.
    Skip,
    /// Draw now, then schedule the next frame.
    Render,
    /// Arm a timer for `delay_ms` that calls `on_deferred`, then schedule the next frame.
    Defer { delay_ms: f64 },
}

pub struct RenderScheduler {
    config: SchedulerConfig,
    state: SchedulerState,
    last_draw_ms: Option<f64>,
    owed: bool,
    /// The owed draw must fire even if the surface is clean.
    forced: bool,
}

impl RenderScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: SchedulerState::Idle,
            last_draw_ms: None,
            owed: false,
            forced: false,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether a deferred draw is pending.
    pub fn is_owed(&self) -> bool {
        self.owed
    }

    /// Enter `Looping`. Returns `true` if the host must schedule the first frame.
    pub fn start_loop(&mut self) -> bool {
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Looping;
            log::debug!("Render loop started");
            return true;
        }
        false
    }

    /// Back to `Idle`. Takes effect on the next tick; an owed draw still fires.
    pub fn stop_loop(&mut self) {
        if self.state != SchedulerState::Idle {
            log::debug!("Render loop stopped");
        }
        self.state = SchedulerState::Idle;
    }

    pub fn on_tick(&mut self, now: f64, render: &mut RenderState) -> TickAction {
        match self.state {
            SchedulerState::Idle => TickAction::Stop,
            SchedulerState::ThrottledWait { .. } => TickAction::Skip,
            SchedulerState::Looping => {
                if !render.dirty || render.rendering {
                    return TickAction::Skip;
                }
                match self.throttle_delay(now) {
                    Some(delay_ms) => {
                        self.state = SchedulerState::ThrottledWait {
                            resume_at: now + delay_ms,
                        };
                        self.owe(render);
                        TickAction::Defer { delay_ms }
                    }
                    None => {
                        self.last_draw_ms = Some(now);
                        TickAction::Render
                    }
                }
            }
        }
    }

    /// Timer callback for a `Defer`. Returns `true` if the host should draw now.
    pub fn on_deferred(&mut self, now: f64, render: &mut RenderState) -> bool {
        if let SchedulerState::ThrottledWait { .. } = self.state {
            self.state = SchedulerState::Looping;
        }
        if !self.owed {
            return false;
        }
        self.owed = false;
        let forced = std::mem::take(&mut self.forced);
        if render.rendering {
            // Guard set: `queued` and `dirty` carry the draw past this render.
            render.queued = true;
            return false;
        }
        if !render.dirty && !render.queued && !forced {
            return false;
        }
        render.queued = false;
        self.last_draw_ms = Some(now);
        true
    }

    /// One-shot draw request for surfaces without a loop.
    ///
    /// Returns `Render`, `Defer` when throttled, or `Skip` while the guard is set.
    pub fn request_render(&mut self, now: f64, render: &mut RenderState) -> TickAction {
        if render.rendering {
            render.queued = true;
            return TickAction::Skip;
        }
        if self.owed {
            render.queued = true;
            return TickAction::Skip;
        }
        match self.throttle_delay(now) {
            Some(delay_ms) => {
                self.owe(render);
                TickAction::Defer { delay_ms }
            }
            None => {
                self.last_draw_ms = Some(now);
                TickAction::Render
            }
        }
    }

    /// One-shot request made while the surface's render state was out of
    /// reach. The draw is owed to the next deferred callback, which fires it
    /// even if nothing is dirty by then.
    pub fn request_while_busy(&mut self) -> TickAction {
        self.forced = true;
        if self.owed {
            return TickAction::Skip;
        }
        self.owed = true;
        TickAction::Defer {
            delay_ms: RETRY_DELAY_MS,
        }
    }

    fn owe(&mut self, render: &mut RenderState) {
        self.owed = true;
        render.queued = true;
    }

    fn throttle_delay(&self, now: f64) -> Option<f64> {
        let last = self.last_draw_ms?;
        let elapsed = now - last;
        (elapsed < self.config.min_frame_interval_ms)
            .then(|| self.config.min_frame_interval_ms - elapsed)
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
