use oddex_core::{Bounds, ClickSample, KeyPress, Status};

use crate::context::ExperimentCtx;

/// How close to a scheduled onset counts as "this frame" (PsychoPy
/// `frameTolerance`).
pub const FRAME_TOLERANCE: f64 = 0.001;

/// Start/stop window of a visual component within its routine.
#[derive(Clone, Debug)]
pub struct Onset {
    pub status: Status,
    start: f64,
    stop: Option<f64>,
}

impl Onset {
    pub fn new(start: f64, stop: Option<f64>) -> Self {
        Self {
            status: Status::NotStarted,
            start,
            stop,
        }
    }

    pub fn reset(&mut self) {
        self.status = Status::NotStarted;
    }

    /// Advance the status for time `t` and report whether the component
    /// should draw this frame.
    pub fn update(&mut self, t: f64) -> bool {
        if self.status == Status::NotStarted && t >= self.start - FRAME_TOLERANCE {
            self.status = Status::Started;
        }
        if self.status == Status::Started {
            if let Some(stop) = self.stop {
                if t >= stop - FRAME_TOLERANCE {
                    self.status = Status::Finished;
                }
            }
        }
        self.status.is_started()
    }
}

/// Keyboard component: armed at its onset, finishes the routine on the
/// first accepted key. Keys arriving on the arming frame are discarded,
/// as the original clears the key buffer on the arming flip.
#[derive(Clone, Debug)]
pub struct KeyboardComponent {
    pub status: Status,
    onset: f64,
    accept: &'static [&'static str],
    armed_at_global: f64,
    pub keys: Option<KeyPress>,
}

impl KeyboardComponent {
    pub fn new(onset: f64, accept: &'static [&'static str]) -> Self {
        Self {
            status: Status::NotStarted,
            onset,
            accept,
            armed_at_global: 0.0,
            keys: None,
        }
    }

    pub fn reset(&mut self) {
        self.status = Status::NotStarted;
        self.keys = None;
    }

    /// Returns true once a response has been collected.
    pub fn update(&mut self, ctx: &ExperimentCtx, t: f64) -> bool {
        if self.status == Status::NotStarted && t >= self.onset - FRAME_TOLERANCE {
            self.status = Status::Started;
            self.armed_at_global = ctx.global_clock.seconds();
            return false;
        }
        if self.status != Status::Started {
            return false;
        }
        for key in &ctx.input.keys {
            if self.accept.contains(&key.name.as_str()) {
                self.keys = Some(KeyPress {
                    name: key.name.clone(),
                    rt: (key.t_global - self.armed_at_global).max(0.0),
                });
                return true;
            }
        }
        false
    }
}

/// Mouse component: collects valid clicks (fresh button press inside one
/// of the clickable bounds). A button already held when the component
/// starts is not a new click.
#[derive(Clone, Debug, Default)]
pub struct MouseComponent {
    pub status: Status,
    onset: f64,
    started_at_global: f64,
    prev_buttons: [bool; 3],
    pub clicks: Vec<ClickSample>,
}

impl MouseComponent {
    pub fn new(onset: f64) -> Self {
        Self {
            onset,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        self.status = Status::NotStarted;
        self.clicks.clear();
    }

    /// Returns true if a valid click landed this frame.
    pub fn update(&mut self, ctx: &ExperimentCtx, t: f64, clickables: &[(&str, Bounds)]) -> bool {
        if self.status == Status::NotStarted && t >= self.onset - FRAME_TOLERANCE {
            self.status = Status::Started;
            self.started_at_global = ctx.global_clock.seconds();
            self.prev_buttons = ctx.input.buttons;
            return false;
        }
        if self.status != Status::Started {
            return false;
        }
        let buttons = ctx.input.buttons;
        if buttons == self.prev_buttons {
            return false;
        }
        self.prev_buttons = buttons;
        if !buttons.iter().any(|&b| b) {
            return false;
        }
        let pos = ctx.input.mouse_pos;
        let mut got_valid_click = false;
        for (name, bounds) in clickables {
            if bounds.contains(pos) {
                got_valid_click = true;
                self.clicks.push(ClickSample {
                    x: pos.0,
                    y: pos.1,
                    left: buttons[0],
                    middle: buttons[1],
                    right: buttons[2],
                    time: ctx.global_clock.seconds() - self.started_at_global,
                    clicked_name: name.to_string(),
                });
            }
        }
        got_valid_click
    }
}
