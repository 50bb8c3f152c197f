//! Library panel auto-hide.
//!
//! Browsing maximizes the host's library panel; a periodic countdown
//! collapses it again once the surface goes quiet. Loading a track cuts
//! the remaining time short so the panel gets out of the way quickly.

use std::time::Duration;

use mixage_core::{ControlEngine, TimerId};

use crate::groups;

/// Number of countdown ticks per full timeout.
const TICKS: u32 = 5;

/// Countdown keeping the library panel visible for a bounded window.
#[derive(Debug)]
pub struct LibraryVisibility {
    timeout: Duration,
    step: Duration,
    remaining: Duration,
    timer: Option<TimerId>,
}

impl LibraryVisibility {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            step: timeout / TICKS,
            remaining: Duration::ZERO,
            timer: None,
        }
    }

    /// Maximize the library and (re)start the countdown. Calling this
    /// while already visible only resets the remaining time.
    pub fn show<E: ControlEngine>(&mut self, engine: &mut E) {
        self.remaining = self.timeout;
        if engine.get_value(groups::MASTER, "maximize_library") == 0.0 {
            engine.set_value(groups::MASTER, "maximize_library", 1.0);
        }
        if self.timer.is_none() {
            self.timer = Some(engine.begin_timer(self.step, false));
        }
    }

    /// Stop the countdown and minimize immediately, whatever the
    /// remaining time.
    pub fn hide<E: ControlEngine>(&mut self, engine: &mut E) {
        if let Some(timer) = self.timer.take() {
            engine.stop_timer(timer);
        }
        self.remaining = Duration::ZERO;
        engine.set_value(groups::MASTER, "maximize_library", 0.0);
    }

    /// Cut the remaining time down to `remaining` (used after loading a
    /// track). Has no effect unless the countdown is running.
    pub fn reduce_to(&mut self, remaining: Duration) {
        if self.timer.is_some() {
            self.remaining = remaining.min(self.remaining);
        }
    }

    /// Feed a fired timer. Returns true when the id was ours. At zero the
    /// countdown stops itself and minimizes the library.
    pub fn on_timer<E: ControlEngine>(&mut self, id: TimerId, engine: &mut E) -> bool {
        if self.timer != Some(id) {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(self.step);
        if self.remaining.is_zero() {
            self.hide(engine);
        }
        true
    }

    /// The countdown is running.
    pub fn is_counting(&self) -> bool {
        self.timer.is_some()
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}
