//! Double-press detection.
//!
//! A press arms a one-shot timer and parks the event payload. A second
//! press before the timer fires cancels it and resolves as a double press;
//! the timer firing resolves as a single press. Timer callbacks that arrive
//! after resolution are ignored.

use std::time::Duration;

use mixage_core::{ControlEngine, TimerId};

/// Detector state for one button.
#[derive(Debug)]
pub struct DoublePress<T> {
    window: Duration,
    pending: Option<(TimerId, T)>,
}

impl<T> DoublePress<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a press. Returns the first press's payload when this press
    /// completes a double press; otherwise the detector is now pending and
    /// the caller waits for [`DoublePress::on_timer`].
    pub fn press<E: ControlEngine>(&mut self, engine: &mut E, payload: T) -> Option<T> {
        if let Some((timer, first)) = self.pending.take() {
            engine.stop_timer(timer);
            Some(first)
        } else {
            let timer = engine.begin_timer(self.window, true);
            self.pending = Some((timer, payload));
            None
        }
    }

    /// Feed a fired timer. Returns the parked payload when the timer was
    /// ours, resolving the press as a single press. Stray ids are a no-op.
    pub fn on_timer(&mut self, id: TimerId) -> Option<T> {
        match &self.pending {
            Some((timer, _)) if *timer == id => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }

    /// A press is waiting for resolution.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
