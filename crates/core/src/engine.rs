//! Host mixing-engine boundary.
//!
//! The host application owns the control registry, the timer scheduler and
//! the event loop. Everything the mapping layer needs from it goes through
//! [`ControlEngine`]; implementations never surface errors here because a
//! failed host call is the host's problem, not the mapping's.

use std::time::Duration;

/// Handle for a control-change subscription.
///
/// Returned by [`ControlEngine::connect_control`]; disposing it via
/// [`ControlEngine::disconnect_control`] is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

/// Handle for a cooperative timer scheduled on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// The host engine's control surface.
///
/// Control values are addressed by `(group, name)` pairs such as
/// `("[Channel1]", "play_indicator")`. Timers fire as ordinary callbacks on
/// the same thread that delivers control events; there is no preemption.
pub trait ControlEngine {
    /// Read a control value.
    fn get_value(&self, group: &str, name: &str) -> f64;

    /// Write a control value.
    fn set_value(&mut self, group: &str, name: &str, value: f64);

    /// Read a normalized parameter.
    fn get_parameter(&self, group: &str, name: &str) -> f64;

    /// Write a normalized parameter.
    fn set_parameter(&mut self, group: &str, name: &str, value: f64);

    /// Subscribe to changes of a control. The host reports changes by
    /// invoking the session's control-change callback with the returned id.
    fn connect_control(&mut self, group: &str, name: &str) -> ConnectionId;

    /// Drop a subscription. Unknown or already-dropped ids are a no-op.
    fn disconnect_control(&mut self, id: ConnectionId);

    /// Enable or disable soft takeover for a control.
    fn soft_takeover(&mut self, group: &str, name: &str, enable: bool);

    /// Ignore the next physical value for a soft-takeover control, so a
    /// stale knob position does not jump the parameter.
    fn soft_takeover_ignore_next(&mut self, group: &str, name: &str);

    /// Put a deck into scratch mode.
    fn scratch_enable(
        &mut self,
        deck: u32,
        ticks_per_revolution: u32,
        rpm: f64,
        alpha: f64,
        beta: f64,
    );

    /// Take a deck out of scratch mode. No-op if not scratching.
    fn scratch_disable(&mut self, deck: u32);

    /// Feed wheel movement into an active scratch.
    fn scratch_tick(&mut self, deck: u32, ticks: i32);

    /// Whether the deck is currently in scratch mode.
    fn is_scratching(&self, deck: u32) -> bool;

    /// Schedule a timer. One-shot timers fire once and are discarded;
    /// periodic timers fire every `interval` until stopped.
    fn begin_timer(&mut self, interval: Duration, one_shot: bool) -> TimerId;

    /// Cancel a timer. Canceling an unknown or already-fired timer is a
    /// no-op.
    fn stop_timer(&mut self, id: TimerId);
}
