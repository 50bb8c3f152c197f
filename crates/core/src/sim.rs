//! Simulated host engine.
//!
//! An in-memory [`ControlEngine`] with a manually advanced clock. The test
//! suites drive sessions over it and assert on the journal of engine calls;
//! the monitor binary uses it as a stand-in host so a controller can be
//! exercised without a running DJ application.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;

use crate::engine::{ConnectionId, ControlEngine, TimerId};
use crate::midi::MidiOut;

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    SetValue {
        group: String,
        name: String,
        value: f64,
    },
    SetParameter {
        group: String,
        name: String,
        value: f64,
    },
    SoftTakeover {
        group: String,
        name: String,
        enable: bool,
    },
    SoftTakeoverIgnoreNext {
        group: String,
        name: String,
    },
    ScratchEnable {
        deck: u32,
    },
    ScratchDisable {
        deck: u32,
    },
    ScratchTick {
        deck: u32,
        ticks: i32,
    },
}

#[derive(Debug, Clone)]
struct SimTimer {
    id: TimerId,
    deadline: Duration,
    interval: Duration,
    one_shot: bool,
}

/// In-memory engine with a manual clock.
#[derive(Default)]
pub struct SimEngine {
    values: HashMap<(String, String), f64>,
    parameters: HashMap<(String, String), f64>,
    connections: Vec<(ConnectionId, String, String)>,
    timers: Vec<SimTimer>,
    scratching: Vec<u32>,
    now: Duration,
    next_id: u64,
    calls: Vec<EngineCall>,
    sent: Vec<[u8; 3]>,
}

impl SimEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Advance the clock, returning the timers that came due in firing
    /// order. One-shot timers are discarded; periodic timers re-arm. The
    /// caller is expected to feed the returned ids back into the session.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerId> {
        let target = self.now + dt;
        let mut fired = Vec::new();
        loop {
            let due = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.deadline <= target)
                .min_by_key(|(_, t)| t.deadline)
                .map(|(i, _)| i);
            let Some(i) = due else { break };
            self.now = self.timers[i].deadline;
            fired.push(self.timers[i].id);
            if self.timers[i].one_shot {
                self.timers.remove(i);
            } else {
                let interval = self.timers[i].interval;
                self.timers[i].deadline += interval;
            }
        }
        self.now = target;
        fired
    }

    /// Seed a control value without journaling it.
    pub fn seed_value(&mut self, group: &str, name: &str, value: f64) {
        self.values.insert((group.into(), name.into()), value);
    }

    /// Seed a parameter value without journaling it.
    pub fn seed_parameter(&mut self, group: &str, name: &str, value: f64) {
        self.parameters.insert((group.into(), name.into()), value);
    }

    /// The recorded engine calls so far.
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Take and clear the recorded calls.
    pub fn drain_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }

    /// Short MIDI messages sent to the device.
    pub fn sent(&self) -> &[[u8; 3]] {
        &self.sent
    }

    /// Take and clear the sent messages.
    pub fn drain_sent(&mut self) -> Vec<[u8; 3]> {
        std::mem::take(&mut self.sent)
    }

    /// Number of timers currently scheduled.
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Look up what a subscription points at.
    pub fn connection_target(&self, id: ConnectionId) -> Option<(&str, &str)> {
        self.connections
            .iter()
            .find(|(c, _, _)| *c == id)
            .map(|(_, g, n)| (g.as_str(), n.as_str()))
    }

    /// Number of live subscriptions.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl ControlEngine for SimEngine {
    fn get_value(&self, group: &str, name: &str) -> f64 {
        self.values
            .get(&(group.to_string(), name.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    fn set_value(&mut self, group: &str, name: &str, value: f64) {
        debug!("engine.setValue {group} {name} = {value}");
        self.values.insert((group.into(), name.into()), value);
        self.calls.push(EngineCall::SetValue {
            group: group.into(),
            name: name.into(),
            value,
        });
    }

    fn get_parameter(&self, group: &str, name: &str) -> f64 {
        self.parameters
            .get(&(group.to_string(), name.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    fn set_parameter(&mut self, group: &str, name: &str, value: f64) {
        debug!("engine.setParameter {group} {name} = {value}");
        self.parameters.insert((group.into(), name.into()), value);
        self.calls.push(EngineCall::SetParameter {
            group: group.into(),
            name: name.into(),
            value,
        });
    }

    fn connect_control(&mut self, group: &str, name: &str) -> ConnectionId {
        let id = ConnectionId(self.next_id());
        self.connections.push((id, group.into(), name.into()));
        id
    }

    fn disconnect_control(&mut self, id: ConnectionId) {
        self.connections.retain(|(c, _, _)| *c != id);
    }

    fn soft_takeover(&mut self, group: &str, name: &str, enable: bool) {
        self.calls.push(EngineCall::SoftTakeover {
            group: group.into(),
            name: name.into(),
            enable,
        });
    }

    fn soft_takeover_ignore_next(&mut self, group: &str, name: &str) {
        self.calls.push(EngineCall::SoftTakeoverIgnoreNext {
            group: group.into(),
            name: name.into(),
        });
    }

    fn scratch_enable(
        &mut self,
        deck: u32,
        _ticks_per_revolution: u32,
        _rpm: f64,
        _alpha: f64,
        _beta: f64,
    ) {
        if !self.scratching.contains(&deck) {
            self.scratching.push(deck);
        }
        self.calls.push(EngineCall::ScratchEnable { deck });
    }

    fn scratch_disable(&mut self, deck: u32) {
        self.scratching.retain(|d| *d != deck);
        self.calls.push(EngineCall::ScratchDisable { deck });
    }

    fn scratch_tick(&mut self, deck: u32, ticks: i32) {
        self.calls.push(EngineCall::ScratchTick { deck, ticks });
    }

    fn is_scratching(&self, deck: u32) -> bool {
        self.scratching.contains(&deck)
    }

    fn begin_timer(&mut self, interval: Duration, one_shot: bool) -> TimerId {
        let id = TimerId(self.next_id());
        self.timers.push(SimTimer {
            id,
            deadline: self.now + interval,
            interval,
            one_shot,
        });
        id
    }

    fn stop_timer(&mut self, id: TimerId) {
        // idempotent: stopping a fired or unknown timer does nothing
        self.timers.retain(|t| t.id != id);
    }
}

impl MidiOut for SimEngine {
    fn send_short(&mut self, status: u8, data1: u8, data2: u8) {
        self.sent.push([status, data1, data2]);
    }
}
