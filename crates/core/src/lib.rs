pub use engine::{ConnectionId, ControlEngine, TimerId};
pub use midi::{status, MidiMessage, MidiOut};
pub use sim::{EngineCall, SimEngine};

mod engine;
mod midi;
pub mod sim;
