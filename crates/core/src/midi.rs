//! MIDI message types shared between the mapping layer and the transport.

/// MIDI status bytes the Mixage uses.
pub mod status {
    pub const NOTE_ON: u8 = 0x90;
    pub const NOTE_OFF: u8 = 0x80;
    pub const CONTROL_CHANGE: u8 = 0xB0;
}

/// MIDI message types we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// (note, velocity). Velocity 0 is reported as a release by the caller.
    NoteOn(u8, u8),
    /// note
    NoteOff(u8),
    /// (controller number, value)
    ControlChange(u8, u8),
}

impl MidiMessage {
    /// Decode raw bytes from the transport.
    ///
    /// Returns `None` for anything malformed or uninteresting; the mapping
    /// layer drops such events silently.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        match bytes[0] & 0xF0 {
            status::NOTE_ON if bytes.len() >= 3 => Some(Self::NoteOn(bytes[1], bytes[2])),
            status::NOTE_OFF if bytes.len() >= 2 => Some(Self::NoteOff(bytes[1])),
            status::CONTROL_CHANGE if bytes.len() >= 3 => {
                Some(Self::ControlChange(bytes[1], bytes[2]))
            }
            _ => None,
        }
    }

    /// The status byte this message would carry on channel 1.
    pub fn status(&self) -> u8 {
        match self {
            Self::NoteOn(..) => status::NOTE_ON,
            Self::NoteOff(..) => status::NOTE_OFF,
            Self::ControlChange(..) => status::CONTROL_CHANGE,
        }
    }
}

/// Output side of the controller: LED and meter feedback.
pub trait MidiOut {
    /// Send a three-byte short message to the device.
    fn send_short(&mut self, status: u8, data1: u8, data2: u8);
}
