//! Deck identity and per-deck controller state.

use serde::{Deserialize, Serialize};

/// Deck identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckId {
    A,
    B,
}

impl DeckId {
    /// Get the deck as a numeric index (0 for A, 1 for B).
    pub fn index(&self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// Engine deck number (1 for A, 2 for B), as used by the scratch calls.
    pub fn number(&self) -> u32 {
        self.index() as u32 + 1
    }

    /// Get the deck from a numeric index.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }

    /// Get the other deck.
    pub fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// The engine channel group for this deck.
    pub fn group(&self) -> &'static str {
        match self {
            Self::A => "[Channel1]",
            Self::B => "[Channel2]",
        }
    }

    /// The effect unit group routed to this deck.
    pub fn unit_group(&self) -> &'static str {
        match self {
            Self::A => "[EffectRack1_EffectUnit1]",
            Self::B => "[EffectRack1_EffectUnit2]",
        }
    }

    /// The group of one effect slot in this deck's unit (slots are 1-based).
    pub fn effect_group(&self, slot: u32) -> String {
        format!(
            "[EffectRack1_EffectUnit{}_Effect{}]",
            self.number(),
            slot
        )
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// One of the two mutually exclusive jog wheel modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelMode {
    Scratch,
    Scroll,
}

/// Mapping-side state for one deck.
///
/// This is the whole of the state the surface keeps per deck; everything
/// else (playback, loops, effects parameters) lives in the host engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeckControlState {
    /// Wheel touch/turn scratches instead of pitch-bending.
    pub scratch_active: bool,
    /// Wheel turn scrolls through the track.
    pub scroll_active: bool,
    /// Index of the focused effect slot, 0 = the unit itself.
    pub focused_effect: u32,
    /// The deck's channel is routed through its effect unit.
    pub fx_routed: bool,
    /// Beat-move encoder is held down (re-purposes the loop encoder).
    pub beat_move_held: bool,
}

impl DeckControlState {
    /// Flip the given wheel mode, forcing the other one off when the flip
    /// enables it. Returns `(scratch_changed, scroll_changed)` so the
    /// caller can refresh the indicator LEDs.
    pub fn toggle_wheel_mode(&mut self, mode: WheelMode) -> (bool, bool) {
        let before = (self.scratch_active, self.scroll_active);
        match mode {
            WheelMode::Scratch => {
                self.scratch_active = !self.scratch_active;
                if self.scratch_active {
                    self.scroll_active = false;
                }
            }
            WheelMode::Scroll => {
                self.scroll_active = !self.scroll_active;
                if self.scroll_active {
                    self.scratch_active = false;
                }
            }
        }
        (
            before.0 != self.scratch_active,
            before.1 != self.scroll_active,
        )
    }
}
