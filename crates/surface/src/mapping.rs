//! Reloop Mixage MIDI mapping.
//!
//! The Mixage is a 2-deck controller with jog wheels, a browse knob with
//! push function, per-deck transport/FX buttons, and rotary encoders for
//! loop length, beat move, dry/wet, FX amount and master pan. Shifted
//! buttons arrive as distinct control ids, so shift never needs tracking
//! here.
//!
//! Two hardware/firmware revisions shipped with different browse-press
//! semantics (immediate vs. double-press aware). Both are expressed as
//! [`MappingProfile`] data; the dispatch logic is shared.

use serde::{Deserialize, Serialize};

use crate::deck::DeckId;

/// What a browse-knob turn selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseTarget {
    /// Scroll the track list.
    Tracks,
    /// Scroll the playlist sidebar.
    Playlists,
}

/// Every logical control on the surface.
///
/// The classification tables are total over this enum; the session
/// dispatches with an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// The "disc" button: toggles scratch mode for the wheel.
    ScratchToggle(DeckId),
    /// The "loupe" button: toggles track-scroll mode for the wheel.
    ScrollToggle(DeckId),
    /// Wheel surface touched or released.
    WheelTouch(DeckId),
    /// Wheel rotation, relative around 64.
    WheelTurn(DeckId),
    /// Load the selected track into a deck.
    Load { deck: DeckId, and_play: bool },
    /// Browse knob pushed.
    BrowsePress { shifted: bool },
    /// Browse knob turned, relative around 64.
    BrowseTurn { target: BrowseTarget },
    /// FX ON: route the deck's channel through its effect unit.
    FxRouting(DeckId),
    /// FX SELECT: cycle the focused effect slot.
    FxSelect(DeckId),
    /// FX AMOUNT knob, absolute 0-127.
    FxAmount(DeckId),
    /// DRY/WET encoder turned, relative around 64.
    DryWetTurn(DeckId),
    /// DRY/WET encoder pushed.
    DryWetPress(DeckId),
    /// BEAT MOVE encoder turned, relative around 64.
    BeatMoveTurn(DeckId),
    /// BEAT MOVE encoder pushed (held: re-purposes the loop encoder).
    BeatMovePress(DeckId),
    /// Loop-length encoder turned, relative around 64.
    LoopLengthTurn(DeckId),
    /// PAN encoder turned, relative around 64.
    PanTurn,
}

/// Control id constants shared by both revisions.
pub mod ids {
    // Note numbers for buttons
    pub const NOTE_SCROLL_A: u8 = 0x03;
    pub const NOTE_SCRATCH_A: u8 = 0x04;
    pub const NOTE_FX_SEL_A: u8 = 0x07;
    pub const NOTE_FX_ON_A: u8 = 0x08;
    pub const NOTE_LOAD_A: u8 = 0x0D;
    pub const NOTE_SCROLL_B: u8 = 0x11;
    pub const NOTE_SCRATCH_B: u8 = 0x12;
    pub const NOTE_FX_SEL_B: u8 = 0x15;
    pub const NOTE_FX_ON_B: u8 = 0x16;
    pub const NOTE_LOAD_B: u8 = 0x1B;
    pub const NOTE_BROWSE: u8 = 0x1F;
    pub const NOTE_BEAT_MOVE_A: u8 = 0x20;
    pub const NOTE_DRY_WET_A: u8 = 0x21;
    pub const NOTE_BEAT_MOVE_B: u8 = 0x22;
    pub const NOTE_DRY_WET_B: u8 = 0x23;
    pub const NOTE_WHEEL_TOUCH_A: u8 = 0x24;
    pub const NOTE_WHEEL_TOUCH_B: u8 = 0x25;
    pub const NOTE_LOAD_PLAY_A: u8 = 0x4C;
    pub const NOTE_LOAD_PLAY_B: u8 = 0x5A;
    pub const NOTE_BROWSE_SHIFT: u8 = 0x5E;

    // Control Change numbers for encoders and knobs
    pub const CC_BROWSE: u8 = 0x1F;
    pub const CC_BEAT_MOVE_PUSHED_A: u8 = 0x20;
    pub const CC_DRY_WET_A: u8 = 0x21;
    pub const CC_BEAT_MOVE_PUSHED_B: u8 = 0x22;
    pub const CC_DRY_WET_B: u8 = 0x23;
    pub const CC_WHEEL_A: u8 = 0x24;
    pub const CC_WHEEL_B: u8 = 0x25;
    pub const CC_FX_AMOUNT_A: u8 = 0x26;
    pub const CC_FX_AMOUNT_B: u8 = 0x27;
    pub const CC_PAN: u8 = 0x28;
    pub const CC_BROWSE_SHIFT: u8 = 0x5E;
    pub const CC_BEAT_MOVE_A: u8 = 0x5F;
    pub const CC_BEAT_MOVE_B: u8 = 0x61;
}

/// Shipped mapping revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Revision {
    /// Original firmware table; the browse press resolves immediately.
    RevA,
    /// Later table; the browse press is double-press aware.
    RevB,
}

impl Default for Revision {
    fn default() -> Self {
        Self::RevB
    }
}

impl std::str::FromStr for Revision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "rev-a" | "reva" => Ok(Self::RevA),
            "b" | "rev-b" | "revb" => Ok(Self::RevB),
            other => Err(format!("unknown revision '{other}' (expected a or b)")),
        }
    }
}

/// Classification table for one hardware revision.
#[derive(Debug, Clone)]
pub struct MappingProfile {
    pub revision: Revision,
    /// Browse press distinguishes single from double press.
    pub browse_double_press: bool,
    notes: Vec<(u8, Control)>,
    ccs: Vec<(u8, Control)>,
}

impl MappingProfile {
    /// Rows common to both revisions.
    fn base_notes() -> Vec<(u8, Control)> {
        use ids::*;
        vec![
            (NOTE_SCRATCH_A, Control::ScratchToggle(DeckId::A)),
            (NOTE_SCRATCH_B, Control::ScratchToggle(DeckId::B)),
            (NOTE_SCROLL_A, Control::ScrollToggle(DeckId::A)),
            (NOTE_SCROLL_B, Control::ScrollToggle(DeckId::B)),
            (NOTE_WHEEL_TOUCH_A, Control::WheelTouch(DeckId::A)),
            (NOTE_WHEEL_TOUCH_B, Control::WheelTouch(DeckId::B)),
            (
                NOTE_LOAD_A,
                Control::Load {
                    deck: DeckId::A,
                    and_play: false,
                },
            ),
            (
                NOTE_LOAD_PLAY_A,
                Control::Load {
                    deck: DeckId::A,
                    and_play: true,
                },
            ),
            (
                NOTE_LOAD_B,
                Control::Load {
                    deck: DeckId::B,
                    and_play: false,
                },
            ),
            (
                NOTE_LOAD_PLAY_B,
                Control::Load {
                    deck: DeckId::B,
                    and_play: true,
                },
            ),
            (NOTE_BROWSE, Control::BrowsePress { shifted: false }),
            (NOTE_BROWSE_SHIFT, Control::BrowsePress { shifted: true }),
            (NOTE_FX_ON_A, Control::FxRouting(DeckId::A)),
            (NOTE_FX_ON_B, Control::FxRouting(DeckId::B)),
            (NOTE_FX_SEL_A, Control::FxSelect(DeckId::A)),
            (NOTE_FX_SEL_B, Control::FxSelect(DeckId::B)),
            (NOTE_BEAT_MOVE_A, Control::BeatMovePress(DeckId::A)),
            (NOTE_BEAT_MOVE_B, Control::BeatMovePress(DeckId::B)),
            (NOTE_DRY_WET_A, Control::DryWetPress(DeckId::A)),
            (NOTE_DRY_WET_B, Control::DryWetPress(DeckId::B)),
        ]
    }

    fn base_ccs() -> Vec<(u8, Control)> {
        use ids::*;
        vec![
            (
                CC_BROWSE,
                Control::BrowseTurn {
                    target: BrowseTarget::Tracks,
                },
            ),
            (
                CC_BROWSE_SHIFT,
                Control::BrowseTurn {
                    target: BrowseTarget::Playlists,
                },
            ),
            (CC_WHEEL_A, Control::WheelTurn(DeckId::A)),
            (CC_WHEEL_B, Control::WheelTurn(DeckId::B)),
            (CC_DRY_WET_A, Control::DryWetTurn(DeckId::A)),
            (CC_DRY_WET_B, Control::DryWetTurn(DeckId::B)),
            (CC_BEAT_MOVE_PUSHED_A, Control::LoopLengthTurn(DeckId::A)),
            (CC_BEAT_MOVE_PUSHED_B, Control::LoopLengthTurn(DeckId::B)),
            (CC_BEAT_MOVE_A, Control::BeatMoveTurn(DeckId::A)),
            (CC_BEAT_MOVE_B, Control::BeatMoveTurn(DeckId::B)),
            (CC_FX_AMOUNT_A, Control::FxAmount(DeckId::A)),
            (CC_FX_AMOUNT_B, Control::FxAmount(DeckId::B)),
            (CC_PAN, Control::PanTurn),
        ]
    }

    /// Original firmware table.
    pub fn rev_a() -> Self {
        Self {
            revision: Revision::RevA,
            browse_double_press: false,
            notes: Self::base_notes(),
            ccs: Self::base_ccs(),
        }
    }

    /// Later firmware table; same ids, but the browse press is
    /// double-press aware.
    pub fn rev_b() -> Self {
        Self {
            revision: Revision::RevB,
            browse_double_press: true,
            notes: Self::base_notes(),
            ccs: Self::base_ccs(),
        }
    }

    pub fn for_revision(revision: Revision) -> Self {
        match revision {
            Revision::RevA => Self::rev_a(),
            Revision::RevB => Self::rev_b(),
        }
    }

    /// Classify a note number. Unmapped ids return `None` and are dropped.
    pub fn note_control(&self, note: u8) -> Option<Control> {
        self.notes
            .iter()
            .find(|(n, _)| *n == note)
            .map(|(_, c)| *c)
    }

    /// Classify a CC number.
    pub fn cc_control(&self, cc: u8) -> Option<Control> {
        self.ccs.iter().find(|(n, _)| *n == cc).map(|(_, c)| *c)
    }

    /// Device name for MIDI port matching.
    pub fn device_name() -> &'static str {
        "Mixage"
    }
}
