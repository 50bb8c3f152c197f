//! Button LED and VU meter feedback.
//!
//! The Mixage lights its buttons from note-on messages: velocity 0x7F is
//! on, 0 is off. The VU meter LEDs take a level 0-7 as velocity.

use mixage_core::{status, MidiOut};

use crate::deck::DeckId;

/// A lit element on the surface, addressed per deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Cue,
    CuePlay,
    Play,
    Load,
    Pfl,
    LoopEnabled,
    SyncEnabled,
    FxOn,
    FxSel,
    ScratchActive,
    ScrollActive,
    RateTempUp,
    RateTempDown,
}

impl Indicator {
    /// The note number driving this LED on the given deck.
    ///
    /// FX SEL lights the lamp behind the MASTER cap; the hardware has one
    /// LED for both.
    pub fn note(&self, deck: DeckId) -> u8 {
        match (self, deck) {
            (Self::RateTempDown, DeckId::A) => 0x01,
            (Self::RateTempUp, DeckId::A) => 0x02,
            (Self::ScrollActive, DeckId::A) => 0x03,
            (Self::ScratchActive, DeckId::A) => 0x04,
            (Self::LoopEnabled, DeckId::A) => 0x06,
            (Self::FxSel, DeckId::A) => 0x07,
            (Self::FxOn, DeckId::A) => 0x08,
            (Self::SyncEnabled, DeckId::A) => 0x09,
            (Self::Cue, DeckId::A) => 0x0A,
            (Self::CuePlay, DeckId::A) => 0x0B,
            (Self::Play, DeckId::A) => 0x0C,
            (Self::Load, DeckId::A) => 0x0D,
            (Self::Pfl, DeckId::A) => 0x0E,

            (Self::RateTempDown, DeckId::B) => 0x0F,
            (Self::RateTempUp, DeckId::B) => 0x10,
            (Self::ScrollActive, DeckId::B) => 0x11,
            (Self::ScratchActive, DeckId::B) => 0x12,
            (Self::LoopEnabled, DeckId::B) => 0x14,
            (Self::FxSel, DeckId::B) => 0x15,
            (Self::FxOn, DeckId::B) => 0x16,
            (Self::SyncEnabled, DeckId::B) => 0x17,
            (Self::Cue, DeckId::B) => 0x18,
            (Self::CuePlay, DeckId::B) => 0x19,
            (Self::Play, DeckId::B) => 0x1A,
            (Self::Load, DeckId::B) => 0x1B,
            (Self::Pfl, DeckId::B) => 0x1C,
        }
    }
}

/// Note numbers of the VU meter LEDs.
pub fn vu_meter_note(deck: DeckId) -> u8 {
    match deck {
        DeckId::A => 0x1D,
        DeckId::B => 0x1E,
    }
}

/// Switch one LED on or off.
pub fn set<M: MidiOut>(midi: &mut M, deck: DeckId, indicator: Indicator, on: bool) {
    midi.send_short(
        status::NOTE_ON,
        indicator.note(deck),
        if on { 0x7F } else { 0x00 },
    );
}

/// Drive a VU meter with a level 0-7.
pub fn vu_meter<M: MidiOut>(midi: &mut M, deck: DeckId, level: u8) {
    midi.send_short(status::NOTE_ON, vu_meter_note(deck), level.min(7));
}

/// Turn every LED off. Done at init and shutdown.
pub fn blank_all<M: MidiOut>(midi: &mut M) {
    for note in 0..=0x7F {
        midi.send_short(status::NOTE_ON, note, 0);
    }
}
