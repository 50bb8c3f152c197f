//! Controller session.
//!
//! One [`MixageSession`] per connected surface. It owns the host engine
//! handle, the MIDI output, and every piece of mapping state, so nothing
//! lives in module globals and several sessions can coexist (or run side
//! by side in tests). The host drives it through three entry points:
//! [`handle_midi`](MixageSession::handle_midi) for control events,
//! [`on_timer`](MixageSession::on_timer) for fired timers, and
//! [`on_control_change`](MixageSession::on_control_change) for engine-side
//! control updates.

use log::debug;
use mixage_core::{ConnectionId, ControlEngine, MidiMessage, MidiOut, TimerId};

use crate::config::SurfaceConfig;
use crate::deck::{DeckControlState, DeckId, WheelMode};
use crate::groups;
use crate::led::{self, Indicator};
use crate::library::LibraryVisibility;
use crate::mapping::{BrowseTarget, Control, MappingProfile};
use crate::press::DoublePress;

/// Button-down velocity. Anything else on a note is a release.
const DOWN: u8 = 0x7F;

// Scratch filter parameters, measured against the stock platter.
const SCRATCH_RPM: f64 = 33.33;
const SCRATCH_ALPHA: f64 = 1.0 / 8.0;
const SCRATCH_BETA: f64 = SCRATCH_ALPHA / 32.0;

/// Base play-position step per wheel tick when scrolling.
const SCROLL_STEP: f64 = 0.00005;

/// Engine controls mirrored onto the surface LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeckFeedback {
    CueIndicator,
    CuePlay,
    PlayIndicator,
    Pfl,
    LoopEnabled,
    BeatActive,
    RateTempUp,
    RateTempDown,
    VuMeter,
}

impl DeckFeedback {
    const ALL: [Self; 9] = [
        Self::CueIndicator,
        Self::CuePlay,
        Self::PlayIndicator,
        Self::Pfl,
        Self::LoopEnabled,
        Self::BeatActive,
        Self::RateTempUp,
        Self::RateTempDown,
        Self::VuMeter,
    ];

    fn control_name(&self) -> &'static str {
        match self {
            Self::CueIndicator => "cue_indicator",
            Self::CuePlay => "cue_default",
            Self::PlayIndicator => "play_indicator",
            Self::Pfl => "pfl",
            Self::LoopEnabled => "loop_enabled",
            Self::BeatActive => "beat_active",
            Self::RateTempUp => "rate_temp_up",
            Self::RateTempDown => "rate_temp_down",
            Self::VuMeter => "VuMeter",
        }
    }
}

/// A live mapping session for one Mixage.
pub struct MixageSession<E: ControlEngine, M: MidiOut> {
    engine: E,
    midi: M,
    config: SurfaceConfig,
    profile: MappingProfile,
    decks: [DeckControlState; 2],
    browse_press: DoublePress<()>,
    library: LibraryVisibility,
    connections: Vec<(ConnectionId, DeckId, DeckFeedback)>,
}

impl<E: ControlEngine, M: MidiOut> MixageSession<E, M> {
    pub fn new(config: SurfaceConfig, engine: E, midi: M) -> Self {
        let profile = MappingProfile::for_revision(config.revision);
        let browse_press = DoublePress::new(config.double_press_window());
        let library = LibraryVisibility::new(config.library_hide_timeout());
        Self {
            engine,
            midi,
            config,
            profile,
            decks: [DeckControlState::default(); 2],
            browse_press,
            library,
            connections: Vec::new(),
        }
    }

    /// Blank the LEDs, subscribe to engine feedback, arm soft takeover,
    /// and restore FX routing state from the engine.
    pub fn init(&mut self) {
        led::blank_all(&mut self.midi);

        for deck in [DeckId::A, DeckId::B] {
            for feedback in DeckFeedback::ALL {
                let id = self
                    .engine
                    .connect_control(deck.group(), feedback.control_name());
                self.connections.push((id, deck, feedback));
            }
        }

        for deck in [DeckId::A, DeckId::B] {
            self.engine.soft_takeover(deck.unit_group(), "super1", true);
            let slots = self.engine.get_value(deck.unit_group(), "num_effects") as u32;
            for slot in 1..=slots {
                self.engine
                    .soft_takeover(&deck.effect_group(slot), "meta", true);
            }
        }

        for deck in [DeckId::A, DeckId::B] {
            let enable = format!("group_{}_enable", deck.group());
            let routed = self.engine.get_value(deck.unit_group(), &enable) != 0.0;
            self.decks[deck.index()].fx_routed = routed;
            led::set(&mut self.midi, deck, Indicator::FxOn, routed);
        }
    }

    /// Drop all engine subscriptions and blank the LEDs.
    pub fn shutdown(&mut self) {
        for (id, _, _) in self.connections.drain(..) {
            self.engine.disconnect_control(id);
        }
        led::blank_all(&mut self.midi);
    }

    /// Route one incoming MIDI message. Unmapped ids are dropped.
    pub fn handle_midi(&mut self, msg: MidiMessage) {
        match msg {
            MidiMessage::NoteOn(note, DOWN) => {
                if let Some(control) = self.profile.note_control(note) {
                    self.on_press(control);
                }
            }
            MidiMessage::NoteOn(note, _) | MidiMessage::NoteOff(note) => {
                if let Some(control) = self.profile.note_control(note) {
                    self.on_release(control);
                }
            }
            MidiMessage::ControlChange(cc, value) => {
                if let Some(control) = self.profile.cc_control(cc) {
                    self.on_turn(control, value);
                }
            }
        }
    }

    /// Feed a fired host timer. Stray ids (already-canceled timers) are
    /// ignored.
    pub fn on_timer(&mut self, id: TimerId) {
        if self.browse_press.on_timer(id).is_some() {
            // single press resolved
            self.preview_toggle();
            return;
        }
        self.library.on_timer(id, &mut self.engine);
    }

    /// Feed an engine-side control change for one of our subscriptions.
    pub fn on_control_change(&mut self, id: ConnectionId, value: f64) {
        let Some(&(_, deck, feedback)) = self.connections.iter().find(|(c, _, _)| *c == id)
        else {
            return;
        };
        let on = value != 0.0;
        match feedback {
            DeckFeedback::CueIndicator => led::set(&mut self.midi, deck, Indicator::Cue, on),
            DeckFeedback::CuePlay => led::set(&mut self.midi, deck, Indicator::CuePlay, on),
            DeckFeedback::PlayIndicator => {
                led::set(&mut self.midi, deck, Indicator::Play, on);
                led::set(&mut self.midi, deck, Indicator::Load, on);
                // a deck starting to play always silences the preview deck
                self.engine.set_value(groups::PREVIEW_DECK, "stop", 1.0);
            }
            DeckFeedback::Pfl => led::set(&mut self.midi, deck, Indicator::Pfl, on),
            DeckFeedback::LoopEnabled => {
                led::set(&mut self.midi, deck, Indicator::LoopEnabled, on)
            }
            DeckFeedback::BeatActive => {
                led::set(&mut self.midi, deck, Indicator::SyncEnabled, on)
            }
            DeckFeedback::RateTempUp => {
                led::set(&mut self.midi, deck, Indicator::RateTempUp, on)
            }
            DeckFeedback::RateTempDown => {
                led::set(&mut self.midi, deck, Indicator::RateTempDown, on)
            }
            DeckFeedback::VuMeter => {
                led::vu_meter(&mut self.midi, deck, (value * 7.0).round() as u8)
            }
        }
    }

    fn on_press(&mut self, control: Control) {
        debug!("press: {control:?}");
        match control {
            Control::ScratchToggle(deck) => self.toggle_wheel_mode(deck, WheelMode::Scratch),
            Control::ScrollToggle(deck) => self.toggle_wheel_mode(deck, WheelMode::Scroll),
            Control::WheelTouch(deck) => self.wheel_touch(deck, true),
            Control::Load { deck, and_play } => self.load_track(deck, and_play),
            Control::BrowsePress { shifted } => self.browse_pressed(shifted),
            Control::FxRouting(deck) => self.toggle_fx_routing(deck),
            Control::FxSelect(deck) => self.cycle_effect_focus(deck),
            Control::DryWetPress(deck) => self.dry_wet_pressed(deck),
            Control::BeatMovePress(deck) => self.decks[deck.index()].beat_move_held = true,
            // encoders only ever arrive as CC messages
            Control::WheelTurn(_)
            | Control::BrowseTurn { .. }
            | Control::FxAmount(_)
            | Control::DryWetTurn(_)
            | Control::BeatMoveTurn(_)
            | Control::LoopLengthTurn(_)
            | Control::PanTurn => {}
        }
    }

    fn on_release(&mut self, control: Control) {
        match control {
            Control::WheelTouch(deck) => self.wheel_touch(deck, false),
            Control::BeatMovePress(deck) => self.decks[deck.index()].beat_move_held = false,
            _ => {}
        }
    }

    fn on_turn(&mut self, control: Control, value: u8) {
        // relative encoders center on 64
        let delta = value as f64 - 64.0;
        match control {
            Control::WheelTurn(deck) => self.wheel_turn(deck, delta),
            Control::BrowseTurn { target } => self.browse_turn(target, delta),
            Control::DryWetTurn(deck) => self.dry_wet_turn(deck, delta),
            Control::FxAmount(deck) => self.fx_amount(deck, value),
            Control::BeatMoveTurn(deck) => self.beat_move(deck, delta),
            Control::LoopLengthTurn(deck) => self.loop_length(deck, delta),
            Control::PanTurn => {
                let balance = self.engine.get_value(groups::MASTER, "balance");
                self.engine
                    .set_value(groups::MASTER, "balance", balance + delta / 16.0);
            }
            Control::ScratchToggle(_)
            | Control::ScrollToggle(_)
            | Control::WheelTouch(_)
            | Control::Load { .. }
            | Control::BrowsePress { .. }
            | Control::FxRouting(_)
            | Control::FxSelect(_)
            | Control::DryWetPress(_)
            | Control::BeatMovePress(_) => {}
        }
    }

    /// Flip scratch or scroll mode; the two are mutually exclusive.
    fn toggle_wheel_mode(&mut self, deck: DeckId, mode: WheelMode) {
        let (scratch_changed, scroll_changed) =
            self.decks[deck.index()].toggle_wheel_mode(mode);
        if !(scratch_changed || scroll_changed) {
            return;
        }
        let state = self.decks[deck.index()];
        led::set(
            &mut self.midi,
            deck,
            Indicator::ScratchActive,
            state.scratch_active,
        );
        led::set(
            &mut self.midi,
            deck,
            Indicator::ScrollActive,
            state.scroll_active,
        );
        if scratch_changed && !state.scratch_active {
            self.engine.scratch_disable(deck.number());
        }
    }

    fn wheel_touch(&mut self, deck: DeckId, touched: bool) {
        let state = self.decks[deck.index()];
        if !(self.config.scratch_by_wheel_touch || state.scratch_active) {
            return;
        }
        if touched {
            self.engine.scratch_enable(
                deck.number(),
                self.config.scratch_ticks_per_revolution,
                SCRATCH_RPM,
                SCRATCH_ALPHA,
                SCRATCH_BETA,
            );
        } else {
            self.engine.scratch_disable(deck.number());
        }
    }

    fn wheel_turn(&mut self, deck: DeckId, delta: f64) {
        let state = self.decks[deck.index()];
        let engaged =
            self.config.scratch_by_wheel_touch || state.scratch_active || state.scroll_active;
        if !engaged {
            return;
        }
        if state.scroll_active {
            let position = self.engine.get_value(deck.group(), "playposition");
            let position = position + SCROLL_STEP * delta * self.config.jog_scroll_speed;
            self.engine.set_value(deck.group(), "playposition", position);
        } else if self.engine.is_scratching(deck.number()) {
            self.engine.scratch_tick(deck.number(), delta as i32);
        } else {
            // pitch bend
            self.engine.set_value(deck.group(), "jog", delta);
        }
    }

    fn load_track(&mut self, deck: DeckId, and_play: bool) {
        self.engine.set_value(groups::PREVIEW_DECK, "stop", 1.0);
        let name = if and_play {
            "LoadSelectedTrackAndPlay"
        } else {
            "LoadSelectedTrack"
        };
        self.engine.set_value(deck.group(), name, 1.0);
        self.library
            .reduce_to(self.config.library_reduced_hide_timeout());
    }

    fn browse_pressed(&mut self, shifted: bool) {
        if self.config.auto_maximize_library {
            self.library.show(&mut self.engine);
        }
        if shifted {
            self.engine.set_value(groups::LIBRARY, "GoToItem", 1.0);
            return;
        }
        if self.profile.browse_double_press {
            if self.browse_press.press(&mut self.engine, ()).is_some() {
                self.browse_double_pressed();
            }
            // otherwise pending; on_timer resolves the single press
        } else {
            self.preview_toggle();
        }
    }

    /// Double press on the browse knob toggles library maximization.
    fn browse_double_pressed(&mut self) {
        if self.engine.get_value(groups::MASTER, "maximize_library") != 0.0 {
            self.library.hide(&mut self.engine);
        } else if self.config.auto_maximize_library {
            self.library.show(&mut self.engine);
        } else {
            self.engine.set_value(groups::MASTER, "maximize_library", 1.0);
        }
    }

    /// Stop the preview deck if it is playing, otherwise preview the
    /// selected track.
    fn preview_toggle(&mut self) {
        if self.engine.get_value(groups::PREVIEW_DECK, "play") != 0.0 {
            self.engine.set_value(groups::PREVIEW_DECK, "stop", 1.0);
        } else {
            self.engine
                .set_value(groups::PREVIEW_DECK, "LoadSelectedTrackAndPlay", 1.0);
        }
    }

    fn browse_turn(&mut self, target: BrowseTarget, delta: f64) {
        if self.config.auto_maximize_library {
            self.library.show(&mut self.engine);
        }
        let name = match target {
            BrowseTarget::Tracks => "SelectTrackKnob",
            BrowseTarget::Playlists => "SelectPlaylist",
        };
        self.engine.set_value(groups::PLAYLIST, name, delta);
    }

    fn toggle_fx_routing(&mut self, deck: DeckId) {
        let routed = !self.decks[deck.index()].fx_routed;
        self.decks[deck.index()].fx_routed = routed;
        let enable = format!("group_{}_enable", deck.group());
        self.engine
            .set_value(deck.unit_group(), &enable, routed as u8 as f64);
        led::set(&mut self.midi, deck, Indicator::FxOn, routed);
    }

    /// FX SELECT cycles unit focus -> slot 1 -> ... -> slot N -> unit.
    fn cycle_effect_focus(&mut self, deck: DeckId) {
        let slots = self.engine.get_value(deck.unit_group(), "num_effects") as u32;
        if slots == 0 {
            return;
        }
        let state = &mut self.decks[deck.index()];
        let next = if state.focused_effect >= slots {
            0
        } else {
            state.focused_effect + 1
        };
        state.focused_effect = next;

        if next == 0 {
            led::set(&mut self.midi, deck, Indicator::FxSel, false);
            // knobs go back to addressing the unit: forget stale positions
            for slot in 1..=slots {
                self.engine
                    .soft_takeover_ignore_next(&deck.effect_group(slot), "meta");
            }
            self.engine
                .soft_takeover_ignore_next(deck.unit_group(), "super1");
        } else {
            led::set(&mut self.midi, deck, Indicator::FxSel, true);
        }

        self.engine
            .set_value(deck.unit_group(), "focused_effect", next as f64);
        self.engine.set_value(deck.unit_group(), "show_focus", 1.0);
    }

    fn dry_wet_turn(&mut self, deck: DeckId, delta: f64) {
        let focus = self.decks[deck.index()].focused_effect;
        if focus == 0 {
            let mix = self.engine.get_value(deck.unit_group(), "mix");
            self.engine
                .set_value(deck.unit_group(), "mix", mix + delta / 16.0);
        } else {
            self.engine
                .set_value(&deck.effect_group(focus), "effect_selector", delta);
        }
    }

    fn dry_wet_pressed(&mut self, deck: DeckId) {
        let focus = self.decks[deck.index()].focused_effect;
        if focus != 0 {
            let group = deck.effect_group(focus);
            let enabled = self.engine.get_value(&group, "enabled") != 0.0;
            self.engine
                .set_value(&group, "enabled", (!enabled) as u8 as f64);
        } else {
            let slots = self.engine.get_value(deck.unit_group(), "num_effects") as u32;
            for slot in 1..=slots {
                self.engine
                    .set_value(&deck.effect_group(slot), "enabled", 0.0);
            }
        }
    }

    fn fx_amount(&mut self, deck: DeckId, value: u8) {
        let amount = value as f64 / 127.0;
        let focus = self.decks[deck.index()].focused_effect;
        if focus == 0 {
            self.engine.set_value(deck.unit_group(), "super1", amount);
        } else {
            self.engine
                .set_value(&deck.effect_group(focus), "meta", amount);
        }
    }

    fn beat_move(&mut self, deck: DeckId, delta: f64) {
        if delta == 0.0 {
            return;
        }
        let name = if delta > 0.0 {
            "beatjump_forward"
        } else {
            "beatjump_backward"
        };
        self.engine.set_value(deck.group(), name, 1.0);
    }

    /// Loop encoder: scales the loop, or the beat-jump size while the
    /// beat-move encoder is held down.
    fn loop_length(&mut self, deck: DeckId, delta: f64) {
        if delta == 0.0 {
            return;
        }
        if self.decks[deck.index()].beat_move_held {
            let size = self.engine.get_parameter(deck.group(), "beatjump_size");
            let size = if delta > 0.0 { size * 2.0 } else { size / 2.0 };
            self.engine
                .set_parameter(deck.group(), "beatjump_size", size);
        } else {
            let name = if delta > 0.0 { "loop_double" } else { "loop_halve" };
            self.engine.set_value(deck.group(), name, 1.0);
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn midi(&self) -> &M {
        &self.midi
    }

    pub fn midi_mut(&mut self) -> &mut M {
        &mut self.midi
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Tear the session apart, returning the engine and MIDI output.
    pub fn into_parts(self) -> (E, M) {
        (self.engine, self.midi)
    }
}
