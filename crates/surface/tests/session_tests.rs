//! End-to-end mapping tests: raw MIDI in, engine calls and LED messages out.

use std::time::Duration;

use mixage_core::{ConnectionId, ControlEngine, EngineCall, MidiMessage, SimEngine};
use mixage_surface::{groups, MixageSession, Revision, SurfaceConfig};

type Session = MixageSession<SimEngine, SimEngine>;

fn new_session(config: SurfaceConfig) -> Session {
    let mut session = MixageSession::new(config, SimEngine::new(), SimEngine::new());
    session.init();
    session.engine_mut().drain_calls();
    session.midi_mut().drain_sent();
    session
}

fn press(session: &mut Session, note: u8) {
    session.handle_midi(MidiMessage::NoteOn(note, 0x7F));
}

fn release(session: &mut Session, note: u8) {
    session.handle_midi(MidiMessage::NoteOn(note, 0x00));
}

fn turn(session: &mut Session, cc: u8, value: u8) {
    session.handle_midi(MidiMessage::ControlChange(cc, value));
}

/// Advance the simulated clock, feeding due timers back into the session.
fn run(session: &mut Session, dt: Duration) {
    for id in session.engine_mut().advance(dt) {
        session.on_timer(id);
    }
}

fn count_set(session: &Session, group: &str, name: &str, value: f64) -> usize {
    session
        .engine()
        .calls()
        .iter()
        .filter(|c| {
            matches!(
                c,
                EngineCall::SetValue { group: g, name: n, value: v }
                    if g == group && n == name && *v == value
            )
        })
        .count()
}

fn find_connection(session: &Session, group: &str, name: &str) -> ConnectionId {
    (1..=64)
        .map(ConnectionId)
        .find(|id| session.engine().connection_target(*id) == Some((group, name)))
        .expect("connection not found")
}

#[test]
fn scratch_and_scroll_are_mutually_exclusive() {
    let mut session = new_session(SurfaceConfig::default());

    // disc button: scratch on
    press(&mut session, 0x04);
    assert!(session.midi().sent().contains(&[0x90, 0x04, 0x7F]));

    // loupe button: scroll on forces scratch off and releases the engine
    press(&mut session, 0x03);
    let sent = session.midi().sent();
    assert!(sent.contains(&[0x90, 0x03, 0x7F]));
    assert!(sent.contains(&[0x90, 0x04, 0x00]));
    assert!(session
        .engine()
        .calls()
        .contains(&EngineCall::ScratchDisable { deck: 1 }));

    // and back: scratch on forces scroll off
    session.midi_mut().drain_sent();
    press(&mut session, 0x04);
    let sent = session.midi().sent();
    assert!(sent.contains(&[0x90, 0x04, 0x7F]));
    assert!(sent.contains(&[0x90, 0x03, 0x00]));
}

#[test]
fn wheel_is_inert_without_a_mode() {
    let mut session = new_session(SurfaceConfig::default());
    turn(&mut session, 0x24, 70);
    release(&mut session, 0x24);
    assert!(session.engine().calls().is_empty());
}

#[test]
fn wheel_scratches_while_touched_in_scratch_mode() {
    let mut session = new_session(SurfaceConfig::default());

    press(&mut session, 0x04); // scratch mode on
    press(&mut session, 0x24); // touch platter
    turn(&mut session, 0x24, 70);
    release(&mut session, 0x24);

    let calls = session.engine().calls();
    assert!(calls.contains(&EngineCall::ScratchEnable { deck: 1 }));
    assert!(calls.contains(&EngineCall::ScratchTick { deck: 1, ticks: 6 }));
    assert!(calls.contains(&EngineCall::ScratchDisable { deck: 1 }));
}

#[test]
fn touch_scratches_without_a_mode_when_configured() {
    let config = SurfaceConfig {
        scratch_by_wheel_touch: true,
        ..Default::default()
    };
    let mut session = new_session(config);

    // no disc button pressed: touch alone engages the engine
    press(&mut session, 0x25);
    turn(&mut session, 0x25, 62);
    release(&mut session, 0x25);

    let calls = session.engine().calls();
    assert!(calls.contains(&EngineCall::ScratchEnable { deck: 2 }));
    assert!(calls.contains(&EngineCall::ScratchTick { deck: 2, ticks: -2 }));
    assert!(calls.contains(&EngineCall::ScratchDisable { deck: 2 }));

    // after release the wheel falls back to pitch bending
    turn(&mut session, 0x25, 70);
    assert_eq!(count_set(&session, "[Channel2]", "jog", 6.0), 1);
}

#[test]
fn wheel_pitch_bends_in_scratch_mode_without_touch() {
    let mut session = new_session(SurfaceConfig::default());
    press(&mut session, 0x12); // scratch mode, deck B
    turn(&mut session, 0x25, 60);
    assert_eq!(count_set(&session, "[Channel2]", "jog", -4.0), 1);
}

#[test]
fn wheel_scrolls_through_the_track_in_scroll_mode() {
    let mut session = new_session(SurfaceConfig::default());
    session
        .engine_mut()
        .seed_value("[Channel1]", "playposition", 0.5);

    press(&mut session, 0x03); // scroll mode on
    turn(&mut session, 0x24, 68);

    // 0.5 + 5e-5 * 4 * scroll speed 2.0
    let position = session.engine().get_value("[Channel1]", "playposition");
    assert!((position - 0.5004).abs() < 1e-9);
}

#[test]
fn browse_double_press_toggles_library_no_single_fires() {
    let mut session = new_session(SurfaceConfig::default());

    // press at t=0 and t=100ms, window is 400ms
    press(&mut session, 0x1F);
    run(&mut session, Duration::from_millis(100));
    press(&mut session, 0x1F);

    assert_eq!(count_set(&session, groups::MASTER, "maximize_library", 1.0), 1);

    // the armed timer was canceled: no single press (preview) ever fires
    run(&mut session, Duration::from_secs(5));
    assert_eq!(
        count_set(&session, groups::PREVIEW_DECK, "LoadSelectedTrackAndPlay", 1.0),
        0
    );
}

#[test]
fn browse_single_press_previews_after_the_window() {
    let mut session = new_session(SurfaceConfig::default());

    press(&mut session, 0x1F);
    assert_eq!(
        count_set(&session, groups::PREVIEW_DECK, "LoadSelectedTrackAndPlay", 1.0),
        0
    );

    run(&mut session, Duration::from_millis(401));
    assert_eq!(
        count_set(&session, groups::PREVIEW_DECK, "LoadSelectedTrackAndPlay", 1.0),
        1
    );
}

#[test]
fn browse_single_press_stops_a_playing_preview() {
    let mut session = new_session(SurfaceConfig::default());
    session
        .engine_mut()
        .seed_value(groups::PREVIEW_DECK, "play", 1.0);

    press(&mut session, 0x1F);
    run(&mut session, Duration::from_millis(500));
    assert_eq!(count_set(&session, groups::PREVIEW_DECK, "stop", 1.0), 1);
}

#[test]
fn rev_a_browse_press_resolves_immediately() {
    let config = SurfaceConfig {
        revision: Revision::RevA,
        ..Default::default()
    };
    let mut session = new_session(config);

    press(&mut session, 0x1F);
    assert_eq!(
        count_set(&session, groups::PREVIEW_DECK, "LoadSelectedTrackAndPlay", 1.0),
        1
    );
    assert_eq!(session.engine().timer_count(), 0);
}

#[test]
fn shifted_browse_press_jumps_to_item() {
    let mut session = new_session(SurfaceConfig::default());
    press(&mut session, 0x5E);
    assert_eq!(count_set(&session, groups::LIBRARY, "GoToItem", 1.0), 1);
    // immediate even on the double-press revision
    assert_eq!(session.engine().timer_count(), 0);
}

#[test]
fn browse_turn_scrolls_tracks_plain_and_playlists_shifted() {
    for revision in [Revision::RevA, Revision::RevB] {
        let config = SurfaceConfig {
            revision,
            ..Default::default()
        };
        let mut session = new_session(config);
        turn(&mut session, 0x1F, 65);
        assert_eq!(count_set(&session, groups::PLAYLIST, "SelectTrackKnob", 1.0), 1);
        turn(&mut session, 0x5E, 62);
        assert_eq!(
            count_set(&session, groups::PLAYLIST, "SelectPlaylist", -2.0),
            1
        );
    }
}

#[test]
fn auto_maximized_library_hides_after_five_ticks() {
    let config = SurfaceConfig {
        auto_maximize_library: true,
        ..Default::default()
    };
    let mut session = new_session(config);

    turn(&mut session, 0x1F, 65);
    assert_eq!(count_set(&session, groups::MASTER, "maximize_library", 1.0), 1);

    // timeout 4000ms, tick every 800ms: hidden after exactly 5 ticks
    run(&mut session, Duration::from_millis(3999));
    assert_eq!(count_set(&session, groups::MASTER, "maximize_library", 0.0), 0);
    run(&mut session, Duration::from_millis(1));
    assert_eq!(count_set(&session, groups::MASTER, "maximize_library", 0.0), 1);

    // countdown stopped itself
    assert_eq!(session.engine().timer_count(), 0);
}

#[test]
fn browsing_again_resets_the_hide_countdown() {
    let config = SurfaceConfig {
        auto_maximize_library: true,
        ..Default::default()
    };
    let mut session = new_session(config);

    turn(&mut session, 0x1F, 65);
    run(&mut session, Duration::from_millis(3200));
    turn(&mut session, 0x1F, 65); // resets remaining to 4000

    run(&mut session, Duration::from_millis(3999));
    assert_eq!(count_set(&session, groups::MASTER, "maximize_library", 0.0), 0);
    run(&mut session, Duration::from_millis(801));
    assert_eq!(count_set(&session, groups::MASTER, "maximize_library", 0.0), 1);
}

#[test]
fn loading_a_track_shortens_the_hide_window() {
    let config = SurfaceConfig {
        auto_maximize_library: true,
        ..Default::default()
    };
    let mut session = new_session(config);

    turn(&mut session, 0x1F, 65);
    press(&mut session, 0x0D); // load into deck A

    assert_eq!(count_set(&session, "[Channel1]", "LoadSelectedTrack", 1.0), 1);
    assert_eq!(count_set(&session, groups::PREVIEW_DECK, "stop", 1.0), 1);

    // remaining dropped to 500ms: the next 800ms tick collapses the panel
    run(&mut session, Duration::from_millis(800));
    assert_eq!(count_set(&session, groups::MASTER, "maximize_library", 0.0), 1);
}

#[test]
fn shifted_load_starts_playback() {
    let mut session = new_session(SurfaceConfig::default());
    press(&mut session, 0x5A);
    assert_eq!(
        count_set(&session, "[Channel2]", "LoadSelectedTrackAndPlay", 1.0),
        1
    );
}

#[test]
fn effect_focus_cycles_through_slots_and_wraps() {
    let mut engine = SimEngine::new();
    engine.seed_value("[EffectRack1_EffectUnit1]", "num_effects", 4.0);
    let mut session = MixageSession::new(SurfaceConfig::default(), engine, SimEngine::new());
    session.init();
    session.engine_mut().drain_calls();
    session.midi_mut().drain_sent();

    for expected in 1..=4 {
        press(&mut session, 0x07);
        assert_eq!(
            count_set(
                &session,
                "[EffectRack1_EffectUnit1]",
                "focused_effect",
                expected as f64
            ),
            1
        );
    }
    // FX SEL lamp lit while a slot has focus
    assert!(session.midi().sent().contains(&[0x90, 0x07, 0x7F]));

    // fifth press wraps to the unit and re-arms soft takeover
    press(&mut session, 0x07);
    assert_eq!(
        count_set(&session, "[EffectRack1_EffectUnit1]", "focused_effect", 0.0),
        1
    );
    assert!(session.midi().sent().contains(&[0x90, 0x07, 0x00]));
    let ignores = session
        .engine()
        .calls()
        .iter()
        .filter(|c| matches!(c, EngineCall::SoftTakeoverIgnoreNext { .. }))
        .count();
    assert_eq!(ignores, 5); // 4 slot metas + the unit super knob
}

#[test]
fn dry_wet_and_amount_follow_the_focused_effect() {
    let mut engine = SimEngine::new();
    engine.seed_value("[EffectRack1_EffectUnit1]", "num_effects", 4.0);
    engine.seed_value("[EffectRack1_EffectUnit1]", "mix", 0.5);
    let mut session = MixageSession::new(SurfaceConfig::default(), engine, SimEngine::new());
    session.init();
    session.engine_mut().drain_calls();

    // focus 0: dry/wet edits the unit mix, amount drives the super knob
    turn(&mut session, 0x21, 72);
    assert_eq!(count_set(&session, "[EffectRack1_EffectUnit1]", "mix", 1.0), 1);
    turn(&mut session, 0x26, 127);
    assert_eq!(count_set(&session, "[EffectRack1_EffectUnit1]", "super1", 1.0), 1);

    // focus slot 1: dry/wet scrolls the effect selector, amount the meta
    press(&mut session, 0x07);
    turn(&mut session, 0x21, 65);
    assert_eq!(
        count_set(
            &session,
            "[EffectRack1_EffectUnit1_Effect1]",
            "effect_selector",
            1.0
        ),
        1
    );
    turn(&mut session, 0x26, 0);
    assert_eq!(
        count_set(&session, "[EffectRack1_EffectUnit1_Effect1]", "meta", 0.0),
        1
    );

    // dry/wet press toggles the focused effect
    press(&mut session, 0x21);
    assert_eq!(
        count_set(&session, "[EffectRack1_EffectUnit1_Effect1]", "enabled", 1.0),
        1
    );
}

#[test]
fn dry_wet_press_at_unit_focus_disables_every_slot() {
    let mut engine = SimEngine::new();
    engine.seed_value("[EffectRack1_EffectUnit2]", "num_effects", 3.0);
    let mut session = MixageSession::new(SurfaceConfig::default(), engine, SimEngine::new());
    session.init();
    session.engine_mut().drain_calls();

    press(&mut session, 0x23);
    for slot in 1..=3 {
        let group = format!("[EffectRack1_EffectUnit2_Effect{slot}]");
        assert_eq!(count_set(&session, &group, "enabled", 0.0), 1);
    }
}

#[test]
fn fx_routing_restored_at_init_and_toggled_by_button() {
    let mut engine = SimEngine::new();
    engine.seed_value(
        "[EffectRack1_EffectUnit1]",
        "group_[Channel1]_enable",
        1.0,
    );
    let mut session = MixageSession::new(SurfaceConfig::default(), engine, SimEngine::new());
    session.init();

    // init mirrored the routing state onto the FX ON lamp
    assert!(session.midi().sent().contains(&[0x90, 0x08, 0x7F]));

    press(&mut session, 0x08);
    assert_eq!(
        count_set(
            &session,
            "[EffectRack1_EffectUnit1]",
            "group_[Channel1]_enable",
            0.0
        ),
        1
    );
    assert!(session.midi().sent().contains(&[0x90, 0x08, 0x00]));
}

#[test]
fn loop_encoder_scales_loop_or_beatjump_size() {
    let mut session = new_session(SurfaceConfig::default());
    session
        .engine_mut()
        .seed_parameter("[Channel1]", "beatjump_size", 4.0);

    turn(&mut session, 0x20, 70);
    assert_eq!(count_set(&session, "[Channel1]", "loop_double", 1.0), 1);
    turn(&mut session, 0x20, 60);
    assert_eq!(count_set(&session, "[Channel1]", "loop_halve", 1.0), 1);

    // held beat-move encoder re-purposes the loop encoder
    press(&mut session, 0x20);
    turn(&mut session, 0x20, 70);
    assert_eq!(
        session.engine().get_parameter("[Channel1]", "beatjump_size"),
        8.0
    );
    release(&mut session, 0x20);
    turn(&mut session, 0x20, 70);
    assert_eq!(count_set(&session, "[Channel1]", "loop_double", 1.0), 2);
}

#[test]
fn beat_move_encoder_jumps_by_beats() {
    let mut session = new_session(SurfaceConfig::default());
    turn(&mut session, 0x5F, 70);
    assert_eq!(count_set(&session, "[Channel1]", "beatjump_forward", 1.0), 1);
    turn(&mut session, 0x61, 60);
    assert_eq!(count_set(&session, "[Channel2]", "beatjump_backward", 1.0), 1);
}

#[test]
fn pan_encoder_nudges_master_balance() {
    let mut session = new_session(SurfaceConfig::default());
    turn(&mut session, 0x28, 72);
    assert_eq!(count_set(&session, groups::MASTER, "balance", 0.5), 1);
}

#[test]
fn play_feedback_lights_leds_and_stops_preview() {
    let mut session = new_session(SurfaceConfig::default());
    let id = find_connection(&session, "[Channel1]", "play_indicator");

    session.on_control_change(id, 1.0);
    let sent = session.midi().sent();
    assert!(sent.contains(&[0x90, 0x0C, 0x7F])); // play LED
    assert!(sent.contains(&[0x90, 0x0D, 0x7F])); // load LED
    assert_eq!(count_set(&session, groups::PREVIEW_DECK, "stop", 1.0), 1);
}

#[test]
fn rate_bend_feedback_drives_the_pitch_lamps() {
    let mut session = new_session(SurfaceConfig::default());

    let up_a = find_connection(&session, "[Channel1]", "rate_temp_up");
    session.on_control_change(up_a, 1.0);
    assert!(session.midi().sent().contains(&[0x90, 0x02, 0x7F]));
    session.on_control_change(up_a, 0.0);
    assert!(session.midi().sent().contains(&[0x90, 0x02, 0x00]));

    let down_b = find_connection(&session, "[Channel2]", "rate_temp_down");
    session.on_control_change(down_b, 1.0);
    assert!(session.midi().sent().contains(&[0x90, 0x0F, 0x7F]));
}

#[test]
fn vu_meter_feedback_scales_to_seven_segments() {
    let mut session = new_session(SurfaceConfig::default());
    let id = find_connection(&session, "[Channel2]", "VuMeter");

    session.on_control_change(id, 1.0);
    assert!(session.midi().sent().contains(&[0x90, 0x1E, 7]));
    session.on_control_change(id, 0.5);
    assert!(session.midi().sent().contains(&[0x90, 0x1E, 4]));
}

#[test]
fn unmapped_events_are_ignored() {
    let mut session = new_session(SurfaceConfig::default());
    press(&mut session, 0x7F);
    turn(&mut session, 0x7E, 70);
    session.handle_midi(MidiMessage::NoteOff(0x7D));
    assert!(session.engine().calls().is_empty());
    assert!(session.midi().sent().is_empty());
}

#[test]
fn init_and_shutdown_manage_connections_and_leds() {
    let mut session = MixageSession::new(
        SurfaceConfig::default(),
        SimEngine::new(),
        SimEngine::new(),
    );
    session.init();
    // 9 feedback controls per deck
    assert_eq!(session.engine().connection_count(), 18);
    // init blanked the whole surface
    assert!(session.midi().sent().len() >= 128);

    session.midi_mut().drain_sent();
    session.shutdown();
    assert_eq!(session.engine().connection_count(), 0);
    assert_eq!(session.midi().sent().len(), 128);
}
