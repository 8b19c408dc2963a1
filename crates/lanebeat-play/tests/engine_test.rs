mod common;

use common::*;
use lanebeat_chart::ChartNote;
use lanebeat_play::{GameConfig, GameState, ScriptedInput, Tier, max_possible_score};
use lanebeat_render::{CommandRecorder, HighwayRenderer, Projector};
use lanebeat_types::test_support::{AudioCall, MockAudio};
use lanebeat_types::{AudioSink, InputEvent, SpecialKey};

fn taps() -> Vec<ChartNote> {
    vec![
        ChartNote::tap(1000.0, 0),
        ChartNote::tap(1500.0, 1),
        ChartNote::tap(2000.0, 2),
    ]
}

#[test]
fn initialize_is_idempotent_and_leaves_loading() {
    let (mut engine, _) = engine(taps());
    assert_eq!(engine.state(), GameState::Loading);
    engine.initialize().unwrap();
    engine.initialize().unwrap();
    assert_eq!(engine.state(), GameState::MainMenu);
    assert_eq!(engine.audio().count(&AudioCall::Init), 1);
}

#[test]
fn audio_init_failure_is_fatal() {
    let (engine, _) = engine(taps());
    let library = engine.library().clone();
    let mut engine = lanebeat_play::GameEngine::new(
        MockAudio::failing_init(),
        lanebeat_types::MockTimeProvider::new(),
        GameConfig::default(),
        library,
    );
    assert!(engine.initialize().is_err());
    assert_eq!(engine.state(), GameState::Loading);
    assert!(!engine.is_initialized());
}

#[test]
fn late_loading_completion_does_not_override_navigation() {
    let (mut engine, _) = engine(taps());
    engine.initialize().unwrap();
    engine.open_song_select();
    assert!(!engine.finish_loading());
    assert_eq!(engine.state(), GameState::SongSelect);
}

#[test]
fn loading_waits_for_initialization() {
    let (mut engine, _) = engine(taps());
    assert!(!engine.finish_loading());
    assert_eq!(engine.state(), GameState::Loading);
    assert!(!engine.is_initialized());

    assert!(!engine.open_song_select());
    assert!(engine.select_song(0).is_err());
    assert!(engine.select_difficulty("medium").is_err());
    assert_eq!(engine.state(), GameState::Loading);
}

#[test]
fn unknown_difficulty_and_song_are_errors() {
    let (mut engine, _) = engine(taps());
    engine.initialize().unwrap();
    engine.open_song_select();
    assert!(engine.select_song(3).is_err());
    engine.select_song(0).unwrap();
    assert!(engine.select_difficulty("expert").is_err());
    assert_eq!(engine.state(), GameState::DifficultySelect);
}

#[test]
fn missing_audio_falls_back_to_default_duration() {
    let (mut engine, _) = engine(taps());
    engine.audio_mut().song_duration_ms = None;
    start(&mut engine);
    assert_eq!(engine.state(), GameState::Countdown);
    assert_eq!(engine.song_duration_ms(), 60_000.0);
}

#[test]
fn countdown_prespawns_and_clamps_delta() {
    let (mut engine, time) = engine(vec![ChartNote::tap(500.0, 2)]);
    start(&mut engine);

    engine.tick(1000.0, 0.0).unwrap();
    let snap = engine.snapshot();
    assert!((snap.countdown_remaining_ms - (3000.0 - 33.33)).abs() < 1e-9);
    assert!(snap.frame.notes.is_empty());

    engine.tick(f64::NAN, 0.0).unwrap();
    assert!((engine.snapshot().countdown_remaining_ms - (3000.0 - 33.33)).abs() < 1e-9);

    // medium travel is 1700ms, so the note spawns at -1200ms
    run_until(&mut engine, &time, -1200.0);
    let snap = engine.snapshot();
    assert_eq!(snap.state, GameState::Countdown);
    assert_eq!(snap.travel_time_ms, 1700.0);
    assert_eq!(snap.frame.notes.len(), 1);
    assert!(snap.frame.notes[0].depth <= 1.0);
    assert!(snap.countdown_seconds().is_some());
}

#[test]
fn countdown_starts_playback_at_zero() {
    let (mut engine, time) = engine(taps());
    start(&mut engine);
    while engine.state() == GameState::Countdown {
        frame(&mut engine, &time);
    }
    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(engine.audio().count(&AudioCall::Play(0.0)), 1);
    assert_eq!(engine.song_position_ms(), 0.0);
}

#[test]
fn autoplay_run_is_a_perfect_full_combo() {
    let mut notes: Vec<ChartNote> = (0..12)
        .map(|i| ChartNote::tap(1000.0 + i as f64 * 250.0, i % 5))
        .collect();
    notes.push(ChartNote::hold(5000.0, 2, 1000.0));
    notes.push(ChartNote::tap(6500.0, 4));
    let (mut engine, time) = engine(notes.clone());
    start(&mut engine);

    let mut input = ScriptedInput::autoplay(&notes);
    run_with_input(&mut engine, &time, &mut input);

    assert_eq!(engine.state(), GameState::Results);
    let result = engine.result().unwrap();
    assert_eq!(result.perfect_count, 14);
    assert_eq!(result.miss_count, 0);
    assert!(result.full_combo);
    assert_eq!(result.max_combo, 14);
    assert_eq!(result.score, max_possible_score(&notes));
    assert_eq!(result.stars, 5);
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(result.title, "Test Song");
    assert_eq!(engine.audio().count(&AudioCall::Stop), 1);
    assert_eq!(engine.audio().count(&AudioCall::StartSustain(2)), 1);
    assert_eq!(engine.audio().count(&AudioCall::StopSustain(2)), 1);
}

#[test]
fn song_ends_after_last_note_plus_buffer() {
    let (mut engine, time) = engine(vec![ChartNote::tap(1000.0, 0)]);
    start(&mut engine);
    run_until(&mut engine, &time, 2900.0);
    assert_eq!(engine.state(), GameState::Playing);
    run_until(&mut engine, &time, 3000.0);
    assert_eq!(engine.state(), GameState::Results);
    let result = engine.result().unwrap();
    assert_eq!(result.miss_count, 1);
    assert!(!result.full_combo);
}

#[test]
fn end_song_twice_is_a_noop() {
    let (mut engine, time) = engine(taps());
    start(&mut engine);
    run_until(&mut engine, &time, 100.0);
    engine.end_song();
    let first = engine.result().cloned();
    engine.end_song();
    assert_eq!(engine.state(), GameState::Results);
    assert_eq!(engine.result().cloned(), first);
    assert_eq!(engine.audio().count(&AudioCall::Stop), 1);

    // ticking in Results changes nothing
    frame(&mut engine, &time);
    assert_eq!(engine.state(), GameState::Results);
}

#[test]
fn empty_lane_press_thumps_and_bad_lane_is_ignored() {
    let (mut engine, time) = engine(taps());
    start(&mut engine);
    run_until(&mut engine, &time, 1000.0);
    press(&mut engine, 4);
    assert!(engine.audio().sfx_played("thump"));
    press(&mut engine, 42);
    release(&mut engine, 42);
    assert_eq!(engine.session().unwrap().score().score, 0);
}

#[test]
fn unplayed_note_breaks_combo() {
    let (mut engine, time) = engine(taps());
    start(&mut engine);
    run_until(&mut engine, &time, 1000.0);
    press(&mut engine, 0);
    release(&mut engine, 0);
    run_until(&mut engine, &time, 1800.0);
    let score = engine.session().unwrap().score();
    assert_eq!(score.perfect_count, 1);
    assert_eq!(score.miss_count, 1);
    assert_eq!(score.combo, 0);
    assert!(engine.audio().sfx_played("miss"));
    assert!(engine.audio().sfx_played("combo_break"));
}

#[test]
fn judgment_flash_ages_with_time_provider() {
    let (mut engine, time) = engine(taps());
    start(&mut engine);
    run_until(&mut engine, &time, 1000.0);
    press(&mut engine, 0);
    time.advance_ms(120.0);
    let flash = engine.snapshot().frame.judgment.unwrap();
    assert_eq!(flash.label, Tier::Perfect.label());
    assert!((flash.age_ms - 120.0).abs() < 1e-6);
}

#[test]
fn held_lanes_show_while_playing() {
    let (mut engine, time) = engine(taps());
    start(&mut engine);
    run_until(&mut engine, &time, 500.0);
    press(&mut engine, 3);
    assert!(engine.snapshot().frame.held_lanes[3]);
    release(&mut engine, 3);
    assert!(!engine.snapshot().frame.held_lanes[3]);
}

#[test]
fn star_power_fills_activates_and_doubles_score() {
    let notes = vec![
        ChartNote::tap(1000.0, 0).with_star_power(),
        ChartNote::tap(1200.0, 0).with_star_power(),
        ChartNote::tap(1400.0, 0).with_star_power(),
        ChartNote::tap(3000.0, 1),
        ChartNote::tap(3500.0, 2),
    ];
    let (mut engine, time) = engine(notes);
    start(&mut engine);

    for t in [1000.0, 1200.0, 1400.0] {
        run_until(&mut engine, &time, t);
        press(&mut engine, 0);
        release(&mut engine, 0);
    }
    assert!(engine.audio().sfx_played("starpower_ready"));

    engine
        .handle_input(InputEvent::Special(SpecialKey::StarPower))
        .unwrap();
    assert!(engine.audio().sfx_played("starpower_activate"));
    assert!(engine.session().unwrap().score().star_power_active);
    // second activation refused
    assert!(!engine.activate_star_power());

    let before = engine.session().unwrap().score().score;
    run_until(&mut engine, &time, 3000.0);
    press(&mut engine, 1);
    let after = engine.session().unwrap().score().score;
    assert_eq!(after - before, 250);

    // a protected miss keeps the combo
    run_until(&mut engine, &time, 3800.0);
    let score = engine.session().unwrap().score();
    assert_eq!(score.miss_count, 1);
    assert_eq!(score.combo, 4);
    assert!(!engine.audio().sfx_played("combo_break"));
}

#[test]
fn render_draws_visible_notes() {
    let (mut engine, time) = engine(taps());
    start(&mut engine);
    run_until(&mut engine, &time, 400.0);
    let visible = engine.snapshot().frame.notes.len();
    assert_eq!(visible, 3);

    let renderer = HighwayRenderer::new(Projector::default());
    let mut recorder = CommandRecorder::new(1280.0, 720.0);
    engine.render(&renderer, &mut recorder).unwrap();
    assert_eq!(recorder.ellipses().len(), visible);
    assert!(recorder.texts().contains(&"SCORE 0"));
}

#[test]
fn audio_offset_shifts_song_position() {
    let config = GameConfig {
        audio_offset_ms: 50.0,
        ..Default::default()
    };
    let (mut engine, time) = engine_with(taps(), config);
    start(&mut engine);
    run_until(&mut engine, &time, 0.0);
    let clock = engine.audio().current_time_ms();
    assert!((engine.current_position() - (clock - 50.0)).abs() < 1e-9);
}
