#![allow(dead_code)]

use std::path::PathBuf;
use std::rc::Rc;

use lanebeat_chart::{Chart, ChartMeta, ChartNote, NoteTrack, SongEntry, SongLibrary};
use lanebeat_play::{GameConfig, GameEngine};
use lanebeat_types::test_support::MockAudio;
use lanebeat_types::{InputEvent, InputSource, MockTimeProvider, TimeProvider};

pub type TestEngine = GameEngine<MockAudio, Rc<MockTimeProvider>>;

pub const FRAME_MS: f64 = 1000.0 / 60.0;

pub fn chart(notes: Vec<ChartNote>) -> Chart {
    let meta = ChartMeta {
        title: "Test Song".to_string(),
        artist: "Test Artist".to_string(),
        audio_file: "song.ogg".to_string(),
        bpm: 120.0,
        ..Default::default()
    };
    Chart::new(meta).with_track("medium", NoteTrack::new(notes, Vec::new()))
}

pub fn engine_with(notes: Vec<ChartNote>, config: GameConfig) -> (TestEngine, Rc<MockTimeProvider>) {
    let library = SongLibrary::new(vec![SongEntry::new(
        PathBuf::from("songs/test/chart.json"),
        chart(notes),
    )]);
    let time = Rc::new(MockTimeProvider::new());
    let engine = GameEngine::new(MockAudio::new(), Rc::clone(&time), config, library);
    (engine, time)
}

pub fn engine(notes: Vec<ChartNote>) -> (TestEngine, Rc<MockTimeProvider>) {
    engine_with(notes, GameConfig::default())
}

/// Initialize and navigate to the countdown of the "medium" track.
pub fn start(engine: &mut TestEngine) {
    engine.initialize().unwrap();
    assert!(engine.open_song_select());
    engine.select_song(0).unwrap();
    engine.select_difficulty("medium").unwrap();
}

/// Advance one frame: audio clock, decorative clock, then the engine tick.
pub fn frame(engine: &mut TestEngine, time: &MockTimeProvider) {
    engine.audio_mut().advance(FRAME_MS);
    time.advance_ms(FRAME_MS);
    engine
        .tick(FRAME_MS, time.now_us() as f64 / 1000.0)
        .unwrap();
}

/// Run frames until the song position reaches `position_ms`.
pub fn run_until(engine: &mut TestEngine, time: &MockTimeProvider, position_ms: f64) {
    for _ in 0..100_000 {
        if engine.song_position_ms() >= position_ms {
            return;
        }
        frame(engine, time);
    }
    panic!("never reached {position_ms}ms");
}

/// Run frames with scripted input until the engine leaves play.
pub fn run_with_input(engine: &mut TestEngine, time: &MockTimeProvider, input: &mut dyn InputSource) {
    for _ in 0..100_000 {
        frame(engine, time);
        for event in input.poll_events(engine.song_position_ms()) {
            engine.handle_input(event).unwrap();
        }
        if !engine.state().accepts_lane_input() {
            return;
        }
    }
    panic!("song never ended");
}

pub fn press(engine: &mut TestEngine, lane: usize) {
    engine
        .handle_input(InputEvent::LanePressed {
            lane,
            timestamp_ms: 0.0,
        })
        .unwrap();
}

pub fn release(engine: &mut TestEngine, lane: usize) {
    engine
        .handle_input(InputEvent::LaneReleased {
            lane,
            timestamp_ms: 0.0,
        })
        .unwrap();
}
