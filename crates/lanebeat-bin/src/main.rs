//! lanebeat-sim: plays a chart headlessly with autoplay input and prints the result.

mod headless_audio;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lanebeat_chart::{Chart, JsonChartLoader, SongEntry, SongLibrary};
use lanebeat_play::{GameConfig, GameEngine, GameState, PlayResult, ScriptedInput};
use lanebeat_types::{InputSource, MockTimeProvider, TimeProvider};
use log::{debug, info};

use headless_audio::HeadlessAudio;

#[derive(Parser, Debug)]
#[command(name = "lanebeat-sim", about = "Headless lanebeat autoplay runner")]
struct Args {
    /// Chart JSON file to play.
    #[arg(long, required_unless_present = "index", conflicts_with = "index")]
    chart: Option<PathBuf>,

    /// Song index JSON file; use with --song to pick an entry.
    #[arg(long)]
    index: Option<PathBuf>,

    /// Entry in the song index.
    #[arg(long, default_value_t = 0)]
    song: usize,

    /// Difficulty to play. Defaults to the easiest one in the chart.
    #[arg(long)]
    difficulty: Option<String>,

    /// Game config JSON file. Missing file means defaults.
    #[arg(long, default_value = "lanebeat.json")]
    config: PathBuf,

    /// Simulated display refresh rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "lanebeat=debug"
    } else {
        "lanebeat=info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }

    let config = GameConfig::load_from(&args.config)?;
    let library = load_library(&args)?;
    let result = simulate(&args, config, library)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn load_library(args: &Args) -> Result<SongLibrary> {
    if let Some(index) = &args.index {
        let library = SongLibrary::build(index, &JsonChartLoader)?;
        if library.is_empty() {
            bail!("no playable songs in {}", index.display());
        }
        return Ok(library);
    }
    let Some(path) = &args.chart else {
        bail!("either --chart or --index is required");
    };
    let chart = Chart::load(path)?;
    Ok(SongLibrary::new(vec![SongEntry::new(path.clone(), chart)]))
}

fn simulate(args: &Args, config: GameConfig, library: SongLibrary) -> Result<PlayResult> {
    let entry = library
        .get(args.song)
        .with_context(|| format!("song {} not in library ({} songs)", args.song, library.len()))?
        .clone();
    let difficulty = match &args.difficulty {
        Some(name) => name.clone(),
        None => entry
            .chart
            .difficulty_names()
            .first()
            .map(|s| s.to_string())
            .with_context(|| format!("'{}' has no difficulties", entry.title()))?,
    };
    let track = entry
        .chart
        .track(&difficulty)
        .with_context(|| format!("'{}' has no '{difficulty}' difficulty", entry.title()))?;

    let song_length_ms = track.last_note_end() + config.song_end_buffer_ms;
    let mut input = ScriptedInput::autoplay(track.notes());
    let frame_ms = 1000.0 / args.fps;
    let max_frames = ((song_length_ms + config.countdown_ms) / frame_ms).ceil() as u64 + 600;

    let mut engine = GameEngine::new(
        HeadlessAudio::new(song_length_ms),
        MockTimeProvider::new(),
        config,
        library,
    );
    engine.initialize()?;
    engine.open_song_select();
    engine.select_song(args.song)?;
    engine.select_difficulty(&difficulty)?;
    info!("simulating '{}' [{difficulty}] at {} fps", entry.title(), args.fps);

    for frame in 0..max_frames {
        engine.audio_mut().advance(frame_ms);
        engine.time().advance_ms(frame_ms);
        let now_ms = engine.time().now_us() as f64 / 1000.0;
        engine.tick(frame_ms, now_ms)?;

        for event in input.poll_events(engine.song_position_ms()) {
            engine.handle_input(event)?;
        }

        if engine.state() == GameState::Results {
            debug!("finished after {frame} frames, sfx: {:?}", engine.audio().sfx_counts());
            return engine
                .result()
                .cloned()
                .context("song ended without a result");
        }
    }
    bail!("simulation did not finish within {max_frames} frames")
}

fn print_summary(result: &PlayResult) {
    println!("{} - {} [{}]", result.artist, result.title, result.difficulty);
    println!(
        "score    {} / {}",
        result.score, result.max_possible_score
    );
    println!("accuracy {:.2}%  stars {}", result.accuracy, result.stars);
    println!(
        "perfect {}  great {}  good {}  miss {}",
        result.perfect_count, result.great_count, result.good_count, result.miss_count
    );
    println!(
        "max combo {}{}  early {}  late {}",
        result.max_combo,
        if result.full_combo { " (FC)" } else { "" },
        result.early_count,
        result.late_count
    );
}
