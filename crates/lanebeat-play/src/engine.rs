use std::sync::Arc;

use anyhow::{Context, Result, bail};
use lanebeat_chart::{Chart, LANE_COUNT, SongLibrary};
use lanebeat_render::{HighwayFrame, HighwayRenderer, JudgmentFlash};
use lanebeat_types::{AudioSink, InputEvent, RenderTarget, Sfx, SpecialKey, TimeProvider};
use log::{debug, info, warn};

use crate::config::GameConfig;
use crate::judgment::{Judgment, JudgmentKind, PressResult};
use crate::result::PlayResult;
use crate::session::PlaySession;
use crate::snapshot::GameSnapshot;
use crate::state::{GameState, StateMachine};

/// The game loop and state machine.
///
/// Owns the audio sink (which is also the song clock), a decorative time
/// provider, the song library and at most one play session.
pub struct GameEngine<A: AudioSink, T: TimeProvider> {
    audio: A,
    time: T,
    config: GameConfig,
    library: SongLibrary,
    state: StateMachine,
    initialized: bool,
    selected_song: Option<usize>,
    chart: Option<Arc<Chart>>,
    session: Option<PlaySession>,
    song_duration_ms: f64,
    countdown_remaining_ms: f64,
    song_position_ms: f64,
    paused_offset_ms: f64,
    /// Physical lane state, tracked in every state.
    lanes_down: [bool; LANE_COUNT],
    /// Latest judgment and when it happened, in provider microseconds.
    last_judgment: Option<(Judgment, i64)>,
    result: Option<PlayResult>,
    song_ended: bool,
    last_frame_timestamp_ms: f64,
}

impl<A: AudioSink, T: TimeProvider> GameEngine<A, T> {
    pub fn new(audio: A, time: T, config: GameConfig, library: SongLibrary) -> Self {
        Self {
            audio,
            time,
            config,
            library,
            state: StateMachine::new(),
            initialized: false,
            selected_song: None,
            chart: None,
            session: None,
            song_duration_ms: 0.0,
            countdown_remaining_ms: 0.0,
            song_position_ms: 0.0,
            paused_offset_ms: 0.0,
            lanes_down: [false; LANE_COUNT],
            last_judgment: None,
            result: None,
            song_ended: false,
            last_frame_timestamp_ms: 0.0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state.current()
    }

    pub fn previous_state(&self) -> GameState {
        self.state.previous()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn library(&self) -> &SongLibrary {
        &self.library
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn session(&self) -> Option<&PlaySession> {
        self.session.as_ref()
    }

    pub fn result(&self) -> Option<&PlayResult> {
        self.result.as_ref()
    }

    pub fn selected_song(&self) -> Option<usize> {
        self.selected_song
    }

    pub fn song_position_ms(&self) -> f64 {
        self.song_position_ms
    }

    pub fn song_duration_ms(&self) -> f64 {
        self.song_duration_ms
    }

    pub fn last_frame_timestamp_ms(&self) -> f64 {
        self.last_frame_timestamp_ms
    }

    pub fn is_lane_down(&self, lane: usize) -> bool {
        self.lanes_down.get(lane).copied().unwrap_or(false)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Start the audio subsystem and leave Loading. Calling again is a no-op.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            debug!("initialize called twice; ignoring");
            return Ok(());
        }
        self.audio.init().context("initializing audio subsystem")?;
        self.initialized = true;
        info!("engine initialized with {} songs", self.library.len());
        self.finish_loading();
        Ok(())
    }

    /// Loading -> MainMenu, only once initialized and only if still loading.
    pub fn finish_loading(&mut self) -> bool {
        if !self.initialized || !self.state.is(GameState::Loading) {
            return false;
        }
        self.state.transition_to(GameState::MainMenu)
    }

    pub fn open_song_select(&mut self) -> bool {
        match self.state.current() {
            GameState::MainMenu | GameState::Results => {
                self.state.transition_to(GameState::SongSelect)
            }
            _ => false,
        }
    }

    pub fn select_song(&mut self, index: usize) -> Result<()> {
        if !self.state.is(GameState::SongSelect) {
            bail!("cannot select a song in {:?}", self.state.current());
        }
        let Some(entry) = self.library.get(index) else {
            bail!(
                "song index {index} out of range ({} songs)",
                self.library.len()
            );
        };
        debug!("selected song {index}: {}", entry.title());
        self.selected_song = Some(index);
        self.state.transition_to(GameState::DifficultySelect);
        Ok(())
    }

    /// Load the song audio, build a fresh session and start the countdown.
    pub fn select_difficulty(&mut self, difficulty: &str) -> Result<()> {
        if !self.initialized {
            bail!("engine not initialized");
        }
        if !self.state.is(GameState::DifficultySelect) {
            bail!("cannot select a difficulty in {:?}", self.state.current());
        }
        let Some(entry) = self.selected_song.and_then(|i| self.library.get(i)) else {
            bail!("no song selected");
        };
        let chart = Arc::clone(&entry.chart);
        let audio_path = entry.audio_path();
        let Some(track) = chart.track(difficulty) else {
            bail!(
                "'{}' has no '{difficulty}' difficulty",
                chart.meta.title
            );
        };

        let fallback = self.config.fallback_song_duration_ms;
        self.song_duration_ms = match self.audio.load_song(&audio_path) {
            Ok(ms) if ms.is_finite() && ms > 0.0 => ms,
            Ok(ms) => {
                warn!(
                    "audio {} reported duration {ms}; assuming {fallback} ms",
                    audio_path.display()
                );
                fallback
            }
            Err(e) => {
                warn!(
                    "failed to load audio {}: {e:#}; assuming {fallback} ms",
                    audio_path.display()
                );
                fallback
            }
        };

        let travel_time_ms = self.config.travel_time_for(difficulty);
        let mut session = PlaySession::new(
            track,
            difficulty,
            travel_time_ms,
            self.config.song_end_buffer_ms,
        );
        self.countdown_remaining_ms = self.config.countdown_ms.max(0.0);
        self.song_position_ms = -self.countdown_remaining_ms;
        session.prepare(self.song_position_ms);

        info!(
            "starting '{}' [{difficulty}] ({} notes)",
            chart.meta.title,
            track.len()
        );
        self.session = Some(session);
        self.chart = Some(chart);
        self.last_judgment = None;
        self.result = None;
        self.song_ended = false;
        self.state.transition_to(GameState::Countdown);
        Ok(())
    }

    /// Song position in the current state, read fresh from the clock while playing.
    pub fn current_position(&self) -> f64 {
        match self.state.current() {
            GameState::Countdown => -self.countdown_remaining_ms,
            GameState::Playing => self.audio.current_time_ms() - self.clock_offset_ms(),
            _ => self.song_position_ms,
        }
    }

    fn clock_offset_ms(&self) -> f64 {
        let chart_offset = self.chart.as_ref().map_or(0.0, |c| c.meta.offset);
        self.config.audio_offset_ms + chart_offset
    }

    /// Advance one display frame. `delta_ms` is clamped to the configured maximum.
    pub fn tick(&mut self, delta_ms: f64, timestamp_ms: f64) -> Result<()> {
        let delta_ms = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, self.config.max_frame_delta_ms)
        } else {
            0.0
        };
        self.last_frame_timestamp_ms = timestamp_ms;

        match self.state.current() {
            GameState::Countdown => self.tick_countdown(delta_ms),
            GameState::Playing => {
                self.tick_playing(delta_ms);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn tick_countdown(&mut self, delta_ms: f64) -> Result<()> {
        self.countdown_remaining_ms = (self.countdown_remaining_ms - delta_ms).max(0.0);
        if self.countdown_remaining_ms > 0.0 {
            self.song_position_ms = -self.countdown_remaining_ms;
            if let Some(session) = self.session.as_mut() {
                session.prepare(self.song_position_ms);
            }
            return Ok(());
        }

        self.audio.play(0.0).context("starting song playback")?;
        self.state.transition_to(GameState::Playing);
        self.song_position_ms = self.current_position();
        if let Some(session) = self.session.as_mut() {
            session.prepare(self.song_position_ms);
        }
        Ok(())
    }

    fn tick_playing(&mut self, delta_ms: f64) {
        let pos = self.current_position();
        self.song_position_ms = pos;

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let judged = session.advance(pos);
        let star_power_ended = session.drain_star_power(delta_ms);
        let finished = session.is_finished(pos);

        for judgment in &judged {
            self.apply_feedback(judgment);
        }
        if star_power_ended {
            info!("star power ended at {pos:.0}ms");
        }
        if finished {
            self.end_song();
        }
    }

    /// Dispatch an input event immediately against the current song position.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::LanePressed { lane, .. } => {
                if lane >= LANE_COUNT {
                    debug!("ignoring press on lane {lane}");
                    return Ok(());
                }
                self.lanes_down[lane] = true;
                if !self.state.current().accepts_lane_input() {
                    return Ok(());
                }
                let pos = self.current_position();
                if let Some(session) = self.session.as_mut() {
                    let result = session.handle_press(lane, pos);
                    self.apply_press(result);
                }
            }
            InputEvent::LaneReleased { lane, .. } => {
                if lane >= LANE_COUNT {
                    return Ok(());
                }
                self.lanes_down[lane] = false;
                if !self.state.current().accepts_lane_input() {
                    return Ok(());
                }
                let pos = self.current_position();
                let judged = self
                    .session
                    .as_mut()
                    .and_then(|s| s.handle_release(lane, pos));
                if let Some(judgment) = judged {
                    self.apply_feedback(&judgment);
                }
            }
            InputEvent::Special(SpecialKey::Pause) => match self.state.current() {
                GameState::Playing => {
                    self.pause();
                }
                GameState::Paused => {
                    self.resume()?;
                }
                _ => {}
            },
            InputEvent::Special(SpecialKey::StarPower) => {
                self.activate_star_power();
            }
        }
        Ok(())
    }

    fn apply_press(&mut self, result: PressResult) {
        match result {
            PressResult::Ignored => {}
            PressResult::Thump { .. } => self.play_sfx(Sfx::Thump),
            PressResult::Judged(judgment) | PressResult::HoldArmed(judgment) => {
                self.apply_feedback(&judgment)
            }
        }
    }

    /// Audio cues and the judgment flash for one judgment.
    fn apply_feedback(&mut self, judgment: &Judgment) {
        match judgment.kind {
            JudgmentKind::HoldHead => self
                .audio
                .start_hold_sustain(judgment.lane, self.config.hold_sustain_volume),
            JudgmentKind::HoldRelease | JudgmentKind::HoldComplete => {
                self.audio.stop_hold_sustain(judgment.lane)
            }
            JudgmentKind::Tap | JudgmentKind::Expired => {}
        }
        if judgment.is_miss() {
            self.play_sfx(Sfx::Miss);
        }
        if judgment.combo_broken {
            self.play_sfx(Sfx::ComboBreak);
        }
        if judgment.star_power_ready {
            self.play_sfx(Sfx::StarPowerReady);
        }
        self.last_judgment = Some((*judgment, self.time.now_us()));
    }

    fn play_sfx(&mut self, sfx: Sfx) {
        self.audio.play_sfx(sfx.name(), self.config.sfx_volume);
    }

    fn stop_sustains(&mut self) {
        let lanes = self
            .session
            .as_ref()
            .map(PlaySession::armed_lanes)
            .unwrap_or_default();
        for lane in lanes {
            self.audio.stop_hold_sustain(lane);
        }
    }

    pub fn activate_star_power(&mut self) -> bool {
        if !self.state.is(GameState::Playing) {
            return false;
        }
        let activated = self
            .session
            .as_mut()
            .is_some_and(PlaySession::activate_star_power);
        if activated {
            self.play_sfx(Sfx::StarPowerActivate);
        }
        activated
    }

    /// Playing -> Paused. Armed holds keep their scoring state but lose their audio.
    pub fn pause(&mut self) -> bool {
        if !self.state.is(GameState::Playing) {
            return false;
        }
        self.song_position_ms = self.current_position();
        self.stop_sustains();
        self.audio.pause();
        self.paused_offset_ms = self.audio.current_time_ms();
        self.state.transition_to(GameState::Paused)
    }

    /// Paused -> Playing at the paused offset.
    ///
    /// Holds whose lane was let go while paused are released at the resume
    /// position; the others get their sustain back.
    pub fn resume(&mut self) -> Result<bool> {
        if !self.state.is(GameState::Paused) {
            return Ok(false);
        }
        self.audio.resume();
        let drift = self.audio.current_time_ms() - self.paused_offset_ms;
        if drift.abs() > self.config.resume_drift_tolerance_ms {
            warn!(
                "clock drifted {drift:.1}ms across pause; seeking back to {:.1}ms",
                self.paused_offset_ms
            );
            if let Err(e) = self.audio.play(self.paused_offset_ms) {
                self.audio.pause();
                return Err(e.context("restoring playback position after pause"));
            }
        }
        self.state.transition_to(GameState::Playing);
        let pos = self.current_position();
        self.song_position_ms = pos;

        let armed = self
            .session
            .as_ref()
            .map(PlaySession::armed_lanes)
            .unwrap_or_default();
        for lane in armed {
            if self.lanes_down[lane] {
                self.audio
                    .start_hold_sustain(lane, self.config.hold_sustain_volume);
                continue;
            }
            let judged = self
                .session
                .as_mut()
                .and_then(|s| s.handle_release(lane, pos));
            if let Some(judgment) = judged {
                self.apply_feedback(&judgment);
            }
        }
        Ok(true)
    }

    /// Step back through the menus. Backing out of Paused abandons the attempt.
    pub fn back(&mut self) -> bool {
        match self.state.current() {
            GameState::DifficultySelect | GameState::Results => {
                self.state.transition_to(GameState::SongSelect)
            }
            GameState::SongSelect => self.state.transition_to(GameState::MainMenu),
            GameState::Paused => {
                info!("attempt abandoned");
                self.stop_sustains();
                self.audio.stop();
                self.session = None;
                self.state.transition_to(GameState::SongSelect)
            }
            _ => false,
        }
    }

    /// Finish the attempt and build its result. Later calls are no-ops.
    pub fn end_song(&mut self) {
        if self.song_ended {
            return;
        }
        if !matches!(
            self.state.current(),
            GameState::Countdown | GameState::Playing | GameState::Paused
        ) {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.song_ended = true;

        let meta = self
            .chart
            .as_ref()
            .map(|c| c.meta.clone())
            .unwrap_or_default();
        let result = PlayResult::new(
            &meta,
            session.difficulty(),
            session.score(),
            session.max_possible_score(),
        );
        info!(
            "song end: '{}' [{}] score={} accuracy={:.2}% stars={}",
            result.title, result.difficulty, result.score, result.accuracy, result.stars
        );

        self.stop_sustains();
        self.audio.stop();
        self.result = Some(result);
        self.state.transition_to(GameState::Results);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let frame = match self.session.as_ref() {
            Some(session) => {
                let mut frame = session.highway_frame(self.song_position_ms);
                if self.state.current().accepts_lane_input() {
                    frame.held_lanes = self.lanes_down;
                } else {
                    // Armed holds keep their scoring state but are drawn released.
                    for sprite in &mut frame.notes {
                        sprite.hold_active = false;
                    }
                }
                frame.judgment = self.last_judgment.map(|(judgment, at_us)| JudgmentFlash {
                    label: judgment.tier.label(),
                    age_ms: self.time.elapsed_ms(at_us),
                });
                frame
            }
            None => HighwayFrame::default(),
        };
        GameSnapshot {
            state: self.state.current(),
            song_position_ms: self.song_position_ms,
            countdown_remaining_ms: self.countdown_remaining_ms,
            travel_time_ms: self
                .session
                .as_ref()
                .map_or(0.0, PlaySession::travel_time_ms),
            frame,
        }
    }

    pub fn render(&self, renderer: &HighwayRenderer, target: &mut impl RenderTarget) -> Result<()> {
        renderer.draw(&self.snapshot().frame, target)
    }
}
