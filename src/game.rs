//! Top-level game state machine
//!
//! Start → InGame → GameOver → Leaderboard → Start, plus quit-to-menu from
//! gameplay. Owns the player controller and the hit bus, and drives the audio,
//! UI, leaderboard and settings collaborators passed in at construction.

use crate::audio::{AudioSink, Clip, SoundHandle};
use crate::input::{InputMode, InputSnapshot, TouchPhase};
use crate::leaderboard::{FetchStatus, LeaderboardFetch, LeaderboardProvider, PlayerRank, ScoreEntry};
use crate::settings::SettingsStore;
use crate::sim::{
    Command, HealthWarning, HitEventBus, PlayerController, PlayerEvent, Scheduler, TimerHandle,
};
use crate::tuning::{Tuning, TuningError};
use crate::ui::{InitialsEntry, UiSink};

/// Top-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Start,
    InGame,
    GameOver,
    Leaderboard,
}

/// Results of the current run, cleared on every return to Start
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameSession {
    pub final_score: u32,
    pub final_duration: u32,
    pub player_identity: Option<String>,
    pub player_initials: Option<String>,
    pub is_personal_best: bool,
    pub leaderboard: Vec<ScoreEntry>,
    pub player_rank: PlayerRank,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GameTimer {
    /// Intro finished; switch to the looping track
    StartMusicLoop,
    /// HUD warning blink step
    WarningBlink,
}

/// Drives a whole play session
pub struct GameStateMachine<A, U, L, S> {
    tuning: Tuning,
    state: GameState,
    player: PlayerController,
    hits: HitEventBus,
    timers: Scheduler<GameTimer>,
    session: GameSession,
    initials: InitialsEntry,
    input_mode: InputMode,
    fetch: Option<LeaderboardFetch>,
    paused: bool,
    quit_requested: bool,

    music: Option<SoundHandle>,
    music_loop: Option<TimerHandle>,
    damage_sound: Option<SoundHandle>,
    blink_phase: u32,
    warnings_shown: (bool, bool),

    /// Player notifications from the last tick
    frame_events: Vec<PlayerEvent>,

    audio: A,
    ui: U,
    leaderboard: L,
    settings: S,
}

impl<A, U, L, S> GameStateMachine<A, U, L, S>
where
    A: AudioSink,
    U: UiSink,
    L: LeaderboardProvider,
    S: SettingsStore,
{
    /// Validate the tuning and open on the main menu
    pub fn new(
        tuning: Tuning,
        audio: A,
        ui: U,
        leaderboard: L,
        settings: S,
    ) -> Result<Self, TuningError> {
        tuning.validate()?;

        let mut timers = Scheduler::new();
        timers.schedule_repeating(tuning.warning_blink_interval, GameTimer::WarningBlink);

        let mut game = Self {
            player: PlayerController::new(tuning.clone()),
            initials: InitialsEntry::new(tuning.touch_letter_step),
            tuning,
            state: GameState::Start,
            hits: HitEventBus::new(),
            timers,
            session: GameSession::default(),
            input_mode: InputMode::default(),
            fetch: None,
            paused: false,
            quit_requested: false,
            music: None,
            music_loop: None,
            damage_sound: None,
            blink_phase: 0,
            warnings_shown: (false, false),
            frame_events: Vec::new(),
            audio,
            ui,
            leaderboard,
            settings,
        };
        game.main_menu();
        Ok(game)
    }

    /// Use the touch binding for initials entry
    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    /// Hit bus for collectibles and hazards to publish on
    pub fn hits_mut(&mut self) -> &mut HitEventBus {
        &mut self.hits
    }

    pub fn initials(&self) -> &InitialsEntry {
        &self.initials
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Still waiting on the leaderboard download
    pub fn is_fetching(&self) -> bool {
        self.fetch.is_some()
    }

    /// Player notifications produced during the last tick
    pub fn frame_events(&self) -> &[PlayerEvent] {
        &self.frame_events
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn leaderboard(&self) -> &L {
        &self.leaderboard
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &InputSnapshot, dt: f32) {
        self.frame_events.clear();

        self.handle_input(input);

        if self.state == GameState::InGame && !self.paused {
            for hit in self.hits.drain() {
                log::debug!("Hit {} from source {}", hit.kind.as_str(), hit.source.0);
                self.player.on_hit(hit.kind);
            }
            self.player.tick(dt);
            for event in self.player.drain_events() {
                self.frame_events.push(event);
                self.handle_player_event(event);
            }
        }

        // Game timers follow simulation time, so they freeze with the pause
        if !self.paused {
            for timer in self.timers.tick(dt) {
                match timer {
                    GameTimer::StartMusicLoop => {
                        self.music_loop = None;
                        self.switch_music(Clip::GameMusicLoop, true);
                    }
                    GameTimer::WarningBlink => {
                        self.blink_phase = self.blink_phase.wrapping_add(1);
                    }
                }
            }
        }

        if self.state == GameState::Leaderboard {
            self.poll_leaderboard(dt);
        }

        self.update_warnings();
    }

    fn handle_input(&mut self, input: &InputSnapshot) {
        match self.state {
            GameState::Start => {
                if input.select {
                    self.start_game();
                } else if input.back {
                    log::info!("Quit requested");
                    self.quit_requested = true;
                }
            }

            GameState::InGame => {
                if input.select {
                    self.toggle_pause();
                } else if input.back {
                    self.main_menu();
                } else if self.paused {
                    if input.left || input.right {
                        log::debug!("Lane input ignored while paused");
                    }
                } else if input.left {
                    self.player.issue_command(Command::Left);
                } else if input.right {
                    self.player.issue_command(Command::Right);
                }
            }

            GameState::GameOver => {
                if input.select {
                    self.submit();
                } else if input.back {
                    self.main_menu();
                } else {
                    self.edit_initials(input);
                }
            }

            GameState::Leaderboard => {
                if input.select {
                    self.start_game();
                } else if input.back {
                    self.main_menu();
                }
            }
        }
    }

    fn edit_initials(&mut self, input: &InputSnapshot) {
        let edited = match self.input_mode {
            InputMode::Touch => match input.touch {
                Some(touch) => {
                    match touch.phase {
                        TouchPhase::Began => self.initials.touch_began(touch.position),
                        TouchPhase::Moved => self.initials.touch_moved(touch.position),
                    }
                    true
                }
                None => false,
            },
            InputMode::Keyboard => {
                if input.left {
                    self.initials.move_slot(-1);
                } else if input.right {
                    self.initials.move_slot(1);
                } else if input.up {
                    self.initials.cycle_letter(1);
                } else if input.down {
                    self.initials.cycle_letter(-1);
                } else {
                    return;
                }
                true
            }
        };
        if edited {
            self.ui
                .show_initials(&self.initials.as_string(), self.initials.slot());
        }
    }

    fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Damaged { .. } => {
                self.audio.play_sound(Clip::Hit.name(), false);
                self.ui.hit_feedback();
            }
            PlayerEvent::PowerupShown(powerup) => {
                self.audio.play_sound(Clip::Powerup.name(), false);
                self.ui.show_powerup(powerup.name());
            }
            PlayerEvent::Exploded => {
                self.audio.play_sound(Clip::Explosion.name(), false);
            }
            PlayerEvent::Died => self.on_player_died(),
            PlayerEvent::CommandIssued { .. }
            | PlayerEvent::LaneChanged { .. }
            | PlayerEvent::InvulnerabilityEnded => {}
        }
    }

    fn set_state(&mut self, state: GameState) {
        log::debug!("State {:?} -> {:?}", self.state, state);
        self.state = state;
        self.ui.update_visibility(state);
    }

    fn switch_music(&mut self, clip: Clip, looping: bool) {
        if let Some(handle) = self.music.take() {
            self.audio.stop_sound(handle);
        }
        self.music = Some(self.audio.play_sound(clip.name(), looping));
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.audio.pause_all(paused);
        self.ui.set_paused(paused);
    }

    fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
    }

    /// Fresh player, nothing pending from the previous run
    fn reset(&mut self) {
        self.player.reset();
        self.hits.clear();
        self.fetch = None;
        if self.paused {
            self.set_paused(false);
        }

        if let Some(handle) = self.music_loop.take() {
            self.timers.cancel(handle);
            if let Some(music) = self.music.take() {
                self.audio.stop_sound(music);
            }
        }
    }

    fn main_menu(&mut self) {
        self.reset();
        self.session = GameSession::default();
        self.switch_music(Clip::MainMenuMusic, true);
        self.set_state(GameState::Start);
    }

    fn start_game(&mut self) {
        self.set_state(GameState::InGame);
        self.reset();

        self.switch_music(Clip::GameMusicIntro, false);
        let intro = self
            .audio
            .clip_length(Clip::GameMusicIntro.name())
            .unwrap_or(self.tuning.default_intro_length);
        self.music_loop = Some(self.timers.schedule(intro, GameTimer::StartMusicLoop));
        log::info!("Game started");
    }

    fn on_player_died(&mut self) {
        let player = self.player.player();
        self.session.final_score = player.distance as u32;
        self.session.final_duration = player.duration as u32;

        let best = self.settings.best_score();
        self.session.is_personal_best = best < self.session.final_score;
        self.ui.set_personal_best(self.session.is_personal_best);
        if self.session.is_personal_best {
            self.settings.set_best_score(self.session.final_score);
        }
        log::info!(
            "Final score: {}, best: {}",
            self.session.final_score,
            best
        );

        self.ui.show_game_over_score(self.session.final_score);
        self.set_state(GameState::GameOver);

        // Died during the intro: the loop must not replace the menu music
        if let Some(handle) = self.music_loop.take() {
            self.timers.cancel(handle);
        }
        self.switch_music(Clip::MainMenuMusic, true);
    }

    fn submit(&mut self) {
        let initials = self.initials.as_string();
        let identity = self.settings.player_identity();

        self.leaderboard.add_score(
            &identity,
            self.session.final_score,
            self.session.final_duration,
            &initials,
        );
        self.session.player_identity = Some(identity);
        self.session.player_initials = Some(initials);

        self.ui.show_loading_leaderboard();
        self.set_state(GameState::Leaderboard);
        self.fetch = Some(LeaderboardFetch::new(self.tuning.leaderboard_timeout));
    }

    fn poll_leaderboard(&mut self, dt: f32) {
        let Some(fetch) = self.fetch.as_mut() else {
            return;
        };
        let FetchStatus::Ready { scores, timed_out } = fetch.poll(&mut self.leaderboard, dt) else {
            return;
        };
        self.fetch = None;
        if timed_out {
            log::warn!("Showing leaderboard without scores");
        }

        let identity = self.session.player_identity.clone().unwrap_or_default();
        let initials = self.session.player_initials.clone().unwrap_or_default();
        let rank = PlayerRank::find(&scores, &identity);
        log::info!("Player placed {} out of {}", rank, scores.len());

        self.ui.show_leaderboard(
            &identity,
            &initials,
            self.session.final_score,
            rank,
            &scores,
        );
        self.session.player_rank = rank;
        self.session.leaderboard = scores;
    }

    /// Blink the damage indicators and pulse the alarm at critical health
    fn update_warnings(&mut self) {
        let level = if self.state == GameState::InGame {
            self.player.health_warning()
        } else {
            HealthWarning::None
        };

        // 0.5s period for critical, 1s for warning, on for the second half
        let show_critical = level == HealthWarning::Critical && self.blink_phase % 2 == 1;
        let show_warning = level == HealthWarning::Warning && (self.blink_phase / 2) % 2 == 1;

        if show_critical && self.damage_sound.is_none() {
            self.damage_sound = Some(self.audio.play_sound(Clip::Damage.name(), true));
        } else if !show_critical {
            if let Some(handle) = self.damage_sound.take() {
                self.audio.stop_sound(handle);
            }
        }

        if self.warnings_shown != (show_warning, show_critical) {
            self.warnings_shown = (show_warning, show_critical);
            self.ui.set_warnings(show_warning, show_critical);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::LocalLeaderboard;
    use crate::settings::Settings;
    use crate::sim::HitKind;

    const DT: f32 = 0.25;

    #[derive(Debug, Default)]
    struct RecordingAudio {
        next: u64,
        started: Vec<(String, bool)>,
        stopped: Vec<SoundHandle>,
        live: Vec<(SoundHandle, String)>,
        paused: bool,
        /// Overrides the 2s intro
        intro_length: Option<f32>,
    }

    impl RecordingAudio {
        fn playing(&self, clip: Clip) -> bool {
            self.live.iter().any(|(_, name)| name == clip.name())
        }
    }

    impl AudioSink for RecordingAudio {
        fn play_sound(&mut self, name: &str, looping: bool) -> SoundHandle {
            self.next += 1;
            let handle = SoundHandle(self.next);
            self.started.push((name.to_string(), looping));
            self.live.push((handle, name.to_string()));
            handle
        }

        fn stop_sound(&mut self, handle: SoundHandle) {
            self.stopped.push(handle);
            self.live.retain(|(h, _)| *h != handle);
        }

        fn pause_all(&mut self, paused: bool) {
            self.paused = paused;
        }

        fn clip_length(&self, name: &str) -> Option<f32> {
            (name == Clip::GameMusicIntro.name()).then_some(self.intro_length.unwrap_or(2.0))
        }
    }

    #[derive(Debug, Default)]
    struct RecordingUi {
        states: Vec<GameState>,
        paused: bool,
        initials: Option<(String, usize)>,
        score: Option<u32>,
        personal_best: Option<bool>,
        toasts: Vec<String>,
        hit_feedback: u32,
        warnings: Vec<(bool, bool)>,
        loading: u32,
        shown: Option<(String, u32, PlayerRank, usize)>,
    }

    impl UiSink for RecordingUi {
        fn update_visibility(&mut self, state: GameState) {
            self.states.push(state);
        }
        fn set_paused(&mut self, paused: bool) {
            self.paused = paused;
        }
        fn show_initials(&mut self, initials: &str, slot: usize) {
            self.initials = Some((initials.to_string(), slot));
        }
        fn show_game_over_score(&mut self, score: u32) {
            self.score = Some(score);
        }
        fn set_personal_best(&mut self, visible: bool) {
            self.personal_best = Some(visible);
        }
        fn show_powerup(&mut self, name: &str) {
            self.toasts.push(name.to_string());
        }
        fn hit_feedback(&mut self) {
            self.hit_feedback += 1;
        }
        fn set_warnings(&mut self, warning: bool, critical: bool) {
            self.warnings.push((warning, critical));
        }
        fn show_loading_leaderboard(&mut self) {
            self.loading += 1;
        }
        fn show_leaderboard(
            &mut self,
            _identity: &str,
            initials: &str,
            score: u32,
            rank: PlayerRank,
            scores: &[ScoreEntry],
        ) {
            self.shown = Some((initials.to_string(), score, rank, scores.len()));
        }
    }

    type TestGame = GameStateMachine<RecordingAudio, RecordingUi, LocalLeaderboard, Settings>;

    fn game_with(tuning: Tuning, leaderboard: LocalLeaderboard, settings: Settings) -> TestGame {
        GameStateMachine::new(
            tuning,
            RecordingAudio::default(),
            RecordingUi::default(),
            leaderboard,
            settings,
        )
        .unwrap()
    }

    fn game() -> TestGame {
        game_with(Tuning::default(), LocalLeaderboard::new(), Settings::default())
    }

    fn idle(game: &mut TestGame, seconds: f32) {
        for _ in 0..(seconds / DT).round() as usize {
            game.tick(&InputSnapshot::default(), DT);
        }
    }

    fn press(game: &mut TestGame, input: InputSnapshot) {
        game.tick(&input, DT);
    }

    /// Hit the player with hazards until the died event lands
    fn crash(game: &mut TestGame) {
        while game.state() == GameState::InGame {
            let rock = game.hits_mut().spawn(HitKind::Hazard);
            game.hits_mut().publish(rock);
            idle(game, 2.5);
        }
    }

    #[test]
    fn test_opens_on_menu_with_music() {
        let game = game();
        assert_eq!(game.state(), GameState::Start);
        assert_eq!(game.ui().states, vec![GameState::Start]);
        assert!(game.audio().playing(Clip::MainMenuMusic));
    }

    #[test]
    fn test_rejects_invalid_tuning() {
        let result = GameStateMachine::new(
            Tuning {
                max_health: 0,
                ..Default::default()
            },
            RecordingAudio::default(),
            RecordingUi::default(),
            LocalLeaderboard::new(),
            Settings::default(),
        );
        assert!(matches!(result, Err(TuningError::ZeroMaxHealth)));
    }

    #[test]
    fn test_back_on_menu_requests_quit() {
        let mut game = game();
        press(&mut game, InputSnapshot::back());
        assert!(game.quit_requested());
        assert_eq!(game.state(), GameState::Start);
    }

    #[test]
    fn test_intro_then_loop_music() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        assert_eq!(game.state(), GameState::InGame);
        assert!(game.audio().playing(Clip::GameMusicIntro));
        assert!(!game.audio().playing(Clip::MainMenuMusic));

        // Intro is 2s long; the select frame already counted one step
        idle(&mut game, 1.5);
        assert!(game.audio().playing(Clip::GameMusicIntro));
        idle(&mut game, 0.25);
        assert!(game.audio().playing(Clip::GameMusicLoop));
        assert!(!game.audio().playing(Clip::GameMusicIntro));
    }

    #[test]
    fn test_back_to_menu_cancels_music_loop() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        press(&mut game, InputSnapshot::back());
        assert_eq!(game.state(), GameState::Start);

        idle(&mut game, 5.0);
        assert!(game.audio().playing(Clip::MainMenuMusic));
        assert!(!game.audio().playing(Clip::GameMusicLoop));
        assert!(!game.audio().playing(Clip::GameMusicIntro));
    }

    #[test]
    fn test_death_during_intro_keeps_menu_music() {
        let audio = RecordingAudio {
            intro_length: Some(20.0),
            ..Default::default()
        };
        let mut game = GameStateMachine::new(
            Tuning::default(),
            audio,
            RecordingUi::default(),
            LocalLeaderboard::new(),
            Settings::default(),
        )
        .unwrap();
        press(&mut game, InputSnapshot::select());
        crash(&mut game);
        assert_eq!(game.state(), GameState::GameOver);

        // Well past where the intro would have ended
        idle(&mut game, 20.0);
        assert!(game.audio().playing(Clip::MainMenuMusic));
        assert!(!game.audio().playing(Clip::GameMusicLoop));
        assert!(!game.audio().playing(Clip::GameMusicIntro));
        assert!(
            !game
                .audio()
                .started
                .iter()
                .any(|(name, _)| name == Clip::GameMusicLoop.name())
        );
    }

    #[test]
    fn test_lane_input_moves_player() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        press(&mut game, InputSnapshot::left());
        assert!(matches!(
            game.frame_events().first(),
            Some(PlayerEvent::CommandIssued {
                command: Command::Left,
                ..
            })
        ));
        idle(&mut game, 0.5);
        assert_eq!(game.player().player().lane_index, 0);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        idle(&mut game, 1.0);

        press(&mut game, InputSnapshot::select());
        assert!(game.is_paused());
        assert!(game.audio().paused);
        assert!(game.ui().paused);

        let distance = game.player().player().distance;
        press(&mut game, InputSnapshot::right());
        idle(&mut game, 5.0);
        assert_eq!(game.player().player().distance, distance);
        assert_eq!(game.player().pending_commands(), 0);
        // Intro timer is frozen too
        assert!(game.audio().playing(Clip::GameMusicIntro));

        press(&mut game, InputSnapshot::select());
        assert!(!game.is_paused());
        assert!(!game.audio().paused);
        idle(&mut game, 1.0);
        assert!(game.player().player().distance > distance);
    }

    #[test]
    fn test_back_while_paused_resumes_audio() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        press(&mut game, InputSnapshot::select());
        press(&mut game, InputSnapshot::back());

        assert_eq!(game.state(), GameState::Start);
        assert!(!game.is_paused());
        assert!(!game.audio().paused);
        assert!(!game.ui().paused);
    }

    #[test]
    fn test_hits_only_delivered_in_game() {
        let mut game = game();
        let rock = game.hits_mut().spawn(HitKind::Hazard);
        game.hits_mut().publish(rock);

        // Starting a run clears anything queued on the menu
        press(&mut game, InputSnapshot::select());
        idle(&mut game, 0.5);
        assert_eq!(game.player().player().health, 3);

        let rock = game.hits_mut().spawn(HitKind::Hazard);
        game.hits_mut().publish(rock);
        idle(&mut game, 0.25);
        assert_eq!(game.player().player().health, 2);
        assert_eq!(game.ui().hit_feedback, 1);
        assert!(game.audio().started.iter().any(|(n, _)| n == "Hit"));
    }

    #[test]
    fn test_powerup_toast() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        let repair = game.hits_mut().spawn(HitKind::Repair);
        game.hits_mut().publish(repair);
        idle(&mut game, 0.25);
        assert_eq!(game.ui().toasts, vec!["Repair".to_string()]);
    }

    #[test]
    fn test_death_captures_score_and_personal_best() {
        let mut game = game_with(
            Tuning::default(),
            LocalLeaderboard::new(),
            Settings {
                best_score: 5,
                player_identity: None,
            },
        );
        press(&mut game, InputSnapshot::select());
        idle(&mut game, 2.0);
        crash(&mut game);

        assert_eq!(game.state(), GameState::GameOver);
        let session = game.session();
        assert!(session.final_score > 5);
        assert!(session.is_personal_best);
        assert_eq!(game.settings().best_score, session.final_score);
        assert_eq!(game.ui().personal_best, Some(true));
        assert_eq!(game.ui().score, Some(session.final_score));
        assert!(game.audio().playing(Clip::MainMenuMusic));
    }

    #[test]
    fn test_worse_run_keeps_best() {
        let mut game = game_with(
            Tuning::default(),
            LocalLeaderboard::new(),
            Settings {
                best_score: 1_000_000,
                player_identity: None,
            },
        );
        press(&mut game, InputSnapshot::select());
        crash(&mut game);
        assert!(!game.session().is_personal_best);
        assert_eq!(game.settings().best_score, 1_000_000);
        assert_eq!(game.ui().personal_best, Some(false));
    }

    #[test]
    fn test_initials_keyboard_binding() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        crash(&mut game);

        press(&mut game, InputSnapshot::up());
        press(&mut game, InputSnapshot::right());
        press(&mut game, InputSnapshot::down());
        assert_eq!(game.initials().as_string(), "BZA");
        assert_eq!(game.ui().initials, Some(("BZA".to_string(), 1)));
    }

    #[test]
    fn test_initials_touch_binding() {
        let mut game = game().with_input_mode(InputMode::Touch);
        press(&mut game, InputSnapshot::select());
        crash(&mut game);

        press(&mut game, InputSnapshot::touch(TouchPhase::Began, 0.9, 0.5));
        press(&mut game, InputSnapshot::touch(TouchPhase::Moved, 0.9, 0.7));
        // Arrow keys do nothing in touch mode
        press(&mut game, InputSnapshot::up());
        assert_eq!(game.initials().as_string(), "AAC");
    }

    #[test]
    fn test_submit_and_rank() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        crash(&mut game);
        press(&mut game, InputSnapshot::up());

        press(&mut game, InputSnapshot::select());
        assert_eq!(game.state(), GameState::Leaderboard);
        assert_eq!(game.ui().loading, 1);
        // The local board answers on the first poll
        assert!(!game.is_fetching());

        let session = game.session();
        let identity = session.player_identity.clone().unwrap();
        assert_eq!(game.settings().player_identity.as_deref(), Some(identity.as_str()));
        assert_eq!(session.player_initials.as_deref(), Some("BAA"));
        assert_eq!(session.player_rank, PlayerRank::Ranked(0));
        assert_eq!(session.leaderboard.len(), 1);
        let (initials, score, rank, count) = game.ui().shown.clone().unwrap();
        assert_eq!(initials, "BAA");
        assert_eq!(score, session.final_score);
        assert_eq!(rank.place(), Some(1));
        assert_eq!(count, 1);
    }

    #[test]
    fn test_identity_reused_across_runs() {
        let mut game = game();
        let mut identities = Vec::new();
        for _ in 0..2 {
            press(&mut game, InputSnapshot::select());
            crash(&mut game);
            press(&mut game, InputSnapshot::select());
            identities.push(game.session().player_identity.clone().unwrap());
            press(&mut game, InputSnapshot::back());
        }
        assert_eq!(identities[0], identities[1]);
        assert_eq!(game.leaderboard().entries.len(), 1);
    }

    #[test]
    fn test_leaderboard_wait_and_timeout() {
        // Download never finishes within the timeout
        let mut game = game_with(
            Tuning::default(),
            LocalLeaderboard::with_latency(1000),
            Settings::default(),
        );
        press(&mut game, InputSnapshot::select());
        crash(&mut game);
        press(&mut game, InputSnapshot::select());
        assert!(game.is_fetching());

        idle(&mut game, 9.5);
        assert!(game.is_fetching());
        assert!(game.ui().shown.is_none());

        idle(&mut game, 1.0);
        assert!(!game.is_fetching());
        let (_, _, rank, count) = game.ui().shown.clone().unwrap();
        assert_eq!(rank, PlayerRank::Unranked);
        assert_eq!(count, 0);
        assert_eq!(game.state(), GameState::Leaderboard);
    }

    #[test]
    fn test_leaving_leaderboard_drops_fetch() {
        let mut game = game_with(
            Tuning::default(),
            LocalLeaderboard::with_latency(1000),
            Settings::default(),
        );
        press(&mut game, InputSnapshot::select());
        crash(&mut game);
        press(&mut game, InputSnapshot::select());

        // Play again before the scores arrive
        press(&mut game, InputSnapshot::select());
        assert_eq!(game.state(), GameState::InGame);
        assert!(!game.is_fetching());
        idle(&mut game, 12.0);
        assert!(game.ui().shown.is_none());
    }

    #[test]
    fn test_back_to_start_clears_session() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        crash(&mut game);
        assert!(game.session().final_score > 0);

        press(&mut game, InputSnapshot::back());
        assert_eq!(game.state(), GameState::Start);
        assert_eq!(*game.session(), GameSession::default());
    }

    #[test]
    fn test_critical_warning_blinks_with_alarm() {
        let mut game = game();
        press(&mut game, InputSnapshot::select());
        for _ in 0..2 {
            let rock = game.hits_mut().spawn(HitKind::Hazard);
            game.hits_mut().publish(rock);
            idle(&mut game, 2.5);
        }
        assert_eq!(game.player().health_warning(), HealthWarning::Critical);

        let mut alarm_on = 0;
        let mut alarm_off = 0;
        for _ in 0..8 {
            idle(&mut game, DT);
            if game.audio().playing(Clip::Damage) {
                alarm_on += 1;
            } else {
                alarm_off += 1;
            }
        }
        assert_eq!(alarm_on, 4);
        assert_eq!(alarm_off, 4);
        assert!(game.ui().warnings.contains(&(false, true)));

        // Back to the menu silences everything
        press(&mut game, InputSnapshot::back());
        assert!(!game.audio().playing(Clip::Damage));
        assert_eq!(game.ui().warnings.last(), Some(&(false, false)));
    }
}
