//! Lane Runner headless entry point
//!
//! Plays scripted sessions against the logging collaborators so the whole
//! state machine can be watched from the console (`RUST_LOG=debug`).

use std::path::PathBuf;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use lane_runner::audio::{Clip, LogAudio};
use lane_runner::consts::FRAME_DT;
use lane_runner::input::InputSnapshot;
use lane_runner::leaderboard::LocalLeaderboard;
use lane_runner::settings::FileSettings;
use lane_runner::sim::HitKind;
use lane_runner::ui::LogUi;
use lane_runner::{GameState, GameStateMachine, Tuning};

/// Upper bound on a single run, in frames
const MAX_RUN_FRAMES: u32 = 60 * 60 * 5;
/// Frames spent waiting on the leaderboard screen
const LEADERBOARD_FRAMES: u32 = 60 * 12;
const RUNS: u32 = 3;

type Game = GameStateMachine<LogAudio, LogUi, LocalLeaderboard, FileSettings>;

fn load_tuning() -> Tuning {
    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        return Tuning::default();
    };
    match Tuning::load(&path) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::warn!("Using default tuning: {e}");
            Tuning::default()
        }
    }
}

/// One frame of scripted play: random hits plus the odd lane change
fn play_frame(game: &mut Game, rng: &mut Pcg32) -> InputSnapshot {
    if rng.random_bool(0.02) {
        let kind = match rng.random_range(0..10) {
            0..=5 => HitKind::Hazard,
            6 => HitKind::Repair,
            7..=8 => HitKind::SpeedBoost,
            _ => HitKind::Jump,
        };
        let hits = game.hits_mut();
        let source = hits.spawn(kind);
        hits.publish(source);
        // Touching twice only counts once
        hits.publish(source);
        hits.despawn(source);
    }

    if rng.random_bool(0.03) {
        if rng.random_bool(0.5) {
            InputSnapshot::left()
        } else {
            InputSnapshot::right()
        }
    } else {
        InputSnapshot::default()
    }
}

fn run_session(game: &mut Game, rng: &mut Pcg32) {
    game.tick(&InputSnapshot::select(), FRAME_DT);

    let mut frames = 0;
    while game.state() == GameState::InGame && frames < MAX_RUN_FRAMES {
        let input = play_frame(game, rng);
        game.tick(&input, FRAME_DT);
        frames += 1;
    }
    if game.state() != GameState::GameOver {
        log::warn!("Run did not end after {} frames, back to menu", frames);
        game.tick(&InputSnapshot::back(), FRAME_DT);
        return;
    }

    // Random initials
    for _ in 0..lane_runner::consts::INITIALS_LEN {
        for _ in 0..rng.random_range(0..26) {
            game.tick(&InputSnapshot::up(), FRAME_DT);
        }
        game.tick(&InputSnapshot::right(), FRAME_DT);
    }
    game.tick(&InputSnapshot::select(), FRAME_DT);

    for _ in 0..LEADERBOARD_FRAMES {
        if !game.is_fetching() {
            break;
        }
        game.tick(&InputSnapshot::default(), FRAME_DT);
    }
    log::info!(
        "Run finished: score {}, {}s, {}",
        game.session().final_score,
        game.session().final_duration,
        game.session().player_rank
    );
    game.tick(&InputSnapshot::back(), FRAME_DT);
}

fn main() {
    env_logger::init();
    log::info!("Lane Runner (headless) starting...");

    let tuning = load_tuning();
    let settings_path = std::env::temp_dir().join("lane-runner-settings.json");

    let audio = LogAudio::new().with_clip_length(Clip::GameMusicIntro, 6.0);
    let mut game = match GameStateMachine::new(
        tuning,
        audio,
        LogUi::default(),
        LocalLeaderboard::with_latency(30),
        FileSettings::open(&settings_path),
    ) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Invalid tuning: {e}");
            std::process::exit(1);
        }
    };

    let seed = std::env::var("LANE_RUNNER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let mut rng = Pcg32::seed_from_u64(seed);

    for run in 1..=RUNS {
        log::info!("--- Run {} ---", run);
        run_session(&mut game, &mut rng);
    }

    game.tick(&InputSnapshot::back(), FRAME_DT);
    log::info!(
        "Best score: {}, quit: {}",
        game.settings().settings().best_score,
        game.quit_requested()
    );
}
