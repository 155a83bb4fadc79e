//! Lane Runner - simulation core for a three-lane endless runner
//!
//! Core modules:
//! - `sim`: Player controller, timed effects, smoothing, hit events
//! - `game`: Top-level state machine (menu, gameplay, game over, leaderboard)
//! - `tuning`: Data-driven game balance
//! - `audio`, `ui`, `leaderboard`, `settings`, `input`: collaborator interfaces

pub mod audio;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use game::{GameSession, GameState, GameStateMachine};
pub use settings::{Settings, SettingsStore};
pub use tuning::{Tuning, TuningError};

/// Fixed layout constants
pub mod consts {
    /// Lateral lane offsets, in lane widths
    pub const LANE_POSITIONS: [f32; 3] = [-1.0, 0.0, 1.0];
    pub const LANE_COUNT: usize = LANE_POSITIONS.len();
    /// Lane the player starts (and resets) in
    pub const MIDDLE_LANE: usize = 1;

    /// Characters in the leaderboard initials
    pub const INITIALS_LEN: usize = 3;

    /// Frame step used by the demo loop (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}
