//! Per-frame input snapshot
//!
//! The host polls its devices once per frame and hands the result to the game.

use glam::Vec2;

/// Touch gesture phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
}

/// A touch sample in normalized screen coordinates (0..1, y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub phase: TouchPhase,
    pub position: Vec2,
}

/// Which binding edits the initials on the game over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Keyboard,
    Touch,
}

/// Discrete inputs for one frame (edge-triggered)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Confirm / start / pause
    pub select: bool,
    /// Back / quit to menu
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub touch: Option<Touch>,
}

impl InputSnapshot {
    pub fn select() -> Self {
        Self {
            select: true,
            ..Default::default()
        }
    }

    pub fn back() -> Self {
        Self {
            back: true,
            ..Default::default()
        }
    }

    pub fn left() -> Self {
        Self {
            left: true,
            ..Default::default()
        }
    }

    pub fn right() -> Self {
        Self {
            right: true,
            ..Default::default()
        }
    }

    pub fn up() -> Self {
        Self {
            up: true,
            ..Default::default()
        }
    }

    pub fn down() -> Self {
        Self {
            down: true,
            ..Default::default()
        }
    }

    pub fn touch(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self {
            touch: Some(Touch {
                phase,
                position: Vec2::new(x, y),
            }),
            ..Default::default()
        }
    }
}
