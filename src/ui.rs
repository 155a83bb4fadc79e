//! UI collaborator interface and the initials entry buffer

use glam::Vec2;

use crate::consts::INITIALS_LEN;
use crate::game::GameState;
use crate::leaderboard::{PlayerRank, ScoreEntry};

/// Menu, HUD and leaderboard presentation
pub trait UiSink {
    /// Show the panels belonging to `state`
    fn update_visibility(&mut self, state: GameState);

    fn set_paused(&mut self, paused: bool);

    /// Initials being edited, with the selected slot
    fn show_initials(&mut self, initials: &str, slot: usize);

    fn show_game_over_score(&mut self, score: u32);

    fn set_personal_best(&mut self, visible: bool);

    fn show_powerup(&mut self, name: &str);

    /// Hazard hit feedback (camera shake, sparks)
    fn hit_feedback(&mut self);

    fn set_warnings(&mut self, warning: bool, critical: bool);

    fn show_loading_leaderboard(&mut self);

    fn show_leaderboard(
        &mut self,
        identity: &str,
        initials: &str,
        score: u32,
        rank: PlayerRank,
        scores: &[ScoreEntry],
    );
}

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Three-letter initials editor driven by keys or touch drags
#[derive(Debug, Clone, PartialEq)]
pub struct InitialsEntry {
    /// Alphabet index per slot
    letters: [usize; INITIALS_LEN],
    slot: usize,
    /// Vertical touch position the current drag is measured from
    drag_anchor: Option<f32>,
    touch_step: f32,
}

impl InitialsEntry {
    pub fn new(touch_step: f32) -> Self {
        Self {
            letters: [0; INITIALS_LEN],
            slot: 0,
            drag_anchor: None,
            touch_step,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Move the slot cursor, clamped to the ends
    pub fn move_slot(&mut self, delta: i32) {
        let slot = self.slot as i32 + delta;
        self.slot = slot.clamp(0, INITIALS_LEN as i32 - 1) as usize;
    }

    /// Cycle the selected letter, wrapping around the alphabet
    pub fn cycle_letter(&mut self, delta: i32) {
        let len = ALPHABET.len() as i32;
        let letter = &mut self.letters[self.slot];
        *letter = (*letter as i32 + delta).rem_euclid(len) as usize;
    }

    /// Touch down: pick the slot under the finger
    pub fn touch_began(&mut self, position: Vec2) {
        let slot = (position.x * INITIALS_LEN as f32).floor() as i32;
        self.slot = slot.clamp(0, INITIALS_LEN as i32 - 1) as usize;
        self.drag_anchor = Some(position.y);
    }

    /// Touch drag: one letter per `touch_step` of vertical travel (up = next)
    pub fn touch_moved(&mut self, position: Vec2) {
        let Some(anchor) = self.drag_anchor else {
            self.touch_began(position);
            return;
        };
        let steps = ((position.y - anchor) / self.touch_step).trunc() as i32;
        if steps != 0 {
            self.cycle_letter(steps);
            self.drag_anchor = Some(anchor + steps as f32 * self.touch_step);
        }
    }

    pub fn as_string(&self) -> String {
        self.letters.iter().map(|&i| ALPHABET[i] as char).collect()
    }
}

/// UI that only logs, used by the headless runner
#[derive(Debug, Default)]
pub struct LogUi {
    pub state: Option<GameState>,
    pub paused: bool,
    pub last_toast: Option<String>,
}

impl UiSink for LogUi {
    fn update_visibility(&mut self, state: GameState) {
        log::info!("UI: showing {:?}", state);
        self.state = Some(state);
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn show_initials(&mut self, initials: &str, slot: usize) {
        log::debug!("UI: initials {} (slot {})", initials, slot);
    }

    fn show_game_over_score(&mut self, score: u32) {
        log::info!("UI: Distance: {}", score);
    }

    fn set_personal_best(&mut self, visible: bool) {
        if visible {
            log::info!("UI: new personal best!");
        }
    }

    fn show_powerup(&mut self, name: &str) {
        log::info!("UI: powerup {}", name);
        self.last_toast = Some(name.to_string());
    }

    fn hit_feedback(&mut self) {
        log::debug!("UI: shake");
    }

    fn set_warnings(&mut self, warning: bool, critical: bool) {
        log::debug!("UI: warning {} critical {}", warning, critical);
    }

    fn show_loading_leaderboard(&mut self) {
        log::info!("UI: loading leaderboard...");
    }

    fn show_leaderboard(
        &mut self,
        _identity: &str,
        initials: &str,
        score: u32,
        rank: PlayerRank,
        scores: &[ScoreEntry],
    ) {
        log::info!("UI: {} scored {} ({})", initials, score, rank);
        for (i, entry) in scores.iter().enumerate() {
            log::info!("  {:>2}. {} {:>6} {:>4}s", i + 1, entry.initials, entry.score, entry.duration);
        }
    }
}
