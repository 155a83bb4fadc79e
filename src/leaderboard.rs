//! Leaderboard provider interface and score polling
//!
//! The remote service is opaque: scores go in with `add_score`, a high-to-low
//! list comes back from `fetch_sorted` once it is ready.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of scores kept by `LocalLeaderboard`
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Unique player identity
    pub identity: String,
    pub initials: String,
    /// Distance travelled
    pub score: u32,
    /// Seconds survived
    pub duration: u32,
}

/// Leaderboard backend
pub trait LeaderboardProvider {
    fn add_score(&mut self, identity: &str, score: u32, duration: u32, initials: &str);

    /// Scores sorted high to low; empty while a download is still pending
    fn fetch_sorted(&mut self) -> Vec<ScoreEntry>;
}

/// Where the submitted score landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerRank {
    /// 0-based position in the high-to-low list
    Ranked(usize),
    #[default]
    Unranked,
}

impl PlayerRank {
    /// Locate `identity` in a sorted list
    pub fn find(scores: &[ScoreEntry], identity: &str) -> Self {
        scores
            .iter()
            .position(|e| e.identity == identity)
            .map_or(PlayerRank::Unranked, PlayerRank::Ranked)
    }

    /// 1-indexed place for display
    pub fn place(&self) -> Option<usize> {
        match self {
            PlayerRank::Ranked(index) => Some(index + 1),
            PlayerRank::Unranked => None,
        }
    }
}

impl fmt::Display for PlayerRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.place() {
            Some(place) => write!(f, "#{place}"),
            None => write!(f, "unranked"),
        }
    }
}

/// Result of one poll
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Pending,
    Ready {
        scores: Vec<ScoreEntry>,
        timed_out: bool,
    },
}

/// Non-blocking wait for the leaderboard, polled once per frame
#[derive(Debug, Clone)]
pub struct LeaderboardFetch {
    elapsed: f32,
    timeout: f32,
}

impl LeaderboardFetch {
    pub fn new(timeout: f32) -> Self {
        Self {
            elapsed: 0.0,
            timeout,
        }
    }

    /// Seconds spent waiting so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Ask the provider once and account for `dt` of waiting.
    ///
    /// Resolves on the first non-empty list, or with the last (empty) result
    /// once the timeout has passed.
    pub fn poll<L: LeaderboardProvider + ?Sized>(&mut self, provider: &mut L, dt: f32) -> FetchStatus {
        let scores = provider.fetch_sorted();
        if !scores.is_empty() {
            return FetchStatus::Ready {
                scores,
                timed_out: false,
            };
        }

        self.elapsed += dt.max(0.0);
        if self.elapsed > self.timeout {
            log::warn!("Leaderboard fetch timed out after {:.1}s", self.elapsed);
            return FetchStatus::Ready {
                scores,
                timed_out: true,
            };
        }
        FetchStatus::Pending
    }
}

/// In-memory leaderboard, one best entry per identity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalLeaderboard {
    pub entries: Vec<ScoreEntry>,
    /// Number of empty fetches after each submission, to mimic a download
    #[serde(skip)]
    pub latency_polls: u32,
    #[serde(skip)]
    polls_left: u32,
}

impl LocalLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency_polls: u32) -> Self {
        Self {
            latency_polls,
            ..Self::default()
        }
    }

    /// Insert a score, keeping the list sorted and trimmed.
    /// Returns the 0-based rank, or None if it did not make the list.
    pub fn insert(&mut self, entry: ScoreEntry) -> Option<usize> {
        if let Some(existing) = self.entries.iter().position(|e| e.identity == entry.identity) {
            if self.entries[existing].score >= entry.score {
                return Some(existing);
            }
            self.entries.remove(existing);
        }

        // Find insertion point (sorted descending by score)
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        if pos >= MAX_HIGH_SCORES {
            return None;
        }
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

impl LeaderboardProvider for LocalLeaderboard {
    fn add_score(&mut self, identity: &str, score: u32, duration: u32, initials: &str) {
        let rank = self.insert(ScoreEntry {
            identity: identity.to_string(),
            initials: initials.to_string(),
            score,
            duration,
        });
        log::info!("Leaderboard: {} scored {} (rank {:?})", initials, score, rank);
        self.polls_left = self.latency_polls;
    }

    fn fetch_sorted(&mut self) -> Vec<ScoreEntry> {
        if self.polls_left > 0 {
            self.polls_left -= 1;
            return Vec::new();
        }
        self.entries.clone()
    }
}
