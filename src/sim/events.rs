//! Collision hit events
//!
//! Collectibles and hazards register as hit sources and publish a single hit
//! when the player runs into them. The game drains the queue once per frame.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

/// What the player ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    /// Asteroid or other obstacle
    Hazard,
    /// Restores one health
    Repair,
    /// "Amplify": shortens the command delay
    SpeedBoost,
    /// Temporary jump to high speed
    Jump,
}

impl HitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitKind::Hazard => "Hazard",
            HitKind::Repair => "Repair",
            HitKind::SpeedBoost => "Amplify",
            HitKind::Jump => "Jump",
        }
    }
}

/// Id of a registered hit source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HitSourceId(pub u32);

/// A delivered hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitEvent {
    pub source: HitSourceId,
    pub kind: HitKind,
}

#[derive(Debug, Clone, Copy)]
struct HitSource {
    kind: HitKind,
    /// Latched once the source has published its hit
    fired: bool,
}

/// Hit queue with exactly-once delivery per source
#[derive(Debug, Clone, Default)]
pub struct HitEventBus {
    sources: BTreeMap<HitSourceId, HitSource>,
    pending: VecDeque<HitEvent>,
    next_id: u32,
}

impl HitEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hit source
    pub fn spawn(&mut self, kind: HitKind) -> HitSourceId {
        self.next_id += 1;
        let id = HitSourceId(self.next_id);
        self.sources.insert(id, HitSource { kind, fired: false });
        id
    }

    /// Report a collision with `source`.
    ///
    /// Returns false if the source is gone or has already delivered its hit.
    pub fn publish(&mut self, source: HitSourceId) -> bool {
        let Some(entry) = self.sources.get_mut(&source) else {
            log::debug!("Hit from despawned source {:?} dropped", source);
            return false;
        };
        if entry.fired {
            return false;
        }
        entry.fired = true;
        self.pending.push_back(HitEvent {
            source,
            kind: entry.kind,
        });
        true
    }

    /// Remove a source along with any hit it has not delivered yet
    pub fn despawn(&mut self, source: HitSourceId) {
        if self.sources.remove(&source).is_some() {
            self.pending.retain(|e| e.source != source);
        }
    }

    /// Take all queued hits, oldest first
    pub fn drain(&mut self) -> Vec<HitEvent> {
        self.pending.drain(..).collect()
    }

    /// Forget every source and queued hit
    pub fn clear(&mut self) {
        self.sources.clear();
        self.pending.clear();
    }

    pub fn is_live(&self, source: HitSourceId) -> bool {
        self.sources.contains_key(&source)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
