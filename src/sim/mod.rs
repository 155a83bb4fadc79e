//! Frame-stepped gameplay simulation
//!
//! Everything here is driven by explicit `tick(dt)` calls from the frame loop:
//! - No threads, no blocking waits
//! - Timed effects go through a `Scheduler` so resets can cancel them
//! - No rendering, audio or platform dependencies

pub mod events;
pub mod player;
pub mod smooth;
pub mod timer;

pub use events::{HitEvent, HitEventBus, HitKind, HitSourceId};
pub use player::{Command, HealthWarning, Player, PlayerController, PlayerEvent, Powerup};
pub use smooth::{Dampable, SmoothedValue, smooth_damp};
pub use timer::{Scheduler, TimerHandle};
