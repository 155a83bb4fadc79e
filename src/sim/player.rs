//! Player state and controller
//!
//! Lane commands, speed/distance accumulation, health and the hit response
//! policy. Everything time-based goes through the controller's scheduler so a
//! reset can drop it in one call.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::HitKind;
use super::smooth::SmoothedValue;
use super::timer::{Scheduler, TimerHandle};
use crate::consts::{LANE_COUNT, LANE_POSITIONS, MIDDLE_LANE};
use crate::tuning::Tuning;

/// Lane change direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Left,
    Right,
}

/// Powerups that show a toast when collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Powerup {
    Repair,
    Amplify,
    Jump,
}

impl Powerup {
    pub fn name(&self) -> &'static str {
        match self {
            Powerup::Repair => "Repair",
            Powerup::Amplify => "Amplify",
            Powerup::Jump => "Jump",
        }
    }
}

/// Notifications produced by the controller, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// Sent before the command is queued, so listeners can react during the delay
    CommandIssued { command: Command, delay: f32 },
    LaneChanged { lane: usize },
    /// Took a hazard hit and survived (shake + particles)
    Damaged { health: u32 },
    InvulnerabilityEnded,
    PowerupShown(Powerup),
    /// Health hit zero; the ship is hidden and the explosion plays
    Exploded,
    /// Explosion finished; sent once per life
    Died,
}

/// HUD damage indicator level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthWarning {
    None,
    Warning,
    Critical,
}

/// Timed effects owned by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
enum PlayerTimer {
    ApplyCommand(Command),
    EndInvulnerability,
    RevertSpeed,
    FinishExplosion,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Index into `LANE_POSITIONS`
    pub lane_index: usize,
    pub position: SmoothedValue<Vec3>,
    pub target_position: Vec3,
    /// Bank angle in degrees
    pub roll: SmoothedValue<f32>,
    pub speed: SmoothedValue<f32>,
    pub target_speed: f32,
    pub distance: f32,
    /// Seconds survived
    pub duration: f32,
    /// Current lane command latency (seconds)
    pub command_delay: f32,
    pub health: u32,
    pub max_health: u32,
    pub invulnerable: bool,
    /// Ship glow, 0 while invulnerable
    pub glow: SmoothedValue<f32>,
    pub alive: bool,
    /// False once the ship has exploded
    pub visible: bool,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let target = lane_target(MIDDLE_LANE, tuning.lane_width);
        Self {
            lane_index: MIDDLE_LANE,
            position: SmoothedValue::new(target, tuning.lane_smooth_time),
            target_position: target,
            roll: SmoothedValue::new(0.0, tuning.roll_smooth_time),
            speed: SmoothedValue::new(tuning.default_speed, tuning.speed_smooth_time),
            target_speed: tuning.default_speed,
            distance: 0.0,
            duration: 0.0,
            command_delay: 0.0,
            health: tuning.max_health,
            max_health: tuning.max_health,
            invulnerable: false,
            glow: SmoothedValue::new(1.0, tuning.glow_smooth_time),
            alive: true,
            visible: true,
        }
    }
}

/// World-space target for a lane
fn lane_target(lane: usize, lane_width: f32) -> Vec3 {
    Vec3::new(LANE_POSITIONS[lane] * lane_width, 0.0, 0.0)
}

/// Owns the player and everything that mutates it
#[derive(Debug, Clone)]
pub struct PlayerController {
    tuning: Tuning,
    player: Player,
    timers: Scheduler<PlayerTimer>,
    invulnerability: Option<TimerHandle>,
    speed_revert: Option<TimerHandle>,
    died_sent: bool,
    events: Vec<PlayerEvent>,
}

impl PlayerController {
    pub fn new(tuning: Tuning) -> Self {
        let player = Player::new(&tuning);
        Self {
            tuning,
            player,
            timers: Scheduler::new(),
            invulnerability: None,
            speed_revert: None,
            died_sent: false,
            events: Vec::new(),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Lane commands still waiting out their delay
    pub fn pending_commands(&self) -> usize {
        self.timers
            .pending()
            .filter(|t| matches!(t, PlayerTimer::ApplyCommand(_)))
            .count()
    }

    /// All pending timed effects, commands included
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Take the notifications produced since the last drain
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue a lane change behind the current command delay
    pub fn issue_command(&mut self, command: Command) {
        if !self.player.alive {
            log::debug!("Ignoring {:?} command while dead", command);
            return;
        }
        let delay = self.player.command_delay;
        self.events.push(PlayerEvent::CommandIssued { command, delay });
        self.timers.schedule(delay, PlayerTimer::ApplyCommand(command));
    }

    /// Advance one frame of gameplay
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let player = &mut self.player;
        if player.alive {
            let speed = player.speed.value;
            player.distance += dt * speed;
            player.duration += dt;
            player.command_delay += dt * speed * self.tuning.command_delay_rate_at(speed);
        }

        for effect in self.timers.tick(dt) {
            self.apply_timer(effect);
        }

        let player = &mut self.player;
        player.speed.update(player.target_speed, dt);
        let position = player.position.update(player.target_position, dt);

        // Bank into the move, proportional to the lateral distance left
        let lateral = ((player.target_position.x - position.x) / self.tuning.lane_width)
            .clamp(-1.0, 1.0);
        player.roll.update(lateral * self.tuning.lane_roll_angle, dt);

        let glow_target = if player.invulnerable { 0.0 } else { 1.0 };
        player.glow.update(glow_target, dt);
    }

    fn apply_timer(&mut self, effect: PlayerTimer) {
        match effect {
            PlayerTimer::ApplyCommand(command) => self.apply_command(command),
            PlayerTimer::EndInvulnerability => {
                self.invulnerability = None;
                self.player.invulnerable = false;
                self.events.push(PlayerEvent::InvulnerabilityEnded);
            }
            PlayerTimer::RevertSpeed => {
                self.speed_revert = None;
                self.player.target_speed = self.tuning.default_speed;
            }
            PlayerTimer::FinishExplosion => {
                if !self.died_sent {
                    self.died_sent = true;
                    log::info!(
                        "Player died: distance {:.1}, duration {:.1}s",
                        self.player.distance,
                        self.player.duration
                    );
                    self.events.push(PlayerEvent::Died);
                }
            }
        }
    }

    fn apply_command(&mut self, command: Command) {
        if !self.player.alive {
            return;
        }
        let lane = self.player.lane_index;
        let next = match command {
            Command::Left if lane > 0 => lane - 1,
            Command::Right if lane < LANE_COUNT - 1 => lane + 1,
            // Edge lane: nothing to do
            _ => return,
        };
        self.player.lane_index = next;
        self.player.target_position = lane_target(next, self.tuning.lane_width);
        self.events.push(PlayerEvent::LaneChanged { lane: next });
    }

    /// React to a collision. The wreck collects nothing.
    pub fn on_hit(&mut self, kind: HitKind) {
        if !self.player.alive {
            log::debug!("Ignoring {} hit while dead", kind.as_str());
            return;
        }
        match kind {
            HitKind::Hazard => self.take_damage(),
            HitKind::Repair => {
                if self.player.health < self.player.max_health {
                    self.player.health += 1;
                }
                // Shown even at full health
                self.events.push(PlayerEvent::PowerupShown(Powerup::Repair));
            }
            HitKind::SpeedBoost => {
                self.player.command_delay =
                    (self.player.command_delay - self.tuning.amplify_amount).max(0.0);
                self.events.push(PlayerEvent::PowerupShown(Powerup::Amplify));
            }
            HitKind::Jump => {
                self.player.target_speed = self.tuning.jump_speed;
                if let Some(handle) = self.speed_revert.take() {
                    self.timers.cancel(handle);
                }
                self.speed_revert = Some(
                    self.timers
                        .schedule(self.tuning.jump_duration, PlayerTimer::RevertSpeed),
                );
                self.events.push(PlayerEvent::PowerupShown(Powerup::Jump));
            }
        }
    }

    fn take_damage(&mut self) {
        if !self.player.alive || self.player.invulnerable || self.player.health == 0 {
            return;
        }

        self.player.health -= 1;
        if self.player.health > 0 {
            self.player.invulnerable = true;
            if let Some(handle) = self.invulnerability.take() {
                self.timers.cancel(handle);
            }
            self.invulnerability = Some(self.timers.schedule(
                self.tuning.invulnerability_duration,
                PlayerTimer::EndInvulnerability,
            ));
            self.events.push(PlayerEvent::Damaged {
                health: self.player.health,
            });
        } else {
            self.explode();
        }
    }

    fn explode(&mut self) {
        self.player.alive = false;
        self.player.visible = false;
        self.events.push(PlayerEvent::Exploded);
        self.timers
            .schedule(self.tuning.explosion_delay, PlayerTimer::FinishExplosion);
    }

    /// Current HUD damage indicator
    pub fn health_warning(&self) -> HealthWarning {
        let player = &self.player;
        if !player.alive || player.health >= player.max_health {
            HealthWarning::None
        } else if player.health == 1 {
            HealthWarning::Critical
        } else {
            HealthWarning::Warning
        }
    }

    /// Back to a fresh life: middle lane, full health, default speed, nothing pending
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.invulnerability = None;
        self.speed_revert = None;
        self.died_sent = false;
        self.events.clear();
        self.player = Player::new(&self.tuning);
    }
}
