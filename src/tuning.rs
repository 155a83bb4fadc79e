//! Data-driven game balance
//!
//! Defaults live here; a JSON file can override any subset of fields.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Balance values for the player and the session flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Lanes ===
    /// Distance between adjacent lanes (world units)
    pub lane_width: f32,
    /// Smooth time for lateral lane motion (seconds)
    pub lane_smooth_time: f32,
    /// Bank angle while changing lanes (degrees, sign follows direction)
    pub lane_roll_angle: f32,
    pub roll_smooth_time: f32,

    // === Speed ===
    pub default_speed: f32,
    /// Target speed while a Jump is active
    pub jump_speed: f32,
    pub speed_smooth_time: f32,
    /// How long a Jump lasts before reverting (seconds)
    pub jump_duration: f32,

    // === Command delay ===
    /// Delay growth per unit of distance at default speed
    pub command_delay_rate: f32,
    /// Delay growth per unit of distance at jump speed
    pub max_command_delay_rate: f32,
    /// Delay removed by a SpeedBoost pickup (seconds)
    pub amplify_amount: f32,

    // === Health ===
    pub max_health: u32,
    pub invulnerability_duration: f32,
    /// Time between the death explosion and the died event
    pub explosion_delay: f32,
    pub glow_smooth_time: f32,

    // === Session ===
    /// Give up waiting for leaderboard scores after this long (seconds)
    pub leaderboard_timeout: f32,
    /// Used when the audio backend cannot report the intro clip length
    pub default_intro_length: f32,
    /// HUD warning blink step (seconds)
    pub warning_blink_interval: f32,
    /// Vertical drag (normalized screen units) per letter step on touch
    pub touch_letter_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lane_width: 1.0,
            lane_smooth_time: 0.15,
            lane_roll_angle: -35.0,
            roll_smooth_time: 0.1,

            default_speed: 10.0,
            jump_speed: 30.0,
            speed_smooth_time: 0.5,
            jump_duration: 3.0,

            // 0.01 s of delay per second played at default speed
            command_delay_rate: 0.001,
            max_command_delay_rate: 0.003,
            amplify_amount: 0.1,

            max_health: 3,
            invulnerability_duration: 2.0,
            explosion_delay: 1.5,
            glow_smooth_time: 0.2,

            leaderboard_timeout: 10.0,
            default_intro_length: 4.0,
            warning_blink_interval: 0.25,
            touch_letter_step: 0.08,
        }
    }
}

/// Invalid tuning values, caught at startup
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    NonPositive { field: &'static str, value: f32 },
    Negative { field: &'static str, value: f32 },
    JumpNotFaster { default_speed: f32, jump_speed: f32 },
    DelayRateInverted { base: f32, max: f32 },
    ZeroMaxHealth,
    Parse(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive (got {value})")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must not be negative (got {value})")
            }
            Self::JumpNotFaster {
                default_speed,
                jump_speed,
            } => write!(
                f,
                "jump_speed ({jump_speed}) must exceed default_speed ({default_speed})"
            ),
            Self::DelayRateInverted { base, max } => write!(
                f,
                "max_command_delay_rate ({max}) is below command_delay_rate ({base})"
            ),
            Self::ZeroMaxHealth => write!(f, "max_health must be at least 1"),
            Self::Parse(msg) => write!(f, "invalid tuning file: {msg}"),
        }
    }
}

impl std::error::Error for TuningError {}

impl Tuning {
    /// Parse tuning overrides from JSON (missing fields keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| TuningError::Parse(format!("{}: {e}", path.display())))?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check the values the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("lane_width", self.lane_width),
            ("default_speed", self.default_speed),
            ("jump_speed", self.jump_speed),
            ("speed_smooth_time", self.speed_smooth_time),
            ("leaderboard_timeout", self.leaderboard_timeout),
            ("warning_blink_interval", self.warning_blink_interval),
            ("touch_letter_step", self.touch_letter_step),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("lane_smooth_time", self.lane_smooth_time),
            ("roll_smooth_time", self.roll_smooth_time),
            ("glow_smooth_time", self.glow_smooth_time),
            ("jump_duration", self.jump_duration),
            ("command_delay_rate", self.command_delay_rate),
            ("max_command_delay_rate", self.max_command_delay_rate),
            ("amplify_amount", self.amplify_amount),
            ("invulnerability_duration", self.invulnerability_duration),
            ("explosion_delay", self.explosion_delay),
            ("default_intro_length", self.default_intro_length),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::Negative { field, value });
            }
        }

        if self.jump_speed <= self.default_speed {
            return Err(TuningError::JumpNotFaster {
                default_speed: self.default_speed,
                jump_speed: self.jump_speed,
            });
        }
        if self.max_command_delay_rate < self.command_delay_rate {
            return Err(TuningError::DelayRateInverted {
                base: self.command_delay_rate,
                max: self.max_command_delay_rate,
            });
        }
        if self.max_health == 0 {
            return Err(TuningError::ZeroMaxHealth);
        }
        Ok(())
    }

    /// Command delay growth per unit distance at `speed`.
    ///
    /// Linear from the base rate at default speed to the max rate at jump speed.
    pub fn command_delay_rate_at(&self, speed: f32) -> f32 {
        let t = ((speed - self.default_speed) / (self.jump_speed - self.default_speed))
            .clamp(0.0, 1.0);
        self.command_delay_rate + (self.max_command_delay_rate - self.command_delay_rate) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_health": 5, "jump_speed": 40.0 }"#).unwrap();
        assert_eq!(tuning.max_health, 5);
        assert_eq!(tuning.jump_speed, 40.0);
        assert_eq!(tuning.default_speed, Tuning::default().default_speed);
    }

    #[test]
    fn test_rejects_bad_values() {
        let tuning = Tuning {
            jump_speed: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::JumpNotFaster { .. })
        ));

        let tuning = Tuning {
            max_health: 0,
            ..Default::default()
        };
        assert_eq!(tuning.validate(), Err(TuningError::ZeroMaxHealth));

        let tuning = Tuning {
            explosion_delay: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Negative {
                field: "explosion_delay",
                ..
            })
        ));

        // Speed always eases, so it needs a real smooth time
        let tuning = Tuning {
            speed_smooth_time: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NonPositive {
                field: "speed_smooth_time",
                ..
            })
        ));

        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_delay_rate_interpolates() {
        let tuning = Tuning::default();
        assert_eq!(tuning.command_delay_rate_at(tuning.default_speed), 0.001);
        assert!((tuning.command_delay_rate_at(tuning.jump_speed) - 0.003).abs() < 1e-7);
        assert_eq!(tuning.command_delay_rate_at(0.0), 0.001);
        assert_eq!(
            tuning.command_delay_rate_at(1000.0),
            tuning.command_delay_rate_at(tuning.jump_speed)
        );
        let mid = tuning.command_delay_rate_at(20.0);
        assert!((mid - 0.002).abs() < 1e-6);
    }
}
