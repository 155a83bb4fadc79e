//! Critically damped smoothing
//!
//! SmoothDamp-style spring-damper used for speed, lane position, roll and glow.

use std::ops::{Add, Mul, Sub};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Values that can be smoothed
pub trait Dampable:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    const ZERO: Self;

    fn dot(self, rhs: Self) -> f32;
}

impl Dampable for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn dot(self, rhs: Self) -> f32 {
        self * rhs
    }
}

impl Dampable for Vec3 {
    const ZERO: Self = Vec3::ZERO;

    #[inline]
    fn dot(self, rhs: Self) -> f32 {
        Vec3::dot(self, rhs)
    }
}

/// Move `current` toward `target`, returning the new value and velocity.
///
/// `smooth_time` is roughly the time to reach the target. Zero snaps to the
/// target, and `dt <= 0` leaves everything unchanged.
pub fn smooth_damp<T: Dampable>(
    current: T,
    target: T,
    velocity: T,
    smooth_time: f32,
    dt: f32,
) -> (T, T) {
    if dt <= 0.0 {
        return (current, velocity);
    }
    if smooth_time <= 0.0 {
        return (target, T::ZERO);
    }

    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (velocity + change * omega) * dt;
    let new_velocity = (velocity - temp * omega) * decay;
    let output = target + (change + temp) * decay;

    // Clamp if we crossed the target this step
    if (target - current).dot(output - target) > 0.0 {
        return (target, T::ZERO);
    }

    (output, new_velocity)
}

/// A smoothed channel: value, velocity state and its smooth time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothedValue<T> {
    pub value: T,
    pub velocity: T,
    pub smooth_time: f32,
}

impl<T: Dampable> SmoothedValue<T> {
    pub fn new(value: T, smooth_time: f32) -> Self {
        Self {
            value,
            velocity: T::ZERO,
            smooth_time,
        }
    }

    /// Step toward `target` and return the new value
    pub fn update(&mut self, target: T, dt: f32) -> T {
        let (value, velocity) =
            smooth_damp(self.value, target, self.velocity, self.smooth_time, dt);
        self.value = value;
        self.velocity = velocity;
        value
    }

    /// Jump straight to `value` and clear the velocity
    pub fn snap(&mut self, value: T) {
        self.value = value;
        self.velocity = T::ZERO;
    }
}
