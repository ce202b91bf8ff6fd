//! L4 Atomic Layer: Pure easing functions for scroll animations
//!
//! Provides mathematical easing functions that map input [0, 1] to output [0, 1]
//! with various deceleration curves.

pub use crate::config::EasingType;

/// An easing curve together with its shape parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolator {
    pub easing: EasingType,
    /// Only used by `EasingType::Decelerate`
    pub factor: f64,
}

impl Interpolator {
    pub fn new(easing: EasingType, factor: f64) -> Self {
        Self { easing, factor }
    }

    /// Decelerating curve with the given factor
    pub fn decelerate(factor: f64) -> Self {
        Self::new(EasingType::Decelerate, factor)
    }

    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self.easing {
            EasingType::Linear => t,
            EasingType::Cubic => cubic_ease_out(t),
            EasingType::Quintic => quintic_ease_out(t),
            EasingType::EaseOut => exponential_ease_out(t),
            EasingType::Decelerate => decelerate(t, self.factor),
        }
    }

    /// Slope of the curve at t = 0, used to size a fling from its start velocity
    pub fn initial_slope(&self) -> f64 {
        match self.easing {
            EasingType::Linear => 1.0,
            EasingType::Cubic => 3.0,
            EasingType::Quintic => 5.0,
            EasingType::EaseOut => 10.0 * std::f64::consts::LN_2,
            EasingType::Decelerate => 2.0 * self.factor,
        }
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::decelerate(1.3)
    }
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Quintic ease-out: f(t) = 1 - (1-t)⁵
#[inline]
fn quintic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv * inv
}

/// Exponential ease-out: f(t) = 1 - 2^(-10t)
#[inline]
fn exponential_ease_out(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}

/// Decelerate: f(t) = 1 - (1-t)^(2·factor)
#[inline]
fn decelerate(t: f64, factor: f64) -> f64 {
    if factor == 1.0 {
        let inv = 1.0 - t;
        1.0 - inv * inv
    } else {
        1.0 - (1.0 - t).powf(2.0 * factor)
    }
}
