//! L4 Atomic Layer: Time calculation utilities for scroll animations
//!
//! Provides pure functions for calculating animation progress and interpolation.
//! Times are host timestamps in milliseconds so that animations stay deterministic.

/// Calculate animation progress (0.0 to 1.0) from start time and duration
///
/// # Arguments
/// * `start_ms` - Animation start time
/// * `duration_ms` - Total animation duration
/// * `now_ms` - Current frame time
///
/// # Returns
/// Progress value clamped to [0.0, 1.0]
#[inline]
pub fn progress(start_ms: i64, duration_ms: i64, now_ms: i64) -> f64 {
    if duration_ms <= 0 {
        return 1.0;
    }
    let elapsed = (now_ms - start_ms) as f64;
    (elapsed / duration_ms as f64).clamp(0.0, 1.0)
}

/// Check if animation is complete
#[inline]
pub fn is_complete(start_ms: i64, duration_ms: i64, now_ms: i64) -> bool {
    now_ms - start_ms >= duration_ms
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Linear interpolation for pixel offsets
#[inline]
pub fn lerp_i32(from: i32, to: i32, t: f64) -> i32 {
    lerp(from as f64, to as f64, t).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 1.0) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_lerp_i32_negative() {
        assert_eq!(lerp_i32(-80, 0, 0.0), -80);
        assert_eq!(lerp_i32(-80, 0, 0.5), -40);
        assert_eq!(lerp_i32(-80, 0, 1.0), 0);
    }

    #[test]
    fn test_progress() {
        assert!((progress(1000, 0, 1000) - 1.0).abs() < 0.001);
        assert!((progress(1000, 200, 1100) - 0.5).abs() < 0.001);
        assert!((progress(1000, 200, 900) - 0.0).abs() < 0.001);
        assert!(is_complete(1000, 200, 1200));
        assert!(!is_complete(1000, 200, 1199));
    }
}
