// animation/tween.rs - Time-stamped eased transitions driven by the frame clock

use serde::{Serialize, Deserialize};
use super::{Vec3, CameraPose, lerp, Result, AnimationError};

// ============================================================================
// EASING FUNCTIONS
// ============================================================================

/// Easing curves available to camera transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadInOut,
    CubicInOut,
    /// `0.5 * (1 - cos(PI * t))`
    #[default]
    SineInOut,
}

impl Easing {
    /// Apply easing function to normalized time value
    #[inline]
    pub fn apply(self, mut t: f32) -> f32 {
        t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 { 2.0 * t * t } else { -1.0 + (4.0 - 2.0 * t) * t }
            },
            Easing::CubicInOut => {
                if t < 0.5 { 4.0 * t * t * t } else {
                    let t = 2.0 * t - 2.0;
                    1.0 + t * t * t / 2.0
                }
            },
            Easing::SineInOut => 0.5 * (1.0 - (std::f32::consts::PI * t).cos()),
        }
    }
}

// ============================================================================
// INTERPOLATABLE TRAIT
// ============================================================================

/// Trait for types that can be interpolated
pub trait Interpolate: Copy + 'static {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        lerp(*self, *other, t)
    }
}

impl Interpolate for Vec3 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }
}

impl Interpolate for CameraPose {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        CameraPose::new(
            self.position.lerp(other.position, t),
            self.target.lerp(other.target, t),
        )
    }
}

// ============================================================================
// TRANSITION
// ============================================================================

/// A single eased transition between two values.
///
/// Progress is derived from absolute clock readings rather than accumulated
/// frame deltas, so a dropped frame never desynchronizes the animation:
/// `progress = clamp((now - start_time) / duration, 0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<T: Interpolate> {
    start: T,
    end: T,
    start_time: f32,
    duration: f32,
    easing: Easing,
}

impl<T: Interpolate> Transition<T> {
    /// Create a transition starting at `start_time` (seconds on the frame clock).
    pub fn new(start: T, end: T, start_time: f32, duration: f32) -> Result<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(AnimationError::InvalidParameters(format!(
                "transition duration must be positive, got {duration}"
            )));
        }
        if !start_time.is_finite() {
            return Err(AnimationError::InvalidParameters(format!(
                "transition start time must be finite, got {start_time}"
            )));
        }

        Ok(Self {
            start,
            end,
            start_time,
            duration,
            easing: Easing::SineInOut,
        })
    }

    /// Set easing function
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn end(&self) -> T {
        self.end
    }

    /// Raw (un-eased) progress in `[0, 1]`.
    #[inline]
    pub fn progress(&self, now: f32) -> f32 {
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    /// Eased progress in `[0, 1]`.
    #[inline]
    pub fn eased_progress(&self, now: f32) -> f32 {
        self.easing.apply(self.progress(now))
    }

    /// Interpolated value at `now`.
    #[inline]
    pub fn sample(&self, now: f32) -> T {
        self.start.interpolate(&self.end, self.eased_progress(now))
    }

    #[inline]
    pub fn is_complete(&self, now: f32) -> bool {
        self.progress(now) >= 1.0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_functions() {
        for easing in [
            Easing::Linear,
            Easing::QuadInOut,
            Easing::CubicInOut,
            Easing::SineInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001);
            assert!((easing.apply(0.5) - 0.5).abs() < 0.001);
        }
    }

    #[test]
    fn test_sine_in_out_matches_cosine_curve() {
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            let expected = 0.5 * (1.0 - (std::f32::consts::PI * t).cos());
            assert!((Easing::SineInOut.apply(t) - expected).abs() < 1e-6);
        }
        // Input outside [0, 1] is clamped
        assert_eq!(Easing::SineInOut.apply(-3.0), 0.0);
        assert!((Easing::SineInOut.apply(7.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transition_progress_clamps() {
        let t = Transition::new(0.0f32, 100.0, 2.0, 0.8).unwrap();

        assert_eq!(t.progress(1.0), 0.0);
        assert_eq!(t.sample(2.0), 0.0);
        assert!((t.progress(2.4) - 0.5).abs() < 1e-6);
        assert!((t.sample(2.4) - 50.0).abs() < 1e-3);
        assert!(!t.is_complete(2.79));
        assert!(t.is_complete(2.81));
        assert!((t.sample(10.0) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_transition_rejects_bad_duration() {
        assert!(Transition::new(0.0f32, 1.0, 0.0, 0.0).is_err());
        assert!(Transition::new(0.0f32, 1.0, 0.0, -1.2).is_err());
        assert!(Transition::new(0.0f32, 1.0, 0.0, f32::NAN).is_err());
        assert!(Transition::new(0.0f32, 1.0, f32::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_pose_interpolation() {
        let start = CameraPose::new(Vec3::new(0.0, 0.0, 5.0), Vec3::zero());
        let end = CameraPose::new(Vec3::new(0.0, -0.1, 2.0), Vec3::new(0.0, -0.1, 0.0));
        let t = Transition::new(start, end, 0.0, 1.2)
            .unwrap()
            .with_easing(Easing::Linear);

        let mid = t.sample(0.6);
        assert!((mid.position.z - 3.5).abs() < 1e-5);
        assert!((mid.target.y + 0.05).abs() < 1e-6);
    }
}
