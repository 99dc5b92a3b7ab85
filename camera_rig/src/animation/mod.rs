// animation/mod.rs - Camera choreography for the portfolio scene

pub mod tween;
pub mod camera_animator;

pub use tween::*;
pub use camera_animator::*;

use serde::{Serialize, Deserialize};
use std::f32::consts::PI;

// ============================================================================
// ANIMATION STATE MANAGEMENT
// ============================================================================

/// Phase of the camera state machine, as reported to the host.
///
/// Phases advance strictly in the order
/// `Idle -> Rotating? -> ZoomingIn -> Zoomed -> ZoomingOut -> Idle`;
/// only `Rotating` may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimationPhase {
    Idle,
    Rotating,
    ZoomingIn,
    Zoomed,
    ZoomingOut,
}

impl AnimationPhase {
    /// Interactive orbit (and autorotation) is only live while idle.
    #[inline]
    pub fn controls_enabled(self) -> bool {
        self == AnimationPhase::Idle
    }

    /// Phases that are allowed to follow `self`.
    pub fn successors(self) -> &'static [AnimationPhase] {
        match self {
            AnimationPhase::Idle => &[AnimationPhase::Rotating, AnimationPhase::ZoomingIn],
            AnimationPhase::Rotating => &[AnimationPhase::ZoomingIn, AnimationPhase::Idle],
            AnimationPhase::ZoomingIn => &[AnimationPhase::Zoomed],
            AnimationPhase::Zoomed => &[AnimationPhase::ZoomingOut],
            AnimationPhase::ZoomingOut => &[AnimationPhase::Idle],
        }
    }
}

impl std::fmt::Display for AnimationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnimationPhase::Idle => "IDLE",
            AnimationPhase::Rotating => "ROTATING",
            AnimationPhase::ZoomingIn => "ZOOMING_IN",
            AnimationPhase::Zoomed => "ZOOMED",
            AnimationPhase::ZoomingOut => "ZOOMING_OUT",
        };
        f.write_str(name)
    }
}

// ============================================================================
// CORE MATH TYPES
// ============================================================================

/// 3D vector in world space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        Vec3::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    #[inline]
    pub fn normalize(self) -> Vec3 {
        let len_sq = self.length_squared();
        if len_sq > 1e-20 {
            self * (1.0 / len_sq.sqrt())
        } else {
            Vec3::zero()
        }
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn min(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    #[inline]
    pub fn max(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, scalar: f32) -> Vec3 {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f32; 3]> for Vec3 {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Vec3::new(arr[0], arr[1], arr[2])
    }
}

impl From<Vec3> for [f32; 3] {
    #[inline]
    fn from(v: Vec3) -> [f32; 3] {
        [v.x, v.y, v.z]
    }
}

// ============================================================================
// SPHERICAL COORDINATES
// ============================================================================

/// Spherical coordinates around a Y-up axis.
///
/// `phi` is the polar angle measured from +Y, `theta` the azimuth measured
/// from +Z towards +X, so `theta == 0` puts the camera on the +Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    #[inline]
    pub const fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// Decompose an offset vector. `theta` lands in `(-PI, PI]`.
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        let theta = v.x.atan2(v.z);
        let phi = (v.y / radius).clamp(-1.0, 1.0).acos();
        Self::new(radius, phi, theta)
    }

    pub fn to_vec3(self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }

    /// Keep the polar angle away from the poles so the view basis stays defined.
    pub fn make_safe(mut self) -> Self {
        const EPS: f32 = 1e-6;
        self.phi = self.phi.clamp(EPS, PI - EPS);
        self
    }
}

// ============================================================================
// CAMERA POSE
// ============================================================================

/// Camera position plus the point it looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    #[inline]
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Spherical coordinates of the position relative to the target.
    #[inline]
    pub fn spherical(&self) -> Spherical {
        Spherical::from_vec3(self.position - self.target)
    }

    /// Azimuth of the camera around the target, in degrees.
    #[inline]
    pub fn azimuth_degrees(&self) -> f32 {
        self.spherical().theta.to_degrees()
    }

    /// Distance between camera and target.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Reasons a trigger or transition request was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnimationError {
    #[error("{trigger} ignored while {phase}")]
    WrongPhase {
        trigger: &'static str,
        phase: AnimationPhase,
    },

    #[error("Screen mesh not found")]
    ScreenMeshUnavailable,

    #[error("Invalid animation parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, AnimationError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!(a.distance(b) < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_spherical_round_trip_axes() {
        let on_z = Spherical::from_vec3(Vec3::new(0.0, 0.0, 5.0));
        assert!((on_z.theta).abs() < 1e-6);
        assert!((on_z.phi - PI / 2.0).abs() < 1e-6);
        assert_vec_close(on_z.to_vec3(), Vec3::new(0.0, 0.0, 5.0));

        let behind = Spherical::from_vec3(Vec3::new(0.0, 0.0, -5.0));
        assert!((behind.theta.to_degrees() - 180.0).abs() < 1e-4);

        let on_x = Spherical::from_vec3(Vec3::new(3.0, 0.0, 0.0));
        assert!((on_x.theta.to_degrees() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_spherical_zero_vector() {
        let s = Spherical::from_vec3(Vec3::zero());
        assert_eq!(s, Spherical::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_pose_azimuth() {
        let pose = CameraPose::new(Vec3::new(1.0, 2.0, -4.0), Vec3::new(1.0, 2.0, 0.0));
        assert!((pose.azimuth_degrees().abs() - 180.0).abs() < 1e-4);
        assert!((pose.distance() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_phase_successors_are_linear() {
        assert_eq!(AnimationPhase::Zoomed.successors(), &[AnimationPhase::ZoomingOut]);
        assert!(AnimationPhase::Idle.controls_enabled());
        assert!(!AnimationPhase::Zoomed.controls_enabled());
    }

    #[test]
    fn test_phase_serializes_like_host_strings() {
        let json = serde_json::to_string(&AnimationPhase::ZoomingIn).unwrap();
        assert_eq!(json, "\"ZOOMING_IN\"");
        assert_eq!(AnimationPhase::ZoomingOut.to_string(), "ZOOMING_OUT");
    }
}
