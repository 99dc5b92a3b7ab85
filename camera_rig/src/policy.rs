// policy.rs - Viewport-driven framing rules and the viewing-arc correction

use std::f32::consts::{PI, TAU};
use serde::{Serialize, Deserialize};

/// Reference viewport the padding tiers are measured against.
pub const REFERENCE_WIDTH: f32 = 1920.0;
pub const REFERENCE_HEIGHT: f32 = 1080.0;

pub const MIN_CAMERA_DISTANCE: f32 = 3.5;
pub const MAX_CAMERA_DISTANCE: f32 = 8.0;

/// Replace unusable viewport dimensions with zero so every tier test stays
/// well defined; the aspect ratio then falls back to 1.
fn sanitize_viewport(width: f32, height: f32) -> (f32, f32, f32) {
    let width = if width.is_finite() && width > 0.0 { width } else { 0.0 };
    let height = if height.is_finite() && height > 0.0 { height } else { 0.0 };
    let aspect = if width > 0.0 && height > 0.0 { width / height } else { 1.0 };
    (width, height, aspect)
}

// ============================================================================
// CAMERA DISTANCE & PADDING
// ============================================================================

/// Idle camera distance for a viewport, always within
/// `[MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE]`.
pub fn responsive_distance(viewport_width: f32, viewport_height: f32) -> f32 {
    let (width, height, aspect) = sanitize_viewport(viewport_width, viewport_height);

    let mut distance: f32 = if height < 600.0 {
        6.5
    } else if height < 800.0 {
        5.5
    } else if height < 1000.0 {
        5.0
    } else {
        4.5
    };

    if aspect < 0.75 {
        distance *= 1.4;
    } else if aspect < 1.0 {
        distance *= 1.2;
    } else if aspect > 2.5 {
        distance *= 0.95;
    }
    // 2.0 < aspect <= 2.5 keeps the base distance

    if width < 400.0 {
        distance *= 1.3;
    } else if width < 768.0 {
        distance *= 1.15;
    }

    distance.clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE)
}

/// Extra margin multiplier applied around the zoomed screen.
pub fn zoom_padding(viewport_width: f32, viewport_height: f32) -> f32 {
    let (width, height, aspect) = sanitize_viewport(viewport_width, viewport_height);
    let area = width * height;
    let reference_area = REFERENCE_WIDTH * REFERENCE_HEIGHT;

    let mut padding = if area < reference_area * 0.5 {
        1.15
    } else if area < reference_area * 0.75 {
        1.10
    } else {
        1.05
    };

    if aspect < 0.75 {
        padding *= 1.1;
    } else if aspect > 2.5 {
        padding *= 1.05;
    }

    padding
}

/// Downward bias applied to the zoom target so the screen sits slightly
/// above center.
pub fn vertical_offset(box_height: f32, aspect: f32, ratio: f32) -> f32 {
    let offset = box_height * ratio;
    if aspect < 1.0 {
        offset * 0.7
    } else if aspect > 2.0 {
        offset * 1.2
    } else {
        offset
    }
}

/// Camera distance that fits a `width` x `height` rectangle in a perspective
/// view, scaled by `padding`.
pub fn fit_distance(width: f32, height: f32, fov_degrees: f32, aspect: f32, padding: f32) -> f32 {
    let half_tan = (fov_degrees.to_radians() / 2.0).tan();
    let fit_y = (height / 2.0) / half_tan;
    let fit_x = (width / 2.0) / half_tan / aspect;
    fit_x.max(fit_y) * padding
}

// ============================================================================
// ROTATION CORRECTION
// ============================================================================

/// Normalize degrees into `[0, 360)`.
#[inline]
pub fn normalize_angle(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Wrap a radian difference into `(-PI, PI]`.
#[inline]
pub fn wrap_signed_radians(diff: f32) -> f32 {
    PI - (PI - diff).rem_euclid(TAU)
}

/// End angle (radians) reached from `start` by the shortest signed arc
/// towards `target`. The result is `start + d` with `d` in `(-PI, PI]`, so it
/// may leave `(-PI, PI]` itself.
#[inline]
pub fn shortest_arc_end(start: f32, target: f32) -> f32 {
    start + wrap_signed_radians(target - start)
}

/// Outcome of checking an azimuth against the forbidden arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationCorrection {
    pub needs_correction: bool,
    /// Target azimuth in degrees, `[0, 360)`.
    pub target_deg: f32,
}

/// Inclusive band of azimuths from which the screen content is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForbiddenArc {
    pub start_deg: f32,
    pub end_deg: f32,
}

impl Default for ForbiddenArc {
    fn default() -> Self {
        Self { start_deg: 95.0, end_deg: 275.0 }
    }
}

impl ForbiddenArc {
    pub fn contains(&self, degrees: f32) -> bool {
        let a = normalize_angle(degrees);
        a >= self.start_deg && a <= self.end_deg
    }

    /// Nearest arc boundary for angles inside the arc, ties going to the
    /// start boundary. Angles outside the arc pass through normalized, and an
    /// angle already on a boundary needs no correction.
    pub fn correct(&self, degrees: f32) -> RotationCorrection {
        let normalized = normalize_angle(degrees);
        if !self.contains(normalized) {
            return RotationCorrection { needs_correction: false, target_deg: normalized };
        }

        let to_start = (normalized - self.start_deg).abs();
        let to_end = (normalized - self.end_deg).abs();
        let target_deg = if to_start <= to_end { self.start_deg } else { self.end_deg };

        RotationCorrection {
            needs_correction: target_deg != normalized,
            target_deg,
        }
    }
}

/// Check an azimuth against the default `[95, 275]` arc.
pub fn rotation_correction(degrees: f32) -> RotationCorrection {
    ForbiddenArc::default().correct(degrees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_tiers() {
        // 1920x1080: tallest tier, no aspect or width adjustment
        assert_eq!(responsive_distance(1920.0, 1080.0), 4.5);
        // 1280x720: second tier
        assert_eq!(responsive_distance(1280.0, 720.0), 5.5);
        // Portrait phones: 5.0 * 1.4 * 1.3 clamps to the max
        assert_eq!(responsive_distance(375.0, 812.0), MAX_CAMERA_DISTANCE);
        assert_eq!(responsive_distance(360.0, 560.0), MAX_CAMERA_DISTANCE);
        // Portrait tablet on a tall screen
        assert!((responsive_distance(1000.0, 1200.0) - 4.5 * 1.2).abs() < 1e-6);
        // Ultra-wide
        assert!((responsive_distance(3440.0, 1080.0) - 4.5 * 0.95).abs() < 1e-6);
        // Tablet portrait, 768 wide is not < 768
        assert!((responsive_distance(768.0, 1024.0) - 4.5 * 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_distance_degenerate_viewport() {
        let d = responsive_distance(0.0, 0.0);
        assert!((MIN_CAMERA_DISTANCE..=MAX_CAMERA_DISTANCE).contains(&d));
        let d = responsive_distance(f32::NAN, f32::INFINITY);
        assert!((MIN_CAMERA_DISTANCE..=MAX_CAMERA_DISTANCE).contains(&d));
    }

    #[test]
    fn test_zoom_padding_tiers() {
        assert!((zoom_padding(1920.0, 1080.0) - 1.05).abs() < 1e-6);
        // 1440x900 is ~62% of the reference area
        assert!((zoom_padding(1440.0, 900.0) - 1.10).abs() < 1e-6);
        assert!((zoom_padding(800.0, 600.0) - 1.15).abs() < 1e-6);
        assert!((zoom_padding(390.0, 844.0) - 1.15 * 1.1).abs() < 1e-6);
        assert!((zoom_padding(5120.0, 1440.0) - 1.05 * 1.05).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_offset_by_aspect() {
        assert!((vertical_offset(3.0, 16.0 / 9.0, 0.04) - 0.12).abs() < 1e-6);
        assert!((vertical_offset(3.0, 0.5, 0.04) - 0.084).abs() < 1e-6);
        assert!((vertical_offset(3.0, 2.4, 0.04) - 0.144).abs() < 1e-6);
    }

    #[test]
    fn test_fit_distance_takes_larger_axis() {
        let half_tan = (75f32.to_radians() / 2.0).tan();
        let tall = fit_distance(4.0, 3.0, 75.0, 16.0 / 9.0, 1.0);
        assert!((tall - 1.5 / half_tan).abs() < 1e-5);

        let narrow = fit_distance(4.0, 3.0, 75.0, 0.5, 1.1);
        assert!((narrow - 2.0 / half_tan / 0.5 * 1.1).abs() < 1e-5);
    }

    #[test]
    fn test_boundaries_need_no_correction() {
        let at_start = rotation_correction(95.0);
        assert!(!at_start.needs_correction);
        assert_eq!(at_start.target_deg, 95.0);

        let at_end = rotation_correction(275.0);
        assert!(!at_end.needs_correction);
        assert_eq!(at_end.target_deg, 275.0);
    }

    #[test]
    fn test_inside_arc_snaps_to_nearest_boundary() {
        let c = rotation_correction(180.0);
        assert!(c.needs_correction);
        assert_eq!(c.target_deg, 95.0);

        let c = rotation_correction(250.0);
        assert!(c.needs_correction);
        assert_eq!(c.target_deg, 275.0);

        // Exactly halfway resolves to the lower boundary
        assert_eq!(rotation_correction(185.0).target_deg, 95.0);

        // -160 degrees is 200 degrees
        let c = rotation_correction(-160.0);
        assert!(c.needs_correction);
        assert_eq!(c.target_deg, 275.0);
    }

    #[test]
    fn test_outside_arc_passes_through() {
        let c = rotation_correction(280.0);
        assert!(!c.needs_correction);
        assert_eq!(c.target_deg, 280.0);

        let c = rotation_correction(-30.0);
        assert!(!c.needs_correction);
        assert_eq!(c.target_deg, 330.0);

        assert_eq!(rotation_correction(720.0 + 10.0).target_deg, 10.0);
    }

    #[test]
    fn test_shortest_arc() {
        let end = shortest_arc_end(10f32.to_radians(), 100f32.to_radians());
        assert!((end.to_degrees() - 100.0).abs() < 1e-4);

        // 350 -> 95 goes forward through 0, not back through 180
        let end = shortest_arc_end(350f32.to_radians(), 95f32.to_radians());
        assert!((end.to_degrees() - 455.0).abs() < 1e-3);

        // Azimuth reported as -160 degrees heading for 275
        let end = shortest_arc_end((-160f32).to_radians(), 275f32.to_radians());
        assert!((end.to_degrees() + 85.0).abs() < 1e-3);

        // Exactly opposite resolves to the positive half-turn
        assert!((wrap_signed_radians(-PI) - PI).abs() < 1e-6);
        assert!((wrap_signed_radians(PI) - PI).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn distance_always_clamped(w in 0.0f32..10_000.0, h in 0.0f32..10_000.0) {
            let d = responsive_distance(w, h);
            prop_assert!((MIN_CAMERA_DISTANCE..=MAX_CAMERA_DISTANCE).contains(&d));
        }

        #[test]
        fn padding_within_tiers(w in 1.0f32..10_000.0, h in 1.0f32..10_000.0) {
            let p = zoom_padding(w, h);
            prop_assert!(p >= 1.05 && p <= 1.15 * 1.1 + 1e-6);
        }

        #[test]
        fn shortest_arc_never_exceeds_half_turn(start in -720.0f32..720.0, target in -720.0f32..720.0) {
            let start = start.to_radians();
            let end = shortest_arc_end(start, target.to_radians());
            prop_assert!((end - start).abs() <= PI + 1e-4);
            let landed = normalize_angle(end.to_degrees());
            let wanted = normalize_angle(target);
            let gap = (landed - wanted).abs();
            prop_assert!(gap < 1e-2 || (360.0 - gap) < 1e-2);
        }

        #[test]
        fn correction_target_never_inside_open_arc(angle in -1000.0f32..1000.0) {
            let c = rotation_correction(angle);
            prop_assert!(c.target_deg >= 0.0 && c.target_deg < 360.0);
            prop_assert!(!(c.target_deg > 95.0 && c.target_deg < 275.0));
        }
    }
}
