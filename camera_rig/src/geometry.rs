// geometry.rs - Projection, vertex deduplication and convex hulls for the screen overlay

use std::collections::HashSet;
use serde::{Serialize, Deserialize};
use crate::animation::Vec3;

// ============================================================================
// 2D POINTS
// ============================================================================

/// Point in screen space, in pixels. Y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Z component of `(a - o) x (b - o)`.
#[inline]
pub fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

// ============================================================================
// MATRICES
// ============================================================================

/// Column-major 4x4 matrix. `cols[c][r]` is row `r` of column `c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn from_scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = s.x;
        m.cols[1][1] = s.y;
        m.cols[2][2] = s.z;
        m
    }

    pub fn from_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// OpenGL-style perspective projection (clip z in `[-w, w]`).
    pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y_radians / 2.0).tan();
        let range_inv = 1.0 / (near - far);
        Self {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, (far + near) * range_inv, -1.0],
                [0.0, 0.0, 2.0 * far * near * range_inv, 0.0],
            ],
        }
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).normalize();
        let mut side = forward.cross(up);
        if side.length_squared() < 1e-12 {
            // Looking straight along `up`
            side = forward.cross(Vec3::Z);
        }
        let side = side.normalize();
        let up = side.cross(forward);

        Self {
            cols: [
                [side.x, up.x, -forward.x, 0.0],
                [side.y, up.y, -forward.y, 0.0],
                [side.z, up.z, -forward.z, 0.0],
                [-side.dot(eye), -up.dot(eye), forward.dot(eye), 1.0],
            ],
        }
    }

    #[inline]
    pub fn mul_mat(&self, rhs: &Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in out.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Mat4 { cols: out }
    }

    /// Multiply `(x, y, z, w)`.
    #[inline]
    pub fn transform_vec4(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        for (r, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|c| self.cols[c][r] * v[c]).sum();
        }
        out
    }

    /// Transform a point (w = 1), dropping w. Exact for affine matrices.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let [x, y, z, _] = self.transform_vec4([p.x, p.y, p.z, 1.0]);
        Vec3::new(x, y, z)
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Mat4;
    #[inline]
    fn mul(self, rhs: Mat4) -> Mat4 {
        self.mul_mat(&rhs)
    }
}

// ============================================================================
// BOUNDING BOXES
// ============================================================================

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points.into_iter().fold(Self::EMPTY, |acc, p| acc.expanded(p))
    }

    #[inline]
    pub fn expanded(self, p: Vec3) -> Self {
        Self { min: self.min.min(p), max: self.max.max(p) }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() { Vec3::zero() } else { self.max - self.min }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() { Vec3::zero() } else { (self.min + self.max) * 0.5 }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing this box's corners after transformation.
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::from_points(self.corners().into_iter().map(|c| m.transform_point(c)))
    }
}

// ============================================================================
// PROJECTION
// ============================================================================

/// Project a world point through a view-projection matrix into normalized
/// device coordinates. Returns `None` for points at or behind the eye plane.
pub fn project_to_ndc(view_projection: &Mat4, world: Vec3) -> Option<Vec3> {
    let [x, y, z, w] = view_projection.transform_vec4([world.x, world.y, world.z, 1.0]);
    if w <= f32::EPSILON {
        return None;
    }
    let inv_w = 1.0 / w;
    Some(Vec3::new(x * inv_w, y * inv_w, z * inv_w))
}

/// Map NDC to pixel coordinates with Y flipped (screen Y grows downward).
#[inline]
pub fn ndc_to_pixels(ndc: Vec3, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        (ndc.x * 0.5 + 0.5) * width,
        (-(ndc.y * 0.5) + 0.5) * height,
    )
}

// ============================================================================
// DEDUPLICATION
// ============================================================================

/// Finest dedup precision. Beyond this the quantized keys of ordinary
/// coordinates overflow `i64` and saturate into one another.
pub const MAX_DEDUP_PRECISION: u32 = 9;

/// Quantized coordinate key at `precision` decimal places.
#[inline]
fn vertex_key(v: [f32; 3], scale: f64) -> [i64; 3] {
    // `as` saturates, so non-finite coordinates collapse into extreme keys
    v.map(|c| (f64::from(c) * scale).round() as i64)
}

/// Collapse coincident vertices (shared-edge topology) while keeping first
/// occurrence order. Coordinates are compared at `precision` decimal places,
/// capped at [`MAX_DEDUP_PRECISION`].
pub fn dedup_vertices(positions: &[[f32; 3]], precision: u32) -> Vec<Vec3> {
    let scale = 10f64.powi(precision.min(MAX_DEDUP_PRECISION) as i32);
    let mut seen: HashSet<[i64; 3]> = HashSet::with_capacity(positions.len());
    let mut unique = Vec::with_capacity(positions.len());

    for &p in positions {
        if seen.insert(vertex_key(p, scale)) {
            unique.push(Vec3::from(p));
        }
    }
    unique
}

// ============================================================================
// CONVEX HULL
// ============================================================================

/// Convex hull of screen-space points (Graham scan).
///
/// The pivot is the lowest point on screen (maximum Y, ties broken by minimum
/// X). The remaining points are ordered by polar angle around it, nearest
/// first for equal angles, and the sweep pops while the last two hull points
/// and the candidate fail to make a strict left turn (`cross <= 0`). Since
/// every other point has `dy <= 0`, the angles lie in `(-PI, 0]` and the output
/// winds counter-clockwise in pixel coordinates, which is clockwise as seen on
/// the Y-down screen. Collinear points are dropped.
///
/// Non-finite points are ignored. Fewer than three remaining points are
/// returned unchanged.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let points: Vec<Vec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
    if points.len() < 3 {
        return points;
    }

    let mut pivot_index = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let best = points[pivot_index];
        if p.y > best.y || (p.y == best.y && p.x < best.x) {
            pivot_index = i;
        }
    }
    let pivot = points[pivot_index];

    let mut sorted: Vec<(f32, f32, Vec2)> = points
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != pivot_index)
        .map(|(_, &p)| ((p.y - pivot.y).atan2(p.x - pivot.x), pivot.distance(p), p))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));

    let mut hull = Vec::with_capacity(points.len());
    hull.push(pivot);
    for (_, _, point) in sorted {
        while hull.len() > 1 {
            let p2 = hull[hull.len() - 1];
            let p1 = hull[hull.len() - 2];
            if cross(p1, p2, point) > 0.0 {
                break;
            }
            hull.pop();
        }
        hull.push(point);
    }

    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    /// Every consecutive triple turns left and every input point is inside or
    /// on the hull.
    fn assert_convex_hull_of(hull: &[Vec2], points: &[Vec2]) {
        let n = hull.len();
        assert!(n >= 3, "degenerate hull {hull:?}");
        for i in 0..n {
            let (a, b, c) = (hull[i], hull[(i + 1) % n], hull[(i + 2) % n]);
            assert!(cross(a, b, c) > 0.0, "not convex at {i}: {hull:?}");
        }
        for &p in points {
            for i in 0..n {
                let (a, b) = (hull[i], hull[(i + 1) % n]);
                assert!(cross(a, b, p) >= -1e-3, "{p:?} outside edge {a:?}->{b:?}");
            }
        }
    }

    #[test]
    fn test_square_hull() {
        let square = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)];
        let hull = convex_hull(&square);

        assert_eq!(hull.len(), 4);
        for corner in &square {
            assert!(hull.contains(corner));
        }
        assert_eq!(hull[0], v(0.0, 10.0));
        assert_eq!(hull, vec![v(0.0, 10.0), v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0)]);
        assert_convex_hull_of(&hull, &square);
    }

    #[test]
    fn test_hull_drops_interior_and_edge_points() {
        let points = [
            v(4.0, 5.0),
            v(0.0, 0.0),
            v(5.0, 0.0),
            v(10.0, 0.0),
            v(10.0, 10.0),
            v(0.0, 10.0),
            v(2.0, 7.0),
            v(10.0, 4.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert_convex_hull_of(&hull, &points);
    }

    #[test]
    fn test_hull_of_projected_quadrilateral() {
        // A perspective-distorted screen: wider at the bottom.
        let points = [v(420.0, 210.0), v(1510.0, 190.0), v(1560.0, 880.0), v(370.0, 905.0)];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert_eq!(hull[0], v(370.0, 905.0));
        assert_convex_hull_of(&hull, &points);
    }

    #[test]
    fn test_collinear_points_degrade() {
        let points = [v(0.0, 0.0), v(5.0, 0.0), v(10.0, 0.0)];
        let hull = convex_hull(&points);
        assert_eq!(hull, vec![v(0.0, 0.0), v(10.0, 0.0)]);
    }

    #[test]
    fn test_non_finite_points_do_not_break_hull() {
        let mut points = Vec::new();
        for i in 0..51 {
            let a = i as f32 * 0.7;
            points.push(v(500.0 + 200.0 * a.cos(), 400.0 + 150.0 * a.sin()));
            if i % 4 == 0 {
                points.push(v(f32::NAN, 300.0));
                points.push(v(120.0, f32::INFINITY));
            }
        }
        let finite: Vec<Vec2> = points.iter().copied().filter(|p| p.is_finite()).collect();

        let hull = convex_hull(&points);
        assert_eq!(hull, convex_hull(&finite));
        assert!(hull.len() > 10);
        assert_convex_hull_of(&hull, &finite);

        let nan_only = [v(f32::NAN, 0.0), v(1.0, 1.0), v(2.0, f32::NAN)];
        assert_eq!(convex_hull(&nan_only), vec![v(1.0, 1.0)]);
    }

    #[test]
    fn test_dedup_precision_is_capped() {
        let positions = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]];
        assert_eq!(dedup_vertices(&positions, 20).len(), 3);
        assert_eq!(dedup_vertices(&positions, u32::MAX).len(), 3);
        assert_eq!(
            dedup_vertices(&[[0.5, 0.0, 0.0], [0.500_000_000_1, 0.0, 0.0]], 40).len(),
            1
        );
    }

    #[test]
    fn test_fewer_than_three_points_pass_through() {
        assert!(convex_hull(&[]).is_empty());
        let two = [v(3.0, 4.0), v(1.0, 1.0)];
        assert_eq!(convex_hull(&two), two.to_vec());
    }

    #[test]
    fn test_dedup_collapses_near_duplicates() {
        let positions = [
            [1.0, 2.0, 3.0],
            [1.000_000_1, 2.0, 3.0],
            [-0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.0, 2.0, 3.5],
        ];
        let unique = dedup_vertices(&positions, 6);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(unique[2], Vec3::new(1.0, 2.0, 3.5));
    }

    #[test]
    fn test_ndc_to_pixels_flips_y() {
        assert_eq!(ndc_to_pixels(Vec3::new(-1.0, 1.0, 0.0), 800.0, 600.0), v(0.0, 0.0));
        assert_eq!(ndc_to_pixels(Vec3::new(1.0, -1.0, 0.0), 800.0, 600.0), v(800.0, 600.0));
        assert_eq!(ndc_to_pixels(Vec3::zero(), 800.0, 600.0), v(400.0, 300.0));
    }

    #[test]
    fn test_projection_centers_target() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zero(), Vec3::Y);
        let proj = Mat4::perspective(75f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0);
        let vp = proj * view;

        let center = project_to_ndc(&vp, Vec3::zero()).unwrap();
        assert!(center.x.abs() < 1e-6 && center.y.abs() < 1e-6);

        let right = project_to_ndc(&vp, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(right.x > 0.0);
        let up = project_to_ndc(&vp, Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(up.y > 0.0);

        assert!(project_to_ndc(&vp, Vec3::new(0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn test_aabb_transform() {
        let local = Aabb::from_center_size(Vec3::zero(), Vec3::new(2.0, 4.0, 6.0));
        let moved = local.transformed(&Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(moved.center(), Vec3::new(1.0, 0.0, 0.0));

        let turned = local.transformed(&Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2));
        let size = turned.size();
        assert!((size.y - 6.0).abs() < 1e-4 && (size.z - 4.0).abs() < 1e-4);

        assert!(Aabb::from_points(std::iter::empty()).is_empty());
        assert_eq!(Aabb::EMPTY.size(), Vec3::zero());
    }
}
