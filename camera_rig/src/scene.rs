// scene.rs - Host-side scene references the camera rig is wired to

use std::path::Path;
use std::time::Instant;
use serde::{Serialize, Deserialize};
use crate::animation::{CameraPose, Vec3};
use crate::error_handling::{read_to_string, Result, RigError};
use crate::geometry::{project_to_ndc, Aabb, Mat4};

// ============================================================================
// VIEWPORT
// ============================================================================

/// Drawing surface size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, 1 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

// ============================================================================
// CAMERA
// ============================================================================

/// Camera the rig drives.
pub trait SceneCamera {
    fn position(&self) -> Vec3;

    /// Move the camera and aim it at `pose.target`.
    fn apply_pose(&mut self, pose: CameraPose);

    /// Vertical field of view in degrees.
    fn fov_degrees(&self) -> f32;

    fn aspect(&self) -> f32;

    fn set_aspect(&mut self, aspect: f32);

    /// World point to normalized device coordinates, `None` when the point
    /// is behind the camera.
    fn project(&self, world: Vec3) -> Option<Vec3>;
}

/// Pinhole perspective camera with a Y-up look-at orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pose: CameraPose,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view_projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            pose: CameraPose::new(Vec3::new(0.0, 0.0, 5.0), Vec3::zero()),
            fov_degrees,
            aspect,
            near,
            far,
            view_projection: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    fn update_matrices(&mut self) {
        let view = Mat4::look_at(self.pose.position, self.pose.target, Vec3::Y);
        let projection = Mat4::perspective(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
        self.view_projection = projection * view;
    }
}

impl Default for PerspectiveCamera {
    /// 75 degree field of view, the stock canvas camera.
    fn default() -> Self {
        Self::new(75.0, Viewport::default().aspect(), 0.1, 1000.0)
    }
}

impl SceneCamera for PerspectiveCamera {
    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn apply_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
        self.update_matrices();
    }

    fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    fn aspect(&self) -> f32 {
        self.aspect
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_matrices();
    }

    fn project(&self, world: Vec3) -> Option<Vec3> {
        project_to_ndc(&self.view_projection, world)
    }
}

// ============================================================================
// SCREEN MESH
// ============================================================================

/// The display-surface geometry the overlay is glued to.
pub trait ScreenMesh {
    fn world_matrix(&self) -> Mat4;

    /// Vertex positions in local space, one entry per buffer vertex.
    fn local_positions(&self) -> &[[f32; 3]];

    /// World-space bounds: the local bounds' corners taken through the world
    /// matrix.
    fn world_bounds(&self) -> Aabb {
        Aabb::from_points(self.local_positions().iter().map(|&p| Vec3::from(p)))
            .transformed(&self.world_matrix())
    }
}

/// A vertex buffer plus its world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstance {
    positions: Vec<[f32; 3]>,
    world: Mat4,
}

impl MeshInstance {
    pub fn new(positions: Vec<[f32; 3]>, world: Mat4) -> Self {
        Self { positions, world }
    }

    /// Decode a tightly packed native-endian `f32` xyz buffer, as stored in a
    /// GPU or glTF position accessor.
    pub fn from_position_bytes(bytes: &[u8], world: Mat4) -> Result<Self> {
        const STRIDE: usize = 3 * std::mem::size_of::<f32>();
        if bytes.len() % STRIDE != 0 {
            return Err(RigError::VertexBufferLength { len: bytes.len() });
        }
        // Copies, so the source slice need not be f32-aligned
        let positions: Vec<[f32; 3]> = bytemuck::pod_collect_to_vec(bytes);
        Ok(Self::new(positions, world))
    }

    /// Axis-aligned box with four vertices per face (24 total), so that
    /// corners are shared between faces the way exported meshes are.
    pub fn cuboid(size: Vec3, world: Mat4) -> Self {
        let h = size * 0.5;
        let corner = |sx: f32, sy: f32, sz: f32| [sx * h.x, sy * h.y, sz * h.z];
        let faces: [[[f32; 3]; 4]; 6] = [
            [corner(1.0, -1.0, -1.0), corner(1.0, 1.0, -1.0), corner(1.0, 1.0, 1.0), corner(1.0, -1.0, 1.0)],
            [corner(-1.0, -1.0, 1.0), corner(-1.0, 1.0, 1.0), corner(-1.0, 1.0, -1.0), corner(-1.0, -1.0, -1.0)],
            [corner(-1.0, 1.0, 1.0), corner(1.0, 1.0, 1.0), corner(1.0, 1.0, -1.0), corner(-1.0, 1.0, -1.0)],
            [corner(-1.0, -1.0, -1.0), corner(1.0, -1.0, -1.0), corner(1.0, -1.0, 1.0), corner(-1.0, -1.0, 1.0)],
            [corner(-1.0, -1.0, 1.0), corner(1.0, -1.0, 1.0), corner(1.0, 1.0, 1.0), corner(-1.0, 1.0, 1.0)],
            [corner(1.0, -1.0, -1.0), corner(-1.0, -1.0, -1.0), corner(-1.0, 1.0, -1.0), corner(1.0, 1.0, -1.0)],
        ];
        Self::new(faces.into_iter().flatten().collect(), world)
    }

    pub fn set_world_matrix(&mut self, world: Mat4) {
        self.world = world;
    }
}

impl ScreenMesh for MeshInstance {
    fn world_matrix(&self) -> Mat4 {
        self.world
    }

    fn local_positions(&self) -> &[[f32; 3]] {
        &self.positions
    }
}

/// JSON description of a screen mesh: local positions plus a
/// translate * rotate-x * scale placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshDescription {
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Radians about the X axis.
    #[serde(default)]
    pub rotation_x: f32,
    #[serde(default = "MeshDescription::unit_scale")]
    pub scale: f32,
}

impl MeshDescription {
    fn unit_scale() -> f32 {
        1.0
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let description = serde_json::from_str(&read_to_string(path)?)?;
        log::debug!("Loaded screen mesh description from {}", path.display());
        Ok(description)
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from(self.translation))
            * Mat4::from_rotation_x(self.rotation_x)
            * Mat4::from_scale(Vec3::new(self.scale, self.scale, self.scale))
    }

    pub fn into_mesh(self) -> Result<MeshInstance> {
        if self.positions.is_empty() {
            return Err(RigError::InvalidMesh { reason: "no vertex positions".to_string() });
        }
        if self.positions.iter().flatten().any(|c| !c.is_finite()) {
            return Err(RigError::InvalidMesh { reason: "non-finite vertex position".to_string() });
        }
        let world = self.world_matrix();
        Ok(MeshInstance::new(self.positions, world))
    }
}

// ============================================================================
// CLOCK
// ============================================================================

/// Monotonic seconds since the clock was created, for live hosts.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
