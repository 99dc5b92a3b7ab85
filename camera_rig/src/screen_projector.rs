// screen_projector.rs - Per-frame screen-space outline of the display mesh

use crate::animation::Vec3;
use crate::geometry::{convex_hull, dedup_vertices, ndc_to_pixels, Vec2};
use crate::scene::{SceneCamera, ScreenMesh, Viewport};

/// Callback receiving the hull polygon in pixel coordinates.
pub type ScreenTransformCallback = Box<dyn FnMut(&[Vec2])>;

/// Projects the screen mesh into the viewport and reports the convex outline
/// the host clips its overlay to.
///
/// Everything is recomputed from the current vertex buffer and transforms on
/// every call; only the scratch allocations are reused between frames.
pub struct ScreenProjector {
    callback: Option<ScreenTransformCallback>,
    precision: u32,
    screen_points: Vec<Vec2>,
}

impl ScreenProjector {
    pub fn new(precision: u32) -> Self {
        Self {
            callback: None,
            precision,
            screen_points: Vec::new(),
        }
    }

    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&[Vec2]) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Project the mesh and return its screen-space convex hull without
    /// invoking the callback.
    pub fn project_frame<C, M>(&mut self, camera: &C, mesh: &M, viewport: Viewport) -> Vec<Vec2>
    where
        C: SceneCamera,
        M: ScreenMesh,
    {
        let world = mesh.world_matrix();
        let unique: Vec<Vec3> = dedup_vertices(mesh.local_positions(), self.precision);

        self.screen_points.clear();
        for local in unique {
            let world_vertex = world.transform_point(local);
            if let Some(ndc) = camera.project(world_vertex) {
                let pixel = ndc_to_pixels(ndc, viewport.width, viewport.height);
                if pixel.is_finite() {
                    self.screen_points.push(pixel);
                }
            }
        }

        let hull = convex_hull(&self.screen_points);
        log::trace!("Projected {} screen points, hull of {}", self.screen_points.len(), hull.len());
        hull
    }

    /// Project and report to the registered callback. Returns the hull, or
    /// `None` when no callback is registered (nothing is computed then).
    pub fn emit<C, M>(&mut self, camera: &C, mesh: &M, viewport: Viewport) -> Option<Vec<Vec2>>
    where
        C: SceneCamera,
        M: ScreenMesh,
    {
        if self.callback.is_none() {
            return None;
        }
        let hull = self.project_frame(camera, mesh, viewport);
        if let Some(callback) = self.callback.as_mut() {
            callback(&hull);
        }
        Some(hull)
    }
}

impl Default for ScreenProjector {
    fn default() -> Self {
        Self::new(6)
    }
}

impl std::fmt::Debug for ScreenProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenProjector")
            .field("has_callback", &self.has_callback())
            .field("precision", &self.precision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::CameraPose;
    use crate::geometry::{cross, Mat4};
    use crate::scene::{MeshInstance, PerspectiveCamera};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn facing_camera(distance: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.apply_pose(CameraPose::new(Vec3::new(0.0, 0.0, distance), Vec3::zero()));
        camera
    }

    #[test]
    fn test_flat_screen_projects_to_centered_rectangle() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let camera = facing_camera(4.0);
        let mesh = MeshInstance::cuboid(Vec3::new(4.0, 3.0, 0.0), Mat4::IDENTITY);
        let mut projector = ScreenProjector::default();

        let hull = projector.project_frame(&camera, &mesh, viewport);
        assert_eq!(hull.len(), 4);

        let (min_x, max_x) = hull.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        let (min_y, max_y) = hull.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        assert!(((min_x + max_x) / 2.0 - 960.0).abs() < 0.5);
        assert!(((min_y + max_y) / 2.0 - 540.0).abs() < 0.5);

        // Pivot is a bottom corner, and the outline is strictly convex
        assert!((hull[0].y - max_y).abs() < 1e-3);
        for i in 0..hull.len() {
            let n = hull.len();
            assert!(cross(hull[i], hull[(i + 1) % n], hull[(i + 2) % n]) > 0.0);
        }
    }

    #[test]
    fn test_emit_reports_to_callback() {
        let viewport = Viewport::new(800.0, 600.0);
        let camera = facing_camera(5.0);
        let mesh = MeshInstance::cuboid(Vec3::new(2.0, 1.0, 0.2), Mat4::IDENTITY);
        let mut projector = ScreenProjector::default();

        assert!(projector.emit(&camera, &mesh, viewport).is_none());

        let seen: Rc<RefCell<Vec<Vec<Vec2>>>> = Rc::default();
        let sink = Rc::clone(&seen);
        projector.set_callback(move |hull| sink.borrow_mut().push(hull.to_vec()));

        let hull = projector.emit(&camera, &mesh, viewport).unwrap();
        projector.emit(&camera, &mesh, viewport);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], hull);
        // A box seen head-on outlines as its nearer, larger face
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn test_points_behind_camera_are_dropped() {
        let viewport = Viewport::new(800.0, 600.0);
        let camera = facing_camera(1.0);
        // Straddles the camera plane
        let mesh = MeshInstance::new(
            vec![[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 3.0]],
            Mat4::IDENTITY,
        );
        let mut projector = ScreenProjector::default();
        let hull = projector.project_frame(&camera, &mesh, viewport);
        assert_eq!(hull.len(), 3);
    }

    #[test]
    fn test_non_finite_vertices_are_skipped() {
        let viewport = Viewport::new(800.0, 600.0);
        let camera = facing_camera(5.0);
        let mesh = MeshInstance::new(
            vec![
                [-1.0, -1.0, 0.0],
                [f32::NAN, 0.0, 0.0],
                [1.0, -1.0, 0.0],
                [0.0, f32::INFINITY, 0.0],
                [1.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0],
            ],
            Mat4::IDENTITY,
        );
        let mut projector = ScreenProjector::default();
        let hull = projector.project_frame(&camera, &mesh, viewport);
        assert_eq!(hull.len(), 4);
        assert!(hull.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_degenerate_mesh_passes_through() {
        let viewport = Viewport::new(800.0, 600.0);
        let camera = facing_camera(5.0);
        let mesh = MeshInstance::new(vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], Mat4::IDENTITY);
        let mut projector = ScreenProjector::default();
        let hull = projector.project_frame(&camera, &mesh, viewport);
        assert_eq!(hull.len(), 2);
        assert!((hull[0].x - 400.0).abs() < 1e-3);
    }
}
