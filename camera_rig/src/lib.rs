// lib.rs - Library exports for portfolio-camera-rig
// Camera choreography and screen-overlay projection for the portfolio scene

pub mod animation;
pub mod config;
pub mod error_handling;
pub mod geometry;
pub mod policy;
pub mod scene;
pub mod screen_projector;

// Re-export commonly used types
pub use animation::{AnimationError, AnimationPhase, CameraPose, CameraRig, Easing, Transition, Vec3};
pub use config::RigConfig;
pub use error_handling::RigError;
pub use geometry::{convex_hull, dedup_vertices, Mat4, Vec2};
pub use policy::{responsive_distance, rotation_correction, zoom_padding, RotationCorrection};
pub use scene::{FrameClock, MeshDescription, MeshInstance, PerspectiveCamera, SceneCamera, ScreenMesh, Viewport};
pub use screen_projector::ScreenProjector;
