// animation/camera_animator.rs - Zoom choreography state machine driven once per frame

use super::{AnimationError, AnimationPhase, CameraPose, Result, Spherical, Transition, Vec3};
use crate::config::RigConfig;
use crate::geometry::Vec2;
use crate::policy::{fit_distance, responsive_distance, shortest_arc_end, vertical_offset, zoom_padding};
use crate::scene::{MeshInstance, PerspectiveCamera, SceneCamera, ScreenMesh, Viewport};
use crate::screen_projector::ScreenProjector;

pub type ZoomCompleteCallback = Box<dyn FnMut()>;
pub type PhaseChangeCallback = Box<dyn FnMut(AnimationPhase, AnimationPhase)>;

/// Engine state. Each variant carries only what its phase needs, so a pose
/// transition and a rotation can never be live at the same time.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RigState {
    Idle,
    Rotating {
        rotation: Transition<f32>,
        radius: f32,
        phi: f32,
        target: Vec3,
    },
    ZoomingIn(Transition<CameraPose>),
    Zoomed,
    ZoomingOut(Transition<CameraPose>),
}

impl RigState {
    fn phase(&self) -> AnimationPhase {
        match self {
            RigState::Idle => AnimationPhase::Idle,
            RigState::Rotating { .. } => AnimationPhase::Rotating,
            RigState::ZoomingIn(_) => AnimationPhase::ZoomingIn,
            RigState::Zoomed => AnimationPhase::Zoomed,
            RigState::ZoomingOut(_) => AnimationPhase::ZoomingOut,
        }
    }
}

/// What a finished transition hands back to the tick driver. Produced once,
/// at the frame where progress reaches 1.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Completion {
    BeginZoomIn,
    EnterZoomed(CameraPose),
    EnterIdle(CameraPose),
}

/// Camera rig for the portfolio scene.
///
/// Owns the camera pose while a transition is running and hands it back to
/// interactive orbiting once idle. The host calls [`CameraRig::tick`] once per
/// rendered frame with a monotonic clock reading in seconds.
pub struct CameraRig<C: SceneCamera = PerspectiveCamera, M: ScreenMesh = MeshInstance> {
    camera: C,
    screen: Option<M>,
    viewport: Viewport,
    config: RigConfig,

    // Authoritative pose, mirrored into the camera on every write
    pose: CameraPose,
    idle_pose: CameraPose,

    state: RigState,
    projector: ScreenProjector,

    on_zoom_in_complete: Option<ZoomCompleteCallback>,
    on_phase_change: Option<PhaseChangeCallback>,

    last_tick: Option<f32>,
}

impl<C: SceneCamera, M: ScreenMesh> CameraRig<C, M> {
    /// Wire the rig to its scene references and park the camera at the idle
    /// pose for the viewport.
    pub fn new(mut camera: C, screen: Option<M>, viewport: Viewport, config: RigConfig) -> Self {
        let idle_pose = Self::idle_pose_for(viewport);
        camera.set_aspect(viewport.aspect());
        camera.apply_pose(idle_pose);

        if screen.is_none() {
            log::warn!("Camera rig created without a screen mesh; zoom requests will be dropped");
        }
        if let Err(err) = config.validate() {
            log::warn!("{err}; out-of-range values are clamped where they are used");
        }

        Self {
            camera,
            screen,
            viewport,
            projector: ScreenProjector::new(config.dedup_precision),
            config,
            pose: idle_pose,
            idle_pose,
            state: RigState::Idle,
            on_zoom_in_complete: None,
            on_phase_change: None,
            last_tick: None,
        }
    }

    fn idle_pose_for(viewport: Viewport) -> CameraPose {
        let distance = responsive_distance(viewport.width, viewport.height);
        CameraPose::new(Vec3::new(0.0, 0.0, distance), Vec3::zero())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn phase(&self) -> AnimationPhase {
        self.state.phase()
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Pose the rig returns to after zooming out.
    pub fn idle_pose(&self) -> CameraPose {
        self.idle_pose
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn screen_mesh(&self) -> Option<&M> {
        self.screen.as_ref()
    }

    /// Replace (or remove) the screen mesh reference, returning the old one.
    pub fn set_screen_mesh(&mut self, screen: Option<M>) -> Option<M> {
        std::mem::replace(&mut self.screen, screen)
    }

    /// Whether interactive orbiting may move the camera.
    pub fn controls_enabled(&self) -> bool {
        self.phase().controls_enabled()
    }

    /// Whether the camera is currently spinning on its own.
    pub fn autorotate_active(&self) -> bool {
        self.config.autorotate && self.controls_enabled()
    }

    // ========================================================================
    // HOST CALLBACKS
    // ========================================================================

    /// Called once each time a zoom-in lands.
    pub fn on_zoom_in_complete<F>(&mut self, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.on_zoom_in_complete = Some(Box::new(callback));
    }

    /// Called with `(from, to)` on every phase transition.
    pub fn on_phase_change<F>(&mut self, callback: F)
    where
        F: FnMut(AnimationPhase, AnimationPhase) + 'static,
    {
        self.on_phase_change = Some(Box::new(callback));
    }

    /// Called with the screen outline in pixels on every frame spent zoomed.
    pub fn on_screen_transform<F>(&mut self, callback: F)
    where
        F: FnMut(&[Vec2]) + 'static,
    {
        self.projector.set_callback(callback);
    }

    // ========================================================================
    // TRIGGERS
    // ========================================================================

    /// Start zooming into the screen. Rotates out of the forbidden viewing
    /// arc first when the camera sits inside it.
    pub fn try_zoom_in(&mut self, now: f32) -> Result<()> {
        let phase = self.phase();
        if phase != AnimationPhase::Idle {
            return Err(AnimationError::WrongPhase { trigger: "zoom_in", phase });
        }
        if self.screen.is_none() {
            log::warn!("Screen mesh not found, zoom request dropped");
            return Err(AnimationError::ScreenMeshUnavailable);
        }

        let spherical = self.pose.spherical();
        let correction = self.config.forbidden_arc().correct(spherical.theta.to_degrees());

        if !correction.needs_correction {
            return self.begin_zoom_in(now);
        }

        let end_theta = shortest_arc_end(spherical.theta, correction.target_deg.to_radians());
        let rotation = Transition::new(spherical.theta, end_theta, now, self.config.rotation_duration_secs)?
            .with_easing(self.config.easing);

        log::debug!(
            "Azimuth {:.1} deg is inside the forbidden arc, rotating to {:.1} deg",
            spherical.theta.to_degrees(),
            correction.target_deg
        );

        self.set_state(RigState::Rotating {
            rotation,
            radius: spherical.radius,
            phi: spherical.phi,
            target: self.pose.target,
        });
        Ok(())
    }

    /// Fire-and-forget form of [`CameraRig::try_zoom_in`].
    pub fn zoom_in(&mut self, now: f32) {
        if let Err(err) = self.try_zoom_in(now) {
            log::debug!("{err}");
        }
    }

    /// Start returning from the zoomed view to the idle pose.
    pub fn try_zoom_out(&mut self, now: f32) -> Result<()> {
        let phase = self.phase();
        if phase != AnimationPhase::Zoomed {
            return Err(AnimationError::WrongPhase { trigger: "zoom_out", phase });
        }

        let transition = Transition::new(self.pose, self.idle_pose, now, self.config.zoom_duration_secs)?
            .with_easing(self.config.easing);
        self.set_state(RigState::ZoomingOut(transition));
        Ok(())
    }

    /// Fire-and-forget form of [`CameraRig::try_zoom_out`].
    pub fn zoom_out(&mut self, now: f32) {
        if let Err(err) = self.try_zoom_out(now) {
            log::debug!("{err}");
        }
    }

    /// Apply a user drag of `delta_azimuth` radians around the current target.
    pub fn orbit(&mut self, delta_azimuth: f32) -> Result<()> {
        let phase = self.phase();
        if !phase.controls_enabled() {
            return Err(AnimationError::WrongPhase { trigger: "orbit", phase });
        }
        self.rotate_azimuth(delta_azimuth);
        Ok(())
    }

    /// Viewport resize. The idle framing is only recomputed while idle so a
    /// running or finished zoom keeps its pose.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());

        if self.phase() == AnimationPhase::Idle {
            self.idle_pose = Self::idle_pose_for(viewport);
            self.set_pose(self.idle_pose);
            log::debug!(
                "Viewport {}x{}, idle distance {:.2}",
                viewport.width,
                viewport.height,
                self.idle_pose.distance()
            );
        }
    }

    // ========================================================================
    // FRAME UPDATE
    // ========================================================================

    /// Advance the rig to `now` (seconds on a monotonic clock).
    pub fn tick(&mut self, now: f32) {
        let dt = self.last_tick.map_or(0.0, |last| (now - last).max(0.0));
        self.last_tick = Some(now);

        let state = self.state;
        let completion = match state {
            RigState::Idle => {
                if self.autorotate_active() && dt > 0.0 {
                    // Orbit-control autorotation turns the camera to the left
                    self.rotate_azimuth(-self.config.autorotate_rate() * dt);
                }
                None
            }
            RigState::Rotating { rotation, radius, phi, target } => {
                let offset = Spherical::new(radius, phi, rotation.sample(now)).to_vec3();
                self.set_pose(CameraPose::new(target + offset, target));
                rotation.is_complete(now).then_some(Completion::BeginZoomIn)
            }
            RigState::ZoomingIn(transition) => {
                self.set_pose(transition.sample(now));
                transition
                    .is_complete(now)
                    .then(|| Completion::EnterZoomed(transition.end()))
            }
            RigState::Zoomed => None,
            RigState::ZoomingOut(transition) => {
                self.set_pose(transition.sample(now));
                transition
                    .is_complete(now)
                    .then(|| Completion::EnterIdle(transition.end()))
            }
        };

        if let Some(completion) = completion {
            self.complete(completion, now);
        }

        if self.phase() == AnimationPhase::Zoomed {
            if let Some(mesh) = self.screen.as_ref() {
                self.projector.emit(&self.camera, mesh, self.viewport);
            }
        }
    }

    /// Project the screen outline for the current pose without going through
    /// the callback. `None` without a screen mesh.
    pub fn project_screen(&mut self) -> Option<Vec<Vec2>> {
        let mesh = self.screen.as_ref()?;
        Some(self.projector.project_frame(&self.camera, mesh, self.viewport))
    }

    /// Pose that frames the screen mesh, or `None` if there is no usable mesh.
    pub fn zoom_target(&self) -> Option<CameraPose> {
        let mesh = self.screen.as_ref()?;
        let bounds = mesh.world_bounds();
        if bounds.is_empty() {
            return None;
        }

        let size = bounds.size();
        let center = bounds.center();
        let aspect = self.camera.aspect();

        let offset = vertical_offset(size.y, aspect, self.config.vertical_offset_ratio);
        let center = Vec3::new(center.x, center.y - offset, center.z);

        let padding = zoom_padding(self.viewport.width, self.viewport.height);
        let distance = fit_distance(size.x, size.y, self.camera.fov_degrees(), aspect, padding);

        Some(CameraPose::new(center + Vec3::new(0.0, 0.0, distance), center))
    }

    fn begin_zoom_in(&mut self, now: f32) -> Result<()> {
        let Some(end) = self.zoom_target() else {
            log::warn!("Screen mesh missing or has empty bounds, zoom request dropped");
            return Err(AnimationError::ScreenMeshUnavailable);
        };
        let transition = Transition::new(self.pose, end, now, self.config.zoom_duration_secs)?
            .with_easing(self.config.easing);
        self.set_state(RigState::ZoomingIn(transition));
        Ok(())
    }

    fn complete(&mut self, completion: Completion, now: f32) {
        match completion {
            Completion::BeginZoomIn => {
                if let Err(err) = self.begin_zoom_in(now) {
                    log::warn!("Rotation finished but zoom could not start: {err}");
                    self.set_state(RigState::Idle);
                }
            }
            Completion::EnterZoomed(end) => {
                self.set_pose(end);
                self.set_state(RigState::Zoomed);
                if let Some(callback) = self.on_zoom_in_complete.as_mut() {
                    callback();
                }
            }
            Completion::EnterIdle(end) => {
                self.set_pose(end);
                self.set_state(RigState::Idle);
            }
        }
    }

    fn rotate_azimuth(&mut self, delta: f32) {
        let target = self.pose.target;
        let mut spherical = self.pose.spherical();
        spherical.theta += delta;
        let spherical = spherical.make_safe();
        self.set_pose(CameraPose::new(target + spherical.to_vec3(), target));
    }

    fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
        self.camera.apply_pose(pose);
    }

    fn set_state(&mut self, next: RigState) {
        let from = self.state.phase();
        let to = next.phase();
        debug_assert!(
            from == to || from.successors().contains(&to),
            "illegal phase transition {from} -> {to}"
        );

        self.state = next;
        if from != to {
            log::debug!("Camera phase {from} -> {to}");
            if let Some(callback) = self.on_phase_change.as_mut() {
                callback(from, to);
            }
        }
    }
}

impl<C: SceneCamera, M: ScreenMesh> std::fmt::Debug for CameraRig<C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraRig")
            .field("phase", &self.phase())
            .field("pose", &self.pose)
            .field("idle_pose", &self.idle_pose)
            .field("viewport", &self.viewport)
            .field("has_screen_mesh", &self.screen.is_some())
            .field("projector", &self.projector)
            .finish()
    }
}
