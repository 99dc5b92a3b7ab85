// main.rs - Headless camera rig session: zoom in, hold, zoom out, report every frame.
// Stands in for the browser host so the whole choreography can be inspected from a terminal.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use portfolio_camera_rig::{
    AnimationPhase, CameraPose, CameraRig, FrameClock, Mat4, MeshDescription, MeshInstance,
    PerspectiveCamera, RigConfig, Vec2, Vec3, Viewport,
};

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Viewport width in CSS pixels
    #[arg(short = 'W', long, default_value = "1920")]
    pub width: f32,

    /// Viewport height in CSS pixels
    #[arg(short = 'H', long, default_value = "1080")]
    pub height: f32,

    /// Vertical field of view in degrees
    #[arg(long, default_value = "75")]
    pub fov: f32,

    /// Simulated frames per second
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Starting azimuth in degrees; 0 faces the screen head-on
    #[arg(short, long, default_value = "180", allow_hyphen_values = true)]
    pub azimuth: f32,

    /// Seconds to stay zoomed before zooming back out
    #[arg(long, default_value = "1.0")]
    pub hold: f32,

    /// Rig configuration JSON (any subset of fields)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Screen mesh description JSON; a 4 x 3 x 0.1 box when omitted
    #[arg(short, long)]
    pub mesh: Option<PathBuf>,

    /// Emit one JSON frame report per line on stdout
    #[arg(long)]
    pub json: bool,

    /// Pace frames against the wall clock instead of a fixed step
    #[arg(long)]
    pub realtime: bool,

    /// Stop after this many frames even if the session has not finished
    #[arg(long, default_value = "10000")]
    pub max_frames: u32,
}

/// One line of `--json` output.
#[derive(Debug, Serialize)]
struct FrameReport {
    frame: u32,
    time: f32,
    phase: AnimationPhase,
    pose: CameraPose,
    #[serde(skip_serializing_if = "Option::is_none")]
    hull: Option<Vec<Vec2>>,
}

/// What the rig's callbacks have told the driver so far.
#[derive(Debug, Default)]
struct SessionEvents {
    transitions: Vec<(AnimationPhase, AnimationPhase)>,
    zoom_completions: u32,
    latest_hull: Option<Vec<Vec2>>,
}

fn load_config(args: &Args) -> Result<RigConfig> {
    match &args.config {
        Some(path) => RigConfig::from_json_file(path)
            .with_context(|| format!("Failed to load rig config {}", path.display())),
        None => Ok(RigConfig::default()),
    }
}

fn load_screen_mesh(args: &Args) -> Result<MeshInstance> {
    match &args.mesh {
        Some(path) => {
            let description = MeshDescription::from_json_file(path)
                .with_context(|| format!("Failed to load mesh description {}", path.display()))?;
            description
                .into_mesh()
                .with_context(|| format!("Unusable mesh description {}", path.display()))
        }
        None => Ok(MeshInstance::cuboid(Vec3::new(4.0, 3.0, 0.1), Mat4::IDENTITY)),
    }
}

fn build_rig(args: &Args, events: &Rc<RefCell<SessionEvents>>) -> Result<CameraRig> {
    let config = load_config(args)?;
    let mesh = load_screen_mesh(args)?;
    let viewport = Viewport::new(args.width, args.height);
    let camera = PerspectiveCamera::new(args.fov, viewport.aspect(), 0.1, 1000.0);

    let mut rig = CameraRig::new(camera, Some(mesh), viewport, config);
    rig.orbit(args.azimuth.to_radians())
        .context("Failed to place the camera at the starting azimuth")?;

    let sink = Rc::clone(events);
    rig.on_phase_change(move |from, to| sink.borrow_mut().transitions.push((from, to)));
    let sink = Rc::clone(events);
    rig.on_zoom_in_complete(move || sink.borrow_mut().zoom_completions += 1);
    let sink = Rc::clone(events);
    rig.on_screen_transform(move |hull| sink.borrow_mut().latest_hull = Some(hull.to_vec()));

    Ok(rig)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    ensure!(args.fps > 0, "--fps must be at least 1");
    ensure!(
        args.width > 0.0 && args.height > 0.0,
        "viewport must be non-empty, got {}x{}",
        args.width,
        args.height
    );
    ensure!(args.hold.is_finite() && args.hold >= 0.0, "--hold must be a non-negative number of seconds");

    let events = Rc::new(RefCell::new(SessionEvents::default()));
    let mut rig = build_rig(&args, &events)?;
    info!(
        "Camera at azimuth {:.1} deg, distance {:.2}",
        rig.pose().azimuth_degrees(),
        rig.pose().distance()
    );

    let frame_step = 1.0 / args.fps as f32;
    let clock = FrameClock::new();
    let mut pacer = tokio::time::interval(Duration::from_secs_f32(frame_step));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut zoomed_at: Option<f32> = None;
    let mut left_idle = false;
    let mut frame = 0u32;

    while frame < args.max_frames {
        let now = if args.realtime {
            pacer.tick().await;
            clock.elapsed_secs()
        } else {
            frame as f32 * frame_step
        };

        if frame == 0 {
            rig.zoom_in(now);
        }

        rig.tick(now);
        let phase = rig.phase();

        match phase {
            AnimationPhase::Idle if left_idle => {
                info!("Back to {phase} at {now:.3}s after {} frames", frame + 1);
                break;
            }
            AnimationPhase::Idle => {}
            AnimationPhase::Zoomed => {
                left_idle = true;
                let since = *zoomed_at.get_or_insert(now);
                if now - since >= args.hold {
                    rig.zoom_out(now);
                }
            }
            _ => left_idle = true,
        }

        if args.json {
            let report = FrameReport {
                frame,
                time: now,
                phase,
                pose: rig.pose(),
                hull: events.borrow_mut().latest_hull.take(),
            };
            serde_json::to_writer(&mut out, &report).context("Failed to encode frame report")?;
            writeln!(out).context("Failed to write frame report")?;
        }

        frame += 1;
    }

    if frame >= args.max_frames {
        warn!("Stopped after {} frames in phase {}", frame, rig.phase());
    }

    let events = events.borrow();
    for (from, to) in &events.transitions {
        info!("Phase {from} -> {to}");
    }
    info!(
        "Zoom-in completed {} time(s), final pose {:?}",
        events.zoom_completions,
        rig.pose()
    );

    out.flush().context("Failed to flush stdout")?;
    Ok(())
}
