use anyhow::Result;
use glam::DVec2;
use log::info;

use crate::color::Rgb;
use crate::render::HeadlessTarget;
use crate::scene::Scene;
use crate::session::Session;
use crate::stage::{PointerButton, Stage, StageConfig};
use crate::viewport::{SharedViewport, ViewportSize};

/// Frame clock used when no display drives the loop.
pub const HEADLESS_FRAME_RATE: f64 = 60.0;

/// Frames simulated after a headless drag so the color transition settles.
pub const SETTLE_FRAMES: u32 = 90;

pub fn scene_summary(scene: &Scene) -> Vec<String> {
    let mut lines = Vec::with_capacity(scene.objects.len() + 1);
    lines.push(format!(
        "Loaded scene with {} objects ({} lights)",
        scene.objects.len(),
        scene.lights.len()
    ));
    for object in &scene.objects {
        lines.push(format!(" - {} ({})", object.name, object.object_type));
    }
    lines
}

pub fn log_scene_summary(scene: &Scene) {
    for line in scene_summary(scene) {
        info!("{line}");
    }
}

pub fn final_state_report(stage: &Stage) -> Vec<String> {
    let mesh = stage.mesh();
    let overlay = stage.overlay();
    let camera = stage.camera();
    let distance = stage
        .controls()
        .map(|controls| camera.position.distance(controls.target()))
        .unwrap_or_else(|| camera.position.length());
    vec![
        "Final stage state:".to_string(),
        format!(
            " - {} scale=({:.2}, {:.2}, {:.2}) color={}",
            mesh.name,
            mesh.scale.x,
            mesh.scale.y,
            mesh.scale.z,
            Rgb::from_linear(stage.mesh_color())
        ),
        format!(
            " - nav offset={:.1}% caption opacity={:.2}",
            overlay.nav_offset_percent, overlay.caption_opacity
        ),
        format!(
            " - camera pos=({:.2}, {:.2}, {:.2}) distance={:.2}",
            camera.position.x, camera.position.y, camera.position.z, distance
        ),
    ]
}

pub fn print_final_state(stage: &Stage) {
    for line in final_state_report(stage) {
        println!("{line}");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessRun {
    pub size: ViewportSize,
    pub frames: u32,
    /// Press at the first point, move through the rest, then release.
    pub drag: Vec<DVec2>,
}

impl Default for HeadlessRun {
    fn default() -> Self {
        Self {
            size: ViewportSize::new(1280, 720),
            frames: 240,
            drag: Vec::new(),
        }
    }
}

impl HeadlessRun {
    /// Mounts a session on a [`HeadlessTarget`] and plays the run against it.
    /// The returned session is still mounted.
    pub fn execute(&self, scene: &Scene, config: StageConfig) -> Result<Session<HeadlessTarget>> {
        let viewport = SharedViewport::new(self.size.width, self.size.height);
        let mut session = Session::mount(scene, config, viewport, HeadlessTarget::new())?;
        let mut clock = 0u64;
        let mut tick = |session: &mut Session<HeadlessTarget>| {
            let timestamp = clock as f64 / HEADLESS_FRAME_RATE;
            clock += 1;
            // Headless frames cannot fail.
            let _ = session.frame(timestamp);
        };

        for _ in 0..self.frames {
            tick(&mut session);
        }

        if let Some((first, rest)) = self.drag.split_first() {
            session.pointer_pressed(PointerButton::Primary, *first);
            for point in rest {
                session.pointer_moved(*point);
                tick(&mut session);
            }
            session.pointer_released(PointerButton::Primary);
            for _ in 0..SETTLE_FRAMES {
                tick(&mut session);
            }
        }

        info!(
            "headless run finished after {} frame(s)",
            session.frames_drawn()
        );
        Ok(session)
    }
}
