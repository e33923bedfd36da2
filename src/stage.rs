use anyhow::Result;
use glam::{DVec2, Mat4, Vec3};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::controls::{OrbitControls, OrbitSettings};
use crate::interaction::{ColorMapper, PointerPolicy, DEFAULT_BLUE_CHANNEL};
use crate::mesh::MeshData;
use crate::overlay::OverlayState;
use crate::render::{CameraParams, FrameSnapshot, LightParams, MeshInstance};
use crate::scene::Scene;
use crate::timeline::{entrance_sequence, AnimationSink, AnimationTarget, Timeline};
use crate::tween::{Ease, TweenSlot, DEFAULT_DURATION};
use crate::viewport::{
    apply_resize, PerspectiveCamera, SharedViewport, SurfaceSizing, ViewportProvider,
    ViewportSize,
};

/// Behaviour knobs; the defaults give the stock spinning-ball page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub pointer_policy: PointerPolicy,
    pub color_transition_seconds: f32,
    pub blue_channel: i32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            auto_rotate: true,
            auto_rotate_speed: 10.0,
            enable_damping: true,
            damping_factor: 0.05,
            enable_pan: false,
            enable_zoom: false,
            pointer_policy: PointerPolicy::Clamp,
            color_transition_seconds: DEFAULT_DURATION,
            blue_channel: DEFAULT_BLUE_CHANNEL,
        }
    }
}

impl StageConfig {
    fn orbit_settings(&self) -> OrbitSettings {
        OrbitSettings {
            enable_damping: self.enable_damping,
            damping_factor: self.damping_factor,
            enable_pan: self.enable_pan,
            enable_zoom: self.enable_zoom,
            auto_rotate: self.auto_rotate,
            auto_rotate_speed: self.auto_rotate_speed,
            ..OrbitSettings::default()
        }
    }
}

/// Pointer button as reported by the host; `Primary` is the left button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
    Other(u16),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshState {
    pub name: String,
    pub scale: Vec3,
    pub geometry: MeshData,
}

struct EntranceTargets<'a> {
    scale: &'a mut Vec3,
    overlay: &'a mut OverlayState,
}

impl AnimationSink for EntranceTargets<'_> {
    fn apply(&mut self, target: AnimationTarget, value: f32) {
        match target {
            AnimationTarget::MeshScale => *self.scale = Vec3::splat(value),
            AnimationTarget::NavOffset => self.overlay.nav_offset_percent = value,
            AnimationTarget::CaptionOpacity => self.overlay.caption_opacity = value,
        }
    }
}

pub struct Stage {
    config: StageConfig,
    viewport: SharedViewport,
    camera: PerspectiveCamera,
    controls: Option<OrbitControls>,
    light: LightParams,
    mesh: MeshState,
    color: TweenSlot<Vec3>,
    overlay: OverlayState,
    mapper: ColorMapper,
    timeline: Timeline,
    entrance_playbacks: u32,
    mounted: bool,
}

impl Stage {
    /// Builds every entity, sizes the camera and surface, and starts the entrance timeline.
    pub fn mount(
        scene: &Scene,
        config: StageConfig,
        viewport: SharedViewport,
        surface: &mut impl SurfaceSizing,
    ) -> Result<Self> {
        let sphere = scene.sphere()?;
        let geometry = sphere.geometry()?;

        let size = viewport.viewport_size();
        let mut camera = match scene.camera() {
            Some(object) => {
                let mut camera =
                    PerspectiveCamera::new(object.fov, size.aspect(), object.near, object.far);
                camera.position = object.position;
                camera
            }
            None => {
                let mut camera = PerspectiveCamera::new(50.0, size.aspect(), 0.1, 100.0);
                camera.position = Vec3::new(0.0, 0.0, 20.0);
                camera
            }
        };
        apply_resize(size, &mut camera, surface);

        let light = scene
            .light()
            .map(|light| LightParams {
                position: light.position,
                color: light.color,
                intensity: light.intensity,
            })
            .unwrap_or(LightParams {
                position: Vec3::new(0.0, 10.0, 10.0),
                color: Vec3::ONE,
                intensity: 150.0,
            });

        let controls = OrbitControls::new(config.orbit_settings(), &mut camera);

        let mut stage = Self {
            config,
            viewport,
            camera,
            controls: Some(controls),
            light,
            mesh: MeshState {
                name: sphere.name.clone(),
                scale: Vec3::ONE,
                geometry,
            },
            color: TweenSlot::new(sphere.color.to_linear()),
            overlay: OverlayState::default(),
            mapper: ColorMapper::new(config.pointer_policy, config.blue_channel),
            timeline: Timeline::new(entrance_sequence()),
            entrance_playbacks: 0,
            mounted: true,
        };
        stage.play_entrance();
        info!(
            "mounted stage {}x{} with mesh {} ({} vertices)",
            size.width,
            size.height,
            stage.mesh.name,
            stage.mesh.geometry.vertex_count()
        );
        Ok(stage)
    }

    fn play_entrance(&mut self) {
        let mut targets = EntranceTargets {
            scale: &mut self.mesh.scale,
            overlay: &mut self.overlay,
        };
        self.timeline.start(&mut targets);
        self.entrance_playbacks += 1;
        debug!("entrance timeline started ({:.1}s)", self.timeline.duration());
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn resize(&mut self, width: u32, height: u32, surface: &mut impl SurfaceSizing) {
        if !self.mounted {
            return;
        }
        let size = self.viewport.update(width, height);
        apply_resize(size, &mut self.camera, surface);
        debug!("viewport resized to {}x{}", size.width, size.height);
    }

    pub fn pointer_pressed(&mut self, button: PointerButton, position: DVec2) {
        if !self.mounted {
            return;
        }
        self.mapper.press();
        if button == PointerButton::Primary {
            if let Some(controls) = self.controls.as_mut() {
                controls.begin_rotate(position.as_vec2());
            }
        }
    }

    /// Press outside the render surface: starts a color drag only.
    pub fn pointer_pressed_off_surface(&mut self) {
        if self.mounted {
            self.mapper.press();
        }
    }

    pub fn pointer_released(&mut self, button: PointerButton) {
        if !self.mounted {
            return;
        }
        self.mapper.release();
        if button == PointerButton::Primary {
            if let Some(controls) = self.controls.as_mut() {
                controls.end_rotate();
            }
        }
    }

    /// Returns the color target started by this move, if any.
    pub fn pointer_moved(&mut self, position: DVec2) -> Option<Rgb> {
        if !self.mounted {
            return None;
        }
        let size = self.viewport.viewport_size();
        if let Some(controls) = self.controls.as_mut() {
            controls.drag_to(position.as_vec2(), size);
        }
        let rgb = self.mapper.pointer_moved(position, size)?;
        self.color.retarget(
            rgb.to_linear(),
            self.config.color_transition_seconds,
            Ease::default(),
        );
        Some(rgb)
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.mounted {
            return;
        }
        if let Some(controls) = self.controls.as_mut() {
            controls.update(&mut self.camera, Some(dt));
        }
        self.color.advance(dt);
        let mut targets = EntranceTargets {
            scale: &mut self.mesh.scale,
            overlay: &mut self.overlay,
        };
        self.timeline.advance(dt, &mut targets);
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            camera: CameraParams {
                view_proj: self.camera.view_proj(),
                position: self.camera.position,
            },
            light: self.light.clone(),
            mesh: MeshInstance {
                model: Mat4::from_scale(self.mesh.scale),
                color: self.color.value(),
            },
            overlay: self.overlay,
            viewport: self.viewport.viewport_size(),
        }
    }

    /// Releases the orbit control; every entry point is a no-op afterwards.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.mapper.release();
        if let Some(mut controls) = self.controls.take() {
            controls.dispose();
        }
        info!("stage unmounted");
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        self.controls.as_ref()
    }

    pub fn mesh(&self) -> &MeshState {
        &self.mesh
    }

    /// Live linear color of the mesh material.
    pub fn mesh_color(&self) -> Vec3 {
        self.color.value()
    }

    pub fn color_target(&self) -> Option<Vec3> {
        self.color.target()
    }

    pub fn last_target_color(&self) -> Option<Rgb> {
        self.mapper.last_target()
    }

    pub fn is_dragging(&self) -> bool {
        self.mapper.is_dragging()
    }

    pub fn overlay(&self) -> OverlayState {
        self.overlay
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport.viewport_size()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn entrance_playbacks(&self) -> u32 {
        self.entrance_playbacks
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct SizeLog(Vec<ViewportSize>);

    impl SurfaceSizing for SizeLog {
        fn set_size(&mut self, size: ViewportSize) {
            self.0.push(size);
        }
    }

    fn mount(width: u32, height: u32) -> (Stage, SizeLog) {
        let mut surface = SizeLog::default();
        let stage = Stage::mount(
            &Scene::builtin().unwrap(),
            StageConfig::default(),
            SharedViewport::new(width, height),
            &mut surface,
        )
        .unwrap();
        (stage, surface)
    }

    #[test]
    fn mount_sizes_camera_and_surface() {
        let (stage, surface) = mount(800, 600);
        assert_eq!(surface.0, vec![ViewportSize::new(800, 600)]);
        assert_eq!(stage.camera().aspect, 800.0 / 600.0);
        assert_eq!(stage.camera().fov, 50.0);
        assert_eq!(stage.camera().position, Vec3::new(0.0, 0.0, 20.0));
    }

    #[test]
    fn mount_hides_everything_until_the_entrance_plays() {
        let (mut stage, _) = mount(800, 600);
        assert_eq!(stage.entrance_playbacks(), 1);
        assert_eq!(stage.mesh().scale, Vec3::ZERO);
        assert_eq!(stage.overlay().nav_offset_percent, -100.0);
        assert_eq!(stage.overlay().caption_opacity, 0.0);

        for _ in 0..200 {
            stage.advance(1.0 / 60.0);
        }
        assert_eq!(stage.mesh().scale, Vec3::ONE);
        assert_eq!(stage.overlay(), OverlayState::default());
        assert!(stage.timeline().is_complete());
        assert_eq!(stage.entrance_playbacks(), 1);
    }

    #[test]
    fn resize_tracks_window() {
        let (mut stage, mut surface) = mount(800, 600);
        stage.resize(1024, 512, &mut surface);
        assert_eq!(stage.viewport(), ViewportSize::new(1024, 512));
        assert_eq!(stage.camera().aspect, 2.0);
        assert_eq!(surface.0.last(), Some(&ViewportSize::new(1024, 512)));
    }

    #[test]
    fn press_release_without_move_keeps_color() {
        let (mut stage, _) = mount(800, 600);
        let before = stage.mesh_color();
        stage.pointer_pressed(PointerButton::Primary, DVec2::new(400.0, 300.0));
        stage.pointer_released(PointerButton::Primary);
        stage.advance(2.0);
        assert_eq!(stage.mesh_color(), before);
        assert_eq!(stage.color_target(), None);
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let (mut stage, _) = mount(800, 600);
        for x in [0.0, 100.0, 799.0] {
            assert_eq!(stage.pointer_moved(DVec2::new(x, 20.0)), None);
        }
        assert_eq!(stage.color_target(), None);
        assert_eq!(stage.last_target_color(), None);
    }

    #[test]
    fn drag_retargets_material_color() {
        let (mut stage, _) = mount(800, 600);
        stage.pointer_pressed(PointerButton::Primary, DVec2::new(400.0, 300.0));
        let target = stage.pointer_moved(DVec2::new(800.0, 600.0));
        assert_eq!(target, Some(Rgb::new(255, 255, 200)));
        assert_eq!(stage.color_target(), Some(Rgb::new(255, 255, 200).to_linear()));

        stage.advance(0.5);
        let halfway = stage.mesh_color();
        stage.pointer_moved(DVec2::new(0.0, 0.0));
        assert_eq!(stage.mesh_color(), halfway);
        stage.advance(1.0);
        assert_eq!(Rgb::from_linear(stage.mesh_color()), Rgb::new(0, 0, 200));
    }

    #[test]
    fn secondary_button_drags_color_but_not_camera() {
        let (mut stage, _) = mount(800, 600);
        stage.pointer_pressed(PointerButton::Secondary, DVec2::new(10.0, 10.0));
        assert!(stage.is_dragging());
        assert!(!stage.controls().unwrap().is_rotating());
        assert!(stage.pointer_moved(DVec2::new(20.0, 20.0)).is_some());
    }

    #[test]
    fn press_off_surface_drags_color_without_orbiting() {
        let (mut stage, _) = mount(800, 600);
        stage.pointer_pressed_off_surface();
        assert!(stage.is_dragging());
        assert!(!stage.controls().unwrap().is_rotating());
        assert_eq!(
            stage.pointer_moved(DVec2::new(400.0, 0.0)),
            Some(Rgb::new(128, 0, 200))
        );
        assert!(!stage.controls().unwrap().is_rotating());
        stage.pointer_released(PointerButton::Primary);
        assert!(!stage.is_dragging());
    }

    #[test]
    fn unmount_releases_controls_and_ignores_events() {
        let (mut stage, mut surface) = mount(800, 600);
        stage.unmount();
        assert!(stage.controls().is_none());
        stage.pointer_pressed(PointerButton::Primary, DVec2::ZERO);
        assert_eq!(stage.pointer_moved(DVec2::new(5.0, 5.0)), None);
        stage.resize(10, 10, &mut surface);
        assert_eq!(surface.0.len(), 1);
        let camera = stage.camera().position;
        stage.advance(1.0);
        assert_eq!(stage.camera().position, camera);
    }
}
