use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use log::debug;

use crate::viewport::{PerspectiveCamera, ViewportSize};

const EPS: f32 = 1e-6;

/// Spherical coordinates with `phi` measured from +Y and `theta` around +Y from +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub auto_rotate: bool,
    /// 1.0 is one full orbit per 60 seconds.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            enable_pan: true,
            enable_zoom: true,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

/// Rotates a camera around `target` from pointer drags.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub settings: OrbitSettings,
    target: Vec3,
    delta: Spherical,
    rotate_start: Option<Vec2>,
    disposed: bool,
}

impl OrbitControls {
    pub fn new(settings: OrbitSettings, camera: &mut PerspectiveCamera) -> Self {
        let target = camera.target;
        camera.look_at(target);
        Self {
            settings,
            target,
            delta: Spherical::default(),
            rotate_start: None,
            disposed: false,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn is_rotating(&self) -> bool {
        self.rotate_start.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn begin_rotate(&mut self, position: Vec2) {
        if self.disposed {
            return;
        }
        self.rotate_start = Some(position);
    }

    /// Converts drag distance into rotation; a full viewport height is one turn.
    pub fn drag_to(&mut self, position: Vec2, viewport: ViewportSize) {
        let Some(start) = self.rotate_start else {
            return;
        };
        let delta = (position - start) * self.settings.rotate_speed;
        let height = viewport.height as f32;
        self.rotate_left(TAU * delta.x / height);
        self.rotate_up(TAU * delta.y / height);
        self.rotate_start = Some(position);
    }

    pub fn end_rotate(&mut self) {
        self.rotate_start = None;
    }

    fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }

    fn auto_rotation_angle(&self, dt: Option<f32>) -> f32 {
        match dt {
            Some(dt) => TAU / 60.0 * self.settings.auto_rotate_speed * dt,
            None => TAU / 60.0 / 60.0 * self.settings.auto_rotate_speed,
        }
    }

    /// Advances damping and auto-rotation and moves the camera.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, dt: Option<f32>) -> bool {
        if self.disposed {
            return false;
        }
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        if self.settings.auto_rotate && self.rotate_start.is_none() {
            self.rotate_left(self.auto_rotation_angle(dt));
        }

        let settings = self.settings;
        if settings.enable_damping {
            spherical.theta += self.delta.theta * settings.damping_factor;
            spherical.phi += self.delta.phi * settings.damping_factor;
        } else {
            spherical.theta += self.delta.theta;
            spherical.phi += self.delta.phi;
        }
        spherical.phi = spherical
            .phi
            .clamp(settings.min_polar_angle, settings.max_polar_angle);
        spherical.make_safe();

        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if settings.enable_damping {
            self.delta.theta *= 1.0 - settings.damping_factor;
            self.delta.phi *= 1.0 - settings.damping_factor;
        } else {
            self.delta = Spherical::default();
        }

        previous.distance_squared(camera.position) > EPS
    }

    /// Detaches the control; later input and updates are ignored.
    pub fn dispose(&mut self) {
        if !self.disposed {
            debug!("orbit controls disposed");
        }
        self.disposed = true;
        self.rotate_start = None;
        self.delta = Spherical::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(50.0, 4.0 / 3.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 0.0, 20.0);
        camera
    }

    fn page_settings() -> OrbitSettings {
        OrbitSettings {
            enable_damping: true,
            enable_pan: false,
            enable_zoom: false,
            auto_rotate: true,
            auto_rotate_speed: 10.0,
            ..OrbitSettings::default()
        }
    }

    #[test]
    fn spherical_round_trips_offsets() {
        let offset = Vec3::new(3.0, -4.0, 12.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!(back.abs_diff_eq(offset, 1e-4));
    }

    #[test]
    fn auto_rotation_orbits_at_constant_distance() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(page_settings(), &mut camera);
        for _ in 0..120 {
            controls.update(&mut camera, Some(1.0 / 60.0));
        }
        assert!((camera.position.length() - 20.0).abs() < 1e-3);
        assert!(camera.position.x.abs() > 0.1);
        assert!(camera.position.y.abs() < 1e-3);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn undamped_update_consumes_delta() {
        let mut camera = camera();
        let settings = OrbitSettings::default();
        let mut controls = OrbitControls::new(settings, &mut camera);
        let viewport = ViewportSize::new(800, 600);
        controls.begin_rotate(Vec2::new(100.0, 100.0));
        controls.drag_to(Vec2::new(250.0, 100.0), viewport);
        assert!(controls.update(&mut camera, None));
        let moved = camera.position;
        assert!(!controls.update(&mut camera, None));
        assert!(camera.position.abs_diff_eq(moved, 1e-5));
    }

    #[test]
    fn damping_decays_drag_motion() {
        let mut camera = camera();
        let settings = OrbitSettings {
            enable_damping: true,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(settings, &mut camera);
        controls.begin_rotate(Vec2::ZERO);
        controls.drag_to(Vec2::new(60.0, 0.0), ViewportSize::new(600, 600));
        controls.end_rotate();

        let mut steps = Vec::new();
        let mut previous = camera.position;
        for _ in 0..10 {
            controls.update(&mut camera, None);
            steps.push(previous.distance(camera.position));
            previous = camera.position;
        }
        assert!(steps.windows(2).all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn auto_rotation_pauses_while_dragging() {
        let mut camera = camera();
        let settings = OrbitSettings {
            auto_rotate: true,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(settings, &mut camera);
        controls.begin_rotate(Vec2::new(10.0, 10.0));
        assert!(!controls.update(&mut camera, Some(0.016)));
        controls.end_rotate();
        assert!(controls.update(&mut camera, Some(0.016)));
    }

    #[test]
    fn polar_angle_stays_off_the_poles() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(OrbitSettings::default(), &mut camera);
        controls.begin_rotate(Vec2::ZERO);
        controls.drag_to(Vec2::new(0.0, 10_000.0), ViewportSize::new(100, 100));
        controls.update(&mut camera, None);
        assert!(camera.position.y > 19.9);
        assert!(camera.position.z > 0.0);
        assert!(camera.view().is_finite());
    }

    #[test]
    fn disposed_controls_ignore_everything() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(page_settings(), &mut camera);
        controls.dispose();
        controls.begin_rotate(Vec2::ZERO);
        assert!(!controls.is_rotating());
        assert!(!controls.update(&mut camera, Some(1.0)));
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 20.0));
    }
}
