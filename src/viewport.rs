use std::sync::Arc;

use glam::{Mat4, Vec3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    /// Zero extents are stored as 1 so ratios stay finite.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

pub trait ViewportProvider {
    fn viewport_size(&self) -> ViewportSize;
}

/// Viewport cell shared between the host window and the stage.
#[derive(Debug, Clone)]
pub struct SharedViewport {
    size: Arc<RwLock<ViewportSize>>,
}

impl SharedViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Arc::new(RwLock::new(ViewportSize::new(width, height))),
        }
    }

    pub fn update(&self, width: u32, height: u32) -> ViewportSize {
        let size = ViewportSize::new(width, height);
        *self.size.write() = size;
        size
    }
}

impl ViewportProvider for SharedViewport {
    fn viewport_size(&self) -> ViewportSize {
        *self.size.read()
    }
}

pub trait SurfaceSizing {
    fn set_size(&mut self, size: ViewportSize);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Must be called after changing `fov`, `aspect`, `near` or `far`.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect.max(1e-4), self.near, self.far);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view()
    }
}

/// Applies a viewport change to the camera and the render surface.
pub fn apply_resize(
    size: ViewportSize,
    camera: &mut PerspectiveCamera,
    surface: &mut impl SurfaceSizing,
) {
    camera.aspect = size.aspect();
    camera.update_projection_matrix();
    surface.set_size(size);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        sizes: Vec<ViewportSize>,
    }

    impl SurfaceSizing for RecordingSurface {
        fn set_size(&mut self, size: ViewportSize) {
            self.sizes.push(size);
        }
    }

    #[test]
    fn resize_updates_aspect_and_surface() {
        let mut camera = PerspectiveCamera::new(50.0, 1.0, 0.1, 100.0);
        let mut surface = RecordingSurface::default();
        for (w, h) in [(800, 600), (1920, 1080), (333, 777), (1, 1)] {
            apply_resize(ViewportSize::new(w, h), &mut camera, &mut surface);
            assert_eq!(camera.aspect, w as f32 / h as f32);
            assert_eq!(surface.sizes.last(), Some(&ViewportSize { width: w, height: h }));
        }
        assert_eq!(surface.sizes.len(), 4);
    }

    #[test]
    fn projection_tracks_aspect() {
        let mut camera = PerspectiveCamera::new(50.0, 1.0, 0.1, 100.0);
        let square = camera.projection();
        camera.aspect = 2.0;
        camera.update_projection_matrix();
        assert_ne!(camera.projection(), square);
        assert_eq!(
            camera.projection(),
            Mat4::perspective_rh(50f32.to_radians(), 2.0, 0.1, 100.0)
        );
    }

    #[test]
    fn shared_viewport_reports_last_update() {
        let viewport = SharedViewport::new(1280, 720);
        let handle = viewport.clone();
        handle.update(640, 0);
        assert_eq!(viewport.viewport_size(), ViewportSize::new(640, 1));
    }
}
