use glam::{Mat4, Vec3};

use crate::overlay::OverlayState;
use crate::viewport::{SurfaceSizing, ViewportSize};

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Lighting state consumed by the renderer's uniform buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct LightParams {
    pub position: Vec3,
    /// Linear color.
    pub color: Vec3,
    pub intensity: f32,
}

/// Per-mesh transform and material color.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshInstance {
    pub model: Mat4,
    /// Linear color.
    pub color: Vec3,
}

/// Everything a render target needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub camera: CameraParams,
    pub light: LightParams,
    pub mesh: MeshInstance,
    pub overlay: OverlayState,
    pub viewport: ViewportSize,
}

/// A surface the render loop can draw on.
pub trait FrameTarget: SurfaceSizing {
    type Error: std::fmt::Debug;

    fn draw(&mut self, frame: &FrameSnapshot) -> Result<(), Self::Error>;

    /// Called once during teardown, after the loop and listeners are gone.
    /// The target is dropped right after, which frees its resources.
    fn release(&mut self) {}
}
