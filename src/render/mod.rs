mod common;
mod gpu;
mod headless;
mod shared;

pub use common::{CameraParams, FrameSnapshot, FrameTarget, LightParams, MeshInstance};
pub use gpu::Renderer;
pub use headless::HeadlessTarget;
