//! A rotating, lit sphere page: orbit controls, an entrance timeline and a
//! drag-driven color transition, rendered with wgpu on desktop or the web.
//!
//! The page state lives in [`Stage`]; [`Session`] pairs it with a render
//! target, a cancellable render loop and the host's listener registrations.
//! Everything except the GPU renderer runs headless, which keeps the crate
//! testable without a display.

pub mod app;
pub mod color;
pub mod controls;
pub mod input;
pub mod interaction;
pub mod lifecycle;
pub mod mesh;
pub mod overlay;
pub mod render;
pub mod render_loop;
pub mod scene;
pub mod session;
pub mod stage;
pub mod timeline;
pub mod tween;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use color::Rgb;
pub use controls::{OrbitControls, OrbitSettings};
pub use input::HostEvent;
pub use interaction::{pointer_to_rgb, ColorMapper, PointerPolicy};
pub use lifecycle::{Disposable, Registrations};
pub use mesh::{uv_sphere, MeshData};
pub use overlay::OverlayState;
pub use render::{FrameSnapshot, FrameTarget, HeadlessTarget, Renderer};
pub use render_loop::{LoopHandle, LoopStatus, RenderLoop};
pub use scene::{Light, Scene, SceneObject};
pub use session::Session;
pub use stage::{PointerButton, Stage, StageConfig};
pub use timeline::{AnimationDescriptor, AnimationTarget, Timeline};
pub use viewport::{SharedViewport, ViewportProvider, ViewportSize};
