use std::convert::Infallible;

use crate::viewport::{SurfaceSizing, ViewportSize};

use super::common::{FrameSnapshot, FrameTarget};

/// Render target without a GPU: keeps the last frame for inspection.
#[derive(Debug, Default)]
pub struct HeadlessTarget {
    size: Option<ViewportSize>,
    last_frame: Option<FrameSnapshot>,
    frames: u64,
}

impl HeadlessTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> Option<ViewportSize> {
        self.size
    }

    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.last_frame.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl SurfaceSizing for HeadlessTarget {
    fn set_size(&mut self, size: ViewportSize) {
        self.size = Some(size);
    }
}

impl FrameTarget for HeadlessTarget {
    type Error = Infallible;

    fn draw(&mut self, frame: &FrameSnapshot) -> Result<(), Infallible> {
        self.last_frame = Some(frame.clone());
        self.frames += 1;
        Ok(())
    }
}
