use serde::{Deserialize, Serialize};

use crate::viewport::ViewportSize;

/// Navigation bar height in pixels.
pub const NAV_HEIGHT: f32 = 60.0;
pub const CAPTION_HEIGHT: f32 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayState {
    /// Vertical offset of the navigation bar, percent of its own height.
    pub nav_offset_percent: f32,
    pub caption_opacity: f32,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            nav_offset_percent: 0.0,
            caption_opacity: 1.0,
        }
    }
}

impl OverlayState {
    pub fn nav_transform(&self) -> String {
        format!("translateY({}%)", self.nav_offset_percent)
    }

    pub fn caption_opacity_css(&self) -> String {
        format!("{}", self.caption_opacity.clamp(0.0, 1.0))
    }
}

/// Axis-aligned rectangle in pixels with a straight-alpha color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [f32; 4],
}

impl OverlayRect {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_visible(&self) -> bool {
        self.color[3] > 0.0 && self.bottom() > 0.0 && self.width > 0.0 && self.height > 0.0
    }
}

/// Bands drawn for the overlay on hosts without a DOM.
pub fn layout(state: &OverlayState, viewport: ViewportSize) -> Vec<OverlayRect> {
    let width = viewport.width as f32;
    let height = viewport.height as f32;

    let nav = OverlayRect {
        x: 0.0,
        y: NAV_HEIGHT * state.nav_offset_percent / 100.0,
        width,
        height: NAV_HEIGHT,
        color: [1.0, 1.0, 1.0, 0.08],
    };

    let caption_width = (width * 0.4).min(420.0);
    let caption = OverlayRect {
        x: (width - caption_width) / 2.0,
        y: height * 0.75 - CAPTION_HEIGHT / 2.0,
        width: caption_width,
        height: CAPTION_HEIGHT,
        color: [1.0, 1.0, 1.0, 0.25 * state.caption_opacity.clamp(0.0, 1.0)],
    };

    [nav, caption]
        .into_iter()
        .filter(OverlayRect::is_visible)
        .collect()
}
