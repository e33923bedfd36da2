use glam::DVec2;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::color::{round_half_up, Rgb};
use crate::viewport::ViewportSize;

pub const DEFAULT_BLUE_CHANNEL: i32 = 200;

/// How pointer positions outside the viewport are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerPolicy {
    /// Clamp to the viewport first; channels stay in `0..=255`.
    #[default]
    Clamp,
    /// Divide the raw position; channels may leave `0..=255`.
    Unclamped,
}

/// Maps a pointer position to the drag color: red follows x, green follows y.
pub fn pointer_to_rgb(
    position: DVec2,
    viewport: ViewportSize,
    policy: PointerPolicy,
    blue: i32,
) -> Rgb {
    let extent = DVec2::new(f64::from(viewport.width), f64::from(viewport.height));
    let position = match policy {
        PointerPolicy::Clamp => position.clamp(DVec2::ZERO, extent),
        PointerPolicy::Unclamped => position,
    };
    let fraction = position / extent;
    Rgb::new(
        round_half_up(fraction.x * 255.0),
        round_half_up(fraction.y * 255.0),
        blue,
    )
}

#[derive(Debug, Clone)]
pub struct ColorMapper {
    policy: PointerPolicy,
    blue: i32,
    pointer_down: bool,
    last_target: Option<Rgb>,
}

impl ColorMapper {
    pub fn new(policy: PointerPolicy, blue: i32) -> Self {
        Self {
            policy,
            blue,
            pointer_down: false,
            last_target: None,
        }
    }

    pub fn press(&mut self) {
        self.pointer_down = true;
    }

    pub fn release(&mut self) {
        self.pointer_down = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer_down
    }

    /// Returns a new target color while dragging, `None` otherwise.
    pub fn pointer_moved(&mut self, position: DVec2, viewport: ViewportSize) -> Option<Rgb> {
        if !self.pointer_down {
            return None;
        }
        let rgb = pointer_to_rgb(position, viewport, self.policy, self.blue);
        trace!("drag at ({:.1}, {:.1}) targets {rgb}", position.x, position.y);
        self.last_target = Some(rgb);
        Some(rgb)
    }

    pub fn last_target(&self) -> Option<Rgb> {
        self.last_target
    }
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::new(PointerPolicy::default(), DEFAULT_BLUE_CHANNEL)
    }
}
