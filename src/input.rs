use glam::DVec2;

use crate::stage::PointerButton;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

/// Window-level event delivered by a host (winit or the DOM).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Resized { width: u32, height: u32 },
    /// `on_surface` is false when the press landed on an element above the
    /// render surface; such presses drag the color but never the camera.
    PointerPressed {
        button: PointerButton,
        position: DVec2,
        on_surface: bool,
    },
    PointerReleased { button: PointerButton },
    /// Position in page coordinates.
    PointerMoved { position: DVec2 },
}

impl PointerButton {
    /// Maps a DOM `MouseEvent.button` index (left button is zero).
    pub fn from_dom_index(index: i16) -> Self {
        match index {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other.max(0) as u16),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<winit::event::MouseButton> for PointerButton {
    fn from(button: winit::event::MouseButton) -> Self {
        use winit::event::MouseButton;
        match button {
            MouseButton::Left => Self::Primary,
            MouseButton::Right => Self::Secondary,
            MouseButton::Middle => Self::Auxiliary,
            MouseButton::Back => Self::Other(3),
            MouseButton::Forward => Self::Other(4),
            MouseButton::Other(value) => Self::Other(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_indices_follow_mouse_event_order() {
        assert_eq!(PointerButton::from_dom_index(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom_index(1), PointerButton::Auxiliary);
        assert_eq!(PointerButton::from_dom_index(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom_index(4), PointerButton::Other(4));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn winit_left_button_is_primary() {
        assert_eq!(
            PointerButton::from(winit::event::MouseButton::Left),
            PointerButton::Primary
        );
        assert_eq!(
            PointerButton::from(winit::event::MouseButton::Other(7)),
            PointerButton::Other(7)
        );
    }
}
