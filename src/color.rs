use anyhow::{anyhow, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Integer color as produced by pointer interaction (`rgb(r, g, b)`).
///
/// Channels are signed because the unclamped pointer policy may produce
/// values outside `0..=255`; the color is still valid and is converted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Rgb {
    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    /// Converts the sRGB channels to the linear working space used by the renderer.
    pub fn to_linear(self) -> Vec3 {
        Vec3::new(
            srgb_to_linear(self.r as f32 / 255.0),
            srgb_to_linear(self.g as f32 / 255.0),
            srgb_to_linear(self.b as f32 / 255.0),
        )
    }

    pub fn from_linear(color: Vec3) -> Self {
        let channel = |value: f32| round_half_up(f64::from(linear_to_srgb(value)) * 255.0);
        Self::new(channel(color.x), channel(color.y), channel(color.z))
    }

    pub fn is_in_gamut(self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|channel| (0..=255).contains(channel))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parses `#rrggbb` (or `rrggbb`) into an sRGB color.
pub fn parse_hex(value: &str) -> Result<Rgb> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!("expected a #rrggbb color, got {value:?}"));
    }
    let channel = |range: std::ops::Range<usize>| -> Result<i32> {
        i32::from_str_radix(&digits[range], 16).map_err(|err| anyhow!("bad color digits: {err}"))
    };
    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Rounds halves toward positive infinity, matching the browser's `Math.round`.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(0.41666) - 0.055
    }
}
