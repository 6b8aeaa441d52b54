use std::time::Duration;

use crate::foundation::error::{PlaybackError, PlaybackResult};

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Logical canvas size in pixels (before pixel-density scaling).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

impl Canvas {
    /// Physical size after applying an integer pixel-density `scale`.
    pub fn scaled(self, scale: u32) -> PlaybackResult<(u16, u16)> {
        let w = self
            .width
            .checked_mul(scale)
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| PlaybackError::input("scaled canvas width exceeds u16"))?;
        let h = self
            .height
            .checked_mul(scale)
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| PlaybackError::input("scaled canvas height exceeds u16"))?;
        Ok((w, h))
    }
}

/// Straight-alpha RGBA8 color. Also serves as the text layout brush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    /// Channels as an `[r, g, b, a]` array.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Whole frames per second implied by a capture interval.
///
/// 50ms maps to 20fps. Intervals that do not divide a second evenly are rounded to the nearest
/// rate, with a floor of 1.
pub fn fps_for_interval(interval: Duration) -> PlaybackResult<u32> {
    let ms = interval.as_secs_f64() * 1000.0;
    if !ms.is_finite() || ms <= 0.0 {
        return Err(PlaybackError::input("capture interval must be > 0"));
    }
    Ok(((1000.0 / ms).round() as u32).max(1))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
