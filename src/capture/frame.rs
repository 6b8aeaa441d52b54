use std::sync::Arc;

use image::ImageEncoder;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PlaybackError, PlaybackResult};
use crate::foundation::math::unpremul_rgba8_in_place;

/// Raw RGBA8 pixels produced by the rasterizer or decoded from a stored frame.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    fn check_len(&self) -> PlaybackResult<()> {
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| PlaybackError::capture("frame dimensions overflow"))?;
        if self.data.len() != expected {
            return Err(PlaybackError::capture(format!(
                "frame buffer has {} bytes, expected {expected} for {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

/// One captured still, stored as PNG bytes.
///
/// Frames are immutable once captured; cloning shares the encoded bytes.
#[derive(Clone, Debug)]
pub struct Frame {
    pub index: FrameIndex,
    pub width: u32,
    pub height: u32,
    png: Arc<[u8]>,
}

impl Frame {
    /// Encodes `rgba` to PNG. Premultiplied input is converted to straight alpha first.
    #[tracing::instrument(skip(rgba), fields(w = rgba.width, h = rgba.height))]
    pub fn encode(index: FrameIndex, rgba: &FrameRGBA) -> PlaybackResult<Self> {
        rgba.check_len()?;

        let mut straight;
        let pixels: &[u8] = if rgba.premultiplied {
            straight = rgba.data.clone();
            unpremul_rgba8_in_place(&mut straight);
            &straight
        } else {
            &rgba.data
        };

        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new_with_quality(
            &mut png,
            image::codecs::png::CompressionType::Fast,
            image::codecs::png::FilterType::Adaptive,
        )
        .write_image(
            pixels,
            rgba.width,
            rgba.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| PlaybackError::capture(format!("png encode failed: {e}")))?;

        Ok(Self {
            index,
            width: rgba.width,
            height: rgba.height,
            png: png.into(),
        })
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Decodes the stored PNG back to straight-alpha RGBA8.
    pub fn decode(&self) -> PlaybackResult<FrameRGBA> {
        let img = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)
            .map_err(|e| PlaybackError::encode(format!("frame {} decode: {e}", self.index.0)))?
            .into_rgba8();
        let (width, height) = img.dimensions();
        if (width, height) != (self.width, self.height) {
            return Err(PlaybackError::encode(format!(
                "frame {} decoded as {width}x{height}, expected {}x{}",
                self.index.0, self.width, self.height
            )));
        }
        Ok(FrameRGBA {
            width,
            height,
            data: img.into_raw(),
            premultiplied: false,
        })
    }
}

/// Position a capture was granted: recording session plus frame index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSlot {
    pub session: u64,
    pub index: FrameIndex,
}

/// Ordered, append-only store of captured frames.
///
/// Every [`FrameBuffer::clear`] starts a new session; frames rendered for an older session are
/// refused, so one buffer never mixes two recordings.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: Vec<Frame>,
    next: u64,
    session: u64,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index the next captured frame will carry.
    pub fn next_index(&self) -> FrameIndex {
        FrameIndex(self.next)
    }

    /// Current recording session id.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Slot the next captured frame will fill.
    pub fn next_slot(&self) -> FrameSlot {
        FrameSlot {
            session: self.session,
            index: self.next_index(),
        }
    }

    /// Appends a frame rendered for `session`. Its index must match [`FrameBuffer::next_index`].
    pub fn push(&mut self, session: u64, frame: Frame) -> PlaybackResult<()> {
        if session != self.session {
            return Err(PlaybackError::capture(format!(
                "frame {} belongs to session {session}, buffer is on session {}",
                frame.index.0, self.session
            )));
        }
        if frame.index.0 != self.next {
            return Err(PlaybackError::capture(format!(
                "out-of-order frame {} (expected {})",
                frame.index.0, self.next
            )));
        }
        if let Some(first) = self.frames.first()
            && (first.width, first.height) != (frame.width, frame.height)
        {
            return Err(PlaybackError::capture(format!(
                "frame size {}x{} differs from buffer size {}x{}",
                frame.width, frame.height, first.width, first.height
            )));
        }
        self.frames.push(frame);
        self.next += 1;
        Ok(())
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Cheap copy of the current frames for a background export.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames.clone()
    }

    /// Drops all frames and starts a new session.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.next = 0;
        self.session += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/frame.rs"]
mod tests;
