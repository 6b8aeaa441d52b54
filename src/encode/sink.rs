use crate::capture::frame::FrameRGBA;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::PlaybackResult;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: u32,
}

/// Sink contract for consuming frames in output order.
///
/// Ordering contract: `push_frame` is called with strictly increasing [`FrameIndex`] values. The
/// index is the position in the output video, so repeated stills get fresh indices.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> PlaybackResult<()>;
    /// Push one frame in strictly increasing output order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PlaybackResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> PlaybackResult<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn begin(&mut self, cfg: SinkConfig) -> PlaybackResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PlaybackResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> PlaybackResult<()> {
        (**self).end()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if it was called.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PlaybackResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PlaybackResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> PlaybackResult<()> {
        self.ended = true;
        Ok(())
    }
}
