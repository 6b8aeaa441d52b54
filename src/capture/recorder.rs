use crate::capture::frame::{Frame, FrameBuffer, FrameSlot};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PlaybackError, PlaybackResult};

/// Why a capture tick produced no frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotRecording,
    EmptyPrefix,
    Processing,
    /// The previous capture is still rendering.
    Busy,
}

/// Recording flags plus the frame buffer they guard.
///
/// `processing` is set for the whole lifetime of an export and blocks capture, new recordings and
/// further exports. At most one capture renders at a time; `rendering` tracks it until
/// [`Recorder::finish_capture`] and survives [`Recorder::clear`].
#[derive(Debug, Default)]
pub struct Recorder {
    recording: bool,
    processing: bool,
    rendering: bool,
    buffer: FrameBuffer,
    skipped: u64,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// A capture handed out by [`Recorder::check_capture`] has not come back yet.
    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub fn frame_count(&self) -> usize {
        self.buffer.len()
    }

    /// Capture ticks that were skipped while recording.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Arms a fresh recording, dropping frames from the previous one.
    ///
    /// Refused for an empty source, while already recording, or while an export runs.
    pub fn start(&mut self, source_len: usize) -> PlaybackResult<()> {
        if source_len == 0 {
            return Err(PlaybackError::input("no source loaded; nothing to record"));
        }
        if self.processing {
            return Err(PlaybackError::input("an export is in progress"));
        }
        if self.recording {
            return Err(PlaybackError::input("already recording"));
        }
        self.buffer.clear();
        self.skipped = 0;
        self.recording = true;
        Ok(())
    }

    /// Disarms recording. Returns whether a recording was active.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.recording, false)
    }

    /// Decides whether a capture tick should rasterize `prefix`.
    ///
    /// A granted slot marks the recorder as rendering until it is returned through
    /// [`Recorder::finish_capture`].
    pub fn check_capture(&mut self, prefix: &str) -> Result<FrameSlot, SkipReason> {
        if !self.recording {
            return Err(SkipReason::NotRecording);
        }
        let reason = if self.processing {
            SkipReason::Processing
        } else if prefix.is_empty() {
            SkipReason::EmptyPrefix
        } else if self.rendering {
            SkipReason::Busy
        } else {
            self.rendering = true;
            return Ok(self.buffer.next_slot());
        };
        self.skipped += 1;
        Err(reason)
    }

    /// Appends a frame encoded for the slot handed out by [`Recorder::check_capture`].
    pub fn push(&mut self, slot: FrameSlot, frame: Frame) -> PlaybackResult<FrameIndex> {
        let index = frame.index;
        self.buffer.push(slot.session, frame)?;
        Ok(index)
    }

    /// Takes back a slot from [`Recorder::check_capture`] together with its render result.
    ///
    /// Frames that arrive after the recording stopped, or that belong to an earlier recording,
    /// are dropped and yield `Ok(None)`.
    pub fn finish_capture(
        &mut self,
        slot: FrameSlot,
        rendered: PlaybackResult<Frame>,
    ) -> PlaybackResult<Option<FrameIndex>> {
        self.rendering = false;
        let frame = rendered?;
        if !self.recording || self.processing || slot.session != self.buffer.session() {
            return Ok(None);
        }
        self.push(slot, frame).map(Some)
    }

    /// Enters the processing state and hands out the frames to export.
    ///
    /// `Ok(None)` means the buffer is empty and nothing should be encoded.
    pub fn begin_export(&mut self) -> PlaybackResult<Option<Vec<Frame>>> {
        if self.recording {
            return Err(PlaybackError::input("stop recording before exporting"));
        }
        if self.processing {
            return Err(PlaybackError::input("an export is already in progress"));
        }
        if self.buffer.is_empty() {
            return Ok(None);
        }
        self.processing = true;
        Ok(Some(self.buffer.snapshot()))
    }

    /// Leaves the processing state. The buffer is kept so a failed export can be retried.
    pub fn finish_export(&mut self) {
        self.processing = false;
    }

    /// Stops recording and drops every captured frame.
    pub fn clear(&mut self) {
        self.recording = false;
        self.skipped = 0;
        self.buffer.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/recorder.rs"]
mod tests;
