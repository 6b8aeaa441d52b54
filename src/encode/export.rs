use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;

use crate::capture::frame::{Frame, FrameRGBA};
use crate::encode::ffmpeg::VideoContainer;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, fps_for_interval};
use crate::foundation::error::{PlaybackError, PlaybackResult};

/// How long the last frame stays on screen after the capture ends.
pub const DEFAULT_TAIL_HOLD: Duration = Duration::from_millis(500);
/// Frames decoded per parallel batch.
pub const DEFAULT_DECODE_CHUNK: usize = 16;

/// Export tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOpts {
    /// Output frame rate; matches the capture rate.
    pub fps: u32,
    /// Wall-clock spacing between pushes. `None` pushes as fast as the sink accepts.
    pub pace: Option<Duration>,
    /// Hold on the last frame, emitted as repeated frames.
    pub tail_hold: Duration,
    pub decode_chunk: usize,
}

impl ExportOpts {
    /// Real-time export for frames captured every `interval`.
    pub fn for_interval(interval: Duration) -> PlaybackResult<Self> {
        Ok(Self {
            fps: fps_for_interval(interval)?,
            pace: Some(interval),
            tail_hold: DEFAULT_TAIL_HOLD,
            decode_chunk: DEFAULT_DECODE_CHUNK,
        })
    }

    /// Same as [`ExportOpts::for_interval`] without pacing.
    pub fn unpaced(interval: Duration) -> PlaybackResult<Self> {
        Ok(Self {
            pace: None,
            ..Self::for_interval(interval)?
        })
    }

    pub fn validate(&self) -> PlaybackResult<()> {
        if self.fps == 0 {
            return Err(PlaybackError::input("export fps must be non-zero"));
        }
        if self.decode_chunk == 0 {
            return Err(PlaybackError::input("decode chunk must be non-zero"));
        }
        if self.pace.is_some_and(|p| p.is_zero()) {
            return Err(PlaybackError::input("export pace must be > 0"));
        }
        Ok(())
    }

    /// Number of repeated last frames that cover `tail_hold`.
    pub fn tail_frames(&self) -> u64 {
        (self.tail_hold.as_secs_f64() * f64::from(self.fps)).ceil() as u64
    }
}

/// Summary of a finished export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Captured frames consumed.
    pub captured: usize,
    /// Frames pushed to the sink, tail hold included.
    pub written: u64,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Output file, when the sink wrote one.
    pub path: Option<PathBuf>,
}

impl ExportReport {
    /// Whether nothing was encoded because the buffer was empty.
    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Playback length of the encoded video.
    pub fn duration(&self) -> Duration {
        if self.fps == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.written as f64 / f64::from(self.fps))
    }
}

/// `code-playback-YYYY-MM-DDTHH-MM-SS.<ext>` for `now` (UTC).
pub fn timestamped_filename(
    now: chrono::DateTime<chrono::Utc>,
    container: VideoContainer,
) -> String {
    format!(
        "code-playback-{}.{}",
        now.format("%Y-%m-%dT%H-%M-%S"),
        container.extension()
    )
}

/// Timestamped output path inside `dir`.
pub fn default_output_path(dir: &Path, container: VideoContainer) -> PathBuf {
    dir.join(timestamped_filename(chrono::Utc::now(), container))
}

async fn with_sink<S, F>(mut sink: S, f: F) -> PlaybackResult<S>
where
    S: FrameSink + 'static,
    F: FnOnce(&mut S) -> PlaybackResult<()> + Send + 'static,
{
    let (sink, res) = tokio::task::spawn_blocking(move || {
        let res = f(&mut sink);
        (sink, res)
    })
    .await
    .map_err(|e| PlaybackError::encode(format!("encoder task failed: {e}")))?;
    res.map(|()| sink)
}

fn decode_chunk(chunk: Vec<Frame>) -> PlaybackResult<Vec<FrameRGBA>> {
    chunk.par_iter().map(Frame::decode).collect()
}

/// Encodes `frames` through `sink` in capture order, then holds on the last frame.
///
/// An empty `frames` returns immediately without calling [`FrameSink::begin`]. The sink is handed
/// back on success so callers can inspect it.
#[tracing::instrument(skip_all, fields(frames = frames.len(), fps = opts.fps))]
pub async fn export_frames<S: FrameSink + 'static>(
    frames: Vec<Frame>,
    sink: S,
    opts: &ExportOpts,
) -> PlaybackResult<(S, ExportReport)> {
    opts.validate()?;
    let Some(first) = frames.first() else {
        tracing::info!("no frames captured; nothing to export");
        return Ok((sink, ExportReport::default()));
    };
    let (width, height) = (first.width, first.height);
    if let Some(bad) = frames
        .iter()
        .find(|f| (f.width, f.height) != (width, height))
    {
        return Err(PlaybackError::encode(format!(
            "frame {} is {}x{}, expected {width}x{height}",
            bad.index.0, bad.width, bad.height
        )));
    }

    let fps = opts.fps;
    let mut sink = with_sink(sink, move |s| {
        s.begin(SinkConfig { width, height, fps })
    })
    .await?;

    let mut pacer = opts.pace.map(|p| {
        let mut iv = tokio::time::interval(p);
        iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        iv
    });
    let mut written = 0u64;
    let mut last: Option<Arc<FrameRGBA>> = None;

    for chunk in frames.chunks(opts.decode_chunk) {
        let owned = chunk.to_vec();
        let decoded = tokio::task::spawn_blocking(move || decode_chunk(owned))
            .await
            .map_err(|e| PlaybackError::encode(format!("decode task failed: {e}")))??;

        for rgba in decoded {
            let rgba = Arc::new(rgba);
            if let Some(p) = pacer.as_mut() {
                p.tick().await;
            }
            let (idx, frame) = (FrameIndex(written), Arc::clone(&rgba));
            sink = with_sink(sink, move |s| s.push_frame(idx, &frame)).await?;
            written += 1;
            last = Some(rgba);
        }
    }

    if let Some(last) = last {
        for _ in 0..opts.tail_frames() {
            if let Some(p) = pacer.as_mut() {
                p.tick().await;
            }
            let (idx, frame) = (FrameIndex(written), Arc::clone(&last));
            sink = with_sink(sink, move |s| s.push_frame(idx, &frame)).await?;
            written += 1;
        }
    }

    let sink = with_sink(sink, |s| s.end()).await?;
    tracing::info!(captured = frames.len(), written, "export finished");

    Ok((
        sink,
        ExportReport {
            captured: frames.len(),
            written,
            width,
            height,
            fps,
            path: None,
        },
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
