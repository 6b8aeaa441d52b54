use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::capture::frame::FrameRGBA;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PlaybackError, PlaybackResult};
use crate::foundation::math::mul_div255_u16;

/// Default target video bitrate, 8 Mbps.
pub const DEFAULT_BITRATE_BPS: u64 = 8_000_000;

/// Output container and codec pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VideoContainer {
    /// WebM with VP9.
    #[default]
    WebM,
    /// MP4 with H.264.
    Mp4,
}

impl VideoContainer {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            VideoContainer::WebM => "webm",
            VideoContainer::Mp4 => "mp4",
        }
    }

    fn codec_args(self) -> &'static [&'static str] {
        match self {
            VideoContainer::WebM => &["-c:v", "libvpx-vp9", "-pix_fmt", "yuv420p"],
            VideoContainer::Mp4 => &[
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ],
        }
    }
}

impl std::fmt::Display for VideoContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for VideoContainer {
    type Err = PlaybackError;

    fn from_str(s: &str) -> PlaybackResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webm" | "vp9" => Ok(VideoContainer::WebM),
            "mp4" | "h264" => Ok(VideoContainer::Mp4),
            other => Err(PlaybackError::input(format!(
                "unknown container '{other}' (expected webm or mp4)"
            ))),
        }
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    pub container: VideoContainer,
    /// Target video bitrate in bits per second.
    pub bitrate_bps: u64,
    /// Opaque color that translucent pixels are composited onto.
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Options for writing `container` to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>, container: VideoContainer) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            container,
            bitrate_bps: DEFAULT_BITRATE_BPS,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    pub fn validate(&self) -> PlaybackResult<()> {
        if self.bitrate_bps == 0 {
            return Err(PlaybackError::input("bitrate must be non-zero"));
        }
        if self.out_path.as_os_str().is_empty() {
            return Err(PlaybackError::input("output path must not be empty"));
        }
        Ok(())
    }
}

type StderrDrain = std::thread::JoinHandle<std::io::Result<Vec<u8>>>;

/// A running encoder process.
struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<StderrDrain>,
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to its stdin.
///
/// Frames are flattened onto [`FfmpegSinkOpts::bg_rgba`] first, since neither VP9 nor H.264 output
/// here keeps alpha.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
    cfg: Option<SinkConfig>,
    rgba: Vec<u8>,
    next_min: u64,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            cfg: None,
            rgba: Vec::new(),
            next_min: 0,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let size = format!("{}x{}", cfg.width, cfg.height);
        let rate = cfg.fps.to_string();
        let bitrate = self.opts.bitrate_bps.to_string();

        let mut cmd = Command::new("ffmpeg");
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" })
            .args(["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"])
            .args(["-s", size.as_str(), "-r", rate.as_str(), "-i", "pipe:0", "-an"])
            .args(self.opts.container.codec_args())
            .args(["-b:v", bitrate.as_str()])
            .arg(&self.opts.out_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    fn check_config(&self, cfg: &SinkConfig) -> PlaybackResult<()> {
        self.opts.validate()?;
        if cfg.fps == 0 {
            return Err(PlaybackError::encode("video frame rate must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(PlaybackError::encode(format!(
                "cannot encode an empty {}x{} video",
                cfg.width, cfg.height
            )));
        }
        if cfg.width % 2 == 1 || cfg.height % 2 == 1 {
            return Err(PlaybackError::encode(format!(
                "yuv420p output needs even dimensions, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(PlaybackError::input(format!(
                "refusing to overwrite '{}'",
                self.opts.out_path.display()
            )));
        }
        Ok(())
    }

    fn spawn(&self, cfg: &SinkConfig) -> PlaybackResult<Encoder> {
        if !is_ffmpeg_on_path() {
            return Err(PlaybackError::unsupported(
                "video export needs the ffmpeg binary on PATH",
            ));
        }
        let mut child = self
            .command(cfg)
            .spawn()
            .map_err(|e| PlaybackError::unsupported(format!("could not start ffmpeg: {e}")))?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut log = Vec::new();
                pipe.read_to_end(&mut log)?;
                Ok(log)
            })
        });
        Ok(Encoder {
            child,
            stdin,
            stderr,
        })
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Some(mut enc) = self.encoder.take() {
            drop(enc.stdin.take());
            let _ = enc.child.kill();
            let _ = enc.child.wait();
        }
    }
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(skip(self), fields(out = %self.opts.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> PlaybackResult<()> {
        self.check_config(&cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;
        let encoder = self.spawn(&cfg)?;

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            container = %self.opts.container,
            "ffmpeg started"
        );
        self.rgba = vec![0; cfg.width as usize * cfg.height as usize * 4];
        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        self.next_min = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PlaybackResult<()> {
        let (Some(cfg), Some(enc)) = (self.cfg.as_ref(), self.encoder.as_mut()) else {
            return Err(PlaybackError::encode("push_frame called before begin"));
        };
        if idx.0 < self.next_min {
            return Err(PlaybackError::encode(format!(
                "frame {} arrived after frame {}",
                idx.0,
                self.next_min - 1
            )));
        }
        if (frame.width, frame.height) != (cfg.width, cfg.height) {
            return Err(PlaybackError::encode(format!(
                "frame {} is {}x{} but the video is {}x{}",
                idx.0, frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.next_min = idx.0 + 1;

        flatten_to_opaque_rgba8(
            &mut self.rgba,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;

        let stdin = enc
            .stdin
            .as_mut()
            .ok_or_else(|| PlaybackError::encode("ffmpeg input already closed"))?;
        use std::io::Write as _;
        stdin
            .write_all(&self.rgba)
            .map_err(|e| PlaybackError::encode(format!("ffmpeg rejected frame {}: {e}", idx.0)))
    }

    fn end(&mut self) -> PlaybackResult<()> {
        let mut enc = self
            .encoder
            .take()
            .ok_or_else(|| PlaybackError::encode("end called before begin"))?;
        self.cfg = None;
        drop(enc.stdin.take());

        let status = enc
            .child
            .wait()
            .map_err(|e| PlaybackError::encode(format!("waiting for ffmpeg: {e}")))?;
        let log = match enc.stderr.take() {
            Some(drain) => drain
                .join()
                .map_err(|_| PlaybackError::encode("ffmpeg log reader panicked"))?
                .map_err(|e| PlaybackError::encode(format!("reading ffmpeg log: {e}")))?,
            None => Vec::new(),
        };

        if status.success() {
            tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg finished");
            return Ok(());
        }
        Err(PlaybackError::encode(format!(
            "ffmpeg failed ({status}): {}",
            String::from_utf8_lossy(&log).trim()
        )))
    }
}

/// Composites RGBA8 over an opaque background, for encoders that ignore alpha.
pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> PlaybackResult<()> {
    if dst.len() != src.len() || dst.len() % 4 != 0 {
        return Err(PlaybackError::encode(format!(
            "pixel buffer holds {} bytes, expected {}",
            src.len(),
            dst.len()
        )));
    }

    for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let alpha = u16::from(px[3]);
        if alpha == 255 {
            out.copy_from_slice(px);
            continue;
        }
        let cover = 255 - alpha;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(px[c])
            } else {
                mul_div255_u16(u16::from(px[c]), alpha)
            };
            out[c] = (fg + mul_div255_u16(u16::from(bg_rgba[c]), cover)).min(255) as u8;
        }
        out[3] = 255;
    }
    Ok(())
}

/// Creates the directory that will hold `path`, if any.
pub fn ensure_parent_dir(path: &Path) -> PlaybackResult<()> {
    use anyhow::Context as _;
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("create '{}' for video output", dir.display()))
            .map_err(Into::into),
        _ => Ok(()),
    }
}

/// Whether `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
