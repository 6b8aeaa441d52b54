use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::capture::frame::{Frame, FrameSlot};
use crate::capture::raster::{CaptureConfig, FontChoice, Rasterizer};
use crate::capture::recorder::{Recorder, SkipReason};
use crate::capture::theme::Theme;
use crate::encode::export::{ExportOpts, ExportReport, export_frames};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoContainer};
use crate::encode::sink::FrameSink;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PlaybackError, PlaybackResult};
use crate::playback::typewriter::{DEFAULT_RATE, PlaybackState, Typewriter};
use crate::source::backend::SourceFile;
use crate::source::language::PLAINTEXT;

/// Default capture period, 20 frames per second.
pub const DEFAULT_CAPTURE_INTERVAL: Duration = Duration::from_millis(50);

/// Options for [`PlaybackSession::spawn`].
#[derive(Clone, Debug)]
pub struct SessionOpts {
    pub capture: CaptureConfig,
    /// Period of the capture timer while recording.
    pub capture_interval: Duration,
    /// Initial reveal rate in characters per second.
    pub rate: u32,
    pub theme: Theme,
    pub font: FontChoice,
    /// Pace export pushes at the capture interval.
    pub realtime_export: bool,
    /// Bounded command queue length.
    pub channel_capacity: usize,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            capture_interval: DEFAULT_CAPTURE_INTERVAL,
            rate: DEFAULT_RATE,
            theme: Theme::default(),
            font: FontChoice::default(),
            realtime_export: true,
            channel_capacity: 32,
        }
    }
}

impl SessionOpts {
    pub fn validate(&self) -> PlaybackResult<()> {
        self.capture.validate()?;
        if self.capture_interval.is_zero() {
            return Err(PlaybackError::input("capture interval must be > 0"));
        }
        if self.rate == 0 {
            return Err(PlaybackError::input("playback rate must be >= 1 char/s"));
        }
        if self.channel_capacity == 0 {
            return Err(PlaybackError::input("channel capacity must be > 0"));
        }
        Ok(())
    }

    fn export_opts(&self) -> PlaybackResult<ExportOpts> {
        if self.realtime_export {
            ExportOpts::for_interval(self.capture_interval)
        } else {
            ExportOpts::unpaced(self.capture_interval)
        }
    }
}

/// Snapshot of everything a shell displays.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStatus {
    pub playback: PlaybackState,
    pub recording: bool,
    /// An export is running.
    pub processing: bool,
    /// Frames in the buffer.
    pub frames: usize,
    /// Capture ticks skipped during the current recording.
    pub skipped: u64,
    pub theme: Theme,
    pub language: String,
    /// Path of the loaded file, if any.
    pub path: Option<String>,
}

enum Command {
    Load {
        file: SourceFile,
        reply: oneshot::Sender<()>,
    },
    Start {
        reply: oneshot::Sender<bool>,
    },
    Pause {
        reply: oneshot::Sender<()>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    SetRate {
        rate: u32,
        reply: oneshot::Sender<PlaybackResult<()>>,
    },
    SetTheme {
        theme: Theme,
        reply: oneshot::Sender<()>,
    },
    StartRecording {
        reply: oneshot::Sender<PlaybackResult<()>>,
    },
    StopRecording {
        reply: oneshot::Sender<usize>,
    },
    Export {
        sink: Box<dyn FrameSink>,
        path: Option<PathBuf>,
        reply: oneshot::Sender<PlaybackResult<ExportReport>>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    Shutdown,
}

struct ExportDone {
    result: PlaybackResult<ExportReport>,
    reply: oneshot::Sender<PlaybackResult<ExportReport>>,
}

/// A capture rendered off the session loop.
struct Captured {
    slot: FrameSlot,
    result: PlaybackResult<Frame>,
}

enum Event {
    Command(Command),
    ExportDone(ExportDone),
    Captured(Captured),
    Type,
    Capture,
    Closed,
}

/// Cloneable handle to a running session.
///
/// The session task ends when [`SessionHandle::shutdown`] is called or the last handle is dropped.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    prefix: watch::Receiver<Arc<str>>,
}

/// Entry point for starting a session task.
pub struct PlaybackSession;

impl PlaybackSession {
    /// Validates `opts`, builds the rasterizer and spawns the session task on the current runtime.
    pub fn spawn(opts: SessionOpts) -> PlaybackResult<(SessionHandle, JoinHandle<()>)> {
        opts.validate()?;
        let raster = Rasterizer::new(opts.capture, opts.theme, &opts.font)?;
        let export = opts.export_opts()?;
        let typewriter = Typewriter::new(opts.rate)?;

        let (tx, rx) = mpsc::channel(opts.channel_capacity);
        let (prefix_tx, prefix_rx) = watch::channel(Arc::<str>::from(""));
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let (captured_tx, captured_rx) = mpsc::unbounded_channel();

        let actor = Actor {
            typewriter,
            recorder: Recorder::new(),
            raster: Arc::new(Mutex::new(raster)),
            theme: opts.theme,
            language: PLAINTEXT.to_string(),
            path: None,
            capture_interval: opts.capture_interval,
            export,
            prefix: prefix_tx,
            typing: None,
            capture: None,
            done_tx,
            done_rx,
            captured_tx,
            captured_rx,
        };
        let task = tokio::spawn(actor.run(rx));

        Ok((
            SessionHandle {
                tx,
                prefix: prefix_rx,
            },
            task,
        ))
    }
}

fn closed() -> PlaybackError {
    PlaybackError::Other(anyhow::anyhow!("playback session has shut down"))
}

impl SessionHandle {
    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> PlaybackResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| closed())?;
        rx.await.map_err(|_| closed())
    }

    /// Replaces the source. Stops any recording, clears captured frames and resets playback.
    pub async fn load(&self, file: SourceFile) -> PlaybackResult<()> {
        self.call(|reply| Command::Load { file, reply }).await
    }

    /// Starts or resumes the reveal. Returns `false` when there is nothing to reveal.
    pub async fn start(&self) -> PlaybackResult<bool> {
        self.call(|reply| Command::Start { reply }).await
    }

    pub async fn pause(&self) -> PlaybackResult<()> {
        self.call(|reply| Command::Pause { reply }).await
    }

    /// Rewinds to an empty prefix. Also stops an active recording.
    pub async fn reset(&self) -> PlaybackResult<()> {
        self.call(|reply| Command::Reset { reply }).await
    }

    pub async fn set_rate(&self, rate: u32) -> PlaybackResult<()> {
        self.call(|reply| Command::SetRate { rate, reply }).await?
    }

    pub async fn set_theme(&self, theme: Theme) -> PlaybackResult<()> {
        self.call(|reply| Command::SetTheme { theme, reply }).await
    }

    /// Begins capturing frames, starting the reveal if it has not started yet.
    pub async fn start_recording(&self) -> PlaybackResult<()> {
        self.call(|reply| Command::StartRecording { reply }).await?
    }

    /// Stops capturing and returns the number of buffered frames.
    pub async fn stop_recording(&self) -> PlaybackResult<usize> {
        self.call(|reply| Command::StopRecording { reply }).await
    }

    /// Encodes the buffered frames through `sink`.
    ///
    /// Resolves once the export finishes. An empty buffer resolves immediately with an empty
    /// report and the sink untouched.
    pub async fn export(&self, sink: Box<dyn FrameSink>) -> PlaybackResult<ExportReport> {
        self.call(|reply| Command::Export {
            sink,
            path: None,
            reply,
        })
        .await?
    }

    /// Encodes the buffered frames to a video file with `ffmpeg`.
    pub async fn export_file(
        &self,
        path: impl Into<PathBuf>,
        container: VideoContainer,
    ) -> PlaybackResult<ExportReport> {
        let path = path.into();
        let sink = FfmpegSink::new(FfmpegSinkOpts::new(path.clone(), container));
        self.call(|reply| Command::Export {
            sink: Box::new(sink),
            path: Some(path),
            reply,
        })
        .await?
    }

    pub async fn status(&self) -> PlaybackResult<SessionStatus> {
        self.call(|reply| Command::Status { reply }).await
    }

    /// Currently displayed prefix.
    pub fn displayed(&self) -> Arc<str> {
        self.prefix.borrow().clone()
    }

    /// Receiver notified whenever the displayed prefix changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<str>> {
        self.prefix.clone()
    }

    /// Asks the session task to stop. Pending exports are abandoned.
    pub async fn shutdown(&self) -> PlaybackResult<()> {
        self.tx.send(Command::Shutdown).await.map_err(|_| closed())
    }
}

struct Actor {
    typewriter: Typewriter,
    recorder: Recorder,
    raster: Arc<Mutex<Rasterizer>>,
    theme: Theme,
    language: String,
    path: Option<String>,
    capture_interval: Duration,
    export: ExportOpts,
    prefix: watch::Sender<Arc<str>>,

    typing: Option<Interval>,
    capture: Option<Interval>,

    done_tx: mpsc::UnboundedSender<ExportDone>,
    done_rx: mpsc::UnboundedReceiver<ExportDone>,
    captured_tx: mpsc::UnboundedSender<Captured>,
    captured_rx: mpsc::UnboundedReceiver<Captured>,
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(iv) => {
            iv.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Periodic timer whose first tick is one `period` from now.
fn periodic(period: Duration, missed: MissedTickBehavior) -> Interval {
    let mut iv = tokio::time::interval_at(Instant::now() + period, period);
    iv.set_missed_tick_behavior(missed);
    iv
}

impl Actor {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        tracing::debug!("playback session started");
        loop {
            let event = tokio::select! {
                cmd = rx.recv() => cmd.map_or(Event::Closed, Event::Command),
                Some(done) = self.done_rx.recv() => Event::ExportDone(done),
                Some(captured) = self.captured_rx.recv() => Event::Captured(captured),
                _ = next_tick(&mut self.typing) => Event::Type,
                _ = next_tick(&mut self.capture) => Event::Capture,
            };

            match event {
                Event::Command(Command::Shutdown) | Event::Closed => break,
                Event::Command(cmd) => self.handle(cmd),
                Event::ExportDone(done) => {
                    self.recorder.finish_export();
                    let _ = done.reply.send(done.result);
                }
                Event::Captured(captured) => self.store_capture(captured),
                Event::Type => self.type_tick(),
                Event::Capture => self.capture_tick(),
            }
        }
        tracing::debug!("playback session stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Load { file, reply } => {
                self.stop_recording();
                self.recorder.clear();
                self.typewriter.load(file.text);
                self.typing = None;
                self.language = file.language;
                self.path = Some(file.path);
                self.publish();
                tracing::info!(path = ?self.path, chars = self.typewriter.len(), "source loaded");
                let _ = reply.send(());
            }
            Command::Start { reply } => {
                let _ = reply.send(self.start_typing());
            }
            Command::Pause { reply } => {
                self.typewriter.pause();
                self.typing = None;
                let _ = reply.send(());
            }
            Command::Reset { reply } => {
                self.typewriter.reset();
                self.typing = None;
                self.stop_recording();
                self.publish();
                let _ = reply.send(());
            }
            Command::SetRate { rate, reply } => {
                let res = self.typewriter.set_rate(rate);
                if res.is_ok() && self.typewriter.is_running() {
                    self.typing = Some(periodic(
                        self.typewriter.tick_interval(),
                        MissedTickBehavior::Delay,
                    ));
                }
                let _ = reply.send(res);
            }
            Command::SetTheme { theme, reply } => {
                self.theme = theme;
                let _ = reply.send(());
            }
            Command::StartRecording { reply } => {
                let _ = reply.send(self.start_recording());
            }
            Command::StopRecording { reply } => {
                self.stop_recording();
                let _ = reply.send(self.recorder.frame_count());
            }
            Command::Export { sink, path, reply } => self.export(sink, path, reply),
            Command::Status { reply } => {
                let _ = reply.send(SessionStatus {
                    playback: self.typewriter.state(),
                    recording: self.recorder.is_recording(),
                    processing: self.recorder.is_processing(),
                    frames: self.recorder.frame_count(),
                    skipped: self.recorder.skipped(),
                    theme: self.theme,
                    language: self.language.clone(),
                    path: self.path.clone(),
                });
            }
            Command::Shutdown => {}
        }
    }

    fn publish(&self) {
        self.prefix.send_replace(Arc::from(self.typewriter.prefix()));
    }

    fn start_typing(&mut self) -> bool {
        let was_at_end = self.typewriter.is_complete();
        if !self.typewriter.start() {
            return false;
        }
        if was_at_end {
            self.publish();
        }
        self.typing = Some(periodic(
            self.typewriter.tick_interval(),
            MissedTickBehavior::Delay,
        ));
        true
    }

    fn type_tick(&mut self) {
        if let Some(prefix) = self.typewriter.tick() {
            let prefix = Arc::<str>::from(prefix);
            self.prefix.send_replace(prefix);
        }
        if !self.typewriter.is_running() {
            self.typing = None;
        }
    }

    fn start_recording(&mut self) -> PlaybackResult<()> {
        self.recorder.start(self.typewriter.len())?;
        if self.typewriter.is_idle() {
            self.start_typing();
        }
        self.capture = Some(periodic(self.capture_interval, MissedTickBehavior::Skip));
        tracing::info!(interval = ?self.capture_interval, "recording started");
        Ok(())
    }

    fn stop_recording(&mut self) {
        self.capture = None;
        if self.recorder.stop() {
            tracing::info!(frames = self.recorder.frame_count(), "recording stopped");
        }
    }

    /// Hands the current prefix to a blocking render task. The result comes back as
    /// [`Event::Captured`], so typing and commands keep running while it renders.
    fn capture_tick(&mut self) {
        let prefix = self.prefix.borrow().clone();
        let slot = match self.recorder.check_capture(&prefix) {
            Ok(slot) => slot,
            Err(SkipReason::NotRecording) => {
                self.capture = None;
                return;
            }
            Err(reason) => {
                tracing::trace!(?reason, "capture skipped");
                return;
            }
        };
        let complete = prefix.len() == self.typewriter.source().len();
        let language = self.language.clone();
        let theme = self.theme;
        let raster = Arc::clone(&self.raster);
        let captured = self.captured_tx.clone();

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || -> PlaybackResult<Frame> {
                let mut raster = raster
                    .lock()
                    .map_err(|_| PlaybackError::capture("rasterizer lock poisoned"))?;
                raster.set_theme(theme);
                let rgba = raster.render(&prefix, complete, &language)?;
                drop(raster);
                Frame::encode(slot.index, &rgba)
            })
            .await
            .map_err(|e| PlaybackError::capture(format!("capture task failed: {e}")))
            .and_then(|r| r);
            let _ = captured.send(Captured { slot, result });
        });
    }

    fn store_capture(&mut self, captured: Captured) {
        match self.recorder.finish_capture(captured.slot, captured.result) {
            Ok(Some(FrameIndex(i))) => tracing::trace!(frame = i, "frame captured"),
            Ok(None) => tracing::trace!(frame = captured.slot.index.0, "late frame dropped"),
            Err(e) => tracing::warn!(error = %e, "frame capture failed"),
        }
    }

    fn export(
        &mut self,
        sink: Box<dyn FrameSink>,
        path: Option<PathBuf>,
        reply: oneshot::Sender<PlaybackResult<ExportReport>>,
    ) {
        let frames = match self.recorder.begin_export() {
            Ok(Some(frames)) => frames,
            Ok(None) => {
                let _ = reply.send(Ok(ExportReport::default()));
                return;
            }
            Err(e) => {
                let _ = reply.send(Err(e));
                return;
            }
        };

        let opts = self.export.clone();
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let result = export_frames(frames, sink, &opts)
                .await
                .map(|(_, report)| ExportReport { path, ..report });
            match &result {
                Ok(report) => {
                    tracing::info!(written = report.written, path = ?report.path, "export complete")
                }
                Err(e) => tracing::error!(error = %e, "export failed"),
            }
            let _ = done.send(ExportDone { result, reply });
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/playback_session.rs"]
mod tests;
