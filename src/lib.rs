//! code-playback replays source files as if they were being typed, and records the playback to
//! video.
//!
//! - Browse a repository through a [`Backend`] (GitHub contents API or a local directory)
//! - Load a file into a [`PlaybackSession`] and reveal it with the [`Typewriter`]
//! - Capture frames while recording and export them through a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Frame capture: themes, tokenizer, rasterizer and frame buffer.
pub mod capture;
/// Video encoding sinks and the export driver.
pub mod encode;
/// Typewriter reveal engine.
pub mod playback;
/// Message-driven playback session.
pub mod session;
/// Persisted user preferences.
pub mod settings;
/// Repository trees and file contents.
pub mod source;

pub use crate::foundation::core::{Canvas, FrameIndex, Rgba8, fps_for_interval};
pub use crate::foundation::error::{PlaybackError, PlaybackResult};

pub use crate::capture::frame::{Frame, FrameBuffer, FrameRGBA, FrameSlot};
pub use crate::capture::raster::{CaptureConfig, FontChoice, Rasterizer};
pub use crate::capture::theme::{Palette, Theme};
pub use crate::capture::tokenize::TokenKind;
pub use crate::encode::export::{ExportOpts, ExportReport, export_frames};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoContainer};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::playback::typewriter::{PlaybackState, Typewriter};
pub use crate::session::playback_session::{
    PlaybackSession, SessionHandle, SessionOpts, SessionStatus,
};
pub use crate::settings::Settings;
pub use crate::source::backend::{Backend, BackendKind, SourceFile};
pub use crate::source::tree::{NodeKind, TreeNode};
