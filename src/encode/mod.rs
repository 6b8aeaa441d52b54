//! Video encoding of captured frames.
//!
//! Sinks consume decoded frames in output order; [`export`] drives a sink from a frame snapshot.

/// Buffered export of captured frames.
pub mod export;
/// `ffmpeg`-based sink (WebM or MP4 via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
