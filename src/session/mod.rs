//! The playback session: typewriter, capture and export behind one message-driven task.

pub mod playback_session;
