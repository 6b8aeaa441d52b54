//! Typewriter-style reveal of a source string.

/// Reveal cursor state machine.
pub mod typewriter;
