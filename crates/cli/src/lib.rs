//! Shared CLI types and command handlers, reused by both the one-shot and
//! interactive entrypoints in `main.rs`.

pub mod commands;
pub mod completions;
pub mod interactive;
pub mod oneshot;
