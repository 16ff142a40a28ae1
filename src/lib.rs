// ABOUTME: Library root for rollwatch - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod output;
pub mod poll;
pub mod progress;
pub mod step;
pub mod types;
