//! Schema module - Configuration types for HGLY playback sessions.

mod config;

pub use config::*;
