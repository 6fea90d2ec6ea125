//! Shared utilities for the roundseed workspace.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat, LogFormatError};
pub use time::format_elapsed;
