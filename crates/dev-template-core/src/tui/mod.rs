//! CLI prompts using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

#[cfg(feature = "tui")]
mod config;
#[cfg(feature = "tui")]
mod observer;
#[cfg(feature = "tui")]
mod prompts;

#[cfg(feature = "tui")]
pub use config::{apply_edits, run_config, ConfigArgs};
#[cfg(feature = "tui")]
pub use observer::TuiObserver;
#[cfg(feature = "tui")]
pub use prompts::{run, CreateArgs};
