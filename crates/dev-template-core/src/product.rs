//! Product configuration trait for CLI binaries
//!
//! A binary built on this library implements this trait to give the shared
//! prompts its identity and its post-creation instructions.

use crate::pipeline::PipelineResult;

pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Environment variable overriding the configuration directory
    fn config_dir_env(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, result: &PipelineResult) -> Vec<String>;
}
