//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Provides implementations for all CLI commands.
//! Each command is in its own submodule for maintainability.

pub mod calculate;
pub mod generate;
pub mod init;
pub mod narrative;

pub use calculate::{execute_calculate, CalculateOptions};
pub use generate::{execute_generate, GenerateOptions};
pub use init::{execute_init, InitOptions};
pub use narrative::{execute_narrative, NarrativeOptions};

use std::path::Path;

use anyhow::Context;

use crate::record::InputRecord;

/// Load the record named on the command line
pub(crate) fn load_record(path: &Path) -> anyhow::Result<InputRecord> {
    InputRecord::load(path).with_context(|| format!("Failed to read record {}", path.display()))
}
