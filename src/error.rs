//! @acp:module "Errors"
//! @acp:summary "Error types for the subsidy engine"
//! @acp:domain subsidy
//! @acp:layer model
//!
//! Business-rule failures (eligibility not met, expenses below the floor) are
//! never errors; they are carried in [`crate::plan::ValidationReport`].
//! Expected absences (missing template, unparsable narrative) are `None` or
//! empty values. Everything here is an unexpected failure.

use std::path::PathBuf;

use thiserror::Error;

/// @acp:summary "Unexpected failures raised by the engine"
#[derive(Debug, Error)]
pub enum SubsidyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Package {path} has no part '{part}'")]
    MissingPart { path: PathBuf, part: String },

    #[error("Workbook has no sheet named '{0}'")]
    MissingSheet(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),

    #[error("Useful life must be positive, got {0}")]
    InvalidUsefulLife(i64),

    #[error("Narrative generation failed: {0}")]
    Narrative(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SubsidyError>;

impl From<handlebars::RenderError> for SubsidyError {
    fn from(err: handlebars::RenderError) -> Self {
        SubsidyError::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for SubsidyError {
    fn from(err: handlebars::TemplateError) -> Self {
        SubsidyError::Template(err.to_string())
    }
}
