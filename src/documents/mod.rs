//! @acp:module "Documents"
//! @acp:summary "Fill the application templates from the record and calculations"
//! @acp:domain documents
//! @acp:layer output
//!
//! ## Core Components
//!
//! - [`template`]: working copies of the blank templates
//! - [`xlsx`], [`docx`]: cell and table editing inside OOXML packages
//! - [`application`], [`business_plan`], [`checklist`]: per-document field maps
//! - [`bundle`]: zip of the finished output directory
//!
//! Each document is a separate stage. A stage whose template is missing
//! yields `Ok(None)`; a stage that fails does not stop the ones after it.

pub mod application;
pub mod bundle;
pub mod business_plan;
pub mod checkbox;
pub mod checklist;
pub mod docx;
pub mod package;
pub mod template;
pub mod xlsx;
pub mod xml;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::plan::{SubsidyCalculation, ThreeYearPlan};
use crate::record::InputRecord;

pub use bundle::{bundle_directory, default_archive_name};
pub use template::{acquire, apply_fields, DocumentKind, FieldMap, WorkingCopy};

/// Result of one pipeline stage
pub type DocumentOutcome = (DocumentKind, Result<Option<PathBuf>>);

/// @acp:summary "Generate one document; `None` when its template is absent"
pub fn generate_document(
    kind: DocumentKind,
    record: &InputRecord,
    output_dir: &Path,
    template_dir: &Path,
    subsidy: &SubsidyCalculation,
    plan: &ThreeYearPlan,
) -> Result<Option<PathBuf>> {
    let Some(copy) = acquire(kind, template_dir, output_dir)? else {
        return Ok(None);
    };

    let path = match kind {
        DocumentKind::ApplicationForm => apply_fields(copy, &application::fields(record, subsidy))?,
        DocumentKind::BusinessPlan => {
            apply_fields(copy, &business_plan::fields(record, plan, subsidy))?
        }
        // Signed by hand; copied as is
        DocumentKind::Pledge => copy.commit(),
        DocumentKind::Checklist => apply_fields(copy, &checklist::fields(record, plan, subsidy))?,
    };

    tracing::info!("Generated {}: {}", kind, path.display());
    Ok(Some(path))
}

/// @acp:summary "Run all four stages in order, reporting progress before each"
pub fn generate_all_documents(
    record: &InputRecord,
    output_dir: &Path,
    template_dir: &Path,
    subsidy: &SubsidyCalculation,
    plan: &ThreeYearPlan,
    mut progress: impl FnMut(usize, usize, DocumentKind),
) -> Result<Vec<DocumentOutcome>> {
    std::fs::create_dir_all(output_dir)?;

    let stages = DocumentKind::pipeline();
    let mut outcomes = Vec::with_capacity(stages.len());
    for (i, kind) in stages.iter().enumerate() {
        progress(i + 1, stages.len(), *kind);
        let outcome = generate_document(*kind, record, output_dir, template_dir, subsidy, plan);
        if let Err(e) = &outcome {
            tracing::warn!("Failed to generate {}: {}", kind, e);
        }
        outcomes.push((*kind, outcome));
    }

    Ok(outcomes)
}
