#![forbid(unsafe_code)]

//! @acp:module "Kagawa Mirai Library"
//! @acp:summary "Subsidy calculation, eligibility checks and application document filling"
//! @acp:domain subsidy
//! @acp:layer api
//! @acp:stability stable
//!
//! # Kagawa Mirai
//!
//! Prepares applications for the Kagawa future investment support subsidy.
//!
//! ## Features
//!
//! - **Projection**: three-year business plan from the latest fiscal year
//! - **Subsidy**: statutory rate and cap, depreciation and payback
//! - **Validation**: growth and minimum expense requirements
//! - **Documents**: fills the xlsx/docx templates and bundles the result
//!
//! ## Example
//!
//! ```rust,no_run
//! use kagawa_mirai::{documents, Assessment, Config, InputRecord, RampMode};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let record = InputRecord::load("interview.json")?;
//!     let assessment = Assessment::from_record(&record, &config, RampMode::Standard)?;
//!
//!     documents::generate_all_documents(
//!         &record,
//!         &config.output_dir,
//!         &config.template_dir,
//!         &assessment.subsidy,
//!         &assessment.plan,
//!         |_, _, _| {},
//!     )?;
//!     Ok(())
//! }
//! ```

pub mod assess;
pub mod commands;
pub mod config;
pub mod documents;
pub mod error;
pub mod format;
pub mod narrative;
pub mod plan;
pub mod record;

// Re-exports
pub use assess::Assessment;
pub use config::{Config, NarrativeConfig};
pub use documents::{generate_all_documents, generate_document, DocumentKind};
pub use error::{Result, SubsidyError};
pub use narrative::{AnthropicClient, NarrativeGenerator, NarrativeSections, SectionKey};
pub use plan::{
    calculate_investment_payback, calculate_subsidy, project, validate, FinancialBaseline,
    Payback, PlannedEffects, RampMode, SubsidyCalculation, ThreeYearPlan, ValidationReport,
};
pub use record::{ExpenseItem, InputRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
