//! @acp:module "Generate Command"
//! @acp:summary "Fill all application documents for a record"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `kagawa-mirai generate`: assessment, document pipeline and an
//! optional zip of the output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::load_record;
use crate::assess::Assessment;
use crate::config::Config;
use crate::documents::{bundle_directory, default_archive_name, generate_all_documents};
use crate::narrative::NarrativeSections;
use crate::plan::RampMode;

/// Options for the generate command
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Interview record (JSON or YAML)
    pub record: PathBuf,
    /// Output directory, config value when unset
    pub output_dir: Option<PathBuf>,
    /// Template directory, config value when unset
    pub template_dir: Option<PathBuf>,
    /// Sections written by the narrative command
    pub narrative: Option<PathBuf>,
    /// Zip the output; the inner `None` picks the default archive name
    pub bundle: Option<Option<PathBuf>>,
    /// Use the delayed ramp regardless of config
    pub delayed: bool,
}

/// Execute the generate command
pub fn execute_generate(options: GenerateOptions, config: &Config) -> Result<()> {
    let mut record = load_record(&options.record)?;
    if let Some(path) = &options.narrative {
        record = record.with_generated_texts(load_sections(path)?);
    }

    let output_dir = options.output_dir.unwrap_or_else(|| config.output_dir.clone());
    let template_dir = options
        .template_dir
        .unwrap_or_else(|| config.template_dir.clone());
    let ramp = if options.delayed {
        RampMode::Delayed
    } else {
        config.ramp_mode
    };

    let assessment = Assessment::from_record(&record, config, ramp)?;
    if !assessment.validation.all_met {
        println!(
            "{} Requirements not met; documents are filled anyway",
            style("⚠").yellow()
        );
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:30.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    let outcomes = generate_all_documents(
        &record,
        &output_dir,
        &template_dir,
        &assessment.subsidy,
        &assessment.plan,
        |index, total, kind| {
            bar.set_length(total as u64);
            bar.set_position(index as u64 - 1);
            bar.set_message(kind.label());
        },
    )?;
    bar.finish_and_clear();

    let mut failures = 0;
    for (kind, outcome) in &outcomes {
        match outcome {
            Ok(Some(path)) => println!("{} {}: {}", style("✓").green(), kind, path.display()),
            Ok(None) => println!(
                "{} {}: template {} not found in {}",
                style("⚠").yellow(),
                kind,
                kind.template_name(),
                template_dir.display()
            ),
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {}", style("✗").red(), kind, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} document(s) failed", failures);
    }

    if let Some(archive) = options.bundle {
        let archive = archive
            .unwrap_or_else(|| output_dir.join(default_archive_name(&record.company.name)));
        let path = bundle_directory(&output_dir, &archive)?;
        println!("{} Bundled into {}", style("✓").green(), path.display());
    }

    Ok(())
}

fn load_sections(path: &Path) -> Result<NarrativeSections> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read narrative {}", path.display()))?;
    let sections: NarrativeSections = serde_json::from_str(&content)
        .with_context(|| format!("Invalid narrative JSON in {}", path.display()))?;
    if sections.is_empty() {
        tracing::warn!("No recognized sections in {}", path.display());
    }
    Ok(sections)
}
