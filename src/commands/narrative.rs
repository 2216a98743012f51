//! @acp:module "Narrative Command"
//! @acp:summary "Generate the business plan narrative sections for a record"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::load_record;
use crate::config::Config;
use crate::narrative::{generate_texts, AnthropicClient, NarrativeSections, SectionKey};

/// Options for the narrative command
#[derive(Debug, Clone)]
pub struct NarrativeOptions {
    /// Interview record (JSON or YAML)
    pub record: PathBuf,
    /// Where the extracted sections are written
    pub output: PathBuf,
    /// Extra attempts when a response yields no sections
    pub retries: u32,
}

/// Execute the narrative command
pub fn execute_narrative(options: NarrativeOptions, config: &Config) -> Result<()> {
    let record = load_record(&options.record)?;
    let client = AnthropicClient::from_config(&config.narrative)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));

    let mut sections = NarrativeSections::new();
    for attempt in 0..=options.retries {
        spinner.set_message(format!(
            "Generating narrative with {} (attempt {}/{})",
            client.model(),
            attempt + 1,
            options.retries + 1
        ));
        sections = generate_texts(&record, &client)?;
        if !sections.is_empty() {
            break;
        }
    }
    spinner.finish_and_clear();

    if sections.is_empty() {
        anyhow::bail!(
            "No narrative sections could be extracted after {} attempt(s)",
            options.retries + 1
        );
    }

    let content = serde_json::to_string_pretty(&sections)?;
    std::fs::write(&options.output, content)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    println!(
        "{} Wrote {} sections to {}",
        style("✓").green(),
        sections.len(),
        options.output.display()
    );
    for line in section_report(&sections) {
        println!("  {}", line);
    }

    Ok(())
}

/// One line per section: characters written against the target length
fn section_report(sections: &NarrativeSections) -> Vec<String> {
    SectionKey::all()
        .iter()
        .map(|key| match sections.get(*key) {
            Some(text) => format!(
                "{} {} {}: {}/{} chars",
                style("✓").green(),
                key.key(),
                key.label(),
                text.chars().count(),
                key.target_chars()
            ),
            None => format!("{} {} {}: missing", style("✗").red(), key.key(), key.label()),
        })
        .collect()
}
