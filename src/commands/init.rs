//! @acp:module "Init Command"
//! @acp:summary "Write a project configuration"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `kagawa-mirai init`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::config::Config;
use crate::plan::RampMode;

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Where the config is written
    pub config_path: PathBuf,
    /// Force overwrite existing config
    pub force: bool,
    /// Skip interactive prompts
    pub yes: bool,
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<()> {
    let config_path = &options.config_path;

    if config_path.exists() && !options.force {
        eprintln!(
            "{} Config file already exists. Use --force to overwrite.",
            style("✗").red()
        );
        std::process::exit(1);
    }

    let mut config = Config::default();
    if !options.yes {
        run_interactive_init(&mut config)?;
    }

    config.save(config_path)?;
    println!("{} Created {}", style("✓").green(), config_path.display());

    if !config.template_dir.exists() {
        println!(
            "{} Template directory {} does not exist yet",
            style("⚠").yellow(),
            config.template_dir.display()
        );
    }

    println!("\n{}", style("Next steps:").bold());
    println!(
        "  1. Place the blank forms in {}",
        style(config.template_dir.display()).cyan()
    );
    println!(
        "  2. Run {} to check the numbers",
        style("kagawa-mirai calculate <record>").cyan()
    );
    println!(
        "  3. Run {} to fill the forms",
        style("kagawa-mirai generate <record>").cyan()
    );

    Ok(())
}

fn run_interactive_init(config: &mut Config) -> Result<()> {
    println!("{} Project Setup\n", style("→").cyan());
    let theme = ColorfulTheme::default();

    let template_dir: String = Input::with_theme(&theme)
        .with_prompt("Template directory")
        .default(config.template_dir.display().to_string())
        .interact_text()?;
    config.template_dir = PathBuf::from(template_dir);

    let output_dir: String = Input::with_theme(&theme)
        .with_prompt("Output directory")
        .default(config.output_dir.display().to_string())
        .interact_text()?;
    config.output_dir = PathBuf::from(output_dir);

    let ramps = [
        ("standard: 50% in year 1, full from year 2", RampMode::Standard),
        ("delayed: none in year 1, 70% in year 2, full in year 3", RampMode::Delayed),
    ];
    let items: Vec<&str> = ramps.iter().map(|(label, _)| *label).collect();
    let selection = Select::with_theme(&theme)
        .with_prompt("Effect ramp-up")
        .items(&items)
        .default(0)
        .interact()?;
    config.ramp_mode = ramps[selection].1;

    config.default_useful_life = Input::with_theme(&theme)
        .with_prompt("Default useful life (years)")
        .default(config.default_useful_life)
        .validate_with(|years: &i64| {
            if *years > 0 {
                Ok(())
            } else {
                Err("must be at least 1 year")
            }
        })
        .interact_text()?;

    Ok(())
}
