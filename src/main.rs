#![forbid(unsafe_code)]
//! Kagawa Mirai Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kagawa_mirai::commands::{
    execute_calculate, execute_generate, execute_init, execute_narrative, CalculateOptions,
    GenerateOptions, InitOptions, NarrativeOptions,
};
use kagawa_mirai::config::CONFIG_FILE;
use kagawa_mirai::Config;

#[derive(Parser)]
#[command(name = "kagawa-mirai")]
#[command(about = "Kagawa future investment subsidy - calculation and application documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, env = "KAGAWA_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a project config
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Skip interactive prompts (use defaults)
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print projection, subsidy, payback and requirement checks
    Calculate {
        /// Interview record (JSON or YAML)
        record: PathBuf,

        /// Output as JSON (default: human-readable)
        #[arg(long)]
        json: bool,

        /// Effects start in year 2 instead of ramping from year 1
        #[arg(long)]
        delayed: bool,
    },

    /// Generate the business plan narrative sections
    Narrative {
        /// Interview record (JSON or YAML)
        record: PathBuf,

        /// Output sections file
        #[arg(short, long, default_value = "sections.json")]
        output: PathBuf,

        /// Retries when a response contains no usable sections
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },

    /// Fill the application documents
    Generate {
        /// Interview record (JSON or YAML)
        record: PathBuf,

        /// Output directory (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Template directory (default: from config)
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Sections file written by the narrative command
        #[arg(long)]
        narrative: Option<PathBuf>,

        /// Zip the output directory, optionally to the given archive path
        #[arg(long, num_args = 0..=1, value_name = "ARCHIVE")]
        bundle: Option<Option<PathBuf>>,

        /// Effects start in year 2 instead of ramping from year 1
        #[arg(long)]
        delayed: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load config
    if !cli.config.exists() && !matches!(cli.command, Commands::Init { .. }) {
        eprintln!(
            "{} No {} found, using defaults (run 'kagawa-mirai init' to create one)",
            style("⚠").yellow(),
            cli.config.display()
        );
    }
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init { force, yes } => {
            let options = InitOptions {
                config_path: cli.config,
                force,
                yes,
            };
            execute_init(options)?;
        }

        Commands::Calculate {
            record,
            json,
            delayed,
        } => {
            let options = CalculateOptions {
                record,
                json,
                delayed,
            };
            execute_calculate(options, &config)?;
        }

        Commands::Narrative {
            record,
            output,
            retries,
        } => {
            let options = NarrativeOptions {
                record,
                output,
                retries,
            };
            execute_narrative(options, &config)?;
        }

        Commands::Generate {
            record,
            output,
            templates,
            narrative,
            bundle,
            delayed,
        } => {
            let options = GenerateOptions {
                record,
                output_dir: output,
                template_dir: templates,
                narrative,
                bundle,
                delayed,
            };
            execute_generate(options, &config)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "kagawa_mirai=debug"
    } else {
        "kagawa_mirai=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
