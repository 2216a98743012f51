//! @acp:module "Configuration"
//! @acp:summary "Engine configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::plan::{RampMode, DEFAULT_USEFUL_LIFE};

/// Default config file name in the working directory
pub const CONFIG_FILE: &str = ".kagawa.config.json";

/// @acp:summary "Main configuration structure"
/// @acp:lock normal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the blank application templates
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Directory that receives the completed documents
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// How the annual effects ramp up over the plan years
    #[serde(default)]
    pub ramp_mode: RampMode,

    /// Useful life in years when the record gives none
    #[serde(default = "default_useful_life")]
    pub default_useful_life: i64,

    /// Multiplier from record financial figures to yen
    #[serde(default = "default_baseline_unit")]
    pub baseline_unit: i64,

    /// Narrative generation backend
    #[serde(default)]
    pub narrative: NarrativeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            output_dir: default_output_dir(),
            ramp_mode: RampMode::default(),
            default_useful_life: default_useful_life(),
            baseline_unit: default_baseline_unit(),
            narrative: NarrativeConfig::default(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a .kagawa.config.json file"
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load from `path`, or defaults when no file exists there"
    ///
    /// Only the given path is consulted. An existing file that fails to
    /// parse is an error.
    pub fn load_or_default<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_useful_life() -> i64 {
    DEFAULT_USEFUL_LIFE
}

fn default_baseline_unit() -> i64 {
    1000
}

/// @acp:summary "Narrative backend settings"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
            endpoint: default_endpoint(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}
