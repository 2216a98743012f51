//! @acp:module "Narrative Client"
//! @acp:summary "Injected text-generation capability and its HTTP backend"
//! @acp:domain subsidy
//! @acp:layer service

use serde::Deserialize;
use serde_json::json;

use super::extract::parse_json_response;
use super::prompt::{build_full_prompt, SYSTEM_PROMPT};
use super::NarrativeSections;
use crate::config::NarrativeConfig;
use crate::error::{Result, SubsidyError};
use crate::record::InputRecord;

const API_VERSION: &str = "2023-06-01";

/// @acp:summary "Anything that turns a system prompt and a user message into text"
pub trait NarrativeGenerator {
    fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

impl<F> NarrativeGenerator for F
where
    F: Fn(&str, &str) -> Result<String>,
{
    fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        self(system_prompt, user_message)
    }
}

/// @acp:summary "Blocking client for the messages API"
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(config: &NarrativeConfig, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key: api_key.into(),
        }
    }

    /// Read the API key from the environment variable named in config
    pub fn from_config(config: &NarrativeConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            SubsidyError::Narrative(format!("{} is not set", config.api_key_env))
        })?;
        Ok(Self::new(config, api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl NarrativeGenerator for AnthropicClient {
    fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system_prompt,
            "messages": [{"role": "user", "content": user_message}],
        });

        tracing::debug!("POST {} (model {})", self.endpoint, self.model);
        let response = ureq::post(&self.endpoint)
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", API_VERSION)
            .set("content-type", "application/json")
            .send_json(body)
            .map_err(|e| SubsidyError::Http(e.to_string()))?;

        let message: MessageResponse = response.into_json()?;
        first_text(message)
    }
}

fn first_text(message: MessageResponse) -> Result<String> {
    message
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .find_map(|block| block.text)
        .ok_or_else(|| SubsidyError::Narrative("response has no text content".to_string()))
}

/// @acp:summary "One generator call for all sections, then extraction"
pub fn generate_texts(
    record: &InputRecord,
    generator: &dyn NarrativeGenerator,
) -> Result<NarrativeSections> {
    let prompt = build_full_prompt(record)?;
    let response = generator.generate(SYSTEM_PROMPT, &prompt)?;
    let sections = parse_json_response(&response);
    if sections.is_empty() {
        tracing::warn!("Narrative response contained no recognized sections");
    } else {
        tracing::info!(
            "Extracted {} narrative sections ({} chars)",
            sections.len(),
            sections.total_chars()
        );
    }
    Ok(sections)
}
