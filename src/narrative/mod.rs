//! @acp:module "Narrative Sections"
//! @acp:summary "The ten free-text sections of the business plan"
//! @acp:domain subsidy
//! @acp:layer model
//!
//! Narrative text is produced by an external generator and consumed as opaque
//! text. This module owns the fixed key set, prompt assembly, response
//! extraction and the injected generation capability.
//!
//! ```rust,ignore
//! use kagawa_mirai::narrative::{generate_texts, NarrativeGenerator};
//!
//! let stub = |_system: &str, _user: &str| -> kagawa_mirai::Result<String> {
//!     Ok(r#"{"section_2_1": "創業50年の製麺所である。"}"#.to_string())
//! };
//! let texts = generate_texts(&record, &stub)?;
//! let record = record.with_generated_texts(texts);
//! ```

pub mod client;
pub mod extract;
pub mod prompt;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub use client::{generate_texts, AnthropicClient, NarrativeGenerator};
pub use extract::parse_json_response;
pub use prompt::{build_full_prompt, SYSTEM_PROMPT};

/// @acp:summary "Recognized narrative section keys, in document order"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionKey {
    #[serde(rename = "section_2_1")]
    History,
    #[serde(rename = "section_2_2")]
    PriceImpact,
    #[serde(rename = "section_3_1")]
    ProjectContent,
    #[serde(rename = "section_3_2")]
    WagePlan,
    #[serde(rename = "section_4_1")]
    AddedValue,
    #[serde(rename = "section_4_2")]
    WageDetail,
    #[serde(rename = "section_4_3")]
    Sustainability,
    #[serde(rename = "section_4_4")]
    Effectiveness,
    #[serde(rename = "section_4_5")]
    Spillover,
    #[serde(rename = "section_4_6")]
    Other,
}

impl SectionKey {
    pub fn all() -> &'static [SectionKey] {
        &[
            SectionKey::History,
            SectionKey::PriceImpact,
            SectionKey::ProjectContent,
            SectionKey::WagePlan,
            SectionKey::AddedValue,
            SectionKey::WageDetail,
            SectionKey::Sustainability,
            SectionKey::Effectiveness,
            SectionKey::Spillover,
            SectionKey::Other,
        ]
    }

    /// Wire key, e.g. `section_2_1`
    pub fn key(&self) -> &'static str {
        match self {
            SectionKey::History => "section_2_1",
            SectionKey::PriceImpact => "section_2_2",
            SectionKey::ProjectContent => "section_3_1",
            SectionKey::WagePlan => "section_3_2",
            SectionKey::AddedValue => "section_4_1",
            SectionKey::WageDetail => "section_4_2",
            SectionKey::Sustainability => "section_4_3",
            SectionKey::Effectiveness => "section_4_4",
            SectionKey::Spillover => "section_4_5",
            SectionKey::Other => "section_4_6",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKey::History => "会社の沿革・既存事業",
            SectionKey::PriceImpact => "物価高騰の影響",
            SectionKey::ProjectContent => "事業の内容",
            SectionKey::WagePlan => "賃上げ計画",
            SectionKey::AddedValue => "付加価値額の増加",
            SectionKey::WageDetail => "賃上げの内容",
            SectionKey::Sustainability => "持続性",
            SectionKey::Effectiveness => "有効性",
            SectionKey::Spillover => "波及性",
            SectionKey::Other => "その他",
        }
    }

    /// Target length in characters; shown to the user, never enforced
    pub fn target_chars(&self) -> usize {
        match self {
            SectionKey::History | SectionKey::PriceImpact => 400,
            SectionKey::ProjectContent => 500,
            SectionKey::WagePlan => 200,
            SectionKey::AddedValue => 300,
            SectionKey::WageDetail | SectionKey::Other => 100,
            SectionKey::Sustainability | SectionKey::Effectiveness | SectionKey::Spillover => 150,
        }
    }

    pub fn from_key(key: &str) -> Option<SectionKey> {
        SectionKey::all().iter().copied().find(|k| k.key() == key)
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// @acp:summary "Generated text per recognized section"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NarrativeSections(BTreeMap<SectionKey, String>);

impl NarrativeSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep string values of recognized keys, drop everything else
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut sections = Self::new();
        for (key, value) in object {
            match (SectionKey::from_key(key), value.as_str()) {
                (Some(section), Some(text)) => {
                    sections.insert(section, text);
                }
                (None, _) => tracing::debug!("Dropping unrecognized narrative key: {}", key),
                (Some(_), None) => tracing::debug!("Dropping non-text narrative value for {}", key),
            }
        }
        sections
    }

    pub fn insert(&mut self, key: SectionKey, text: impl Into<String>) {
        self.0.insert(key, text.into());
    }

    pub fn get(&self, key: SectionKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: SectionKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Character count across all sections
    pub fn total_chars(&self) -> usize {
        self.0.values().map(|v| v.chars().count()).sum()
    }
}

impl<'de> Deserialize<'de> for NarrativeSections {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
        Ok(raw.map(|object| Self::from_json_object(&object)).unwrap_or_default())
    }
}
