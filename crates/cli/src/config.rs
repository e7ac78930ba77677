//! Configuration loading.
//!
//! Values come from an optional TOML file, then from environment variables
//! (after `.env` has been loaded), which take precedence. The resolved
//! configuration is validated once; nothing downstream re-reads the
//! environment.

use std::path::Path;

use anyhow::Context;
use pipeline::ScoutError;
use serde::{Deserialize, Serialize};

/// File read when `--config` is not given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "scout.toml";

pub const DEFAULT_GOAL: &str = "Find posts where someone is looking to hire a web developer or needs help with a web project.";

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoutConfig {
    /// Goal used when `scout run` is given no `--goal`.
    pub goal: String,
    pub llm: LlmSection,
    pub search: SearchSection,
    pub enrichment: EnrichmentSection,
    pub tracker: TrackerSection,
    pub notifier: NotifierSection,
    pub retry: RetrySection,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            goal: DEFAULT_GOAL.to_string(),
            llm: LlmSection::default(),
            search: SearchSection::default(),
            enrichment: EnrichmentSection::default(),
            tracker: TrackerSection::default(),
            notifier: NotifierSection::default(),
            retry: RetrySection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub qualify_temperature: f32,
    pub draft_temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            qualify_temperature: nodes::DEFAULT_QUALIFY_TEMPERATURE,
            draft_temperature: nodes::DEFAULT_DRAFT_TEMPERATURE,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSection {
    pub url: String,
    pub collection: String,
    /// Embedding model; the chat model is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    pub top_k: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            collection: "opportunities".to_string(),
            embedding_model: None,
            top_k: search::DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentProviderKind {
    #[default]
    Hunter,
    Clearbit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichmentSection {
    pub provider: EnrichmentProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunter_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearbit_api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerProviderKind {
    #[default]
    Trello,
    Notion,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerSection {
    pub provider: TrackerProviderKind,
    /// Trello list id or Notion database id. Unset skips task creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trello_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trello_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifierSection {
    /// Discord channel id. Unset skips the notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord_bot_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        let defaults = nodes::RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            base_delay_ms: u64::try_from(defaults.base_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl RetrySection {
    pub fn to_retry_config(&self) -> nodes::RetryConfig {
        nodes::RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: std::time::Duration::from_millis(self.base_delay_ms),
        }
    }
}

impl ScoutConfig {
    /// Reads `path` (which must exist), or [`DEFAULT_CONFIG_FILE`] when it
    /// exists, applies the process environment and validates the result.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overrides file values with non-empty environment values.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("OLLAMA_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = var("OLLAMA_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = var("QDRANT_URL") {
            self.search.url = v;
        }
        if let Some(v) = var("QDRANT_COLLECTION_NAME") {
            self.search.collection = v;
        }

        set_if_present(&mut self.enrichment.hunter_api_key, var("HUNTER_API_KEY"));
        set_if_present(&mut self.enrichment.clearbit_api_key, var("CLEARBIT_API_KEY"));

        set_if_present(&mut self.tracker.trello_api_key, var("TRELLO_API_KEY"));
        set_if_present(&mut self.tracker.trello_token, var("TRELLO_TOKEN"));
        set_if_present(&mut self.tracker.notion_api_key, var("NOTION_API_KEY"));
        let destination_var = match self.tracker.provider {
            TrackerProviderKind::Trello => "TRELLO_LIST_ID",
            TrackerProviderKind::Notion => "NOTION_DATABASE_ID",
        };
        set_if_present(&mut self.tracker.destination, var(destination_var));

        set_if_present(&mut self.notifier.discord_bot_token, var("DISCORD_BOT_TOKEN"));
        set_if_present(&mut self.notifier.channel, var("DISCORD_CHANNEL_ID"));
    }

    /// Rejects configurations the pipeline cannot start with.
    pub fn validate(&self) -> Result<(), ScoutError> {
        let required = [
            ("goal", self.goal.as_str()),
            ("llm.base_url", self.llm.base_url.as_str()),
            ("llm.model", self.llm.model.as_str()),
            ("search.url", self.search.url.as_str()),
            ("search.collection", self.search.collection.as_str()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ScoutError::configuration(format!("{name} must not be empty")));
        }
        if self.search.embedding_model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(ScoutError::configuration(
                "search.embedding_model must not be empty when set",
            ));
        }
        if self.search.top_k == 0 {
            return Err(ScoutError::configuration("search.top_k must be at least 1"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ScoutError::configuration("llm.timeout_secs must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ScoutError::configuration("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }

    pub fn embedding_model(&self) -> &str {
        self.search
            .embedding_model
            .as_deref()
            .unwrap_or(&self.llm.model)
    }

    /// A copy with every credential replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for secret in [
            &mut copy.enrichment.hunter_api_key,
            &mut copy.enrichment.clearbit_api_key,
            &mut copy.tracker.trello_api_key,
            &mut copy.tracker.trello_token,
            &mut copy.tracker.notion_api_key,
            &mut copy.notifier.discord_bot_token,
        ] {
            if secret.is_some() {
                *secret = Some(REDACTED.to_string());
            }
        }
        copy
    }

    /// The redacted configuration as TOML.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&self.redacted())
    }
}

fn set_if_present(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}
