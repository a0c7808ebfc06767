//! Configuration settings for Delve.

use crate::error::{DelveError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub model: ModelSettings,
    pub search: SearchSettings,
    pub agent: AgentSettings,
    pub batch: BatchSettings,
    pub prompts: PromptSettings,
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Chat model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// OpenAI-compatible API base URL. Defaults to the OpenAI API.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Web search provider type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    /// Tavily search API.
    #[default]
    Tavily,
}

impl std::str::FromStr for SearchProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tavily" => Ok(SearchProvider::Tavily),
            _ => Err(format!("Unknown search provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchProvider::Tavily => write!(f, "tavily"),
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub provider: SearchProvider,
    /// Base URL of the search API.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Maximum results returned per query.
    pub max_results: u32,
    /// Search depth (basic, advanced).
    pub search_depth: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: SearchProvider::Tavily,
            base_url: "https://api.tavily.com".to_string(),
            api_key_env: "TAVILY_API_KEY".to_string(),
            max_results: 5,
            search_depth: "basic".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Research agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Strategy used when none is given on the command line.
    pub strategy: String,
    /// Maximum model turns in the ReAct loop.
    pub max_iterations: usize,
    /// Attempts allowed for structured query generation (zeroshot).
    pub query_attempts: usize,
    /// Wall-clock limit for one topic, in seconds. No limit when unset.
    pub run_timeout_secs: Option<u64>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            strategy: "react".to_string(),
            max_iterations: 10,
            query_attempts: 3,
            run_timeout_secs: None,
        }
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// JSONL file with `{"id": ..., "prompt": ...}` records.
    pub input: String,
    /// Directory receiving `<strategy>.jsonl` output files.
    pub output_dir: String,
    /// Number of topics researched at the same time.
    pub concurrency: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            input: "query.jsonl".to_string(),
            output_dir: "outputs".to_string(),
            concurrency: 1,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DelveError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("delve")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded batch input path.
    pub fn batch_input(&self) -> PathBuf {
        Self::expand_path(&self.batch.input)
    }

    /// Get the expanded batch output directory.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.batch.output_dir)
    }

    /// Check values that deserialize fine but cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_iterations == 0 {
            return Err(DelveError::Config(
                "agent.max_iterations must be at least 1".to_string(),
            ));
        }
        if self.agent.query_attempts == 0 {
            return Err(DelveError::Config(
                "agent.query_attempts must be at least 1".to_string(),
            ));
        }
        if self.agent.run_timeout_secs == Some(0) {
            return Err(DelveError::Config(
                "agent.run_timeout_secs must be at least 1 when set".to_string(),
            ));
        }
        if self.batch.concurrency == 0 {
            return Err(DelveError::Config(
                "batch.concurrency must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.search.base_url).map_err(|e| {
            DelveError::Config(format!("search.base_url is not a valid URL: {}", e))
        })?;
        if let Some(base) = self.model.api_base.as_deref().filter(|b| !b.is_empty()) {
            url::Url::parse(base).map_err(|e| {
                DelveError::Config(format!("model.api_base is not a valid URL: {}", e))
            })?;
        }
        Ok(())
    }

    /// Return a copy with a dotted key (e.g. "agent.max_iterations") set.
    ///
    /// The value is read as a TOML literal when possible (numbers, booleans)
    /// and as a plain string otherwise.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self> {
        let mut root = toml::Value::try_from(self).map_err(|e| DelveError::Config(e.to_string()))?;

        let parsed = toml::from_str::<toml::Table>(&format!("v = {}", value))
            .ok()
            .and_then(|mut t| t.remove("v"))
            .unwrap_or_else(|| toml::Value::String(value.to_string()));

        let mut parts = key.split('.').peekable();
        let mut current = &mut root;
        while let Some(part) = parts.next() {
            let table = current
                .as_table_mut()
                .ok_or_else(|| DelveError::Config(format!("Unknown config key: {}", key)))?;
            if parts.peek().is_none() {
                // Optional keys are absent from the serialized table until set.
                table.insert(part.to_string(), parsed);
                break;
            }
            current = table
                .get_mut(part)
                .ok_or_else(|| DelveError::Config(format!("Unknown config key: {}", key)))?;
        }

        let updated: Settings = root
            .try_into()
            .map_err(|e: toml::de::Error| DelveError::Config(format!("Invalid value for {}: {}", key, e)))?;

        // Keys serde does not know are dropped on the way back in.
        let roundtrip =
            toml::Value::try_from(&updated).map_err(|e| DelveError::Config(e.to_string()))?;
        let known = key
            .split('.')
            .try_fold(&roundtrip, |value, part| value.get(part))
            .is_some();
        if !known {
            return Err(DelveError::Config(format!("Unknown config key: {}", key)));
        }

        updated.validate()?;
        Ok(updated)
    }
}
