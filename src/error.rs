//! Error types for Delve.

use thiserror::Error;

/// Library-level error type for Delve operations.
#[derive(Error, Debug)]
pub enum DelveError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model produced a turn without a parsable `Action:`/`Action Input:` pair.
    #[error("Invalid agent output: {0}")]
    InvalidAgentOutput(String),

    /// The model named an action that no tool handles. The ReAct loop turns
    /// this into an observation instead of failing the run.
    #[error("Invalid action specified: {0}")]
    InvalidActionSpecified(String),

    #[error("Structured output failed validation after {attempts} attempt(s): {reason}")]
    StructuredOutputValidation { attempts: usize, reason: String },

    #[error("Strategy not found: {0}. Run 'delve strategies' to list the available ones.")]
    StrategyNotFound(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Research run timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Delve operations.
pub type Result<T> = std::result::Result<T, DelveError>;
