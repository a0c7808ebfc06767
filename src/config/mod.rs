//! Configuration module for Delve.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, ReactPrompts, ZeroshotPrompts};
pub use settings::{
    AgentSettings, BatchSettings, ModelSettings, PromptSettings, SearchProvider, SearchSettings,
    Settings,
};
