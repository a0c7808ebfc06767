//! Research strategies and the static registry that resolves them by name.

use crate::agent::ReactAgent;
use crate::config::{AgentSettings, Prompts};
use crate::error::{DelveError, Result};
use crate::llm::LanguageModel;
use crate::search::SearchTool;
use crate::zeroshot::ZeroshotResearcher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Final result of one research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOutput {
    /// The synthesized report (markdown).
    pub report: String,
    pub metadata: ResearchMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchMetadata {
    /// Name of the strategy that produced the report.
    pub strategy: String,
    /// Number of search actions taken.
    pub search_count: usize,
    /// Model turns in the reasoning loop, for iterative strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    pub completed_at: DateTime<Utc>,
}

/// A self-contained procedure mapping a topic to a report.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, topic: &str) -> Result<ResearchOutput>;
}

/// Shared handles a strategy is built from.
#[derive(Clone)]
pub struct StrategyContext {
    pub model: Arc<dyn LanguageModel>,
    pub search: Arc<dyn SearchTool>,
    pub prompts: Arc<Prompts>,
    pub agent: AgentSettings,
}

pub type StrategyConstructor = fn(&StrategyContext) -> Box<dyn Strategy>;

struct RegistryEntry {
    description: &'static str,
    constructor: StrategyConstructor,
}

/// Maps strategy names to constructors. Populated once at startup.
pub struct StrategyRegistry {
    entries: BTreeMap<&'static str, RegistryEntry>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in strategies.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            "react",
            "Iterative Thought/Action/Observation loop, then a synthesized report",
            build_react,
        );
        registry.register(
            "zeroshot",
            "Generate search queries once, run them all, then write the report",
            build_zeroshot,
        );
        registry
    }

    pub fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        constructor: StrategyConstructor,
    ) {
        self.entries.insert(
            name,
            RegistryEntry {
                description,
                constructor,
            },
        );
    }

    /// Registered names with their descriptions, sorted by name.
    pub fn describe(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().map(|(name, e)| (*name, e.description))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Build the named strategy. Names match case-insensitively.
    pub fn build(&self, name: &str, ctx: &StrategyContext) -> Result<Box<dyn Strategy>> {
        let entry = self
            .lookup(name)
            .ok_or_else(|| DelveError::StrategyNotFound(name.to_string()))?;
        Ok((entry.constructor)(ctx))
    }

    fn lookup(&self, name: &str) -> Option<&RegistryEntry> {
        let key = name.trim().to_lowercase();
        self.entries.get(key.as_str())
    }
}

fn build_react(ctx: &StrategyContext) -> Box<dyn Strategy> {
    Box::new(ReactAgent::from_context(ctx))
}

fn build_zeroshot(ctx: &StrategyContext) -> Box<dyn Strategy> {
    Box::new(ZeroshotResearcher::from_context(ctx))
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
