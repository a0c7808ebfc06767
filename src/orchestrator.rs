//! Pipeline orchestrator for Delve.
//!
//! Wires the model and search clients into a strategy and runs one topic.

use crate::config::{Prompts, Settings};
use crate::error::{DelveError, Result};
use crate::llm::{LanguageModel, OpenAIModel};
use crate::search::{create_search_tool, SearchTool};
use crate::strategy::{ResearchOutput, Strategy, StrategyContext, StrategyRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// The main orchestrator for the Delve pipeline.
///
/// Holds the shared, read-only model and search handles; every call to
/// [`Orchestrator::run_pipeline`] builds a fresh strategy so runs share no state.
pub struct Orchestrator {
    settings: Settings,
    context: StrategyContext,
    registry: StrategyRegistry,
}

impl Orchestrator {
    /// Create a new orchestrator from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let model: Arc<dyn LanguageModel> = Arc::new(OpenAIModel::from_settings(&settings.model)?);
        let search = create_search_tool(&settings.search)?;

        info!(
            "Using model {} with {} search",
            settings.model.model, settings.search.provider
        );

        Ok(Self::with_components(settings, prompts, model, search))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        model: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchTool>,
    ) -> Self {
        let context = StrategyContext {
            model,
            search,
            prompts: Arc::new(prompts),
            agent: settings.agent.clone(),
        };

        Self {
            settings,
            context,
            registry: StrategyRegistry::builtin(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Resolve a strategy by name.
    pub fn strategy(&self, name: &str) -> Result<Box<dyn Strategy>> {
        self.registry.build(name, &self.context)
    }

    /// Research one topic with the named strategy.
    ///
    /// The strategy is resolved before any model or search call. When
    /// `agent.run_timeout_secs` is set the whole run is abandoned on expiry.
    #[instrument(skip(self), fields(run_id = %uuid::Uuid::new_v4()))]
    pub async fn run_pipeline(&self, topic: &str, strategy_name: &str) -> Result<ResearchOutput> {
        let strategy = self.strategy(strategy_name)?;
        info!("Starting research with '{}' strategy", strategy.name());

        let run = strategy.run(topic);
        let output = match self.settings.agent.run_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
                .await
                .map_err(|_| DelveError::Timeout(secs))??,
            None => run.await?,
        };

        info!(
            "Research finished ({} searches, {} chars)",
            output.metadata.search_count,
            output.report.len()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchResultItem;
    use crate::testing::{ScriptedModel, StaticSearch};

    fn orchestrator(model: Arc<ScriptedModel>, settings: Settings) -> Orchestrator {
        let search = Arc::new(StaticSearch::new(vec![SearchResultItem::new(
            "t",
            "https://example.com",
            "c",
        )]));
        Orchestrator::with_components(settings, Prompts::default(), model, search)
    }

    #[tokio::test]
    async fn test_unknown_strategy_makes_no_calls() {
        let model = Arc::new(ScriptedModel::new(["unused"]));
        let orchestrator = orchestrator(model.clone(), Settings::default());

        let err = orchestrator.run_pipeline("topic", "mcts").await.unwrap_err();
        assert!(matches!(err, DelveError::StrategyNotFound(_)));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_runs_selected_strategy() {
        let model = Arc::new(ScriptedModel::new([
            "Thought: t\nAction: Finish\nAction Input: nothing needed",
            "report",
        ]));
        let orchestrator = orchestrator(model, Settings::default());

        let output = orchestrator.run_pipeline("topic", "react").await.unwrap();
        assert_eq!(output.report, "report");
        assert_eq!(output.metadata.iterations, Some(1));
    }

    #[tokio::test]
    async fn test_agent_settings_reach_strategy() {
        let mut settings = Settings::default();
        settings.agent.max_iterations = 2;
        let model = Arc::new(
            ScriptedModel::new(Vec::<String>::new())
                .repeating("Thought: t\nAction: Search\nAction Input: q"),
        );
        let orchestrator = orchestrator(model, settings);

        let output = orchestrator.run_pipeline("topic", "react").await.unwrap();
        assert_eq!(output.metadata.iterations, Some(2));
    }

    #[tokio::test]
    async fn test_timeout() {
        struct SlowModel;

        #[async_trait::async_trait]
        impl LanguageModel for SlowModel {
            async fn complete(&self, _prompt: &crate::llm::Prompt) -> Result<String> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(String::new())
            }

            fn name(&self) -> &str {
                "slow"
            }
        }

        let mut settings = Settings::default();
        settings.agent.run_timeout_secs = Some(1);
        let orchestrator = Orchestrator::with_components(
            settings,
            Prompts::default(),
            Arc::new(SlowModel),
            Arc::new(StaticSearch::new(Vec::new())),
        );

        let err = orchestrator.run_pipeline("topic", "react").await.unwrap_err();
        assert!(matches!(err, DelveError::Timeout(1)));
    }
}
