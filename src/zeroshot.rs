//! Zero-shot research strategy.
//!
//! One pass: ask the model for a list of search queries, run them all,
//! number the results, and write the report from them.

use crate::config::Prompts;
use crate::error::{DelveError, Result};
use crate::llm::{LanguageModel, Prompt};
use crate::report::ReportSynthesizer;
use crate::search::{format_result_sets, SearchTool};
use crate::strategy::{ResearchMetadata, ResearchOutput, Strategy, StrategyContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Format instructions appended to the query generation prompt.
pub const QUERY_FORMAT_INSTRUCTIONS: &str = r#"Respond with a single JSON object that conforms to the schema below, and nothing else.

{"type": "object", "properties": {"queries": {"type": "array", "items": {"type": "string"}, "description": "Web search queries"}}, "required": ["queries"]}

Example: {"queries": ["first search query", "second search query"]}"#;

/// Search queries produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryList {
    pub queries: Vec<String>,
}

impl QueryList {
    /// Parse and validate a model response.
    ///
    /// Tolerates prose or code fences around the JSON object. Every query is
    /// trimmed; the list must be non-empty and contain no blank entries.
    pub fn parse(response: &str) -> std::result::Result<Self, String> {
        let json_start = response.find('{');
        let json_end = response.rfind('}');

        let json_str = match (json_start, json_end) {
            (Some(start), Some(end)) if end > start => &response[start..=end],
            _ => response,
        };

        let mut list: QueryList = serde_json::from_str(json_str).map_err(|e| {
            format!(
                "{}. Response was: {}",
                e,
                response.chars().take(300).collect::<String>()
            )
        })?;

        if list.queries.is_empty() {
            return Err("query list is empty".to_string());
        }
        for query in list.queries.iter_mut() {
            *query = query.trim().to_string();
            if query.is_empty() {
                return Err("query list contains a blank query".to_string());
            }
        }

        Ok(list)
    }
}

/// Zero-shot research strategy.
pub struct ZeroshotResearcher {
    model: Arc<dyn LanguageModel>,
    search: Arc<dyn SearchTool>,
    prompts: Arc<Prompts>,
    synthesizer: ReportSynthesizer,
    query_attempts: usize,
}

impl ZeroshotResearcher {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchTool>,
        prompts: Arc<Prompts>,
    ) -> Self {
        Self {
            synthesizer: ReportSynthesizer::for_zeroshot(model.clone(), prompts.clone()),
            model,
            search,
            prompts,
            query_attempts: 3,
        }
    }

    pub fn from_context(ctx: &StrategyContext) -> Self {
        Self::new(ctx.model.clone(), ctx.search.clone(), ctx.prompts.clone())
            .with_query_attempts(ctx.agent.query_attempts)
    }

    /// Set how many times query generation may be attempted.
    pub fn with_query_attempts(mut self, attempts: usize) -> Self {
        self.query_attempts = attempts.max(1);
        self
    }

    fn query_prompt(&self, topic: &str) -> Prompt {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic.to_string());
        vars.insert(
            "format_instructions".to_string(),
            QUERY_FORMAT_INSTRUCTIONS.to_string(),
        );
        Prompt::user(
            self.prompts
                .render_with_custom(&self.prompts.zeroshot.queries, &vars),
        )
    }

    /// Ask the model for search queries, retrying responses that fail validation.
    ///
    /// Model call errors are returned immediately.
    pub async fn generate_queries(&self, topic: &str) -> Result<QueryList> {
        let prompt = self.query_prompt(topic);
        let mut last_reason = String::new();

        for attempt in 1..=self.query_attempts {
            let response = self.model.complete(&prompt).await?;
            match QueryList::parse(&response) {
                Ok(list) => {
                    debug!("Generated queries on attempt {}: {:?}", attempt, list.queries);
                    return Ok(list);
                }
                Err(reason) => {
                    warn!(
                        "Query list failed validation (attempt {}/{}): {}",
                        attempt, self.query_attempts, reason
                    );
                    last_reason = reason;
                }
            }
        }

        Err(DelveError::StructuredOutputValidation {
            attempts: self.query_attempts,
            reason: last_reason,
        })
    }
}

#[async_trait]
impl Strategy for ZeroshotResearcher {
    fn name(&self) -> &'static str {
        "zeroshot"
    }

    #[instrument(skip(self), fields(strategy = "zeroshot", model = %self.model.name()))]
    async fn run(&self, topic: &str) -> Result<ResearchOutput> {
        let list = self.generate_queries(topic).await?;
        info!("Running {} search queries", list.queries.len());

        // Queries run concurrently; results keep the query order.
        let result_sets = futures::future::try_join_all(
            list.queries.iter().map(|query| self.search.search(query)),
        )
        .await?;

        let search_results = format_result_sets(&result_sets);
        let report = self.synthesizer.synthesize(topic, &search_results).await?;

        Ok(ResearchOutput {
            report,
            metadata: ResearchMetadata {
                strategy: self.name().to_string(),
                search_count: list.queries.len(),
                iterations: None,
                completed_at: chrono::Utc::now(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchResultItem;
    use crate::testing::{ScriptedModel, StaticSearch};

    fn researcher(model: Arc<ScriptedModel>, search: Arc<StaticSearch>) -> ZeroshotResearcher {
        ZeroshotResearcher::new(model, search, Arc::new(Prompts::default()))
    }

    #[test]
    fn test_parse_plain_json() {
        let list = QueryList::parse(r#"{"queries": [" tides ", "moon gravity"]}"#).unwrap();
        assert_eq!(list.queries, vec!["tides", "moon gravity"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let response = "Here you go:\n```json\n{\"queries\": [\"a\", \"b\"]}\n```";
        assert_eq!(QueryList::parse(response).unwrap().queries.len(), 2);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(QueryList::parse("I would search for tides.").is_err());
        assert!(QueryList::parse(r#"{"queries": []}"#).is_err());
        assert!(QueryList::parse(r#"{"queries": ["ok", "   "]}"#).is_err());
        assert!(QueryList::parse(r#"{"terms": ["a"]}"#).is_err());
    }

    #[tokio::test]
    async fn test_results_numbered_across_queries() {
        let model = Arc::new(ScriptedModel::new([
            r#"{"queries": ["tides", "moon"]}"#,
            "# Tides report",
        ]));
        let search = Arc::new(StaticSearch::new(vec![SearchResultItem::new(
            "Tides",
            "https://example.com/tides",
            "The moon pulls the oceans.",
        )]));

        let output = researcher(model.clone(), search.clone())
            .run("What causes tides?")
            .await
            .unwrap();

        assert_eq!(output.report, "# Tides report");
        assert_eq!(output.metadata.search_count, 2);
        assert_eq!(output.metadata.iterations, None);

        let mut queries = search.queries();
        queries.sort();
        assert_eq!(queries, vec!["moon".to_string(), "tides".to_string()]);

        let synthesis = &model.prompts()[1].user;
        assert!(synthesis.contains("Result 1:\nTitle: Tides"));
        assert!(synthesis.contains("Result 2:\nTitle: Tides"));
        assert!(!synthesis.contains("Result 3:"));
    }

    #[tokio::test]
    async fn test_query_prompt_contains_instructions() {
        let model = Arc::new(ScriptedModel::new([r#"{"queries": ["q"]}"#, "report"]));
        let search = Arc::new(StaticSearch::new(Vec::new()));

        researcher(model.clone(), search).run("Solar sails").await.unwrap();

        let first = &model.prompts()[0];
        assert!(first.user.contains("Research topic: Solar sails"));
        assert!(first.user.contains("\"required\": [\"queries\"]"));
    }

    #[tokio::test]
    async fn test_retries_until_valid() {
        let model = Arc::new(ScriptedModel::new([
            "Sure! Here are some queries: tides, moon",
            r#"{"queries": []}"#,
            r#"{"queries": ["tides"]}"#,
        ]));
        let list = researcher(model.clone(), Arc::new(StaticSearch::new(Vec::new())))
            .generate_queries("tides")
            .await
            .unwrap();

        assert_eq!(list.queries, vec!["tides"]);
        assert_eq!(model.call_count(), 3);
        // Every attempt uses the same prompt.
        let prompts = model.prompts();
        assert_eq!(prompts[0], prompts[2]);
    }

    #[tokio::test]
    async fn test_gives_up_after_attempts() {
        let model = Arc::new(ScriptedModel::new(Vec::<String>::new()).repeating("not json"));
        let search = Arc::new(StaticSearch::new(Vec::new()));

        let err = researcher(model.clone(), search.clone())
            .run("tides")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DelveError::StructuredOutputValidation { attempts: 3, .. }
        ));
        assert_eq!(model.call_count(), 3);
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_model_error_not_retried() {
        let model = Arc::new(ScriptedModel::new(Vec::<String>::new()).then_error("timeout"));
        let err = researcher(model.clone(), Arc::new(StaticSearch::new(Vec::new())))
            .generate_queries("tides")
            .await
            .unwrap_err();

        assert!(matches!(err, DelveError::OpenAI(_)));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_search_failure_fails_run() {
        let model = Arc::new(ScriptedModel::new([r#"{"queries": ["a"]}"#, "report"]));
        let err = researcher(model, Arc::new(StaticSearch::failing("down")))
            .run("tides")
            .await
            .unwrap_err();
        assert!(matches!(err, DelveError::Search(_)));
    }
}
