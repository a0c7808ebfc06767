//! Routes parsed actions to tools and turns their results into observations.

use super::action::{ActionKind, ParsedAction};
use super::transcript::Turn;
use crate::error::{DelveError, Result};
use crate::search::{stringify_results, SearchTool};
use std::sync::Arc;
use tracing::{info, warn};

/// Observation recorded when the model names an action no tool handles.
pub const INVALID_ACTION_OBSERVATION: &str = "Observation: Invalid action specified.";

/// Tool dispatcher for the ReAct loop. Search is the only tool.
pub struct ToolDispatcher {
    search: Arc<dyn SearchTool>,
}

impl ToolDispatcher {
    pub fn new(search: Arc<dyn SearchTool>) -> Self {
        Self { search }
    }

    /// Run the action and return the observation turn to append.
    ///
    /// Search failures propagate; unknown actions become an observation so
    /// the model can correct itself on the next turn.
    pub async fn dispatch(&self, action: &ParsedAction) -> Result<Turn> {
        match &action.kind {
            ActionKind::Search => {
                info!("Searching: {}", action.input);
                let results = self.search.search(&action.input).await?;
                Ok(Turn::Observation(format!(
                    "Observation: {}",
                    stringify_results(&results)
                )))
            }
            // Finish is intercepted by the termination policy before dispatch.
            ActionKind::Finish | ActionKind::Unrecognized(_) => {
                warn!(
                    "{}",
                    DelveError::InvalidActionSpecified(action.name().to_string())
                );
                Ok(Turn::Observation(INVALID_ACTION_OBSERVATION.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchResultItem;
    use crate::testing::StaticSearch;

    #[tokio::test]
    async fn test_search_dispatch() {
        let search = Arc::new(StaticSearch::new(vec![SearchResultItem::new(
            "Title",
            "https://example.com",
            "Body",
        )]));
        let dispatcher = ToolDispatcher::new(search.clone());

        let action = ParsedAction {
            kind: ActionKind::Search,
            input: "rust async".to_string(),
        };
        let turn = dispatcher.dispatch(&action).await.unwrap();

        assert_eq!(
            turn,
            Turn::Observation(
                r#"Observation: [{"title":"Title","url":"https://example.com","content":"Body"}]"#
                    .to_string()
            )
        );
        assert_eq!(search.queries(), vec!["rust async".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_action_is_observation() {
        let search = Arc::new(StaticSearch::new(Vec::new()));
        let dispatcher = ToolDispatcher::new(search.clone());

        let action = ParsedAction {
            kind: ActionKind::Unrecognized("Teleport".to_string()),
            input: "Mars".to_string(),
        };
        let turn = dispatcher.dispatch(&action).await.unwrap();

        assert_eq!(turn.text(), "Observation: Invalid action specified.");
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let search = Arc::new(StaticSearch::failing("rate limited"));
        let dispatcher = ToolDispatcher::new(search);

        let action = ParsedAction {
            kind: ActionKind::Search,
            input: "q".to_string(),
        };
        assert!(matches!(
            dispatcher.dispatch(&action).await,
            Err(DelveError::Search(_))
        ));
    }
}
