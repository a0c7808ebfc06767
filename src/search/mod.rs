//! Web search abstraction and result formatting.

mod tavily;

pub use tavily::TavilySearch;

use crate::config::{SearchProvider, SearchSettings};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

const MISSING_FIELD: &str = "N/A";
const MISSING_CONTENT: &str = "No content available.";

/// One hit returned by a search query. Providers may omit any field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SearchResultItem {
    pub fn new(title: &str, url: &str, content: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            content: Some(content.to_string()),
        }
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(MISSING_FIELD)
    }

    pub fn url_or_default(&self) -> &str {
        self.url.as_deref().unwrap_or(MISSING_FIELD)
    }

    pub fn content_or_default(&self) -> &str {
        self.content.as_deref().unwrap_or(MISSING_CONTENT)
    }
}

/// Trait for web search providers.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Run one query and return its results in ranking order.
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>>;
}

/// Create the search tool selected in settings.
pub fn create_search_tool(settings: &SearchSettings) -> Result<Arc<dyn SearchTool>> {
    match settings.provider {
        SearchProvider::Tavily => Ok(Arc::new(TavilySearch::from_settings(settings)?)),
    }
}

/// Stringify the results of one query for a ReAct observation.
pub fn stringify_results(results: &[SearchResultItem]) -> String {
    serde_json::to_string(results).unwrap_or_else(|e| {
        warn!("Failed to serialize {} search result(s): {}", results.len(), e);
        "[]".to_string()
    })
}

/// Flatten the results of several queries into one numbered text block.
///
/// Numbering runs across all queries, starting at 1.
pub fn format_result_sets(result_sets: &[Vec<SearchResultItem>]) -> String {
    result_sets
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Result {}:\nTitle: {}\nURL: {}\nContent: {}",
                i + 1,
                r.title_or_default(),
                r.url_or_default(),
                r.content_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_spans_queries() {
        let sets = vec![
            vec![SearchResultItem::new("First", "https://a.example", "alpha")],
            vec![SearchResultItem::new("Second", "https://b.example", "beta")],
        ];

        let text = format_result_sets(&sets);
        assert_eq!(
            text,
            "Result 1:\nTitle: First\nURL: https://a.example\nContent: alpha\
             \n\n---\n\n\
             Result 2:\nTitle: Second\nURL: https://b.example\nContent: beta"
        );
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let sets = vec![vec![SearchResultItem::default()]];
        let text = format_result_sets(&sets);
        assert!(text.contains("Title: N/A"));
        assert!(text.contains("URL: N/A"));
        assert!(text.contains("Content: No content available."));
    }

    #[test]
    fn test_empty_sets() {
        assert_eq!(format_result_sets(&[]), "");
        assert_eq!(format_result_sets(&[vec![], vec![]]), "");
    }

    #[test]
    fn test_stringify_results() {
        let results = vec![SearchResultItem {
            title: Some("T".to_string()),
            url: None,
            content: Some("C".to_string()),
        }];
        assert_eq!(stringify_results(&results), r#"[{"title":"T","content":"C"}]"#);
        assert_eq!(stringify_results(&[]), "[]");
    }
}
