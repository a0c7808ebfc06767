//! Tavily search API client.

use super::{SearchResultItem, SearchTool};
use crate::config::SearchSettings;
use crate::error::{DelveError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Search tool backed by `POST {base_url}/search`.
pub struct TavilySearch {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    max_results: u32,
    search_depth: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResultItem>,
}

impl TavilySearch {
    /// Create a client from settings, reading the key from the configured env var.
    pub fn from_settings(settings: &SearchSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).unwrap_or_default();
        Self::new(settings, api_key)
    }

    /// Create a client with an explicit API key.
    pub fn new(settings: &SearchSettings, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| DelveError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results: settings.max_results,
            search_depth: settings.search_depth.clone(),
        })
    }
}

#[async_trait]
impl SearchTool for TavilySearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
            search_depth: &self.search_depth,
        };

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DelveError::Search(format!(
                "Tavily returned {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        debug!("Search returned {} results", parsed.results.len());
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> SearchSettings {
        SearchSettings {
            base_url: server.uri(),
            max_results: 3,
            ..SearchSettings::default()
        }
    }

    #[tokio::test]
    async fn test_search_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(serde_json::json!({
                "query": "printing press",
                "max_results": 3,
                "api_key": "tvly-test"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": "printing press",
                "results": [
                    {"title": "Gutenberg", "url": "https://example.com/g", "content": "Movable type", "score": 0.9},
                    {"url": "https://example.com/h"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = TavilySearch::new(&settings_for(&server), "tvly-test".to_string()).unwrap();
        let results = tool.search("printing press").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.as_deref(), Some("Gutenberg"));
        assert_eq!(results[1].title, None);
        assert_eq!(results[1].content_or_default(), "No content available.");
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let tool = TavilySearch::new(&settings_for(&server), "bad".to_string()).unwrap();
        let err = tool.search("anything").await.unwrap_err();

        match err {
            DelveError::Search(msg) => assert!(msg.contains("401")),
            other => panic!("Expected Search error, got {:?}", other),
        }
    }
}
