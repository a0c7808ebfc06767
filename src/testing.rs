//! Scripted model and search doubles for unit tests.

use crate::error::{DelveError, Result};
use crate::llm::{LanguageModel, Prompt};
use crate::search::{SearchResultItem, SearchTool};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Model that replays canned responses in order and records every prompt.
///
/// Once the script is exhausted every further call returns `fallback`.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer with `response` forever after the script runs out.
    pub fn repeating(mut self, response: &str) -> Self {
        self.fallback = Some(response.to_string());
        self
    }

    /// Queue an error as the next scripted step.
    pub fn then_error(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(DelveError::OpenAI(message.to_string())));
        self
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(step), _) => step,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(DelveError::OpenAI("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Search tool returning the same results for every query.
pub struct StaticSearch {
    results: Vec<SearchResultItem>,
    failure: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(results: Vec<SearchResultItem>) -> Self {
        Self {
            results,
            failure: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            results: Vec::new(),
            failure: Some(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchTool for StaticSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.failure {
            Some(message) => Err(DelveError::Search(message.clone())),
            None => Ok(self.results.clone()),
        }
    }
}
