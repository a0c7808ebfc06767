//! Final report synthesis.

use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{LanguageModel, Prompt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Turns accumulated research into a written report with a single model call.
pub struct ReportSynthesizer {
    model: Arc<dyn LanguageModel>,
    prompts: Arc<Prompts>,
    system: String,
    user: String,
    question_var: &'static str,
    research_var: &'static str,
}

impl ReportSynthesizer {
    /// Synthesizer fed with a ReAct transcript.
    pub fn for_react(model: Arc<dyn LanguageModel>, prompts: Arc<Prompts>) -> Self {
        Self {
            system: prompts.react.report_system.clone(),
            user: prompts.react.report_user.clone(),
            model,
            prompts,
            question_var: "question",
            research_var: "research_summary",
        }
    }

    /// Synthesizer fed with numbered search results.
    pub fn for_zeroshot(model: Arc<dyn LanguageModel>, prompts: Arc<Prompts>) -> Self {
        Self {
            system: prompts.zeroshot.report_system.clone(),
            user: prompts.zeroshot.report_user.clone(),
            model,
            prompts,
            question_var: "topic",
            research_var: "search_results",
        }
    }

    /// Render the synthesis prompt.
    pub fn prompt(&self, question: &str, research: &str) -> Prompt {
        let mut vars = HashMap::new();
        vars.insert(self.question_var.to_string(), question.to_string());
        vars.insert(self.research_var.to_string(), research.to_string());

        Prompt::with_system(
            self.prompts.render_with_custom(&self.system, &vars),
            self.prompts.render_with_custom(&self.user, &vars),
        )
    }

    /// Write the report. Not retried; a model failure fails the run.
    #[instrument(skip(self, research), fields(research_len = research.len()))]
    pub async fn synthesize(&self, question: &str, research: &str) -> Result<String> {
        info!("Synthesizing final report");
        self.model.complete(&self.prompt(question, research)).await
    }
}
