//! ReAct research loop.
//!
//! The loop alternates model turns and observations until the termination
//! policy ends it, then hands the transcript to the report synthesizer:
//!
//! ```text
//! Running ──(model turn, continue)──> parse ─> dispatch ─> observation ─> Running
//!    └────(model turn, end)──────────> Synthesizing ─> Done
//! ```

use super::action::{parse_action, ActionKind};
use super::dispatch::ToolDispatcher;
use super::termination::{Decision, FinishReason, TerminationPolicy};
use super::transcript::{Transcript, Turn};
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{LanguageModel, Prompt};
use crate::report::ReportSynthesizer;
use crate::strategy::{ResearchMetadata, ResearchOutput, Strategy, StrategyContext};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Mutable state of one run. Never shared between runs.
#[derive(Debug)]
pub struct LoopState {
    question: String,
    transcript: Transcript,
    iterations: usize,
    report: Option<String>,
}

impl LoopState {
    pub fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            transcript: Transcript::new(),
            iterations: 0,
            report: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    /// Model turns whose action is `Search`, including one the cap cut off.
    pub fn search_count(&self) -> usize {
        self.transcript
            .model_turns()
            .filter(|text| matches!(parse_action(text), Ok(a) if a.kind == ActionKind::Search))
            .count()
    }

    fn record_model_turn(&mut self, text: String) {
        self.transcript.append(Turn::Model(text));
        self.iterations += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Synthesizing(FinishReason),
    Done,
}

/// ReAct research strategy.
pub struct ReactAgent {
    model: Arc<dyn LanguageModel>,
    prompts: Arc<Prompts>,
    dispatcher: ToolDispatcher,
    policy: TerminationPolicy,
    synthesizer: ReportSynthesizer,
}

impl ReactAgent {
    /// Create an agent with the default iteration cap.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        dispatcher: ToolDispatcher,
        prompts: Arc<Prompts>,
    ) -> Self {
        Self {
            synthesizer: ReportSynthesizer::for_react(model.clone(), prompts.clone()),
            model,
            prompts,
            dispatcher,
            policy: TerminationPolicy::default(),
        }
    }

    pub fn from_context(ctx: &StrategyContext) -> Self {
        Self::new(
            ctx.model.clone(),
            ToolDispatcher::new(ctx.search.clone()),
            ctx.prompts.clone(),
        )
        .with_max_iterations(ctx.agent.max_iterations)
    }

    /// Set maximum model turns for the loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.policy = TerminationPolicy::new(max);
        self
    }

    /// Render the per-turn prompt from the question and the transcript so far.
    pub fn agent_prompt(&self, state: &LoopState) -> Prompt {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), state.question.clone());
        vars.insert("scratchpad".to_string(), state.transcript.render());
        Prompt::user(self.prompts.render_with_custom(&self.prompts.react.agent, &vars))
    }

    /// Drive the loop to completion and return the final state.
    pub async fn run_loop(&self, question: &str) -> Result<LoopState> {
        let mut state = LoopState::new(question);
        let mut phase = Phase::Running;

        while phase != Phase::Done {
            phase = match phase {
                Phase::Running => self.step(&mut state).await?,
                Phase::Synthesizing(reason) => {
                    info!(
                        "Loop ended ({}) after {} iteration(s)",
                        reason, state.iterations
                    );
                    let summary = state.transcript.render();
                    let report = self.synthesizer.synthesize(&state.question, &summary).await?;
                    state.report = Some(report);
                    Phase::Done
                }
                Phase::Done => Phase::Done,
            };
        }

        Ok(state)
    }

    /// One model turn, and the observation that follows it if the loop continues.
    async fn step(&self, state: &mut LoopState) -> Result<Phase> {
        debug!("ReAct iteration {}", state.iterations + 1);

        let response = self.model.complete(&self.agent_prompt(state)).await?;
        state.record_model_turn(response);

        let latest = state
            .transcript
            .last()
            .map(Turn::text)
            .unwrap_or_default();

        match self.policy.decide(latest, state.iterations) {
            Decision::End(reason) => Ok(Phase::Synthesizing(reason)),
            Decision::Continue => {
                let action = parse_action(latest)?;
                let observation = self.dispatcher.dispatch(&action).await?;
                state.transcript.append(observation);
                Ok(Phase::Running)
            }
        }
    }
}

#[async_trait]
impl Strategy for ReactAgent {
    fn name(&self) -> &'static str {
        "react"
    }

    #[instrument(skip(self), fields(strategy = "react", model = %self.model.name()))]
    async fn run(&self, topic: &str) -> Result<ResearchOutput> {
        let state = self.run_loop(topic).await?;

        Ok(ResearchOutput {
            metadata: ResearchMetadata {
                strategy: self.name().to_string(),
                search_count: state.search_count(),
                iterations: Some(state.iterations),
                completed_at: chrono::Utc::now(),
            },
            report: state.report.unwrap_or_else(|| "No report generated.".to_string()),
        })
    }
}
