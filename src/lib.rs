//! Delve - Automated Web Research
//!
//! A CLI tool that researches a topic on the web and writes a markdown report.
//!
//! # Overview
//!
//! Delve runs a research strategy for each topic:
//! - `react`: the model alternates reasoning and web searches until it
//!   decides to finish or runs out of iterations, then writes the report
//! - `zeroshot`: the model plans a set of search queries up front, all of
//!   them run at once, and the report is written from the numbered results
//!
//! Topics can be researched one at a time or in resumable JSONL batches.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` - Chat model abstraction (OpenAI-compatible)
//! - `search` - Web search abstraction (Tavily)
//! - `agent` - The ReAct loop
//! - `zeroshot` - The single-pass strategy
//! - `report` - Report synthesis
//! - `strategy` - Strategy trait and registry
//! - `orchestrator` - Pipeline coordination
//! - `batch` - JSONL batch processing
//!
//! # Example
//!
//! ```rust,no_run
//! use delve::config::Settings;
//! use delve::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let output = orchestrator
//!         .run_pipeline("How did the printing press change Europe?", "react")
//!         .await?;
//!     println!("{}", output.report);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod report;
pub mod search;
pub mod strategy;
pub mod zeroshot;

#[cfg(test)]
mod testing;

pub use error::{DelveError, Result};
