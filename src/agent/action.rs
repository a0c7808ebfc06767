//! Extraction of the `Action:` / `Action Input:` pair from a model turn.

use crate::error::{DelveError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Literal that marks a finishing turn.
pub const FINISH_MARKER: &str = "Action: Finish";

/// Which tool the model asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Search,
    Finish,
    /// A well-formed action naming no known tool.
    Unrecognized(String),
}

impl ActionKind {
    fn from_name(name: &str) -> Self {
        match name {
            "Search" => ActionKind::Search,
            "Finish" => ActionKind::Finish,
            other => ActionKind::Unrecognized(other.to_string()),
        }
    }
}

/// An action and its argument, both trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub kind: ActionKind,
    pub input: String,
}

impl ParsedAction {
    /// The action name as written by the model.
    pub fn name(&self) -> &str {
        match &self.kind {
            ActionKind::Search => "Search",
            ActionKind::Finish => "Finish",
            ActionKind::Unrecognized(name) => name,
        }
    }
}

fn action_regex() -> &'static Regex {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    // The name is the rest of the `Action:` line; the input runs to the end of the text.
    ACTION.get_or_init(|| {
        Regex::new(r"(?s)Action: ([^\n]*)\nAction Input: (.*)").expect("action pattern is valid")
    })
}

/// Parse the action from one model turn.
///
/// Fails with [`DelveError::InvalidAgentOutput`] when the text has no
/// `Action:` line directly followed by an `Action Input:` line.
pub fn parse_action(text: &str) -> Result<ParsedAction> {
    let caps = action_regex().captures(text).ok_or_else(|| {
        DelveError::InvalidAgentOutput(format!(
            "no 'Action:' / 'Action Input:' pair in model output: {}",
            text.chars().take(200).collect::<String>()
        ))
    })?;

    Ok(ParsedAction {
        kind: ActionKind::from_name(caps[1].trim()),
        input: caps[2].trim().to_string(),
    })
}

/// Whether a model turn asks to finish.
pub fn signals_finish(text: &str) -> bool {
    text.contains(FINISH_MARKER)
}
