//! Append-only record of a research run.

use serde::Serialize;

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Turn {
    /// Raw text produced by the model (Thought / Action / Action Input).
    Model(String),
    /// Result of an action, always starting with `"Observation: "`.
    Observation(String),
}

impl Turn {
    pub fn text(&self) -> &str {
        match self {
            Turn::Model(text) | Turn::Observation(text) => text,
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, Turn::Model(_))
    }
}

/// Ordered history of turns. Turns can be appended but never edited or removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Texts of the model turns, oldest first.
    pub fn model_turns(&self) -> impl Iterator<Item = &str> {
        self.turns.iter().filter(|t| t.is_model()).map(Turn::text)
    }

    /// Render as plain text: turn texts in order, one per line.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(Turn::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
