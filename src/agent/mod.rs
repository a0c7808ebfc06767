//! ReAct research agent.
//!
//! The model reasons in `Thought:` / `Action:` / `Action Input:` turns, the
//! dispatcher answers each action with an `Observation:`, and the loop stops
//! on `Finish` or when the iteration budget runs out. The accumulated
//! transcript is then synthesized into a report.

mod action;
mod dispatch;
mod runner;
mod termination;
mod transcript;

pub use action::{parse_action, signals_finish, ActionKind, ParsedAction, FINISH_MARKER};
pub use dispatch::{ToolDispatcher, INVALID_ACTION_OBSERVATION};
pub use runner::{LoopState, ReactAgent};
pub use termination::{Decision, FinishReason, TerminationPolicy};
pub use transcript::{Transcript, Turn};
