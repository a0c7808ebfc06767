//! Decides whether the ReAct loop keeps going after a model turn.

use super::action::signals_finish;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The model emitted the `Finish` action.
    FinishAction,
    /// The iteration budget ran out.
    IterationLimit,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::FinishAction => write!(f, "finish action"),
            FinishReason::IterationLimit => write!(f, "iteration limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    End(FinishReason),
}

/// Stops on an explicit finish or once `max_iterations` model turns have run.
///
/// Evaluated on the raw text before any parsing, so a malformed turn that
/// hits the cap still ends the loop.
#[derive(Debug, Clone, Copy)]
pub struct TerminationPolicy {
    max_iterations: usize,
}

impl TerminationPolicy {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn decide(&self, latest_turn: &str, iterations: usize) -> Decision {
        if signals_finish(latest_turn) {
            Decision::End(FinishReason::FinishAction)
        } else if iterations >= self.max_iterations {
            Decision::End(FinishReason::IterationLimit)
        } else {
            Decision::Continue
        }
    }
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = "Thought: t\nAction: Search\nAction Input: q";
    const FINISH: &str = "Thought: t\nAction: Finish\nAction Input: s";

    #[test]
    fn test_continue_below_cap() {
        let policy = TerminationPolicy::default();
        assert_eq!(policy.decide(SEARCH, 1), Decision::Continue);
        assert_eq!(policy.decide(SEARCH, 9), Decision::Continue);
    }

    #[test]
    fn test_finish_ends() {
        let policy = TerminationPolicy::default();
        assert_eq!(policy.decide(FINISH, 1), Decision::End(FinishReason::FinishAction));
    }

    #[test]
    fn test_cap_overrides_continue() {
        let policy = TerminationPolicy::default();
        assert_eq!(policy.decide(SEARCH, 10), Decision::End(FinishReason::IterationLimit));
    }

    #[test]
    fn test_cap_ends_even_on_garbage() {
        let policy = TerminationPolicy::new(3);
        assert_eq!(
            policy.decide("no action here", 3),
            Decision::End(FinishReason::IterationLimit)
        );
        // Below the cap garbage is left for the parser to reject.
        assert_eq!(policy.decide("no action here", 2), Decision::Continue);
    }
}
