use serde::Serialize;
use thiserror::Error;

/// Phase of the orchestration loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopPhase {
    Planning,
    Iterating,
    Done,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: LoopPhase, to: LoopPhase },

    #[error("cannot leave terminal phase {state:?}")]
    FromTerminalState { state: LoopPhase },
}

pub struct LoopTransition;

impl LoopTransition {
    pub fn validate(from: LoopPhase, to: LoopPhase) -> Result<(), TransitionError> {
        if Self::is_terminal(from) {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        match (from, to) {
            (LoopPhase::Planning, LoopPhase::Iterating)
            // zero tasks planned
            | (LoopPhase::Planning, LoopPhase::Done)
            | (LoopPhase::Iterating, LoopPhase::Done) => Ok(()),
            _ => Err(TransitionError::InvalidTransition { from, to }),
        }
    }

    pub fn is_terminal(phase: LoopPhase) -> bool {
        phase == LoopPhase::Done
    }

    pub fn describe(phase: LoopPhase) -> &'static str {
        match phase {
            LoopPhase::Planning => "planning",
            LoopPhase::Iterating => "iterating",
            LoopPhase::Done => "done",
        }
    }
}
