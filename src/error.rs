//! Typed error taxonomy for the core engine (spec §7).

use thiserror::Error;

/// Errors surfaced by the rule engines, search, and training pipeline.
#[derive(Debug, Error)]
pub enum ShogiError {
    #[error("action {action} is not in the legal move set for the current position")]
    InvalidAction { action: u32 },

    #[error("attempted to remove a piece kind not present in hand")]
    HandUnderflow,

    #[error("cannot select a move: the legal move set is empty")]
    EmptyLegalSet,

    #[error("apply_move called on a terminal state")]
    TerminalState,

    #[error("neural network inference failed: {0}")]
    InferenceFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ShogiResult<T> = Result<T, ShogiError>;
