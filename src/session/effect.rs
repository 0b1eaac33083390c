//! Effects produced by session transitions

use crate::transcript::Turn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the transcript
    AppendTurn(Turn),
    /// Send the current transcript to the relay
    RequestAdvice,
}
