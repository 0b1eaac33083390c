//! Session state

/// Whether a relay request is in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for user input
    #[default]
    Idle,
    /// Waiting for the relay's reply; input is refused
    AwaitingResponse,
}

impl SessionState {
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::AwaitingResponse)
    }
}
