//! Events that drive session transitions

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// User typed a message
    UserSubmit { text: String },
    /// Relay answered
    RelaySucceeded { answer: String },
    /// Relay unreachable or returned an error; `error` is for logs only
    RelayFailed { error: String },
}
