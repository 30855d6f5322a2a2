//! Error types for the chat session.

/// Messages the session refuses to process.
///
/// Command failures are not errors here; they come back as assistant
/// messages.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is disabled")]
    Disabled,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
}
