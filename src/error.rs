/// Errors raised by the conversation core.
///
/// Only `Validation` can come out of the store. The rest describe how an
/// outbound call went wrong and are turned into a notification by the
/// submission controller; none of them are fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Validation error: message content is empty")]
    Validation,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Response error: {0}")]
    Response(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        // A body that decodes badly arrived with a success status
        if err.is_decode() {
            ChatError::Response(err.to_string())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}
