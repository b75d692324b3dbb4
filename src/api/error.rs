#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    /// The server answered with an error payload or a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The server could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with something that is not the expected JSON.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ChatError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Server-provided message, if the server answered at all.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ChatError::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::Malformed(err.to_string())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Malformed(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
