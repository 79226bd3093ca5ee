use thiserror::Error;

/// Top-level error type for the Clove bot runtime.
#[derive(Debug, Error)]
pub enum CloveError {
    #[error("interaction already answered through its primary reply")]
    AlreadyReplied,

    #[error("no response has been sent for this interaction yet")]
    NotResponded,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
