use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid lookup url: {0}")]
    Url(String),

    #[error("login failed: {0}")]
    Login(String),

    #[error("missing Hytale credentials")]
    MissingCredentials,

    #[error("unexpected status {0} from username lookup")]
    UnexpectedStatus(u16),
}
