use thiserror::Error;

/// A failed call to the front-management API.
///
/// `detail` is the human-readable message extracted from the response body
/// when the server sent one, otherwise the status line or transport error.
#[derive(Debug, Error)]
#[error("{action}: {detail}")]
pub struct FrontApiError {
    pub action: &'static str,
    pub detail: String,
    pub status: Option<u16>,
}

impl FrontApiError {
    pub fn new(action: &'static str, detail: impl Into<String>) -> Self {
        Self { action, detail: detail.into(), status: None }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}
