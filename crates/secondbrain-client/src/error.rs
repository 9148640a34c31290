use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or an undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// An endpoint that needs a bearer token was called without one.
    #[error("not logged in")]
    Unauthenticated,

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// True for 401 responses and missing tokens.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthenticated => true,
            Self::Status { status, .. } => *status == 401,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
