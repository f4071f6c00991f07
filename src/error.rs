use thiserror::Error;

/// Failure modes surfaced by prediction-serving operations.
///
/// Single-request paths (stats lookup, matchup scoring) propagate these to
/// the caller immediately; batch paths (backtesting, live-game resolution)
/// absorb per-item failures and continue.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("player not found: {0}")]
    NotFound(String),

    #[error("model not loaded")]
    ModelUnavailable,

    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed payload: {0}")]
    Data(String),
}

/// Typed HTTP failure. Keeps the status code around so callers can map a
/// 404 on a profile lookup to `PredictError::NotFound` instead of a generic
/// fetch error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    ClientInit(String),

    #[error("http {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
