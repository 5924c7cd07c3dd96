use thiserror::Error;

/// Failures surfaced by the retrieval layer. None of these are retried or
/// recovered locally; a failed fetch aborts the resolve cycle that issued it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned HTTP {status}")]
    Http { status: u16 },

    #[error("malformed response body: {0}")]
    Parse(String),

    #[error("missing field `{0}` in response record")]
    MissingField(&'static str),

    #[error("no record matched id {0}")]
    NotFound(u64),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Parse(e.to_string())
    }
}
