use std::time::Duration;

use async_trait::async_trait;

use super::error::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("bbv/", env!("CARGO_PKG_VERSION"));

/// Boundary to the wire. The core never sees HTTP beyond this trait, which
/// lets tests drive the whole stack from canned responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET and returns the response body as text.
    async fn get(&self, url: &str) -> Result<String, ApiError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, ApiError> {
        tracing::debug!(%url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }

        resp.text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }
}
