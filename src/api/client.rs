use std::sync::Arc;

use serde::Deserialize;

use crate::model::{Build, Builder, Change, Log, Step};

use super::error::ApiError;
use super::query::{BuildFilters, ChangeFilters, Query};
use super::transport::Transport;

/// Thin client over the read endpoints of a Buildbot-style `/api/v2`. Builds
/// the one correct URL per semantic query, fetches through the transport and
/// decodes the envelope once. No retries; failures propagate to the caller.
pub struct ApiClient {
    base: String,
    transport: Arc<dyn Transport>,
}

#[derive(Deserialize)]
struct ChangesEnvelope {
    changes: Vec<ChangeRecord>,
}

#[derive(Deserialize)]
struct BuildsEnvelope {
    builds: Vec<Build>,
}

#[derive(Deserialize)]
struct BuildersEnvelope {
    builders: Vec<Builder>,
}

#[derive(Deserialize)]
struct StepsEnvelope {
    steps: Vec<Step>,
}

#[derive(Deserialize)]
struct LogsEnvelope {
    logs: Vec<Log>,
}

/// Wire shape of a change. Revision and branch are nullable upstream; the
/// normalized entity requires both, so absence is schema drift and errors.
#[derive(Deserialize)]
struct ChangeRecord {
    changeid: u64,
    revision: Option<String>,
    branch: Option<String>,
    author: String,
    when_timestamp: i64,
    comments: String,
}

impl ChangeRecord {
    fn normalize(self) -> Result<Change, ApiError> {
        Ok(Change {
            change_id: self.changeid,
            revision: self.revision.ok_or(ApiError::MissingField("revision"))?,
            branch: self.branch.ok_or(ApiError::MissingField("branch"))?,
            author: self.author,
            when_timestamp: self.when_timestamp,
            comments: self.comments,
            builds: None,
        })
    }
}

impl ApiClient {
    pub fn new(host: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base: format!("{}/api/v2", host.trim_end_matches('/')),
            transport,
        }
    }

    fn url(&self, path: &str, query: &Query) -> String {
        if query.is_empty() {
            format!("{}/{path}", self.base)
        } else {
            format!("{}/{path}?{}", self.base, query.encode())
        }
    }

    pub async fn changes(&self, filters: &ChangeFilters) -> Result<Vec<Change>, ApiError> {
        let body = self.transport.get(&self.url("changes", &filters.query())).await?;
        let envelope: ChangesEnvelope = serde_json::from_str(&body)?;
        envelope
            .changes
            .into_iter()
            .map(ChangeRecord::normalize)
            .collect()
    }

    pub async fn builds_for_change(&self, change_id: u64) -> Result<Vec<Build>, ApiError> {
        let url = format!("{}/changes/{change_id}/builds", self.base);
        let envelope: BuildsEnvelope = serde_json::from_str(&self.transport.get(&url).await?)?;
        Ok(envelope.builds)
    }

    pub async fn builders(&self) -> Result<Vec<Builder>, ApiError> {
        let url = format!("{}/builders", self.base);
        let envelope: BuildersEnvelope = serde_json::from_str(&self.transport.get(&url).await?)?;
        Ok(envelope.builders)
    }

    pub async fn builds_for_builder(
        &self,
        builder_id: u64,
        filters: &BuildFilters,
    ) -> Result<Vec<Build>, ApiError> {
        let url = self.url(&format!("builders/{builder_id}/builds"), &filters.query());
        let envelope: BuildsEnvelope = serde_json::from_str(&self.transport.get(&url).await?)?;
        Ok(envelope.builds)
    }

    pub async fn builds(&self, filters: &BuildFilters) -> Result<Vec<Build>, ApiError> {
        let url = self.url("builds", &filters.query());
        let envelope: BuildsEnvelope = serde_json::from_str(&self.transport.get(&url).await?)?;
        Ok(envelope.builds)
    }

    pub async fn steps(&self, build_id: u64) -> Result<Vec<Step>, ApiError> {
        let url = format!("{}/builds/{build_id}/steps", self.base);
        let envelope: StepsEnvelope = serde_json::from_str(&self.transport.get(&url).await?)?;
        Ok(envelope.steps)
    }

    pub async fn logs(&self, step_id: u64) -> Result<Vec<Log>, ApiError> {
        let url = format!("{}/steps/{step_id}/logs", self.base);
        let envelope: LogsEnvelope = serde_json::from_str(&self.transport.get(&url).await?)?;
        Ok(envelope.logs)
    }

    /// Raw log text. Opaque passthrough, never parsed as JSON.
    pub async fn log_raw(&self, log_id: u64) -> Result<String, ApiError> {
        let url = format!("{}/logs/{log_id}/raw", self.base);
        self.transport.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with one canned body to every request, recording URLs.
    struct CannedTransport {
        body: Result<String, u16>,
        requests: Mutex<Vec<String>>,
    }

    impl CannedTransport {
        fn ok(body: &str) -> Self {
            Self {
                body: Ok(body.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn http_error(status: u16) -> Self {
            Self {
                body: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn get(&self, url: &str) -> Result<String, ApiError> {
            self.requests.lock().unwrap().push(url.to_string());
            match &self.body {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(ApiError::Http { status: *status }),
            }
        }
    }

    fn client_with(transport: Arc<CannedTransport>) -> ApiClient {
        ApiClient::new("http://bb.test", transport)
    }

    #[tokio::test]
    async fn changes_decodes_and_normalizes() {
        let transport = Arc::new(CannedTransport::ok(
            r#"{"changes": [{
                "changeid": 12,
                "revision": "deadbeef",
                "branch": "main",
                "author": "dev@example.org",
                "when_timestamp": 1700000000,
                "comments": "tidy parser"
            }]}"#,
        ));
        let changes = client_with(transport.clone())
            .changes(&ChangeFilters::default())
            .await
            .unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_id, 12);
        assert_eq!(changes[0].revision, "deadbeef");
        assert!(changes[0].builds.is_none());
        assert_eq!(
            transport.requests.lock().unwrap()[0],
            "http://bb.test/api/v2/changes"
        );
    }

    #[tokio::test]
    async fn change_filters_land_in_the_query_string() {
        let transport = Arc::new(CannedTransport::ok(r#"{"changes": []}"#));
        let filters = ChangeFilters {
            limit: Some(10),
            order: Some("-changeid".to_string()),
            branch: Some("main".to_string()),
            ..Default::default()
        };
        client_with(transport.clone()).changes(&filters).await.unwrap();
        assert_eq!(
            transport.requests.lock().unwrap()[0],
            "http://bb.test/api/v2/changes?limit=10&order=-changeid&branch=main"
        );
    }

    #[tokio::test]
    async fn null_revision_is_missing_field() {
        let transport = Arc::new(CannedTransport::ok(
            r#"{"changes": [{
                "changeid": 12,
                "revision": null,
                "branch": "main",
                "author": "dev@example.org",
                "when_timestamp": 1700000000,
                "comments": ""
            }]}"#,
        ));
        let err = client_with(transport)
            .changes(&ChangeFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingField("revision")));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let transport = Arc::new(CannedTransport::ok("not json"));
        let err = client_with(transport).builders().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn wrong_envelope_is_parse_error() {
        let transport = Arc::new(CannedTransport::ok(r#"{"not_builders": []}"#));
        let err = client_with(transport).builders().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn http_failure_propagates() {
        let transport = Arc::new(CannedTransport::http_error(503));
        let err = client_with(transport)
            .steps(4)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 503 }));
    }

    #[tokio::test]
    async fn path_shapes_match_the_api() {
        let transport = Arc::new(CannedTransport::ok(
            r#"{"builds": [], "builders": [], "steps": [], "logs": []}"#,
        ));
        let client = client_with(transport.clone());
        client.builds_for_change(7).await.unwrap();
        client.builders().await.unwrap();
        client
            .builds_for_builder(3, &BuildFilters::default())
            .await
            .unwrap();
        client.steps(9).await.unwrap();
        client.logs(11).await.unwrap();
        client.log_raw(13).await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0], "http://bb.test/api/v2/changes/7/builds");
        assert_eq!(requests[1], "http://bb.test/api/v2/builders");
        assert_eq!(requests[2], "http://bb.test/api/v2/builders/3/builds");
        assert_eq!(requests[3], "http://bb.test/api/v2/builds/9/steps");
        assert_eq!(requests[4], "http://bb.test/api/v2/steps/11/logs");
        assert_eq!(requests[5], "http://bb.test/api/v2/logs/13/raw");
    }

    #[tokio::test]
    async fn trailing_slash_on_host_is_tolerated() {
        let transport = Arc::new(CannedTransport::ok(r#"{"builders": []}"#));
        let client = ApiClient::new("http://bb.test/", transport.clone());
        client.builders().await.unwrap();
        assert_eq!(
            transport.requests.lock().unwrap()[0],
            "http://bb.test/api/v2/builders"
        );
    }

    #[tokio::test]
    async fn log_raw_is_opaque_text() {
        let transport = Arc::new(CannedTransport::ok("line 1\nline 2"));
        let text = client_with(transport).log_raw(5).await.unwrap();
        assert_eq!(text, "line 1\nline 2");
    }
}
