use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Derived build/step status. Never taken verbatim from upstream; see
/// [`crate::status::StatusPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    Success,
    Failure,
    Pending,
    #[default]
    Other,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failure => "failure",
            Status::Pending => "pending",
            Status::Other => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Builder {
    #[serde(rename = "builderid")]
    pub builder_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FailedTest {
    pub test_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Build {
    #[serde(rename = "buildid")]
    pub build_id: u64,
    #[serde(rename = "builderid")]
    pub builder_id: u64,
    pub state_string: String,
    #[serde(default)]
    pub failed_tests: Vec<FailedTest>,
    /// Derived after decode, not part of the wire record.
    #[serde(skip)]
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    #[serde(rename = "stepid")]
    pub step_id: u64,
    pub number: u64,
    pub name: String,
    pub state_string: String,
    #[serde(skip)]
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Log {
    #[serde(rename = "logid")]
    pub log_id: u64,
    pub name: String,
}

/// One recorded revision event. `builds` is populated lazily; `None` means
/// the change is not yet resolved. Once `Some`, it is never overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub change_id: u64,
    pub revision: String,
    pub branch: String,
    pub author: String,
    pub when_timestamp: i64,
    pub comments: String,
    pub builds: Option<Vec<Build>>,
}

/// Revision summary projected from the first matching change; all changes of
/// one revision share author and revision id upstream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RevisionInfo {
    pub revision: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub comments: String,
}

impl RevisionInfo {
    pub fn from_change(change: &Change) -> Self {
        Self {
            revision: change.revision.clone(),
            author: change.author.clone(),
            created_at: DateTime::from_timestamp(change.when_timestamp, 0).unwrap_or_default(),
            comments: change.comments.clone(),
        }
    }

    /// Summary for a revision with no matching change. Still constructible;
    /// an empty match set is not an error.
    pub fn empty(revision: &str) -> Self {
        Self {
            revision: revision.to_string(),
            ..Self::default()
        }
    }
}

/// Per-branch grouping of a revision's builds.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeInfo {
    pub branch: String,
    pub stats: BuildStats,
    pub builds: Vec<Build>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    pub success: usize,
    pub failure: usize,
    pub pending: usize,
}

impl BuildStats {
    pub fn tally(builds: &[Build]) -> Self {
        let mut stats = Self::default();
        for build in builds {
            match build.status {
                Status::Success => stats.success += 1,
                Status::Failure => stats.failure += 1,
                Status::Pending => stats.pending += 1,
                Status::Other => {}
            }
        }
        stats
    }
}
