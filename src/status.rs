use crate::model::{Build, Status, Step};

/// Keyword table driving status inference from upstream state text. The
/// upstream schema does not promise a closed vocabulary, so the table is
/// configurable and anything unmatched surfaces as [`Status::Other`].
#[derive(Debug, Clone)]
pub struct StatusPolicy {
    pub pending: Vec<String>,
    pub success: Vec<String>,
    pub failure: Vec<String>,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            pending: keywords(&["running", "pending", "starting", "preparing"]),
            success: keywords(&["success", "succeeded", "passed"]),
            failure: keywords(&["fail", "error", "exception"]),
        }
    }
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

impl StatusPolicy {
    /// Case-insensitive substring classification of a state description.
    pub fn classify(&self, text: &str) -> Status {
        let text = text.to_lowercase();
        let hit = |set: &[String]| set.iter().any(|kw| text.contains(kw.as_str()));
        if hit(&self.pending) {
            Status::Pending
        } else if hit(&self.success) {
            Status::Success
        } else if hit(&self.failure) {
            Status::Failure
        } else {
            Status::Other
        }
    }

    /// Recorded failed tests win over any state text. A build mid-retry can
    /// carry a transient "pending" description while its failures are
    /// already on record.
    pub fn build_status(&self, build: &Build) -> Status {
        if build.failed_tests.is_empty() {
            self.classify(&build.state_string)
        } else {
            Status::Failure
        }
    }

    /// Steps have no failed-tests signal; text is all there is.
    pub fn step_status(&self, step: &Step) -> Status {
        self.classify(&step.state_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FailedTest;

    fn build(state: &str, failed: &[&str]) -> Build {
        Build {
            build_id: 1,
            builder_id: 1,
            state_string: state.to_string(),
            failed_tests: failed
                .iter()
                .map(|name| FailedTest {
                    test_name: (*name).to_string(),
                })
                .collect(),
            status: Status::Other,
        }
    }

    #[test]
    fn failed_tests_beat_pending_text() {
        let policy = StatusPolicy::default();
        let b = build("retrying, currently running", &["test_io"]);
        assert_eq!(policy.build_status(&b), Status::Failure);
    }

    #[test]
    fn failed_tests_beat_success_text() {
        let policy = StatusPolicy::default();
        let b = build("build successful", &["test_io"]);
        assert_eq!(policy.build_status(&b), Status::Failure);
    }

    #[test]
    fn no_failed_tests_falls_back_to_text() {
        let policy = StatusPolicy::default();
        assert_eq!(policy.build_status(&build("build successful", &[])), Status::Success);
        assert_eq!(policy.build_status(&build("running tests", &[])), Status::Pending);
    }

    #[test]
    fn classify_is_case_insensitive() {
        let policy = StatusPolicy::default();
        assert_eq!(policy.classify("RUNNING"), Status::Pending);
        assert_eq!(policy.classify("Build Successful"), Status::Success);
    }

    #[test]
    fn classify_failure_keywords() {
        let policy = StatusPolicy::default();
        assert_eq!(policy.classify("failed compile"), Status::Failure);
        assert_eq!(policy.classify("internal error"), Status::Failure);
    }

    #[test]
    fn classify_unmatched_text_is_other() {
        let policy = StatusPolicy::default();
        assert_eq!(policy.classify("skipped"), Status::Other);
        assert_eq!(policy.classify(""), Status::Other);
    }

    #[test]
    fn custom_policy_table_is_honored() {
        let policy = StatusPolicy {
            pending: vec!["en cours".to_string()],
            success: vec!["ok".to_string()],
            failure: vec!["casse".to_string()],
        };
        assert_eq!(policy.classify("en cours"), Status::Pending);
        assert_eq!(policy.classify("tout ok"), Status::Success);
        assert_eq!(policy.classify("casse"), Status::Failure);
        assert_eq!(policy.classify("success"), Status::Other);
    }

    #[test]
    fn step_status_uses_text_only() {
        let policy = StatusPolicy::default();
        let step = Step {
            step_id: 1,
            number: 1,
            name: "compile".to_string(),
            state_string: "running".to_string(),
            status: Status::Other,
        };
        assert_eq!(policy.step_status(&step), Status::Pending);
    }
}
