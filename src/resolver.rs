use crate::api::{ApiClient, ApiError, BuildFilters, ChangeFilters};
use crate::config::Config;
use crate::model::{Build, BuildStats, Change, ChangeInfo, Log, RevisionInfo, Step};
use crate::status::StatusPolicy;

/// What the changes listing is being narrowed to.
#[derive(Debug, Clone, Copy)]
pub enum ChangeScope<'a> {
    Revision(&'a str),
    Branch(&'a str),
}

/// Turns raw records into the normalized entity graph: attaches builds to
/// changes, groups revisions by branch and derives statuses. Borrowed fresh
/// from the session for each resolve cycle.
pub struct Resolver<'a> {
    client: &'a ApiClient,
    config: &'a Config,
    policy: &'a StatusPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a ApiClient, config: &'a Config, policy: &'a StatusPolicy) -> Self {
        Self {
            client,
            config,
            policy,
        }
    }

    fn derive_build_statuses(&self, builds: &mut [Build]) {
        for build in builds {
            build.status = self.policy.build_status(build);
        }
    }

    /// Changes matching a revision or branch, honoring the configured
    /// filtering strategy. The indirect strategy never returns a false
    /// positive; matches that fell out of the fetch window are silently
    /// absent, which is an accepted under-count.
    pub async fn matching_changes(&self, scope: ChangeScope<'_>) -> Result<Vec<Change>, ApiError> {
        let cap = match scope {
            ChangeScope::Branch(_) => self.config.branch_changes_limit,
            ChangeScope::Revision(_) => self.config.changes_fetch_limit,
        };

        if self.config.use_direct_filter {
            let mut filters = ChangeFilters {
                limit: Some(cap),
                order: Some("-changeid".to_string()),
                ..Default::default()
            };
            match scope {
                ChangeScope::Revision(rev) => filters.revision = Some(rev.to_string()),
                ChangeScope::Branch(branch) => filters.branch = Some(branch.to_string()),
            }
            return self.client.changes(&filters).await;
        }

        let filters = ChangeFilters {
            limit: Some(self.config.changes_fetch_limit),
            order: Some("-changeid".to_string()),
            ..Default::default()
        };
        let window = self.client.changes(&filters).await?;
        let matched: Vec<Change> = window
            .into_iter()
            .filter(|change| match scope {
                ChangeScope::Revision(rev) => change.revision == rev,
                ChangeScope::Branch(branch) => change.branch == branch,
            })
            .take(cap)
            .collect();
        tracing::debug!(matched = matched.len(), "indirect filter applied");
        Ok(matched)
    }

    /// Attaches builds to a change that does not carry them yet. Idempotent:
    /// an already-populated change is left untouched.
    pub async fn attach_builds(&self, change: &mut Change) -> Result<(), ApiError> {
        if change.builds.is_some() {
            return Ok(());
        }
        let mut builds = self.client.builds_for_change(change.change_id).await?;
        self.derive_build_statuses(&mut builds);
        change.builds = Some(builds);
        Ok(())
    }

    /// All recent changes of a branch, each with its builds, newest first.
    /// No merging across revisions.
    pub async fn resolve_branch(&self, branch: &str) -> Result<Vec<Change>, ApiError> {
        let mut changes = self.matching_changes(ChangeScope::Branch(branch)).await?;
        for change in &mut changes {
            self.attach_builds(change).await?;
        }
        tracing::debug!(branch, changes = changes.len(), "branch resolved");
        Ok(changes)
    }

    /// Revision summary plus its builds grouped per branch. A revision with
    /// no matching change yields an empty group list, not an error.
    pub async fn resolve_revision(
        &self,
        revision: &str,
    ) -> Result<(RevisionInfo, Vec<ChangeInfo>), ApiError> {
        let mut changes = self.matching_changes(ChangeScope::Revision(revision)).await?;
        for change in &mut changes {
            self.attach_builds(change).await?;
        }

        let info = changes
            .first()
            .map_or_else(|| RevisionInfo::empty(revision), RevisionInfo::from_change);

        let mut groups: Vec<ChangeInfo> = Vec::new();
        for change in &changes {
            let builds = change.builds.clone().unwrap_or_default();
            match groups.iter_mut().find(|g| g.branch == change.branch) {
                Some(group) => group.builds.extend(builds),
                None => groups.push(ChangeInfo {
                    branch: change.branch.clone(),
                    stats: BuildStats::default(),
                    builds,
                }),
            }
        }
        for group in &mut groups {
            group.stats = BuildStats::tally(&group.builds);
        }
        tracing::debug!(revision, groups = groups.len(), "revision resolved");
        Ok((info, groups))
    }

    /// Single build by id, e.g. when a build view is opened with no ancestor
    /// context at all.
    pub async fn resolve_build(&self, build_id: u64) -> Result<Build, ApiError> {
        let filters = BuildFilters {
            build_id: Some(build_id),
            ..Default::default()
        };
        let mut builds = self.client.builds(&filters).await?;
        self.derive_build_statuses(&mut builds);
        builds
            .into_iter()
            .find(|b| b.build_id == build_id)
            .ok_or(ApiError::NotFound(build_id))
    }

    /// Recent builds of one builder, newest first, capped by configuration.
    pub async fn resolve_builder_builds(&self, builder_id: u64) -> Result<Vec<Build>, ApiError> {
        let filters = BuildFilters {
            limit: Some(self.config.builder_build_limit),
            order: Some("-buildid".to_string()),
            ..Default::default()
        };
        let mut builds = self.client.builds_for_builder(builder_id, &filters).await?;
        self.derive_build_statuses(&mut builds);
        Ok(builds)
    }

    pub async fn resolve_steps(&self, build_id: u64) -> Result<Vec<Step>, ApiError> {
        let mut steps = self.client.steps(build_id).await?;
        for step in &mut steps {
            step.status = self.policy.step_status(step);
        }
        Ok(steps)
    }

    pub async fn resolve_logs(&self, step_id: u64) -> Result<Vec<Log>, ApiError> {
        self.client.logs(step_id).await
    }

    pub async fn resolve_log_text(&self, log_id: u64) -> Result<String, ApiError> {
        self.client.log_raw(log_id).await
    }
}
