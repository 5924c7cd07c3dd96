pub const DEFAULT_BUILDER_BUILD_LIMIT: usize = 25;
pub const DEFAULT_BRANCH_CHANGES_LIMIT: usize = 10;
pub const DEFAULT_CHANGES_FETCH_LIMIT: usize = 200;

/// Session configuration. `host` has no default; everything else does.
#[derive(Debug, Clone)]
pub struct Config {
    /// Buildbot master URL, scheme included.
    pub host: String,
    /// Cap on builds fetched in a builder-scoped listing.
    pub builder_build_limit: usize,
    /// Cap on changes shown in a branch view.
    pub branch_changes_limit: usize,
    /// Window size for indirect filtering: how many recent changes are
    /// fetched before filtering client-side.
    pub changes_fetch_limit: usize,
    /// Send revision/branch as server-side filter parameters instead of
    /// filtering a recent window locally.
    pub use_direct_filter: bool,
}

impl Config {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            builder_build_limit: DEFAULT_BUILDER_BUILD_LIMIT,
            branch_changes_limit: DEFAULT_BRANCH_CHANGES_LIMIT,
            changes_fetch_limit: DEFAULT_CHANGES_FETCH_LIMIT,
            use_direct_filter: false,
        }
    }
}
