use clap::{Parser, Subcommand};

use crate::config::{
    Config, DEFAULT_BRANCH_CHANGES_LIMIT, DEFAULT_BUILDER_BUILD_LIMIT, DEFAULT_CHANGES_FETCH_LIMIT,
};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "bbv", version = VERSION, about = "Buildbot build history browser")]
pub struct Cli {
    /// Buildbot master URL, e.g. https://buildbot.example.org
    #[arg(short = 'H', long)]
    pub host: String,

    /// Maximum builds listed per builder
    #[arg(long, default_value_t = DEFAULT_BUILDER_BUILD_LIMIT)]
    pub builder_build_limit: usize,

    /// Maximum changes shown in a branch view
    #[arg(long, default_value_t = DEFAULT_BRANCH_CHANGES_LIMIT)]
    pub branch_changes_limit: usize,

    /// Size of the recent-changes window used by indirect filtering
    #[arg(long, default_value_t = DEFAULT_CHANGES_FETCH_LIMIT)]
    pub changes_fetch_limit: usize,

    /// Filter changes server-side instead of over a recent window
    #[arg(long)]
    pub direct_filter: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse builds for one revision
    Rev {
        /// Revision id (commit hash)
        revision: String,
    },
    /// Browse recent changes on a branch
    Branch {
        /// Branch name
        name: String,
    },
    /// List a builder's recent builds
    Builder {
        /// Builder name
        name: String,
    },
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            host: self.host.clone(),
            builder_build_limit: self.builder_build_limit,
            branch_changes_limit: self.branch_changes_limit,
            changes_fetch_limit: self.changes_fetch_limit,
            use_direct_filter: self.direct_filter,
        }
    }
}
