use std::sync::Arc;

use bbv::api::HttpTransport;
use bbv::cli::{Cli, Command};
use bbv::session::Session;

use clap::Parser;
use color_eyre::eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let filter = if args.verbose { "bbv=debug" } else { "bbv=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let transport = Arc::new(HttpTransport::new()?);
    let mut session = Session::new(args.config(), transport);

    // Builder names resolve to "unknown" until this snapshot lands.
    session.init_builders().await?;

    let doc = match &args.command {
        Command::Rev { revision } => session.open_revision(revision).await?.doc.clone(),
        Command::Branch { name } => session.open_branch(name).await?.doc.clone(),
        Command::Builder { name } => session.builder_overview(name).await?,
    };

    print!("{doc}");
    Ok(())
}
