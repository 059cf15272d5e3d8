use anyhow::{Context, Result};
use clap::Parser;
use sa_data::DashboardConfig;
use sa_views::{SortConfig, SortDirection};
use tracing::info;

mod cli;
mod logging;
mod report;
mod session;

use cli::Cli;
use session::{Intents, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    info!("Starting social media dashboard");

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    config.source.failing.extend(cli.failing.iter().copied());

    let key = cli.sort.unwrap_or(SortConfig::default().key);
    let direction = if cli.asc { SortDirection::Asc } else { SortDirection::Desc };
    let sort = SortConfig::new(key, direction);

    let intents = Intents {
        platform: cli.platform,
        search: cli.search,
        sort,
        ranges: cli.ranges,
        inspect: cli.inspect,
        select: cli.select,
    };

    let session = Session::new(&config)?;
    let outcome = session.run(&intents).await?;

    print!("{}", report::render(&outcome).context("Failed to render report")?);
    Ok(())
}
