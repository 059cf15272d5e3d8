//! Command line arguments

use std::path::PathBuf;

use clap::Parser;
use sa_core::{PlatformFilter, PlatformId, RequestClass, TimeRange};
use sa_views::SortKey;

#[derive(Parser, Debug)]
#[command(
    name = "social-dash",
    version,
    about = "Headless social media analytics dashboard",
    long_about = "Loads metrics from the mock source through the dashboard store and\n\
                  prints stat cards, audience distribution, the engagement series\n\
                  and the recent posts table."
)]
pub struct Cli {
    /// Dashboard configuration file (JSON). Defaults apply when omitted.
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Show posts of one platform only ("all" for every platform).
    #[arg(long, value_name = "PLATFORM")]
    pub platform: Option<PlatformFilter>,

    /// Search posts by content or platform, typed through the debouncer.
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// Sort the posts table by this column.
    #[arg(long, value_name = "KEY")]
    pub sort: Option<SortKey>,

    /// Sort ascending instead of descending.
    #[arg(long)]
    pub asc: bool,

    /// Time ranges to switch to, in order. Changes are throttled.
    #[arg(long = "range", value_name = "RANGE")]
    pub ranges: Vec<TimeRange>,

    /// Fetch a single platform by name after the dashboard loaded.
    #[arg(long, value_name = "NAME")]
    pub inspect: Option<String>,

    /// Highlight a platform in the report.
    #[arg(long, value_name = "PLATFORM")]
    pub select: Option<PlatformId>,

    /// Make every request of this class fail (may be repeated).
    #[arg(long = "fail", value_name = "CLASS", value_parser = parse_class)]
    pub failing: Vec<RequestClass>,

    /// Log debug output unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_class(value: &str) -> Result<RequestClass, String> {
    RequestClass::ALL
        .into_iter()
        .find(|class| class.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown request class '{value}' (all, platform, historical)"))
}
