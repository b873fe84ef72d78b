use clap::ValueHint;

use std::path::PathBuf;

use reqwest::Url;

#[derive(clap::Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Path to the config file.
    ///
    /// By default, feedsync looks for a file named `feedsync.toml` in the following
    /// directories (in order):
    ///
    /// - `./` (the current directory)
    /// - `/etc`
    #[arg(
        short,
        env = "FEEDSYNC_CONFIG",
        value_hint(ValueHint::FilePath)
    )]
    pub config_path: Option<PathBuf>,

    /// URL of the feed to synchronize from.
    #[arg(long, env = "FEEDSYNC_FEED_URL")]
    pub feed_url: Option<Url>,

    /// Base URL of the record store.
    #[arg(long, env = "FEEDSYNC_STORE_URL")]
    pub store_url: Option<Url>,

    /// Access token for the record store.
    #[arg(long, env = "FEEDSYNC_STORE_TOKEN", hide_env_values = true)]
    pub store_token: Option<String>,

    /// Run a single synchronization pass and exit instead of staying resident.
    #[arg(long)]
    pub once: bool,

    /// With --once, print the run report to stdout as JSON.
    #[arg(long, requires = "once")]
    pub json: bool,
}

impl Args {
    pub fn parse() -> Self {
        clap::Parser::parse()
    }
}
