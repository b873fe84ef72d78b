use std::process::ExitCode;

use anyhow::Result;
use feedsync::cli::Args;
use feedsync::config;
use feedsync::runner::{self, Runner};
use tokio_util::sync::CancellationToken;
use tracing::{error, Level};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn set_up_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_regex(false)
                .with_default_directive(Level::INFO.into())
                .with_env_var("FEEDSYNC_LOG")
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    set_up_logging();

    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();

        async move {
            tokio::signal::ctrl_c().await.unwrap();
            cancel.cancel();
        }
    });

    match run(cancel).await {
        Ok(()) => ExitCode::SUCCESS,

        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cancel: CancellationToken) -> Result<()> {
    let mut args = Args::parse();
    let config_paths = args
        .config_path
        .take()
        .into_iter()
        .chain(["./feedsync.toml".into(), "/etc/feedsync.toml".into()])
        .collect::<Vec<_>>();
    let mut config = config::load(&config_paths)?;
    let (once, json) = (args.once, args.json);
    config.update(args);

    if once {
        let reconciler = runner::make_reconciler(&config)?;
        let report = reconciler.run().await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{report}");
        }

        return Ok(());
    }

    Runner::new(config).run(cancel).await
}
