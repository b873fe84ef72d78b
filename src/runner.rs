use std::pin::pin;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{thread_rng, Rng, SeedableRng};
use tokio::time::Instant;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::feed::FeedClient;
use crate::store::StoreClient;
use crate::sync::Reconciler;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const TOTAL_TIMEOUT: Duration = Duration::from_secs(300);

pub fn make_reconciler(cfg: &Config) -> Result<Reconciler> {
    let http = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .timeout(TOTAL_TIMEOUT)
        .build()
        .context("could not create an HTTP client")?;

    let token = cfg.store.token.clone().context(
        "the store token is not set (pass --store-token or set FEEDSYNC_STORE_TOKEN)",
    )?;

    let feed = FeedClient::new(http.clone(), cfg.feed_url.clone());
    let store = StoreClient::new(http, &cfg.store.base_url, &cfg.store.collection, token);

    Ok(Reconciler::new(feed, store))
}

/// Drives the reconciler on a fixed interval until cancelled. Runs never
/// overlap: each pass is awaited to completion before the next is scheduled,
/// and a failed pass is logged and retried at the next tick, not sooner.
pub struct Runner {
    cfg: Config,
}

impl Runner {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let reconciler = make_reconciler(&self.cfg)?;
        let sync_interval = Duration::from(self.cfg.sync_interval);
        let max_initial_sleep = Duration::from(self.cfg.max_initial_sleep);

        // Stagger the first run so restarts don't hammer the feed host.
        let initial_sleep = if max_initial_sleep.is_zero() {
            Duration::ZERO
        } else {
            let mut rng = SmallRng::from_rng(&mut thread_rng())
                .context("could not seed the sleep jitter RNG")?;
            rng.gen_range(Duration::ZERO..max_initial_sleep)
        };

        debug!("Scheduling the first run in {}s", initial_sleep.as_secs());
        let mut next_run = pin!(time::sleep(initial_sleep));

        loop {
            select! {
                _ = cancel.cancelled() => {
                    debug!("Received a cancellation signal; exiting");
                    break;
                }

                _ = &mut next_run => {}
            }

            match reconciler.run().await {
                Ok(report) if report.is_clean() => info!("Synchronized: {report}"),
                Ok(report) => warn!("Synchronized with failures: {report}"),
                Err(e) => error!("Synchronization run failed: {e}"),
            }

            debug!("Scheduling the next run in {}s", sync_interval.as_secs());
            next_run.as_mut().reset(Instant::now() + sync_interval);
        }

        Ok(())
    }
}
