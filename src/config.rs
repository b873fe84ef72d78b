mod types;

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

pub use self::types::Duration;

fn default_sync_interval() -> Duration {
    Duration::from_secs(7200)
}

fn default_max_initial_sleep() -> Duration {
    Duration::from_secs(45)
}

fn default_collection() -> String {
    "blog".into()
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub feed_url: Url,
    pub store: StoreConfig,

    #[serde(default = "default_sync_interval")]
    pub sync_interval: Duration,

    #[serde(default = "default_max_initial_sleep")]
    pub max_initial_sleep: Duration,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StoreConfig {
    pub base_url: Url,

    /// Usually supplied through the environment rather than the file.
    pub token: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Config {
    pub fn update(&mut self, args: crate::cli::Args) {
        fn set_if_some<T>(dst: &mut T, v: Option<T>) {
            if let Some(v) = v {
                *dst = v;
            }
        }

        set_if_some(&mut self.feed_url, args.feed_url);
        set_if_some(&mut self.store.base_url, args.store_url);
        set_if_some(&mut self.store.token, args.store_token.map(Some));
    }
}

pub fn load(search_paths: &[PathBuf]) -> Result<Config> {
    for path in search_paths {
        debug!("Trying to load {}", path.display());
        let mut contents = String::new();

        {
            let mut f = match File::open(path) {
                Ok(f) => f,

                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(file = %path.display(), "File not found, skipping");
                    continue;
                }

                Err(e) => {
                    return Err(e)
                        .context(anyhow!("could not load a config file `{}`", path.display()));
                }
            };

            f.read_to_string(&mut contents).with_context(|| {
                anyhow!(
                    "could not read the contents of a config file `{}`",
                    path.display()
                )
            })?;
        }

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| anyhow!("could not load the config file `{}`", path.display()))?;

        info!("Loaded a config file `{}`", path.display());

        return Ok(cfg);
    }

    bail!(
        "no config file found (searched: {})",
        search_paths
            .iter()
            .map(|path| format!("`{}`", path.display()))
            .collect::<Vec<_>>()
            .join(", ")
    );
}
