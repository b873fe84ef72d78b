use reqwest::{Client, Url};
use rss::Channel;
use tracing::{info, warn};

use crate::error::FetchError;

/// One feed item, reduced to the fields the synchronizer cares about.
///
/// The publication date is kept as delivered; parsing it is the normalizer's
/// job and must not make an entry unusable.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub published: Option<String>,
}

impl FeedEntry {
    /// Converts a raw feed item. Items without a link are dropped: the link
    /// is the key that correlates an entry to a stored record, so an entry
    /// without one cannot take part in reconciliation.
    pub fn from_item(item: &rss::Item) -> Option<Self> {
        let Some(url) = item.link() else {
            warn!("Skipping a feed item without a link (title: {:?})", item.title());
            return None;
        };

        Some(FeedEntry {
            url: url.into(),
            title: item.title().unwrap_or_default().into(),
            summary: item.description().map(Into::into),
            content: item.content().map(Into::into),
            published: item.pub_date().map(Into::into),
        })
    }
}

pub struct FeedClient {
    http: Client,
    url: Url,
}

impl FeedClient {
    pub fn new(http: Client, url: Url) -> Self {
        Self { http, url }
    }

    pub async fn fetch(&self) -> Result<Vec<FeedEntry>, FetchError> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(FetchError::Feed)?;
        let body = response.bytes().await.map_err(FetchError::Feed)?;
        let channel = Channel::read_from(&body[..]).map_err(FetchError::Parse)?;

        let entries = channel
            .items()
            .iter()
            .filter_map(FeedEntry::from_item)
            .collect::<Vec<_>>();
        info!("Retrieved {} entries from `{}`", entries.len(), self.url);

        Ok(entries)
    }
}
