use std::sync::OnceLock;

use regex_lite::Regex;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;
use tracing::warn;

use crate::feed::FeedEntry;
use crate::store::RecordFields;

/// Maps a feed entry to the store's record shape. Total: a malformed date
/// degrades to an absent one, it never fails the entry.
pub fn normalize(entry: &FeedEntry) -> RecordFields {
    let description = entry
        .summary
        .as_deref()
        .or(entry.content.as_deref())
        .unwrap_or_default();

    RecordFields {
        title: entry.title.clone(),
        description: strip_tags(description),
        external_url: entry.url.clone(),
        content: None,
        date_created: entry.published.as_deref().and_then(parse_pub_date),
    }
}

fn strip_tags(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();

    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]+>").unwrap());

    tag.replace_all(text, "").trim().to_string()
}

fn parse_pub_date(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .inspect_err(|e| warn!("Could not parse the publication date `{raw}`: {e}"))
        .ok()
}
