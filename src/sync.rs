use std::collections::{HashMap, HashSet};

use tracing::{error, info, warn};

use crate::error::FetchError;
use crate::feed::FeedClient;
use crate::normalize::normalize;
use crate::report::RunReport;
use crate::store::{RecordFields, StoreClient, StoredRecord};

/// Brings the store's externally sourced records into agreement with the
/// current feed snapshot.
///
/// Both sides are re-fetched in full on every run and diffed by external URL;
/// there is no cross-run state. Re-running against an unchanged feed performs
/// zero writes, and a run interrupted halfway re-derives the correct diff the
/// next time around.
pub struct Reconciler {
    feed: FeedClient,
    store: StoreClient,
}

impl Reconciler {
    pub fn new(feed: FeedClient, store: StoreClient) -> Self {
        Self { feed, store }
    }

    /// Runs one synchronization pass.
    ///
    /// Only a failure to fetch either snapshot aborts the pass; every store
    /// write failure is isolated to its record, collected into the report,
    /// and the pass moves on. Creates and updates happen in feed order,
    /// deletes afterwards.
    pub async fn run(&self) -> Result<RunReport, FetchError> {
        let entries = self.feed.fetch().await?;
        let existing = self.store.list_external().await?;

        info!(
            "Reconciling {} feed entries against {} stored records",
            entries.len(),
            existing.len()
        );

        let existing_by_url: HashMap<&str, &StoredRecord> = existing
            .iter()
            .map(|record| (record.external_url.as_str(), record))
            .collect();

        let mut report = RunReport::default();
        let mut seen = HashSet::new();

        for fields in dedup_by_url(entries.iter().map(normalize)) {
            seen.insert(fields.external_url.clone());

            match existing_by_url.get(fields.external_url.as_str()) {
                Some(record) if record.differs_from(&fields) => {
                    info!("Updating record {} for `{}`", record.id, fields.external_url);

                    match self.store.update(&record.id, &fields).await {
                        Ok(_) => report.updated += 1,

                        Err(e) => {
                            error!("Could not update `{}`: {e}", fields.external_url);
                            report.record_failure(&fields.external_url, &e);
                        }
                    }
                }

                // Already in sync; don't touch it.
                Some(_) => {}

                None => {
                    info!("Creating a record for `{}`", fields.external_url);

                    match self.store.create(&fields).await {
                        Ok(_) => report.created += 1,

                        Err(e) => {
                            error!("Could not create `{}`: {e}", fields.external_url);
                            report.record_failure(&fields.external_url, &e);
                        }
                    }
                }
            }
        }

        for record in &existing {
            if seen.contains(&record.external_url) {
                continue;
            }

            info!(
                "Deleting record {}: `{}` is gone from the feed",
                record.id, record.external_url
            );

            match self.store.delete(&record.id).await {
                Ok(()) => report.deleted += 1,

                Err(e) => {
                    error!("Could not delete `{}`: {e}", record.external_url);
                    report.record_failure(&record.external_url, &e);
                }
            }
        }

        Ok(report)
    }
}

/// Collapses entries sharing an external URL to the last occurrence, keeping
/// the feed position of the first. The URL is the correlation key, so letting
/// duplicates through would issue conflicting writes for the same record.
fn dedup_by_url(records: impl Iterator<Item = RecordFields>) -> Vec<RecordFields> {
    let mut result: Vec<RecordFields> = vec![];
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for fields in records {
        match index_of.get(&fields.external_url) {
            Some(&i) => {
                warn!(
                    "The feed lists `{}` more than once; keeping the last occurrence",
                    fields.external_url
                );
                result[i] = fields;
            }

            None => {
                index_of.insert(fields.external_url.clone(), result.len());
                result.push(fields);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(url: &str, title: &str) -> RecordFields {
        RecordFields {
            title: title.into(),
            description: String::new(),
            external_url: url.into(),
            content: None,
            date_created: None,
        }
    }

    #[test]
    fn dedup_keeps_last_occurrence_in_first_position() {
        let deduped = dedup_by_url(
            [
                fields("https://e.com/a", "A1"),
                fields("https://e.com/b", "B"),
                fields("https://e.com/a", "A2"),
            ]
            .into_iter(),
        );

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].external_url, "https://e.com/a");
        assert_eq!(deduped[0].title, "A2");
        assert_eq!(deduped[1].title, "B");
    }

    #[test]
    fn dedup_passes_unique_entries_through() {
        let deduped = dedup_by_url(
            [fields("https://e.com/a", "A"), fields("https://e.com/b", "B")].into_iter(),
        );

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "A");
        assert_eq!(deduped[1].title, "B");
    }
}
