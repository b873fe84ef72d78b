use reqwest::StatusCode;
use thiserror::Error;

/// A failure that aborts the whole synchronization run before any store
/// mutation is attempted.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not fetch the feed: {0}")]
    Feed(reqwest::Error),

    #[error("could not parse the feed: {0}")]
    Parse(rss::Error),

    #[error("could not list the externally sourced records: {0}")]
    List(StoreError),
}

/// A failure of a single store call. During reconciliation these are isolated
/// to the record that triggered them and collected into the run report.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not reach the store: {0}")]
    Transport(reqwest::Error),

    #[error("the store returned {status}: {detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("could not decode the store response: {0}")]
    Decode(reqwest::Error),
}
