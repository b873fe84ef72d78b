use std::fmt;

use serde::Serialize;

use crate::error::StoreError;

/// The outcome of one synchronization run: operation counts plus the records
/// whose store call failed. Partial success is an expected outcome, not an
/// exceptional one.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub errors: Vec<SyncFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    pub url: String,
    pub message: String,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn record_failure(&mut self, url: &str, error: &StoreError) {
        self.errors.push(SyncFailure {
            url: url.into(),
            message: error.to_string(),
        });
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleted, {} failed",
            self.created,
            self.updated,
            self.deleted,
            self.errors.len()
        )?;

        for failure in &self.errors {
            write!(f, "\n  {}: {}", failure.url, failure.message)?;
        }

        Ok(())
    }
}
