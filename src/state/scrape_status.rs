/// Scrape status definitions for tracking article preview progress
///
/// This module defines the states an article moves through while its
/// preview metadata is being scraped.
use std::fmt;

/// Represents the current scrape state of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeStatus {
    /// Article has been submitted but no scrape has completed yet
    Pending,

    /// Metadata was fetched and stored
    Success,

    /// The most recent scrape attempt failed
    Failed,
}

impl ScrapeStatus {
    /// Returns true if a failed article with `retry_count` attempts may be retried
    ///
    /// Eligibility is derived, never stored: it is recomputed from the status
    /// and retry count every time it is needed.
    pub fn is_retry_eligible(&self, retry_count: u32, max_retries: u32) -> bool {
        matches!(self, Self::Failed) && retry_count < max_retries
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}
