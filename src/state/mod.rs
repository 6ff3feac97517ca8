//! State module for tracking scrape progress
//!
//! - `ScrapeStatus`: lifecycle of an article's preview scrape (pending, success, failed)

mod scrape_status;

pub use scrape_status::ScrapeStatus;
