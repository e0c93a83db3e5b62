//! Remote ICS feeds.
//!
//! `FeedClient` owns the fetch cycle, `parse` turns feed bodies into
//! occurrences and `transport` abstracts the HTTP download.

mod client;
mod parse;
mod snapshot;
mod transport;

pub use client::{FeedClient, SourceAdded};
pub use parse::parse_feed;
pub use snapshot::{FeedSnapshot, FeedStatus, SourceOutcome, SourceReport};
pub use transport::{FeedResponse, FeedTransport, HttpTransport};

#[cfg(test)]
pub(crate) use transport::fake;
