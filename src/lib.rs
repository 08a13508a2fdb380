//! Streaming RSS ingestion.
//!
//! Validates a fetched buffer, drives quick-xml events through a small state
//! machine and returns a [`feed::Feed`]: one optional channel record and the
//! item records in document order.

pub mod config;
pub mod feed;
pub mod util;

pub use feed::{parse_feed, Feed, FeedError, FeedParser, TagWhitelist};
