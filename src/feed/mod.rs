//! RSS ingestion: buffer pre-checks, the event-driven record builder, and the
//! parser that wires quick-xml onto it.
//!
//! - [`validate`] - fast rejection of empty, truncated or non-XML buffers
//! - [`state`] - the channel/item/image state machine
//! - [`record`] - channel, item and feed values
//! - [`tags`] - the whitelist of field names the parser extracts
//! - [`parser`] - the facade tying the above together
//!
//! # Example
//!
//! ```ignore
//! use rss_ingest::feed::{FeedParser, TagWhitelist};
//!
//! let parser = FeedParser::new(TagWhitelist::default());
//! let feed = parser.parse(&bytes)?;
//! for item in &feed {
//!     println!("{:?}", item.title());
//! }
//! ```

pub mod parser;
pub mod record;
pub mod state;
pub mod tags;
pub mod validate;

pub use parser::{parse_feed, FeedError, FeedParser};
pub use record::{ChannelRecord, Feed, ItemRecord, Record};
pub use state::FeedStateMachine;
pub use tags::{TagWhitelist, DEFAULT_TAGS};
pub use validate::{validate, ValidatedInput, ValidationError, MIN_FEED_LEN};
