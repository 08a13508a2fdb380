use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::encoding::Decoder;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use super::record::Feed;
use super::state::FeedStateMachine;
use super::tags::TagWhitelist;
use super::validate::{validate, ValidatedInput, ValidationError};

/// Errors surfaced by [`FeedParser`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// The buffer was rejected before any parsing started.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The XML reader failed mid-stream. No partial feed is returned.
    #[error("parse exception: {0}")]
    Parse(String),

    /// The feed file could not be opened.
    #[error("Failed to read feed: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses RSS documents into [`Feed`] values using an injected tag whitelist.
///
/// Holds no per-parse state: every call builds its own state machine, so one
/// parser can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct FeedParser {
    whitelist: TagWhitelist,
}

impl FeedParser {
    pub fn new(whitelist: TagWhitelist) -> Self {
        Self { whitelist }
    }

    /// Validates `bytes` and parses them.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Invalid`] if the buffer fails the pre-checks
    /// - [`FeedError::Parse`] if the XML is malformed anywhere in the stream
    pub fn parse(&self, bytes: &[u8]) -> Result<Feed, FeedError> {
        let input = validate(bytes).map_err(|e| {
            tracing::debug!(len = bytes.len(), error = %e, "Rejected feed buffer");
            e
        })?;
        self.parse_validated(input)
    }

    pub fn parse_validated(&self, input: ValidatedInput<'_>) -> Result<Feed, FeedError> {
        self.parse_reader(input.as_bytes())
    }

    /// Parses an already open stream without the buffer pre-checks, which
    /// need the whole document up front.
    pub fn parse_reader<R: BufRead>(&self, source: R) -> Result<Feed, FeedError> {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().expand_empty_elements = true;

        let mut machine = FeedStateMachine::new(self.whitelist.clone());
        let mut buf = Vec::new();
        let mut depth: usize = 0;
        let mut root_closed = false;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                FeedError::Parse(format!("{} (at byte {})", e, reader.buffer_position()))
            })?;
            let decoder = reader.decoder();

            match event {
                Event::Start(e) => {
                    if root_closed {
                        return Err(FeedError::Parse(format!(
                            "element after the document root (at byte {})",
                            reader.buffer_position()
                        )));
                    }
                    // Attributes are only checked when iterated.
                    for attr in e.attributes().with_checks(true) {
                        attr.map_err(|err| FeedError::Parse(err.to_string()))?;
                    }
                    depth += 1;
                    machine.open(&decode(decoder, e.name().as_ref())?);
                }
                Event::End(e) => {
                    depth = depth.saturating_sub(1);
                    root_closed = depth == 0;
                    machine.close(&decode(decoder, e.name().as_ref())?);
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| FeedError::Parse(err.to_string()))?;
                    if depth == 0 {
                        if !text.trim().is_empty() {
                            return Err(FeedError::Parse(
                                "text outside the document root".to_string(),
                            ));
                        }
                    } else {
                        machine.characters(&text);
                    }
                }
                Event::CData(e) => {
                    if depth == 0 {
                        return Err(FeedError::Parse(
                            "CDATA outside the document root".to_string(),
                        ));
                    }
                    machine.characters(&decode(decoder, &e)?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        // The reader checks end names but not that everything was closed.
        if depth > 0 {
            return Err(FeedError::Parse(format!(
                "unexpected end of document with {} unclosed element(s)",
                depth
            )));
        }

        let feed = machine.finish();
        tracing::debug!(
            items = feed.len(),
            has_channel = feed.channel().is_some(),
            "Parsed feed"
        );
        Ok(feed)
    }

    /// Opens `path` and parses it as a stream (no buffer pre-checks).
    pub fn parse_file(&self, path: &Path) -> Result<Feed, FeedError> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }
}

/// Validates and parses `bytes` with the default RSS whitelist.
pub fn parse_feed(bytes: &[u8]) -> Result<Feed, FeedError> {
    FeedParser::default().parse(bytes)
}

/// Decodes names and CDATA with the encoding the document declared.
fn decode(decoder: Decoder, bytes: &[u8]) -> Result<Cow<'_, str>, FeedError> {
    decoder
        .decode(bytes)
        .map_err(|e| FeedError::Parse(e.to_string()))
}
