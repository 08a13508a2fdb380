//! Cheap pre-checks run on a fetched buffer before any XML reader is built.
//!
//! These are fast-reject filters for truncated or non-XML responses. Passing
//! them says nothing about well-formedness; the XML reader still decides that.

use thiserror::Error;

/// Buffers shorter than this are treated as truncated responses.
pub const MIN_FEED_LEN: usize = 100;

const XML_PREFIX: &[u8] = b"<?xml";

/// Number of trailing bytes searched for the closing `rss` marker.
const TAIL_LEN: usize = 10;
const TAIL_MARKER: &str = "rss";

/// Reasons a buffer is rejected before parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("response=null")]
    EmptyInput,

    /// Carries the buffer decoded as text so the bad response can be logged.
    #[error("response={0}")]
    TooShort(String),

    #[error("response does not contain valid xml")]
    NotXml,

    #[error("response incomplete")]
    IncompleteFeed,
}

/// A buffer that passed [`validate`]. Only obtainable through validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedInput<'a> {
    bytes: &'a [u8],
}

impl<'a> ValidatedInput<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Runs the pre-checks in order: empty, too short, missing `<?xml` prefix,
/// missing `rss` near the end.
pub fn validate(bytes: &[u8]) -> Result<ValidatedInput<'_>, ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    if bytes.len() < MIN_FEED_LEN {
        return Err(ValidationError::TooShort(
            String::from_utf8_lossy(bytes).into_owned(),
        ));
    }
    if !bytes.starts_with(XML_PREFIX) {
        return Err(ValidationError::NotXml);
    }

    let tail = String::from_utf8_lossy(&bytes[bytes.len() - TAIL_LEN..]);
    if !tail.contains(TAIL_MARKER) {
        return Err(ValidationError::IncompleteFeed);
    }

    Ok(ValidatedInput { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn padded(body: &str) -> Vec<u8> {
        let mut doc = String::from(r#"<?xml version="1.0"?><rss version="2.0"><channel>"#);
        doc.push_str(body);
        while doc.len() < MIN_FEED_LEN {
            doc.push(' ');
        }
        doc.push_str("</channel></rss>");
        doc.into_bytes()
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(validate(b"").unwrap_err(), ValidationError::EmptyInput);
    }

    #[test]
    fn test_short_carries_content() {
        let err = validate(b"<html>503</html>").unwrap_err();
        assert_eq!(err, ValidationError::TooShort("<html>503</html>".to_string()));
        assert_eq!(err.to_string(), "response=<html>503</html>");
    }

    #[test]
    fn test_exactly_min_len_is_not_too_short() {
        let mut doc = b"<?xml".to_vec();
        doc.resize(MIN_FEED_LEN - 3, b' ');
        doc.extend_from_slice(b"rss");
        assert_eq!(doc.len(), MIN_FEED_LEN);
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn test_missing_prolog_rejected() {
        let mut doc = b"<rss version=\"2.0\"><channel>".to_vec();
        doc.resize(MIN_FEED_LEN, b' ');
        doc.extend_from_slice(b"</channel></rss>");
        assert_eq!(validate(&doc).unwrap_err(), ValidationError::NotXml);
    }

    #[test]
    fn test_leading_whitespace_is_not_xml() {
        let doc = [b"  ".as_slice(), &padded("")].concat();
        assert_eq!(validate(&doc).unwrap_err(), ValidationError::NotXml);
    }

    #[test]
    fn test_truncated_tail_rejected() {
        let mut doc = padded("<title>x</title>");
        doc.truncate(doc.len() - 6);
        assert_eq!(validate(&doc).unwrap_err(), ValidationError::IncompleteFeed);
    }

    #[test]
    fn test_tail_with_trailing_newline_accepted() {
        let mut doc = padded("");
        doc.extend_from_slice(b"\n");
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn test_valid_input_borrows_buffer() {
        let doc = padded("<title>ok</title>");
        let validated = validate(&doc).unwrap();
        assert_eq!(validated.as_bytes(), doc.as_slice());
    }

    proptest! {
        #[test]
        fn prop_short_buffers_always_too_short(bytes in proptest::collection::vec(any::<u8>(), 1..MIN_FEED_LEN)) {
            prop_assert!(matches!(validate(&bytes), Err(ValidationError::TooShort(_))));
        }

        #[test]
        fn prop_wrong_prefix_is_not_xml(
            first in any::<u8>().prop_filter("not '<'", |b| *b != b'<'),
            rest in proptest::collection::vec(any::<u8>(), MIN_FEED_LEN..400),
        ) {
            let mut bytes = vec![first];
            bytes.extend(rest);
            prop_assert_eq!(validate(&bytes).unwrap_err(), ValidationError::NotXml);
        }
    }
}
