use std::collections::BTreeSet;
use std::sync::Arc;

/// Field names extracted from RSS 2.0 channels and items when no other
/// whitelist is configured.
pub const DEFAULT_TAGS: &[&str] = &[
    "title",
    "link",
    "description",
    "pubDate",
    "lastBuildDate",
    "guid",
    "author",
    "category",
    "comments",
    "copyright",
    "language",
    "source",
    "generator",
    "docs",
    "ttl",
    "managingEditor",
    "webMaster",
    "dc:date",
    "dc:creator",
    "dc:subject",
    "dc:publisher",
];

/// Tags that change parse context instead of carrying a value. They are never
/// stored as fields, even if a caller lists them.
pub(crate) const STRUCTURAL_TAGS: &[&str] = &["channel", "item", "image"];

/// The closed set of element names the parser turns into record fields.
///
/// Immutable once built. Cloning is cheap (shared `Arc`), so one whitelist can
/// back any number of parsers across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWhitelist {
    names: Arc<BTreeSet<String>>,
}

impl TagWhitelist {
    /// Builds a whitelist from qualified element names (`title`, `dc:date`).
    ///
    /// Blank names and structural tags are dropped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(|name| {
                let name: String = name.into();
                name.trim().to_string()
            })
            .filter(|name| !name.is_empty() && !STRUCTURAL_TAGS.contains(&name.as_str()))
            .collect();
        Self {
            names: Arc::new(names),
        }
    }

    /// Returns a new whitelist holding these names plus `extra`.
    pub fn extended<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let merged: Vec<String> = self
            .names
            .iter()
            .cloned()
            .chain(extra.into_iter().map(Into::into))
            .collect();
        Self::new(merged)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for TagWhitelist {
    fn default() -> Self {
        Self::new(DEFAULT_TAGS.iter().copied())
    }
}
