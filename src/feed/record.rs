use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use sha2::{Digest, Sha256};
use url::Url;

/// Field name -> trimmed text value, shared by channel and item records.
///
/// Only the state machine writes fields, and only for whitelisted names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A later element with the same name replaces the earlier value.
    pub(crate) fn set(&mut self, name: &str, value: String) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn link(&self) -> Option<&str> {
        self.get("link")
    }

    pub fn description(&self) -> Option<&str> {
        self.get("description")
    }

    pub fn author(&self) -> Option<&str> {
        self.get("author").or_else(|| self.get("dc:creator"))
    }

    pub fn pub_date(&self) -> Option<&str> {
        self.get("pubDate").or_else(|| self.get("dc:date"))
    }

    pub fn language(&self) -> Option<&str> {
        self.get("language")
    }

    pub fn category(&self) -> Option<&str> {
        self.get("category").or_else(|| self.get("dc:subject"))
    }
}

/// Metadata describing the feed as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelRecord {
    pub fields: Record,
    /// Text of `channel/image/url`, kept apart from `fields`.
    pub image: Option<String>,
}

impl ChannelRecord {
    pub fn title(&self) -> Option<&str> {
        self.fields.title()
    }

    pub fn link(&self) -> Option<&str> {
        self.fields.link()
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.description()
    }

    /// The image URL if it is absolute and well formed.
    pub fn image_url(&self) -> Option<Url> {
        self.image.as_deref().and_then(|s| Url::parse(s).ok())
    }
}

/// One entry of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub fields: Record,
}

impl ItemRecord {
    pub fn title(&self) -> Option<&str> {
        self.fields.title()
    }

    pub fn link(&self) -> Option<&str> {
        self.fields.link()
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.description()
    }

    /// The declared guid, or the link when the item has no usable guid.
    pub fn guid(&self) -> Option<&str> {
        non_blank(self.fields.get("guid")).or_else(|| non_blank(self.fields.link()))
    }

    /// Identity for de-duplication: the guid when there is one, otherwise a
    /// SHA-256 over `link|title|pubDate`.
    pub fn stable_id(&self) -> String {
        if let Some(guid) = self.guid() {
            return guid.to_string();
        }

        let input = format!(
            "{}|{}|{}",
            self.fields.link().unwrap_or(""),
            self.fields.title().unwrap_or(""),
            self.fields.pub_date().unwrap_or("")
        );
        let hash = Sha256::digest(input.as_bytes());
        format!("{:x}", hash)
    }

    /// `pubDate` (or `dc:date`) as a timestamp. RSS 2.0 uses RFC 2822, RDF
    /// feeds use W3C-DTF which is accepted as RFC 3339.
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.fields.pub_date()?;
        DateTime::parse_from_rfc2822(raw)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
    }

    pub fn link_url(&self) -> Option<Url> {
        self.fields.link().and_then(|s| Url::parse(s).ok())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The parse result: an optional channel and items in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feed {
    channel: Option<ChannelRecord>,
    items: Vec<ItemRecord>,
}

impl Feed {
    pub fn channel(&self) -> Option<&ChannelRecord> {
        self.channel.as_ref()
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemRecord> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn image(&self) -> Option<&str> {
        self.channel.as_ref().and_then(|c| c.image.as_deref())
    }

    pub fn find_by_link(&self, link: &str) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.link() == Some(link))
    }

    pub fn find_by_guid(&self, guid: &str) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.guid() == Some(guid))
    }

    pub(crate) fn set_channel(&mut self, channel: ChannelRecord) {
        self.channel = Some(channel);
    }

    pub(crate) fn push_item(&mut self, item: ItemRecord) {
        self.items.push(item);
    }
}

impl<'a> IntoIterator for &'a Feed {
    type Item = &'a ItemRecord;
    type IntoIter = std::slice::Iter<'a, ItemRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
