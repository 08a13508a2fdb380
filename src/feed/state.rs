//! Event-driven RSS builder.
//!
//! The machine knows nothing about XML syntax. It is fed element-open,
//! element-close and character events (qualified names, decoded text) and
//! grows a [`Feed`] as records close. The parser module adapts quick-xml
//! events onto it.

use super::record::{ChannelRecord, Feed, ItemRecord};
use super::tags::TagWhitelist;

const CHANNEL: &str = "channel";
const ITEM: &str = "item";
const IMAGE: &str = "image";
const IMAGE_URL: &str = "url";

/// Parse context plus the feed built so far.
#[derive(Debug)]
pub struct FeedStateMachine {
    whitelist: TagWhitelist,
    feed: Feed,

    in_channel: bool,
    in_image: bool,
    in_item: bool,

    channel: Option<ChannelRecord>,
    item: Option<ItemRecord>,

    text: String,
}

impl FeedStateMachine {
    /// A machine with no open context that stores only `whitelist` fields.
    pub fn new(whitelist: TagWhitelist) -> Self {
        Self {
            whitelist,
            feed: Feed::default(),
            in_channel: false,
            in_image: false,
            in_item: false,
            channel: None,
            item: None,
            text: String::new(),
        }
    }

    /// Element-open. `channel` and `item` start a fresh record, `image` marks
    /// the image context. Any other name leaves the state unchanged.
    pub fn open(&mut self, name: &str) {
        match name {
            CHANNEL => {
                self.channel = Some(ChannelRecord::default());
                self.in_channel = true;
            }
            ITEM => {
                if self.item.is_some() {
                    tracing::trace!("Discarding unfinished item at nested <item>");
                }
                self.item = Some(ItemRecord::default());
                self.in_item = true;
            }
            IMAGE => self.in_image = true,
            _ => {}
        }
    }

    /// Element-close, first match wins:
    ///
    /// 1. `channel` commits the channel record
    /// 2. `item` appends the item record
    /// 3. `image` leaves the image context
    /// 4. inside `channel/image`, a `url` sets the channel image
    /// 5. inside an item, a whitelisted name becomes an item field
    /// 6. inside the channel, a whitelisted name becomes a channel field
    ///
    /// Cases 4–6 drain and trim the text buffer even when nothing is stored.
    pub fn close(&mut self, name: &str) {
        match name {
            CHANNEL => {
                self.in_channel = false;
                if let Some(channel) = self.channel.take() {
                    self.feed.set_channel(channel);
                }
            }
            ITEM => {
                if let Some(item) = self.item.take() {
                    self.feed.push_item(item);
                }
                self.in_item = false;
            }
            IMAGE => self.in_image = false,
            _ if self.in_image && self.in_channel => {
                let value = self.drain_text();
                if name == IMAGE_URL {
                    if let Some(channel) = self.channel.as_mut() {
                        channel.image = Some(value);
                    }
                }
            }
            _ if self.in_item => {
                let value = self.drain_text();
                if self.whitelist.contains(name) {
                    if let Some(item) = self.item.as_mut() {
                        item.fields.set(name, value);
                    }
                } else {
                    tracing::trace!(tag = name, "Ignoring unrecognized item tag");
                }
            }
            _ if self.in_channel => {
                let value = self.drain_text();
                if self.whitelist.contains(name) {
                    if let Some(channel) = self.channel.as_mut() {
                        channel.fields.set(name, value);
                    }
                } else {
                    tracing::trace!(tag = name, "Ignoring unrecognized channel tag");
                }
            }
            _ => {}
        }
    }

    /// Buffers text while inside an item or the channel; dropped otherwise.
    pub fn characters(&mut self, text: &str) {
        if self.in_item || self.in_channel {
            self.text.push_str(text);
        }
    }

    /// Consumes the machine. Records still open at this point are dropped,
    /// only closed ones are part of the feed.
    pub fn finish(self) -> Feed {
        self.feed
    }

    fn drain_text(&mut self) -> String {
        let value = self.text.trim().to_string();
        self.text.clear();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn machine() -> FeedStateMachine {
        FeedStateMachine::new(TagWhitelist::default())
    }

    fn element(m: &mut FeedStateMachine, name: &str, text: &str) {
        m.open(name);
        m.characters(text);
        m.close(name);
    }

    #[test]
    fn test_channel_and_item_fields() {
        let mut m = machine();
        m.open("channel");
        element(&mut m, "title", "  Channel  ");
        m.open("item");
        element(&mut m, "title", "First");
        element(&mut m, "link", "https://example.com/1");
        m.close("item");
        m.close("channel");

        let feed = m.finish();
        assert_eq!(feed.channel().and_then(|c| c.title()), Some("Channel"));
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.items()[0].title(), Some("First"));
        assert_eq!(feed.items()[0].link(), Some("https://example.com/1"));
    }

    #[test]
    fn test_channel_fields_after_items_stay_on_channel() {
        let mut m = machine();
        m.open("channel");
        m.open("item");
        element(&mut m, "title", "Item");
        m.close("item");
        element(&mut m, "description", "About the channel");
        m.close("channel");

        let feed = m.finish();
        let channel = feed.channel().unwrap();
        assert_eq!(channel.description(), Some("About the channel"));
        assert_eq!(channel.title(), None);
        assert_eq!(feed.items()[0].description(), None);
    }

    #[test]
    fn test_image_url_kept_out_of_fields() {
        let mut m = machine();
        m.open("channel");
        m.open("image");
        element(&mut m, "url", "\n https://example.com/logo.png \n");
        element(&mut m, "title", "Logo");
        m.close("image");
        element(&mut m, "title", "Channel");
        m.close("channel");

        let feed = m.finish();
        let channel = feed.channel().unwrap();
        assert_eq!(channel.image.as_deref(), Some("https://example.com/logo.png"));
        assert_eq!(channel.fields.get("url"), None);
        assert_eq!(channel.title(), Some("Channel"));
    }

    #[test]
    fn test_unrecognized_tags_discarded() {
        let mut m = machine();
        m.open("channel");
        m.open("item");
        element(&mut m, "media:content", "secret");
        element(&mut m, "title", "Visible");
        m.close("item");
        m.close("channel");

        let feed = m.finish();
        let item = &feed.items()[0];
        assert_eq!(item.fields.len(), 1);
        assert!(item.fields.iter().all(|(_, v)| v != "secret"));
        assert_eq!(item.title(), Some("Visible"));
    }

    #[test]
    fn test_text_outside_records_ignored() {
        let mut m = machine();
        m.characters("stray");
        m.open("channel");
        element(&mut m, "title", "T");
        m.close("channel");

        assert_eq!(m.finish().channel().and_then(|c| c.title()), Some("T"));
    }

    #[test]
    fn test_item_outside_channel_is_collected() {
        // RSS 1.0 places items as siblings of the channel.
        let mut m = machine();
        m.open("rdf:RDF");
        m.open("channel");
        element(&mut m, "title", "RDF");
        m.close("channel");
        m.open("item");
        element(&mut m, "title", "Sibling");
        element(&mut m, "dc:date", "2003-06-10T04:00:00Z");
        m.close("item");
        m.close("rdf:RDF");

        let feed = m.finish();
        assert_eq!(feed.channel().and_then(|c| c.title()), Some("RDF"));
        assert_eq!(feed.items()[0].title(), Some("Sibling"));
        assert_eq!(
            feed.items()[0].fields.get("dc:date"),
            Some("2003-06-10T04:00:00Z")
        );
    }

    #[test]
    fn test_unclosed_item_not_visible() {
        let mut m = machine();
        m.open("channel");
        m.open("item");
        element(&mut m, "title", "Half");

        assert!(m.finish().is_empty());
    }

    #[test]
    fn test_items_keep_document_order() {
        let mut m = machine();
        m.open("channel");
        for title in ["a", "b", "c"] {
            m.open("item");
            element(&mut m, "title", title);
            m.close("item");
        }
        m.close("channel");

        let titles: Vec<_> = m.finish().iter().filter_map(|i| i.title()).map(String::from).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_custom_whitelist() {
        let mut m = FeedStateMachine::new(TagWhitelist::new(["link"]));
        m.open("channel");
        m.open("item");
        element(&mut m, "title", "dropped");
        element(&mut m, "link", "kept");
        m.close("item");
        m.close("channel");

        let feed = m.finish();
        assert_eq!(feed.items()[0].title(), None);
        assert_eq!(feed.items()[0].link(), Some("kept"));
    }
}
