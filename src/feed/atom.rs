//! Namespace-aware streaming parser for the arXiv Atom feed.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use super::{Feed, ATOM_NS, OPENSEARCH_NS};
use crate::error::{LoaderError, Result};
use crate::models::FeedEntry;

/// Elements the parser cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Entry,
    Id,
    Title,
    Link,
    TotalResults,
    StartIndex,
    ItemsPerPage,
    Other,
}

impl Tag {
    fn classify(resolved: &ResolveResult<'_>, local_name: &[u8]) -> Self {
        match resolved {
            ResolveResult::Bound(Namespace(ns)) if *ns == ATOM_NS.as_bytes() => match local_name {
                b"entry" => Tag::Entry,
                b"id" => Tag::Id,
                b"title" => Tag::Title,
                b"link" => Tag::Link,
                _ => Tag::Other,
            },
            ResolveResult::Bound(Namespace(ns)) if *ns == OPENSEARCH_NS.as_bytes() => {
                match local_name {
                    b"totalResults" => Tag::TotalResults,
                    b"startIndex" => Tag::StartIndex,
                    b"itemsPerPage" => Tag::ItemsPerPage,
                    _ => Tag::Other,
                }
            }
            _ => Tag::Other,
        }
    }

    fn is_counter(self) -> bool {
        matches!(self, Tag::TotalResults | Tag::StartIndex | Tag::ItemsPerPage)
    }
}

/// Parser state while walking the document
#[derive(Default)]
struct FeedBuilder {
    feed: Feed,
    /// Open elements
    depth: usize,
    root_seen: bool,
    /// Entry being built and the level of its `entry` element
    entry: Option<(FeedEntry, usize)>,
    /// Text-bearing element being captured and its level
    capture: Option<(Tag, usize)>,
    text: String,
}

impl FeedBuilder {
    fn open(&mut self, tag: Tag, element: &BytesStart<'_>, level: usize) -> Result<()> {
        if level == 1 {
            if self.root_seen {
                return Err(LoaderError::parse("junk after document element"));
            }
            self.root_seen = true;
        }

        let entry_level = self.entry.as_ref().map(|(_, entry_level)| *entry_level);
        match (entry_level, tag) {
            (None, Tag::Entry) => {
                self.entry = Some((FeedEntry::default(), level));
            }
            (Some(entry_level), Tag::Id | Tag::Title) if level == entry_level + 1 => {
                self.begin_capture(tag, level);
            }
            (Some(entry_level), Tag::Link) if level == entry_level + 1 => {
                // Last matching link wins
                if let (Some(href), Some((entry, _))) = (pdf_href(element)?, self.entry.as_mut()) {
                    entry.pdf_link = Some(href);
                }
            }
            (None, tag) if tag.is_counter() => self.begin_capture(tag, level),
            _ => {}
        }
        Ok(())
    }

    fn begin_capture(&mut self, tag: Tag, level: usize) {
        self.capture = Some((tag, level));
        self.text.clear();
    }

    fn close(&mut self, tag: Tag, level: usize) {
        if let Some((captured, capture_level)) = self.capture {
            if capture_level == level {
                self.finish_capture(captured);
                self.capture = None;
            }
        }

        if tag == Tag::Entry {
            if let Some((_, entry_level)) = self.entry {
                if entry_level == level {
                    if let Some((entry, _)) = self.entry.take() {
                        self.feed.entries.push(entry);
                    }
                }
            }
        }
    }

    fn finish_capture(&mut self, tag: Tag) {
        let text = self.text.trim();
        match tag {
            Tag::Id => {
                if let Some((entry, _)) = self.entry.as_mut() {
                    entry.id = text.to_string();
                }
            }
            Tag::Title => {
                if let Some((entry, _)) = self.entry.as_mut() {
                    let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    entry.title = (!title.is_empty()).then_some(title);
                }
            }
            Tag::TotalResults => self.feed.total_results = text.parse().ok(),
            Tag::StartIndex => self.feed.start_index = text.parse().ok(),
            Tag::ItemsPerPage => self.feed.items_per_page = text.parse().ok(),
            Tag::Entry | Tag::Link | Tag::Other => {}
        }
    }

    fn finish(self) -> Result<Feed> {
        if self.depth != 0 {
            return Err(LoaderError::parse(format!(
                "unexpected end of document with {} unclosed element(s)",
                self.depth
            )));
        }
        if !self.root_seen {
            return Err(LoaderError::parse("document has no root element"));
        }
        Ok(self.feed)
    }
}

/// `href` of a `link` whose `title` attribute is `pdf`.
fn pdf_href(element: &BytesStart<'_>) -> Result<Option<String>> {
    let is_pdf = match element.try_get_attribute("title")? {
        Some(title) => title.unescape_value()? == "pdf",
        None => false,
    };

    if !is_pdf {
        return Ok(None);
    }

    match element.try_get_attribute("href")? {
        Some(href) => Ok(Some(href.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Parse a complete feed body.
///
/// The whole document is checked for well-formedness before any entry is
/// handed out, so a truncated or malformed body never yields a partial page.
pub fn parse_feed(data: &[u8]) -> Result<Feed> {
    let mut reader = NsReader::from_reader(data);
    let mut buf = Vec::new();
    let mut builder = FeedBuilder::default();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) => {
                let tag = Tag::classify(&resolved, e.local_name().as_ref());
                builder.depth += 1;
                let level = builder.depth;
                builder.open(tag, e, level)?;
            }
            Event::Empty(ref e) => {
                let tag = Tag::classify(&resolved, e.local_name().as_ref());
                let level = builder.depth + 1;
                builder.open(tag, e, level)?;
                builder.close(tag, level);
            }
            Event::End(ref e) => {
                let tag = Tag::classify(&resolved, e.local_name().as_ref());
                let level = builder.depth;
                builder.close(tag, level);
                builder.depth = builder
                    .depth
                    .checked_sub(1)
                    .ok_or_else(|| LoaderError::parse("unmatched closing tag"))?;
            }
            Event::Text(ref e) => {
                if builder.depth == 0 {
                    if !e.iter().all(|b| b.is_ascii_whitespace()) {
                        return Err(LoaderError::parse("text outside of the document element"));
                    }
                } else {
                    let text = e.unescape()?;
                    if builder.capture.is_some() {
                        builder.text.push_str(&text);
                    }
                }
            }
            Event::CData(ref e) => {
                if builder.depth == 0 {
                    return Err(LoaderError::parse("CDATA outside of the document element"));
                }
                if builder.capture.is_some() {
                    builder.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    builder.finish()
}
