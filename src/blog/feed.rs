//! RSS 2.0 feed parsing.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use url::Url;

use crate::blog::types::{BlogError, BlogResult, Post};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

#[derive(Default)]
struct ItemBuilder {
    title: String,
    link: String,
    guid: String,
    pub_date: String,
    description: String,
    author: String,
    categories: Vec<String>,
}

impl ItemBuilder {
    fn push_text(&mut self, element: &[u8], text: &str) {
        match element {
            b"title" => self.title.push_str(text),
            b"link" => self.link.push_str(text),
            b"guid" => self.guid.push_str(text),
            b"pubDate" => self.pub_date.push_str(text),
            b"description" => self.description.push_str(text),
            b"dc:creator" | b"author" => self.author.push_str(text),
            b"category" => self.categories.push(text.trim().to_string()),
            _ => {}
        }
    }

    fn build(self) -> Option<Post> {
        let slug = slug_from_url(&self.link).or_else(|| {
            slug_from_url(&self.guid).or_else(|| {
                let guid = self.guid.trim();
                (!guid.is_empty() && Url::parse(guid).is_err()).then(|| guid.to_string())
            })
        })?;

        let date = parse_date(&self.pub_date);
        let author = self.author.trim();

        Some(Post {
            slug,
            title: self.title.trim().to_string(),
            link: self.link.trim().to_string(),
            date,
            date_modified: date,
            excerpt: plain_text(&self.description),
            author: (!author.is_empty()).then(|| author.to_string()),
            categories: self.categories.into_iter().filter(|c| !c.is_empty()).collect(),
        })
    }
}

/// Parse an RSS document into posts, in feed order.
pub fn parse_feed(xml: &str) -> BlogResult<Vec<Post>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut posts = Vec::new();
    let mut saw_channel = false;
    let mut item: Option<ItemBuilder> = None;
    let mut element: Option<Vec<u8>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"channel" => saw_channel = true,
                    b"item" => item = Some(ItemBuilder::default()),
                    other if item.is_some() => element = Some(other.to_vec()),
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(item), Some(element)) = (item.as_mut(), element.as_deref()) {
                    let text = t
                        .unescape()
                        .map_err(|e| BlogError::Parse(e.to_string()))?;
                    item.push_text(element, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(item), Some(element)) = (item.as_mut(), element.as_deref()) {
                    let bytes = c.into_inner();
                    item.push_text(element, &String::from_utf8_lossy(&bytes));
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(post) = item.take().and_then(ItemBuilder::build) {
                        posts.push(post);
                    }
                }
                element = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(BlogError::Parse(format!(
                    "at byte {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }

    if !saw_channel {
        return Err(BlogError::Parse("document has no <channel>".to_string()));
    }
    Ok(posts)
}

/// Last non-empty path segment of an absolute URL.
fn slug_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

fn plain_text(html: &str) -> String {
    let stripped = HTML_TAG.replace_all(html, " ");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}
