//! Atom tag-feed parsing.
//!
//! Forges publish their tags as an Atom feed at `{repo}/tags.atom`. XML
//! serializes a one-element list the same way as a bare element, so single
//! and repeated `<entry>`/`<link>` elements must both land in the same
//! `Vec`-shaped fields.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::FeedError;

/// A parsed Atom feed of repository tags.
#[derive(Debug, Clone, Deserialize)]
pub struct AtomFeed {
    /// e.g. `tag:github.com,2008:https://github.com/Magic-Loupe/PetStore/releases`
    pub id: String,
    pub title: String,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub link: Vec<FeedLink>,
    #[serde(default, rename = "entry")]
    pub entries: Vec<FeedEntry>,
}

/// One `<entry>` element: a published tag.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    /// e.g. `tag:github.com,2008:Repository/584868941/0.0.2`
    pub id: String,
    /// The tag name, e.g. `0.0.2`
    pub title: String,
    /// e.g. `2023-01-03T20:28:34Z`
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub link: Vec<FeedLink>,
}

/// A `<link>` element.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedLink {
    /// e.g. `text/html`
    #[serde(default, rename = "@type")]
    pub kind: Option<String>,
    /// e.g. `alternate`
    #[serde(default, rename = "@rel")]
    pub rel: Option<String>,
    #[serde(rename = "@href")]
    pub href: String,
}

/// Parses the given XML as an Atom feed.
///
/// Malformed XML and missing required fields are hard errors; entries are
/// never silently dropped.
pub fn parse(xml: &str) -> Result<AtomFeed, FeedError> {
    Ok(quick_xml::de::from_str(xml)?)
}
