//! Error types for feed parsing, ref enumeration, and cache management.
//!
//! Unparsable version strings are deliberately not an error: `SemVer::parse`
//! returns `None` and callers treat the tag as having no version.

use thiserror::Error;

/// Errors from parsing a forge's Atom tag feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Malformed feed: {0}")]
    Malformed(#[from] quick_xml::DeError),
}

/// Errors from deriving URLs or enumerating refs for a module source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} for URL: {url}")]
    Http { status: u16, url: String },

    #[error("Feed parse failed: {0}")]
    Feed(#[from] FeedError),

    #[error("Cannot derive URL for {repository}: {reason}")]
    InvalidRepository { repository: String, reason: String },
}

/// Errors from managing the local ref cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to extract archive: {0}")]
    Extract(#[from] zip::result::ZipError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
