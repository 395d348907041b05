//! Track, fetch, and locally cache versioned module bundles published as
//! tagged or branched archives on a git forge (GitHub-, GitLab-, or
//! Gitea-style hosting).
//!
//! Given a repository URL, this crate enumerates the refs the forge
//! currently publishes, ranks them against an installed baseline version,
//! downloads and extracts the archive for a chosen ref into a per-ref cache
//! directory, and keeps an index of which refs are materialized locally.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌───────────────┐
//! │  ForgeSource │────▶│  Atom feed   │     │ ModuleManager │
//! │ (URLs, refs) │     │  (parsing)   │◀────│ (local cache) │
//! └──────────────┘     └──────────────┘     └───────────────┘
//!        │                                          │
//!        ▼                                          ▼
//! ┌──────────────┐                          ┌───────────────┐
//! │    Forge     │                          │    SemVer     │
//! │ (URL shapes) │                          │ (compat rule) │
//! └──────────────┘                          └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`source`]: per-forge URL derivation and tag-feed enumeration
//! - [`manager`]: per-repository cache of downloaded, extracted refs
//! - [`refs`]: tag/branch value types
//! - [`semver`]: dotted version parsing and the minor-compatibility rule
//! - [`config`]: cache locations and HTTP constants
//! - [`error`]: error types for feed, source, and cache operations

pub mod config;
pub mod error;
pub mod manager;
pub mod refs;
pub mod semver;
pub mod source;

pub use error::{CacheError, FeedError, SourceError};
pub use manager::{ModuleEvent, ModuleManager};
pub use refs::{Ref, RefInfo, RefKind};
pub use semver::SemVer;
pub use source::{Forge, ForgeSource, ModuleSource};
