//! Value types identifying the refs a repository publishes.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::semver::SemVer;

/// The kind of a git ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// An immutable tag
    Tag,
    /// A mutable branch head
    Branch,
}

impl RefKind {
    /// Returns the string representation of the ref kind, as used for the
    /// on-disk cache directory names.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::Tag => "tag",
            RefKind::Branch => "branch",
        }
    }
}

impl std::str::FromStr for RefKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(RefKind::Tag),
            "branch" => Ok(RefKind::Branch),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named pointer to a repository state: a tag or a branch.
///
/// The name is never empty; every constructor rejects empty names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ref {
    kind: RefKind,
    name: String,
}

impl Ref {
    /// Creates a ref of the given kind. Returns `None` for an empty name.
    pub fn new(kind: RefKind, name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            return None;
        }
        Some(Self { kind, name })
    }

    /// Creates a tag ref. Returns `None` for an empty name.
    pub fn tag(name: impl Into<String>) -> Option<Self> {
        Self::new(RefKind::Tag, name)
    }

    /// Creates a branch ref. Returns `None` for an empty name.
    pub fn branch(name: impl Into<String>) -> Option<Self> {
        Self::new(RefKind::Branch, name)
    }

    /// Reconstructs a ref from its `(kind, name)` string pair, the shape it
    /// has on disk. Returns `None` when the kind string is neither `"tag"`
    /// nor `"branch"`, or the name is empty.
    pub fn from_parts(kind: &str, name: &str) -> Option<Self> {
        let kind = kind.parse::<RefKind>().ok()?;
        Self::new(kind, name)
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// If this is a tag and the name is a semantic version, returns it.
    /// Branches and non-semver tags have no version.
    pub fn semver(&self) -> Option<SemVer> {
        match self.kind {
            RefKind::Tag => SemVer::parse(&self.name),
            RefKind::Branch => None,
        }
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// A ref together with its feed publication time, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefInfo {
    pub reference: Ref,
    /// Absent for synthetic entries, e.g. caller-supplied branches that have
    /// no feed entry.
    pub published_at: Option<DateTime<Utc>>,
}

impl RefInfo {
    pub fn new(reference: Ref, published_at: Option<DateTime<Utc>>) -> Self {
        Self {
            reference,
            published_at,
        }
    }
}
