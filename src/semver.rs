//! Dotted version parsing and the minor-compatibility rule.
//!
//! Forge tags use shapes the `semver` crate cannot represent (a `v` or
//! `release-` prefix, four-plus dotted components), so versions are parsed
//! into a plain field-wise comparable struct instead.

use std::fmt;

/// A version component after the `major.minor.patch` core.
///
/// Numeric components compare numerically and order before alphanumeric
/// ones, which compare lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identifier {
    Numeric(u64),
    Alpha(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{n}"),
            Identifier::Alpha(s) => f.write_str(s),
        }
    }
}

/// A parsed dotted version: `major.minor.patch` plus any further components.
///
/// Ordering is field-wise over `(major, minor, patch)` and then
/// lexicographic over the remaining components, so `1.2.3 < 1.2.3.1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    extra: Vec<Identifier>,
}

impl SemVer {
    /// Sentinel comparing greater than every parsed version. Used as the
    /// baseline when no installed version is known; under
    /// [`minor_compatible`](Self::minor_compatible) it accepts nothing,
    /// keeping the major-version gate closed.
    pub const MAX: SemVer = SemVer {
        major: u64::MAX,
        minor: u64::MAX,
        patch: u64::MAX,
        extra: Vec::new(),
    };

    /// Parses a dotted version string, tolerating a leading non-digit prefix
    /// such as `v` or `release-`.
    ///
    /// Requires `N.N.N`, optionally followed by further dot-separated
    /// numeric or alphanumeric components. Returns `None` for any other
    /// shape; callers must treat unparsable tags as "no version", not as an
    /// error.
    pub fn parse(version: &str) -> Option<SemVer> {
        let digits_at = version.find(|c: char| c.is_ascii_digit())?;
        let mut parts = version[digits_at..].split('.');

        let major = numeric(parts.next()?)?;
        let minor = numeric(parts.next()?)?;
        let patch = numeric(parts.next()?)?;

        let mut extra = Vec::new();
        for part in parts {
            extra.push(identifier(part)?);
        }

        Some(SemVer {
            major,
            minor,
            patch,
            extra,
        })
    }

    /// True when `self` is on the same major line as `other` at the same or
    /// a newer minor. Patch levels are ignored, and the relation is not
    /// symmetric: a newer installed minor is compatible with an older
    /// required one, but not vice versa.
    pub fn minor_compatible(&self, other: &SemVer) -> bool {
        self.major == other.major && self.minor >= other.minor
    }

    /// Components beyond `major.minor.patch`.
    pub fn extra(&self) -> &[Identifier] {
        &self.extra
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for id in &self.extra {
            write!(f, ".{id}")?;
        }
        Ok(())
    }
}

fn numeric(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn identifier(part: &str) -> Option<Identifier> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    if part.bytes().all(|b| b.is_ascii_digit())
        && let Ok(n) = part.parse()
    {
        return Some(Identifier::Numeric(n));
    }
    Some(Identifier::Alpha(part.to_string()))
}
