//! Per-forge URL derivation strategies.
//!
//! Each forge family has its own archive URL convention. Supporting a new
//! host means adding a variant here, not another branch at the call sites.

use url::Url;

use crate::error::SourceError;
use crate::refs::{Ref, RefKind};

/// The forge family hosting a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forge {
    /// `github.com` and its subdomains
    GitHub,
    /// `gitlab.com` and its subdomains
    GitLab,
    /// Everything else (Gitea-compatible hosts)
    Gitea,
}

impl Forge {
    /// Picks the URL strategy for a repository from its host. Hosts that are
    /// neither GitHub- nor GitLab-managed fall back to the Gitea shape.
    pub fn detect(repository: &Url) -> Forge {
        let host = repository.host_str().unwrap_or("");
        if host_matches(host, "github.com") {
            Forge::GitHub
        } else if host_matches(host, "gitlab.com") {
            Forge::GitLab
        } else {
            Forge::Gitea
        }
    }

    /// The archive download URL for the given ref.
    ///
    /// - GitHub: `{repo}/archive/refs/tags/{name}.zip` for tags,
    ///   `{repo}/archive/refs/heads/{name}.zip` for branches
    /// - GitLab: `{repo}/-/archive/{name}/{short}-{name}.zip`, identical for
    ///   tags and branches
    /// - Gitea: `{repo}/archive/{name}.zip`, identical for tags and branches
    pub fn archive_url(&self, repository: &Url, reference: &Ref) -> Result<Url, SourceError> {
        let repo = trimmed(repository);
        let name = reference.name();
        let raw = match self {
            Forge::GitHub => {
                let refs_dir = match reference.kind() {
                    RefKind::Tag => "tags",
                    RefKind::Branch => "heads",
                };
                format!("{repo}/archive/refs/{refs_dir}/{name}.zip")
            }
            Forge::GitLab => {
                let short =
                    short_name(repository).ok_or_else(|| SourceError::InvalidRepository {
                        repository: repository.to_string(),
                        reason: "missing repository path segment".to_string(),
                    })?;
                format!("{repo}/-/archive/{name}/{short}-{name}.zip")
            }
            Forge::Gitea => format!("{repo}/archive/{name}.zip"),
        };
        parse_derived(repository, &raw)
    }

    /// The tag feed URL: `{repo}/tags.atom` for every family.
    pub fn feed_url(&self, repository: &Url) -> Result<Url, SourceError> {
        parse_derived(repository, &format!("{}/tags.atom", trimmed(repository)))
    }
}

/// Case-insensitive exact-or-subdomain host match: `"." + host` must end
/// with `"." + domain`, so `www.github.com` matches `github.com` while
/// `notgithub.com` does not.
fn host_matches(host: &str, domain: &str) -> bool {
    format!(".{}", host.to_ascii_lowercase()).ends_with(&format!(".{domain}"))
}

/// The repository URL as a string with a trailing `.git` path extension
/// removed. Only `.git` is stripped, so repository names like `widgets.js`
/// survive.
fn trimmed(repository: &Url) -> String {
    let repo = repository.as_str().trim_end_matches('/');
    repo.strip_suffix(".git").unwrap_or(repo).to_string()
}

/// The short repository name: the path segment after the org, minus `.git`.
fn short_name(repository: &Url) -> Option<String> {
    let segment = repository.path_segments()?.nth(1)?;
    let segment = segment.strip_suffix(".git").unwrap_or(segment);
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

fn parse_derived(repository: &Url, raw: &str) -> Result<Url, SourceError> {
    Url::parse(raw).map_err(|e| SourceError::InvalidRepository {
        repository: repository.to_string(),
        reason: e.to_string(),
    })
}
