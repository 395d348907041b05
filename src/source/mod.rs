//! Module sources: deriving archive URLs and enumerating published refs.

pub mod feed;
pub mod forge;

pub use forge::Forge;

#[cfg(test)]
use mockall::automock;

use tracing::debug;
use url::Url;

use crate::config;
use crate::error::SourceError;
use crate::refs::{Ref, RefInfo};
use crate::semver::SemVer;

/// Capability contract for one repository's module archive hosting.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ModuleSource: Send + Sync {
    /// The archive download URL for a ref; a pure function of the repository
    /// and the ref.
    fn archive_url(&self, reference: &Ref) -> Result<Url, SourceError>;

    /// Fetches the refs the forge currently publishes, in feed order.
    ///
    /// Hits the network on every call and never invents entries; callers
    /// own any caching policy. Only the GitHub tag-feed format is
    /// implemented — GitLab/Gitea branch refs must be supplied by the
    /// caller out of band.
    ///
    /// # Errors
    ///
    /// Propagates network failures and unparsable feed bodies.
    async fn refs(&self) -> Result<Vec<RefInfo>, SourceError>;

    /// All published tags that parse as semantic versions.
    async fn tag_versions(&self) -> Result<Vec<SemVer>, SourceError> {
        Ok(self
            .refs()
            .await?
            .iter()
            .filter_map(|info| info.reference.semver())
            .collect())
    }
}

/// A module source backed by a git forge's tag feed and archive endpoints.
pub struct ForgeSource {
    repository: Url,
    forge: Forge,
    http: reqwest::Client,
}

impl ForgeSource {
    /// Creates a source for the given repository URL, picking the URL
    /// strategy from its host.
    pub fn new(repository: Url) -> Self {
        let forge = Forge::detect(&repository);
        Self {
            repository,
            forge,
            http: reqwest::Client::builder()
                .timeout(config::HTTP_TIMEOUT)
                .user_agent(config::USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// The repository this source serves.
    pub fn repository(&self) -> &Url {
        &self.repository
    }

    /// The forge family hosting the repository.
    pub fn forge(&self) -> Forge {
        self.forge
    }

    /// The feed URL refs are enumerated from.
    pub fn feed_url(&self) -> Result<Url, SourceError> {
        self.forge.feed_url(&self.repository)
    }
}

#[async_trait::async_trait]
impl ModuleSource for ForgeSource {
    fn archive_url(&self, reference: &Ref) -> Result<Url, SourceError> {
        self.forge.archive_url(&self.repository, reference)
    }

    async fn refs(&self) -> Result<Vec<RefInfo>, SourceError> {
        let url = self.feed_url()?;
        debug!("fetching tag feed: {}", url);

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed = feed::parse(&body)?;
        Ok(parsed
            .entries
            .into_iter()
            .filter_map(|entry| {
                Ref::tag(entry.title).map(|tag| RefInfo::new(tag, Some(entry.updated)))
            })
            .collect())
    }
}
