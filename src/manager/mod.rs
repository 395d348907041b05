//! Local cache management for one repository's module refs.
//!
//! A [`ModuleManager`] owns the cache root for a single repository. It
//! refreshes the remote ref list from its [`ModuleSource`], scans the
//! `cache_root/{kind}/{name}` tree to know which refs are already extracted,
//! downloads and extracts archives on demand, and evicts cached refs.

mod extract;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{CacheError, SourceError};
use crate::refs::{Ref, RefInfo};
use crate::semver::SemVer;
use crate::source::ModuleSource;

/// Change notifications for presentation layers.
///
/// The manager carries no UI observation machinery; subscribers receive
/// these over a plain broadcast channel and re-read the accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleEvent {
    /// The remote ref list was replaced after a successful refresh.
    RemoteRefsUpdated,
    /// The local version index changed after a scan or removal.
    LocalVersionsChanged,
}

/// Capacity of the event channel; lagging subscribers lose old events.
const EVENT_CAPACITY: usize = 16;

/// Manages the local cache of downloaded refs for one repository.
///
/// All mutating operations take `&mut self`: the manager expects a single
/// logical owner, and a multi-writer environment must serialize access
/// itself. The on-disk cache outlives the manager and is rediscovered by
/// [`scan_local_cache`](Self::scan_local_cache) on the next construction.
pub struct ModuleManager<S: ModuleSource> {
    source: S,
    installed_version: Option<SemVer>,
    relative_path: Option<String>,
    cache_root: PathBuf,
    remote_refs: Vec<RefInfo>,
    local_versions: HashMap<Ref, PathBuf>,
    events: broadcast::Sender<ModuleEvent>,
    http: reqwest::Client,
}

impl<S: ModuleSource> ModuleManager<S> {
    /// Creates a manager rooted at `cache_root`.
    ///
    /// `installed_version` is the baseline the compatibility filter runs
    /// against; `relative_path` optionally locates the module entry inside
    /// an extracted ref.
    pub fn new(
        source: S,
        installed_version: Option<SemVer>,
        relative_path: Option<String>,
        cache_root: PathBuf,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            source,
            installed_version,
            relative_path,
            cache_root,
            remote_refs: Vec::new(),
            local_versions: HashMap::new(),
            events,
            http: reqwest::Client::builder()
                .timeout(config::HTTP_TIMEOUT)
                .user_agent(config::USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn installed_version(&self) -> Option<&SemVer> {
        self.installed_version.as_ref()
    }

    /// The last successfully fetched remote refs; empty until the first
    /// refresh succeeds.
    pub fn remote_refs(&self) -> &[RefInfo] {
        &self.remote_refs
    }

    /// The refs currently materialized on disk, keyed to their extraction
    /// directories.
    pub fn local_versions(&self) -> &HashMap<Ref, PathBuf> {
        &self.local_versions
    }

    /// Subscribes to change events. Events are only emitted when observable
    /// state actually changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ModuleEvent> {
        self.events.subscribe()
    }

    /// Fetches the current ref list from the source.
    ///
    /// On failure the previously known refs are left untouched; the error is
    /// surfaced to the caller, which owns any retry policy.
    pub async fn refresh(&mut self) -> Result<(), SourceError> {
        debug!("refreshing refs");
        match self.source.refs().await {
            Ok(refs) => {
                info!("fetched {} refs", refs.len());
                self.remote_refs = refs;
                let _ = self.events.send(ModuleEvent::RemoteRefsUpdated);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "refresh failed, keeping {} known refs: {}",
                    self.remote_refs.len(),
                    e
                );
                Err(e)
            }
        }
    }

    /// The most recent remote tag whose version is minor-compatible with
    /// the installed baseline.
    ///
    /// Branches and non-semver tags never qualify. With no baseline the
    /// [`SemVer::MAX`] sentinel keeps the major gate closed and nothing
    /// matches. Tags parsing to the same version are tie-broken by
    /// publication time, then by position in the fetched sequence, so the
    /// result is deterministic.
    pub fn latest_compatible_ref(&self) -> Option<RefInfo> {
        let baseline = self.installed_version.clone().unwrap_or(SemVer::MAX);
        self.remote_refs
            .iter()
            .filter_map(|info| info.reference.semver().map(|version| (version, info)))
            .filter(|(version, _)| version.minor_compatible(&baseline))
            .max_by(|(a, info_a), (b, info_b)| {
                a.cmp(b).then(info_a.published_at.cmp(&info_b.published_at))
            })
            .map(|(_, info)| info.clone())
    }

    /// The extraction directory for a ref: `cache_root/kind/name`, whether
    /// or not anything is extracted there.
    pub fn local_path_for(&self, reference: &Ref) -> PathBuf {
        self.cache_root
            .join(reference.kind().as_str())
            .join(reference.name())
    }

    /// Whether the ref is currently materialized in the local cache.
    pub fn has_local(&self, reference: &Ref) -> bool {
        self.local_versions.contains_key(reference)
    }

    /// The module entry inside an extracted ref, when the manager was built
    /// with a relative path.
    pub fn module_entry_path(&self, reference: &Ref) -> Option<PathBuf> {
        self.relative_path
            .as_ref()
            .map(|rel| self.local_path_for(reference).join(rel))
    }

    /// Rebuilds the local version index from the `cache_root/{kind}/{name}`
    /// tree.
    ///
    /// Directories that do not parse back into a ref are skipped silently,
    /// as are dot-prefixed entries (including orphaned staging directories).
    /// A missing cache root yields an empty index, not an error. No event is
    /// emitted when the rebuilt index equals the current one.
    pub fn scan_local_cache(&mut self) -> Result<(), CacheError> {
        let mut versions = HashMap::new();

        if self.cache_root.is_dir() {
            for kind_dir in list_dirs(&self.cache_root)? {
                let Some(kind) = file_name_str(&kind_dir) else {
                    continue;
                };
                for ref_dir in list_dirs(&kind_dir)? {
                    let reference =
                        file_name_str(&ref_dir).and_then(|name| Ref::from_parts(kind, name));
                    if let Some(reference) = reference {
                        versions.insert(reference, ref_dir);
                    }
                }
            }
        } else {
            debug!("no cache folder at {}", self.cache_root.display());
        }

        if versions != self.local_versions {
            debug!("local versions changed: {} refs", versions.len());
            self.local_versions = versions;
            let _ = self.events.send(ModuleEvent::LocalVersionsChanged);
        }
        Ok(())
    }

    /// Downloads and extracts the archive for `reference`, returning the
    /// extracted root.
    ///
    /// An already-extracted ref short-circuits without network activity
    /// unless `overwrite` is set, in which case the existing directory is
    /// deleted first. The archive is extracted into a staging directory and
    /// renamed into place, so an interrupted attempt never leaves a
    /// half-extracted ref at the target path. The index is rescanned from
    /// disk whether or not the download succeeds, and errors propagate to
    /// the caller after that rescan.
    pub async fn download_and_extract(
        &mut self,
        reference: &Ref,
        overwrite: bool,
    ) -> Result<PathBuf, CacheError> {
        let target = self.local_path_for(reference);
        if target.exists() {
            if overwrite {
                info!("removing {}", target.display());
                fs::remove_dir_all(&target)?;
            } else {
                debug!("returning existing folder {}", target.display());
                return Ok(target);
            }
        }

        let result = self.fetch_into(reference, &target).await;

        // The index must reflect disk truth even after a failure.
        if let Err(e) = self.scan_local_cache() {
            warn!("rescan after download failed: {}", e);
        }

        result.map(|()| target)
    }

    async fn fetch_into(&self, reference: &Ref, target: &Path) -> Result<(), CacheError> {
        let url = self.source.archive_url(reference)?;
        info!("downloading {} from {}", reference, url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(SourceError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }
        let bytes = response.bytes().await.map_err(SourceError::Network)?;
        debug!("downloaded {} bytes", bytes.len());

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        // Extract into a dot-prefixed staging directory (invisible to
        // scans), then move it into place in one step.
        let staging = tempfile::Builder::new()
            .prefix(".staging")
            .tempdir_in(&self.cache_root)?;
        extract::extract_archive(&bytes, staging.path())?;
        fs::rename(staging.keep(), target)?;

        info!("extracted to {}", target.display());
        Ok(())
    }

    /// Removes the ref's extracted directory and drops exactly that index
    /// entry, skipping the full rescan.
    ///
    /// A failed deletion propagates with the entry left in place, so the
    /// index stays consistent with disk either way.
    pub fn remove_local(&mut self, reference: &Ref) -> Result<(), CacheError> {
        let path = self.local_path_for(reference);
        info!("removing folder {}", path.display());
        fs::remove_dir_all(&path)?;

        if self.local_versions.remove(reference).is_some() {
            let _ = self.events.send(ModuleEvent::LocalVersionsChanged);
        }
        Ok(())
    }
}

/// Lists the non-hidden subdirectories of `dir`.
fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, CacheError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}
