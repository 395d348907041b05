use std::path::PathBuf;
use std::time::Duration;

use url::Url;

// =============================================================================
// HTTP constants
// =============================================================================

/// Timeout for feed and archive requests.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request.
pub const USER_AGENT: &str = "forge-modules";

/// Returns the base data directory for forge-modules.
/// Uses $XDG_DATA_HOME/forge-modules if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/forge-modules,
/// or ./forge-modules if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default cache root for one repository: the data directory
/// followed by the repository host and path, e.g.
/// `~/.local/share/forge-modules/github.com/Org/Repo.git`.
///
/// Tagged refs of that repository extract beneath it as `tag/TAG/`, branch
/// refs as `branch/BRANCH/`.
pub fn cache_root_for(repository: &Url) -> PathBuf {
    let mut root = data_dir().join(repository.host_str().unwrap_or("host"));
    for segment in repository.path_segments().into_iter().flatten() {
        if !segment.is_empty() {
            root.push(segment);
        }
    }
    root
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("forge-modules")
}
