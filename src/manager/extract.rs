//! Archive extraction for downloaded module bundles.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::CacheError;

/// Extracts a downloaded zip archive into `dest`, stripping the single
/// top-level wrapper folder forge archives carry (`Repo-1.0.0/...`) so that
/// `dest` holds the repository files directly.
pub(crate) fn extract_archive(bytes: &[u8], dest: &Path) -> Result<(), CacheError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(path) = entry.enclosed_name() else {
            // entries escaping the destination are never extracted
            continue;
        };

        // Drop the wrapper component; the wrapper itself maps to `dest`,
        // which already exists.
        let stripped: PathBuf = path.components().skip(1).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(stripped);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    Ok(())
}
