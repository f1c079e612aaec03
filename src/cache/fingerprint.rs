// src/cache/fingerprint.rs

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::trace;

use crate::fs::FileSystem;

/// Marker hashed in place of a path that does not exist.
const ABSENT_MARKER: &str = "<absent>";

/// Hash the raw contents of a single file.
pub fn hash_file_contents(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("reading file for hashing: {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Fingerprint a single path.
///
/// - a file hashes its name together with its contents;
/// - a directory hashes its children, visited in name order so the result
///   does not depend on how the OS lists them;
/// - a missing path yields `None`.
pub fn fingerprint_path(fs: &dyn FileSystem, path: &Path) -> Result<Option<String>> {
    if !fs.exists(path) {
        return Ok(None);
    }

    if fs.is_dir(path) {
        let mut children = fs.read_dir(path)?;
        children.sort();
        let mut hasher = Hasher::new();
        for child in &children {
            hasher.update(entry_digest(fs, child)?.as_bytes());
        }
        trace!(path = ?path, children = children.len(), "fingerprinted directory");
        return Ok(Some(hasher.finalize().to_hex().to_string()));
    }

    let contents = hash_file_contents(fs, path)?;
    let mut hasher = Hasher::new();
    hasher.update(base_name(path).as_bytes());
    hasher.update(contents.as_bytes());
    Ok(Some(hasher.finalize().to_hex().to_string()))
}

/// Fingerprint an ordered list of paths.
///
/// Each path contributes its base name plus its own fingerprint, so renaming
/// a watched path changes the result. Missing paths contribute a fixed
/// marker rather than failing.
pub fn fingerprint_paths<I, P>(fs: &dyn FileSystem, paths: I) -> Result<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut hasher = Hasher::new();
    for path in paths {
        hasher.update(entry_digest(fs, path.as_ref())?.as_bytes());
    }
    Ok(hasher.finalize().to_hex().to_string())
}

fn entry_digest(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let inner = fingerprint_path(fs, path)?;
    let mut hasher = Hasher::new();
    hasher.update(base_name(path).as_bytes());
    hasher.update(inner.as_deref().unwrap_or(ABSENT_MARKER).as_bytes());
    Ok(hasher.finalize().to_hex().to_string())
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
