//! # Path Utilities

use std::path::{Path, PathBuf};

use anyhow::bail;

/// Extend a path with context dirs and a file name.
///
/// Does not check or create anything on disk.
pub fn extend_path<P, S, F>(
    path: P,
    context: &[S],
    filename: F,
) -> PathBuf
where
    P: AsRef<Path>,
    S: AsRef<Path>,
    F: AsRef<Path>,
{
    let mut path = path.as_ref().to_path_buf();
    path.extend(context.iter().map(|s| s.as_ref()));
    path.push(filename.as_ref());
    path
}

/// Split a hub identifier (``"org/name"``) into cache path components.
///
/// Rejects empty identifiers, empty components, and ``"."`` / ``".."``,
/// so an identifier can never escape the cache directory.
pub fn identifier_context(identifier: &str) -> anyhow::Result<Vec<String>> {
    let parts: Vec<&str> = identifier.split('/').collect();
    for part in &parts {
        if part.is_empty() || *part == "." || *part == ".." || part.contains('\\') {
            bail!("invalid hub identifier: {identifier:?}");
        }
    }
    Ok(parts.into_iter().map(str::to_string).collect())
}
