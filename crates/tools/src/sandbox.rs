//! Path validation: confines tool file access to the source folder.
//!
//! Tools receive paths relative to the source root. A path is accepted only
//! if it resolves (after following symlinks) to a location inside that root.

use std::path::{Component, Path, PathBuf};

/// Error returned when path validation fails.
#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    #[error("Path '{path}' is outside the source folder")]
    OutsideRoot { path: String },

    #[error("Path traversal detected in '{path}'")]
    PathTraversal { path: String },

    #[error("Failed to canonicalize path '{path}': {reason}")]
    CanonicalizeFailed { path: String, reason: String },
}

/// Resolve `path` against `root`, rejecting anything that escapes it.
///
/// Returns the canonical path on success. The target itself need not exist
/// (writes create files), but its nearest existing ancestor must lie inside
/// the root.
pub fn resolve_in_root(root: &Path, path: &str) -> Result<PathBuf, PathValidationError> {
    let requested = Path::new(path);

    if requested
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(PathValidationError::PathTraversal { path: path.into() });
    }

    let canonical_root =
        root.canonicalize()
            .map_err(|e| PathValidationError::CanonicalizeFailed {
                path: root.display().to_string(),
                reason: e.to_string(),
            })?;

    let joined = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        canonical_root.join(requested)
    };

    let canonical = canonicalize_lenient(&joined).map_err(|e| {
        PathValidationError::CanonicalizeFailed {
            path: path.into(),
            reason: e.to_string(),
        }
    })?;

    if !canonical.starts_with(&canonical_root) {
        return Err(PathValidationError::OutsideRoot { path: path.into() });
    }

    Ok(canonical)
}

/// Canonicalize the longest existing prefix and re-append the missing tail.
fn canonicalize_lenient(path: &Path) -> std::io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut tail: Vec<std::ffi::OsString> = Vec::new();

    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    for part in tail.into_iter().rev() {
        resolved.push(part);
    }
    Ok(resolved)
}
