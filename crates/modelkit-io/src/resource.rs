//! Bounded loading of model files and the resources they reference.

use std::fs;
use std::path::{Path, PathBuf};

use modelkit_core::{Buffer, ModelError, Result};
use tracing::debug;

/// Reads a model or motion file, refusing files larger than `limit` bytes.
pub fn read_model_file(path: &Path, limit: u64) -> Result<Buffer> {
    read_bounded(path, limit, |path, size, limit| ModelError::FileTooLarge {
        path,
        size,
        limit,
    })
}

/// Reads a texture file, refusing files larger than `limit` bytes.
pub fn read_texture_file(path: &Path, limit: u64) -> Result<Buffer> {
    read_bounded(path, limit, |path, size, limit| ModelError::TextureTooLarge {
        path,
        size,
        limit,
    })
}

fn read_bounded(
    path: &Path,
    limit: u64,
    too_large: impl FnOnce(PathBuf, u64, u64) -> ModelError,
) -> Result<Buffer> {
    let unreadable = |source| ModelError::ResourceUnreadable {
        path: path.to_path_buf(),
        source,
    };
    let size = fs::metadata(path).map_err(unreadable)?.len();
    if size > limit {
        return Err(too_large(path.to_path_buf(), size, limit));
    }
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    let buffer = Buffer::from_file(name, path, size).map_err(unreadable)?;
    debug!(path = %path.display(), size, mapped = buffer.is_mapped(), "read resource");
    Ok(buffer)
}

/// Joins a file-relative reference onto `base`. Both `/` and `\` separate components.
pub fn resolve_relative(base: &Path, reference: &str) -> PathBuf {
    reference
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .fold(base.to_path_buf(), |mut path, part| {
            path.push(part);
            path
        })
}
