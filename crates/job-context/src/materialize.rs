use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::context::JobContext;
use crate::error::{JobContextError, Result};

/// Create `dir` and any missing parents. Succeeds if it already exists.
pub fn ensure_config_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        debug!("Creating config dir: {:?}", dir);
    }
    fs::create_dir_all(dir).map_err(|e| JobContextError::io(dir, e))
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_path(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Write every config map entry under the context's config dir.
///
/// Keys are joined onto the directory as-is; the payload is trusted.
#[instrument(skip(context), fields(config_dir = %context.config_dir))]
pub fn materialize_config(context: &JobContext, working_dir: &Path) -> Result<Vec<PathBuf>> {
    let config_dir = resolve_path(working_dir, &context.config_dir);
    ensure_config_dir(&config_dir)?;

    let mut written = Vec::with_capacity(context.config_map.len());
    for (name, contents) in &context.config_map {
        let path = config_dir.join(name);
        fs::write(&path, contents).map_err(|e| JobContextError::io(&path, e))?;
        debug!(bytes = contents.len(), "wrote {:?}", path);
        written.push(path);
    }
    info!(files = written.len(), "materialized config map");
    Ok(written)
}
