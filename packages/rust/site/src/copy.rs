use std::fs;
use std::path::Path;

use gazette_shared::{GazetteError, Result};

/// Recursively copy `src` into `dst`, returning the number of files copied.
///
/// A missing `src` copies nothing.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if !src.exists() {
        return Ok(0);
    }

    fs::create_dir_all(dst).map_err(|e| GazetteError::build(dst, e))?;

    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(|e| GazetteError::build(src, e))? {
        let entry = entry.map_err(|e| GazetteError::build(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| GazetteError::build(&from, e))?;

        if file_type.is_dir() {
            copied += copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| GazetteError::build(&from, e))?;
            copied += 1;
        }
    }

    Ok(copied)
}
