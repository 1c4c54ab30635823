//! Template directory copy

use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::ReportError;

/// Recursively copy `src` into `dst`, creating `dst` and every subdirectory.
/// Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize, ReportError> {
    if !src.is_dir() {
        return Err(ReportError::TemplateMissing(src.to_path_buf()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|source| ReportError::Io {
                path: target.clone(),
                source,
            })?;
        } else {
            fs::copy(entry.path(), &target).map_err(|source| ReportError::Io {
                path: target.clone(),
                source,
            })?;
            debug!("Copied {}", relative.display());
            copied += 1;
        }
    }
    Ok(copied)
}
