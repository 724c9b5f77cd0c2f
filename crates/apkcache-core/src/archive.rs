//! Package integrity check. An APK is a zip container, so a package counts as
//! intact when its central directory can be read.

use std::fs::File;
use std::path::Path;

/// True if `path` exists and opens as a zip archive.
pub fn is_valid_package(path: &Path) -> bool {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    match zip::ZipArchive::new(file) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "not a readable archive");
            false
        }
    }
}
