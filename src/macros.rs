//! Saved macro discovery
//!
//! Macros are stored one per file; a directory of macros is listed by entry
//! name. Nothing here reads or parses the files themselves.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// List the entry names in `dir`, sorted by name.
///
/// A directory that cannot be read yields an empty list. Entries that fail to
/// read are skipped.
pub fn list_macros(dir: impl AsRef<Path>) -> Vec<String> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "cannot read macro directory");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.file_name().to_string_lossy().into_owned()),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .collect();
    names.sort();

    debug!(path = %dir.display(), count = names.len(), "listed macros");
    names
}
