use crate::error::{BookError, Result};
use std::fs;
use std::path::Path;

pub const EPUB_SUFFIX: &str = ".epub";
pub const PDF_SUFFIX: &str = ".pdf";

/// Names of the entries directly inside `dir` that end with `suffix`.
///
/// The match is case-sensitive and does not recurse. Names are returned in
/// the order the filesystem yields them.
pub fn files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| BookError::from_io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BookError::from_io(dir, e))?;
        // Names that are not valid UTF-8 cannot be passed back to a client
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(suffix) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}
