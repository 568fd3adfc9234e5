use std::path::Path;

use crate::error::InputError;

/// Read app ids from a file, one per line. Blank lines and `#` comments are
/// skipped; an empty result is an error.
pub fn load_app_ids(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.is_file() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let ids = parse_app_ids(&text);
    if ids.is_empty() {
        return Err(InputError::Empty(path.to_path_buf()));
    }
    Ok(ids)
}

pub fn parse_app_ids(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
