use std::fs;
use std::path::Path;

use super::ExtractError;

/// Reads a UTF-8 text file, normalizing CRLF line endings.
pub fn extract_txt(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path).map_err(|e| ExtractError::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|_| ExtractError::InvalidUtf8(path.to_path_buf()))?;

    if text.contains("\r\n") {
        return Ok(text.replace("\r\n", "\n"));
    }
    Ok(text)
}
