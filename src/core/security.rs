//! Guards for client-supplied values that end up on the filesystem.

const MAX_FILE_NAME_CHARS: usize = 200;

/// Reduces a client-supplied upload name to a single safe path component.
///
/// Directory parts (either separator style) are discarded, characters outside
/// `[A-Za-z0-9._- ]` become `_`, and leading dots are stripped so the result
/// can never be `.`/`..` or a hidden file. Returns `None` when nothing usable
/// is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let last_component = raw
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = last_component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return None;
    }

    if cleaned.chars().count() > MAX_FILE_NAME_CHARS {
        return Some(truncate_keeping_extension(cleaned));
    }
    Some(cleaned.to_string())
}

fn truncate_keeping_extension(name: &str) -> String {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| ext.len() <= 10);
    match extension {
        Some(ext) => {
            let keep = MAX_FILE_NAME_CHARS - ext.len() - 1;
            let stem: String = name.chars().take(keep).collect();
            format!("{}.{}", stem, ext)
        }
        None => name.chars().take(MAX_FILE_NAME_CHARS).collect(),
    }
}
