//! Object path generation and display URL resolution.
//!
//! Path format: `{user_id}/{project_id}/{unique}-{sanitized file name}`.

use uuid::Uuid;

use crate::Storage;

/// Replace anything outside `[A-Za-z0-9._-]` with `_` and drop leading dots.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Generate a fresh object path for an upload.
pub fn object_path(user_id: Uuid, project_id: Uuid, file_name: &str) -> String {
    format!(
        "{}/{}/{}-{}",
        user_id,
        project_id,
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    )
}

/// True for `http://` and `https://` values, which are stored as-is and
/// never resolved through a bucket.
pub fn is_absolute_url(path: &str) -> bool {
    let lower = path.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// URL to show for a stored path: absolute URLs unchanged, bucket paths
/// through the bucket's public URL.
pub fn resolve_display_url(storage: &dyn Storage, path: &str) -> String {
    if is_absolute_url(path) {
        path.to_string()
    } else {
        storage.public_url(path)
    }
}
