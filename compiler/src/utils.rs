use std::path::Path;

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Splits a declaration key on single spaces, dropping empty pieces.
pub fn split_key(key: &str) -> Vec<&str> {
    key.split(' ').filter(|token| !token.is_empty()).collect()
}

/// Everything after the last `.` of a router key, or the whole key when it has none.
pub fn last_segment(router: &str) -> &str {
    match router.rfind('.') {
        Some(pos) => &router[pos + 1..],
        None => router,
    }
}

/// File name without directories and without its final extension.
pub fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}
