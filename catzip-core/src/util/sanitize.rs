/// Normalize a name for use inside an archive.
///
/// Backslashes become `/`, empty and `.` segments are dropped. Returns `None`
/// for names that would climb out of the archive root (`..`), contain NUL, or
/// end up empty.
pub fn arc_name(raw: &str) -> Option<String> {
    let normalized = raw.replace('\\', "/");
    let mut parts = Vec::new();
    for part in normalized.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            p if p.contains('\0') => return None,
            p => parts.push(p),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
