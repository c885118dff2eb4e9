//! Path utilities turning caller paths into canonical root-relative paths

/// Strip one leading slash, if present
pub fn relativize(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Collapse empty and repeated segments and return `/` or a path with exactly one leading slash
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Build `shared_folder_root / root / relative_path` and normalize it
pub fn join_root(shared_folder_root: &str, root: &str, relative_path: &str) -> String {
    let joined = [shared_folder_root, root, relative_path]
        .iter()
        .map(|part| part.trim_matches('/'))
        .collect::<Vec<_>>()
        .join("/");
    normalize(&joined)
}

/// Split a path into its directory part and its basename
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    }
}

/// Normalized path of a child entry
pub fn child_path(parent: &str, name: &str) -> String {
    normalize(&format!("{}/{}", parent, name))
}
