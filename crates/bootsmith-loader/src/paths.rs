//! Derivation of artifact identities from file-style names.

/// Derive an artifact identity key from a path relative to its
/// convention directory: extension stripped, separators preserved.
pub fn artifact_name(rel: &str) -> String {
    let rel = rel.replace('\\', "/");
    match rel.rfind('.') {
        Some(dot) if dot > rel.rfind('/').map_or(0, |s| s + 1) => rel[..dot].to_string(),
        _ => rel,
    }
}

/// Derive an HTTP route path from a file-style name.
///
/// Bracketed segments become axum captures and an `index` filename
/// collapses to the parent path:
///
/// - `index.rs` → `/`
/// - `[id]/message.rs` → `/{id}/message`
/// - `users/[id]/index.rs` → `/users/{id}`
pub fn route_path(rel: &str) -> String {
    let name = artifact_name(rel);
    let mut segments: Vec<String> = name
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            if segment.starts_with('[') && segment.ends_with(']') && segment.len() > 2 {
                format!("{{{}}}", &segment[1..segment.len() - 1])
            } else {
                segment.to_string()
            }
        })
        .collect();

    if segments.last().map(String::as_str) == Some("index") {
        segments.pop();
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
