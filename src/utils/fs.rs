//! Path display helpers

/// Shortens an abbreviated repository path for display
///
/// The leading component (usually the root alias such as `$work`) and the
/// last two components survive; the middle collapses to `...`.
pub fn shorten_path(path: &str, max_length: usize) -> String {
    if path.chars().count() <= max_length {
        return path.to_string();
    }

    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if components.len() <= 3 {
        return path.to_string();
    }

    let head = if path.starts_with('/') {
        format!("/{}", components[0])
    } else {
        components[0].to_string()
    };
    let tail = &components[components.len() - 2..];
    format!("{head}/.../{}/{}", tail[0], tail[1])
}
