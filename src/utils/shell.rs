//! Quoting for generated shell text

/// Double-quotes a display path so `$alias` still expands when sourced
///
/// A leading `~/` is rewritten to `$HOME/` since the shell does not expand
/// a tilde inside quotes.
pub fn double_quoted(display_path: &str) -> String {
    let path = match display_path.strip_prefix("~/") {
        Some(rest) => format!("$HOME/{rest}"),
        None if display_path == "~" => "$HOME".to_string(),
        None => display_path.to_string(),
    };
    let escaped = path
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('`', "\\`");
    format!("\"{escaped}\"")
}

/// Single-quotes `value` so the shell takes it literally
pub fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
