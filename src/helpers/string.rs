//! String helpers

/// Keep only ASCII letters, digits, and any character listed in `extras`.
pub fn str_alnum(s: &str, extras: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || extras.contains(*c))
        .collect()
}

/// Check if a string starts with a prefix, optionally ignoring case
pub fn str_startswith(s: &str, prefix: &str, match_case: bool) -> bool {
    if match_case {
        s.starts_with(prefix)
    } else {
        s.to_lowercase().starts_with(&prefix.to_lowercase())
    }
}

/// Check if a string ends with a suffix, optionally ignoring case
pub fn str_endswith(s: &str, suffix: &str, match_case: bool) -> bool {
    if match_case {
        s.ends_with(suffix)
    } else {
        s.to_lowercase().ends_with(&suffix.to_lowercase())
    }
}

/// Trimmed text between the first `start` and the next `end` after it.
///
/// Empty when `start` does not occur. When `end` does not follow, runs to the
/// end of the string.
pub fn str_between(s: &str, start: &str, end: &str) -> String {
    let Some((_, after)) = s.split_once(start) else {
        return String::new();
    };
    let inner = match after.split_once(end) {
        Some((inner, _)) => inner,
        None => after,
    };
    inner.trim().to_string()
}

/// Split on `delimiter` and trim whitespace from every piece.
pub fn explode_trim(delimiter: &str, s: &str) -> Vec<String> {
    s.split(delimiter).map(|part| part.trim().to_string()).collect()
}

/// Join items as a natural-language list ("a, b, and c").
pub fn implode_nice<S: AsRef<str>>(items: &[S], separator: &str, last_separator: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}{}{}", head.join(separator), last_separator, last.as_ref())
        }
    }
}
