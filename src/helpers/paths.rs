//! Path manipulation helpers
//!
//! Pure string transforms. Nothing here touches the filesystem.

use std::path::{MAIN_SEPARATOR, Path};

const SLASHES: [char; 2] = ['/', '\\'];

/// Absolute-path convention used by [`is_abspath_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// Leading `/`.
    Posix,
    /// Drive letter and colon (`C:\`, `C:/`) or a `\\server` share.
    Windows,
}

impl PathStyle {
    /// Style of the platform this binary was built for.
    pub fn host() -> Self {
        if MAIN_SEPARATOR == '\\' {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Strip every leading and trailing `/` and `\`.
pub fn unslash(path: &str) -> String {
    path.trim_matches(SLASHES).to_string()
}

/// Convert `\` to `/`, then strip slashes from both ends.
pub fn cleanpath(path: &str) -> String {
    unslash(&path.replace('\\', "/"))
}

/// Strip trailing slashes and append exactly one `/`.
pub fn rslash(path: &str) -> String {
    format!("{}/", path.trim_end_matches(SLASHES))
}

/// Strip leading slashes and prepend exactly one `/`.
pub fn lslash(path: &str) -> String {
    format!("/{}", path.trim_start_matches(SLASHES))
}

/// Join segments with the host separator after unslashing each one.
pub fn joinpath<S: AsRef<str>>(segments: &[S]) -> String {
    joinpath_with(MAIN_SEPARATOR, segments)
}

/// Join segments with an explicit separator after unslashing each one.
pub fn joinpath_with<S: AsRef<str>>(separator: char, segments: &[S]) -> String {
    let parts: Vec<String> = segments.iter().map(|s| unslash(s.as_ref())).collect();
    parts.join(&separator.to_string())
}

/// Whether `path` is shaped like an absolute path on the host platform.
pub fn is_abspath(path: &str) -> bool {
    is_abspath_in(path, PathStyle::host())
}

/// Whether `path` is shaped like an absolute path under `style`.
///
/// Syntactic only: the path does not have to exist.
pub fn is_abspath_in(path: &str, style: PathStyle) -> bool {
    match style {
        PathStyle::Posix => path.starts_with('/'),
        PathStyle::Windows => {
            if path.starts_with("\\\\") {
                return true;
            }
            let bytes = path.as_bytes();
            bytes.len() >= 3
                && bytes[0].is_ascii_alphabetic()
                && bytes[1] == b':'
                && matches!(bytes[2], b'/' | b'\\')
        }
    }
}

/// Get the basename (filename) of a path
pub fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Get the directory name (parent) of a path
pub fn dirname(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default()
}
