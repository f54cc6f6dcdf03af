//! Settings shared by all helpers.
//!
//! Values that would otherwise be process-wide constants (path separator,
//! dot-path delimiter, default walk depth, spool threshold, CSV dialect, XML
//! defaults) live in one immutable [`Settings`] value, built once and handed
//! to the engine. Settings are layered from TOML files:
//!
//! 1. every `$XDG_CONFIG_DIRS/scriptkit/config.toml` (default `/etc/xdg`)
//! 2. `$XDG_CONFIG_HOME/scriptkit/config.toml`
//! 3. an explicit file passed by the caller
//!
//! Later files override earlier ones key by key. Missing files are skipped.

use crate::error::{Result, UtilError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_MAX_DEPTH: usize = 5;
const DEFAULT_SPOOL_THRESHOLD: usize = 2 * 1024 * 1024;
const DEFAULT_KEY_DELIMITER: char = '.';

/// CSV dialect used by the tabular codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

/// Document-level defaults for the markup codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOptions {
    pub root_tag: String,
    pub version: String,
    pub encoding: String,
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            root_tag: "XML".to_owned(),
            version: "1.0".to_owned(),
            encoding: "UTF-8".to_owned(),
            indent: None,
        }
    }
}

/// Resolved, read-only settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub path_separator: char,
    pub key_delimiter: char,
    pub max_depth: usize,
    /// Literal CSV/JSON text larger than this is spooled to a temp file.
    pub spool_threshold: usize,
    pub csv: CsvDialect,
    pub xml: XmlOptions,
    /// Print script `debug` lines.
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            path_separator: std::path::MAIN_SEPARATOR,
            key_delimiter: DEFAULT_KEY_DELIMITER,
            max_depth: DEFAULT_MAX_DEPTH,
            spool_threshold: DEFAULT_SPOOL_THRESHOLD,
            csv: CsvDialect::default(),
            xml: XmlOptions::default(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    path_separator: Option<char>,
    key_delimiter: Option<char>,
    max_depth: Option<usize>,
    spool_threshold: Option<usize>,
    verbose: Option<bool>,
    csv: Option<CsvToml>,
    xml: Option<XmlToml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CsvToml {
    delimiter: Option<char>,
    quote: Option<char>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct XmlToml {
    root_tag: Option<String>,
    version: Option<String>,
    encoding: Option<String>,
    indent: Option<usize>,
}

impl SettingsToml {
    fn merge(&mut self, other: SettingsToml) {
        if other.path_separator.is_some() {
            self.path_separator = other.path_separator;
        }
        if other.key_delimiter.is_some() {
            self.key_delimiter = other.key_delimiter;
        }
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        if other.spool_threshold.is_some() {
            self.spool_threshold = other.spool_threshold;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        match (self.csv.as_mut(), other.csv) {
            (Some(dst), Some(src)) => dst.merge(src),
            (None, Some(src)) => self.csv = Some(src),
            _ => {}
        }
        match (self.xml.as_mut(), other.xml) {
            (Some(dst), Some(src)) => dst.merge(src),
            (None, Some(src)) => self.xml = Some(src),
            _ => {}
        }
    }
}

impl CsvToml {
    fn merge(&mut self, other: CsvToml) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.quote.is_some() {
            self.quote = other.quote;
        }
    }
}

impl XmlToml {
    fn merge(&mut self, other: XmlToml) {
        if other.root_tag.is_some() {
            self.root_tag = other.root_tag;
        }
        if other.version.is_some() {
            self.version = other.version;
        }
        if other.encoding.is_some() {
            self.encoding = other.encoding;
        }
        if other.indent.is_some() {
            self.indent = other.indent;
        }
    }
}

fn split_xdg_config_dirs() -> Vec<PathBuf> {
    let raw = std::env::var("XDG_CONFIG_DIRS").unwrap_or_else(|_| "/etc/xdg".to_owned());
    raw.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn xdg_config_home() -> PathBuf {
    if let Ok(raw) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".").join(".config"))
}

/// Config files consulted by [`Settings::load`], lowest priority first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = split_xdg_config_dirs()
        .into_iter()
        .map(|dir| dir.join("scriptkit").join("config.toml"))
        .collect();
    paths.push(xdg_config_home().join("scriptkit").join("config.toml"));
    paths
}

fn read_toml(path: &Path) -> Result<SettingsToml> {
    let text = std::fs::read_to_string(path).map_err(|e| UtilError::Config {
        path: path.to_path_buf(),
        reason: format!("failed to read: {e}"),
    })?;
    toml::from_str::<SettingsToml>(&text).map_err(|e| UtilError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn ascii_byte(path: &Path, key: &str, c: char) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| UtilError::Config {
            path: path.to_path_buf(),
            reason: format!("`{key}` must be a single ASCII character, got '{c}'"),
        })
}

impl Settings {
    /// Load settings from the XDG search path, then `explicit` if given.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut candidates = config_search_paths();
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(UtilError::Config {
                    path: path.to_path_buf(),
                    reason: "file not found".to_owned(),
                });
            }
            candidates.push(path.to_path_buf());
        }
        Self::from_files(&candidates)
    }

    /// Layer the given TOML files over the defaults. Missing files are skipped.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = SettingsToml::default();
        let mut origin = PathBuf::new();
        for path in paths {
            if !path.is_file() {
                continue;
            }
            merged.merge(read_toml(path)?);
            origin = path.clone();
        }
        Self::resolve(merged, &origin)
    }

    /// Parse a single TOML document over the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let origin = PathBuf::from("<inline>");
        let parsed = toml::from_str::<SettingsToml>(text).map_err(|e| UtilError::Config {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::resolve(parsed, &origin)
    }

    fn resolve(cfg: SettingsToml, origin: &Path) -> Result<Self> {
        let defaults = Settings::default();
        let csv = cfg.csv.unwrap_or_default();
        let xml = cfg.xml.unwrap_or_default();

        let csv = CsvDialect {
            delimiter: match csv.delimiter {
                Some(c) => ascii_byte(origin, "csv.delimiter", c)?,
                None => defaults.csv.delimiter,
            },
            quote: match csv.quote {
                Some(c) => ascii_byte(origin, "csv.quote", c)?,
                None => defaults.csv.quote,
            },
        };

        Ok(Settings {
            path_separator: cfg.path_separator.unwrap_or(defaults.path_separator),
            key_delimiter: cfg.key_delimiter.unwrap_or(defaults.key_delimiter),
            max_depth: cfg.max_depth.unwrap_or(defaults.max_depth),
            spool_threshold: cfg.spool_threshold.unwrap_or(defaults.spool_threshold),
            csv,
            xml: XmlOptions {
                root_tag: xml.root_tag.unwrap_or(defaults.xml.root_tag),
                version: xml.version.unwrap_or(defaults.xml.version),
                encoding: xml.encoding.unwrap_or(defaults.xml.encoding),
                indent: xml.indent.or(defaults.xml.indent),
            },
            verbose: cfg.verbose.unwrap_or(defaults.verbose),
        })
    }
}
