//! Structured-data helpers for Rhai scripts
//!
//! A toolbox for scripts that shuffle data between directories, CSV, JSON
//! and XML. Every helper is an ordinary Rust function in [`helpers`]; the
//! [`UtilEngine`] registers them all into a Rhai engine under short names.
//!
//! # Example Script
//!
//! ```rhai
//! let files = flatten_scan("data", 2, true);
//! let report = #{};
//! for path in files.keys() {
//!     if str_endswith(path, ".csv") {
//!         report.array_set("csv." + basename(path), csv2array(files[path]).len());
//!     }
//! }
//! log(xml_encode(report, "report"));
//! ```
//!
//! # Engine-Provided Functions
//!
//! ## Paths
//! - `unslash(p)`, `cleanpath(p)`, `rslash(p)`, `lslash(p)`
//! - `joinpath([..])` / `joinpath(a, b[, c])` - Join with the configured separator
//! - `is_abspath(p[, "posix"|"windows"])`, `basename(p)`, `dirname(p)`
//!
//! ## Directories
//! - `scandir_recursive(dir[, depth])` - Nested map of the directory
//! - `glob_recursive(dir[, depth])` - Flat map of leaf paths
//! - `flatten_scan(dir[, depth[, strip_prefix]])`, `glob_list(pattern)`
//!
//! ## Nested maps
//! - `array_get(m, path[, default])`, `array_has(m, path)`
//! - `m.array_set(path, value)`, `m.array_unset(path)` - Mutate `m` in place
//! - `array_key(m, "first"|"last"|n)`, `array_select_keys(m, keys)`
//!
//! ## Data formats
//! - `csv2array(src[, has_headers])`, `csv_encode(rows)`
//! - `csv_read(src[, has_headers])` returns `#{headers, rows}` with the
//!   column order intact
//! - `csv_write(dest, rows[, |row, i| ..])`, `csv_write(dest, rows, headers)`,
//!   `csv_write(dest, table)` for a `csv_read` result
//! - `csv_to_xml(src[, has_headers])`, `csv_to_html(src[, has_headers])`
//! - `xml_encode(data[, root_tag])`, `xml_decode(src)`, `json_read(src)`
//!
//! A `src` argument is a file path when it names an existing file, and the
//! content itself otherwise.
//!
//! # Variables Available in Scripts
//!
//! - `DIR_SEP` - Configured path separator
//! - `MAX_DEPTH` - Configured default walk depth

pub mod config;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod output;

pub use config::Settings;
pub use engine::UtilEngine;
pub use error::{Result, UtilError};
