//! Structured-data helper functions
//!
//! Plain Rust functions over strings, paths and `serde_json` values. The
//! script engine wraps each of them; nothing here depends on Rhai.
//!
//! ## Design: Pure Functions
//!
//! Helpers take explicit inputs and return explicit outputs. Defaults that
//! would otherwise be global (separator, delimiter, depth, dialect) come from
//! a [`Settings`](crate::config::Settings) value passed in by the caller.
//!
//! ```rhai
//! let rows = csv2array("people.csv");
//! let by_name = #{};
//! for row in rows {
//!     by_name.array_set("people." + row.name, row);
//! }
//! xml_encode(by_name, "directory")
//! ```
//!
//! ## Categories
//!
//! - **paths**: unslash, cleanpath, rslash, lslash, joinpath, is_abspath, basename, dirname
//! - **dir**: scandir_recursive, glob_recursive, flatten_scan, glob_list
//! - **dot**: array_get, array_set, array_unset, array_has
//! - **array**: array_key, array_select_keys
//! - **csv**: csv2array, csv_read, csv_write, csv_encode, csv_to_xml, csv_to_html
//! - **xml**: xml_encode, xml_decode
//! - **json**: json_read
//! - **string**: str_alnum, str_startswith, str_endswith, str_between, explode_trim, implode_nice
//! - **log**: log, debug, warn

pub mod array;
pub mod csv;
pub mod dir;
pub mod dot;
pub mod json;
pub mod log;
pub mod paths;
pub mod source;
pub mod string;
pub mod xml;
