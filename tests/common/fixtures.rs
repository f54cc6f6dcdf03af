//! Test fixtures - sample data files and directory layouts.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// People table with a short last row.
pub const PEOPLE_CSV: &str = "name,age,city\nAl,30,Oslo\nBo,41\n";

/// Same table, semicolon separated with quoted fields.
pub const PEOPLE_CSV_SEMICOLON: &str = "name;age;city\n\"Al; Jr\";30;Oslo\n";

/// Catalogue with repeated elements, attributes and mixed content.
pub const CATALOG_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog>
  <book id="b1">
    <title>Rust &amp; You</title>
    <tag>systems</tag>
    <tag>lang</tag>
  </book>
  <owner>Library</owner>
</catalog>
"#;

pub const CONFIG_JSON: &str = r#"{
  "server": {"host": "localhost", "ports": [80, 443]},
  "debug": false
}"#;

/// Lay out a small tree under `root`:
///
/// ```text
/// root/
///   readme.txt
///   src/
///     main.rs
///     util/
///       mod.rs
///       deep/
///         leaf.rs
/// ```
pub fn write_tree(root: &Path) {
    fs::write(root.join("readme.txt"), "hello").unwrap();
    fs::create_dir_all(root.join("src/util/deep")).unwrap();
    fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
    fs::write(root.join("src/util/mod.rs"), "").unwrap();
    fs::write(root.join("src/util/deep/leaf.rs"), "").unwrap();
}
