//! Integration tests for the script helper functions
//!
//! Each test runs a Rhai script through `UtilEngine`. Scripts `throw` on the
//! first failed expectation and return `true` otherwise.

mod common;

use common::{CATALOG_XML, CONFIG_JSON, PEOPLE_CSV, eval, eval_err, write_tree};
use tempfile::TempDir;

fn assert_script(script: &str) {
    let value = eval(script);
    assert!(
        value.as_bool().unwrap_or(false),
        "script did not return true: {value}"
    );
}

// =============================================================================
// Path Helper Tests
// =============================================================================

#[test]
fn test_path_helpers() {
    assert_script(
        r#"
        if unslash("/a/b/") != "a/b" { throw "unslash"; }
        if unslash("\\a\\b\\") == "a/b" { throw "unslash must not convert"; }
        if cleanpath("\\a\\b\\") != "a/b" { throw "cleanpath"; }
        if rslash("a//") != "a/" { throw "rslash"; }
        if lslash("//a") != "/a" { throw "lslash"; }
        if joinpath("a/", "/b/", "c") != "a" + DIR_SEP + "b" + DIR_SEP + "c" { throw "joinpath"; }
        if joinpath(["x", "/y/"]) != "x" + DIR_SEP + "y" { throw "joinpath array"; }
        if !is_abspath("/definitely/not/on/disk", "posix") { throw "posix abs"; }
        if is_abspath("rel/path", "posix") { throw "posix rel"; }
        if !is_abspath("C:\\Windows", "windows") { throw "windows abs"; }
        if basename("/a/b/c.txt") != "c.txt" { throw "basename"; }
        if dirname("/a/b/c.txt") != "/a/b" { throw "dirname"; }
        true
        "#,
    );
}

#[test]
fn test_is_abspath_rejects_unknown_style() {
    let err = eval_err(r#"is_abspath("/x", "vms")"#);
    assert!(err.contains("style"), "{err}");
}

// =============================================================================
// Nested Map Tests
// =============================================================================

#[test]
fn test_dot_path_cycle() {
    assert_script(
        r#"
        let m = #{};
        m.array_set("a.b.c", 5);
        if array_get(m, "a.b.c") != 5 { throw "get after set"; }
        if !array_has(m, "a.b.c") { throw "has after set"; }
        m.array_unset("a.b.c");
        if array_has(m, "a.b.c") { throw "leaf still present"; }
        if !array_has(m, "a.b") { throw "unset removed the parent"; }
        if array_get(#{}, "x.y.z", "default") != "default" { throw "default"; }
        if type_of(array_get(#{}, "x.y.z")) != "()" { throw "missing should be unit"; }
        true
        "#,
    );
}

#[test]
fn test_dot_path_lists_and_presence() {
    assert_script(
        r#"
        let m = #{ rows: [#{ name: "Al" }, #{ name: "Bo" }], off: false, none: () };
        if array_get(m, "rows.1.name") != "Bo" { throw "list index"; }
        if !array_has(m, "off") { throw "false is present"; }
        if !array_has(m, "none") { throw "unit is present"; }
        m.array_set("rows.2", #{ name: "Cy" });
        if m.rows.len() != 3 { throw "append at len"; }
        true
        "#,
    );
}

#[test]
fn test_dot_set_through_scalar_fails() {
    let err = eval_err(r#"let m = #{ a: 1 }; m.array_set("a.b", 2);"#);
    assert!(err.contains("invalid argument"), "{err}");
}

#[test]
fn test_array_key_and_select() {
    assert_script(
        r#"
        let m = #{ a: 1, b: 2, c: 3 };
        if array_key(m, "first") != "a" { throw "first"; }
        if array_key(m, "last") != "c" { throw "last"; }
        if array_key(m, 2) != "b" { throw "second"; }
        if array_key(m, -1) != "c" { throw "from end"; }
        if type_of(array_key(m, 9)) != "()" { throw "out of range"; }
        let picked = array_select_keys(m, ["c", "zz"]);
        if picked.len() != 1 || picked.c != 3 { throw "select"; }
        true
        "#,
    );
}

// =============================================================================
// Directory Walker Tests
// =============================================================================

#[test]
fn test_scandir_and_glob_agree() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path());

    assert_script(&format!(
        r#"
        let root = "{root}";
        let tree = scandir_recursive(root);
        if type_of(tree["readme.txt"]) != "string" {{ throw "file leaf"; }}
        if type_of(tree.src.util.deep) != "map" {{ throw "nested dir"; }}

        let globbed = glob_recursive(root, 2);
        let flat = flatten_scan(root, 2);
        if globbed.len() != flat.len() {{ throw "key sets differ in size"; }}
        for key in flat.keys() {{
            if !(key in globbed) {{ throw "missing from glob: " + key; }}
        }}
        true
        "#,
        root = dir.path().display()
    ));
}

#[test]
fn test_depth_limit_keeps_dir_as_leaf() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path());

    assert_script(&format!(
        r#"
        let tree = scandir_recursive("{root}", 1);
        if type_of(tree.src) != "map" {{ throw "depth 1 dir should be scanned"; }}
        if type_of(tree.src.util) != "string" {{ throw "depth 2 dir should be a leaf"; }}
        true
        "#,
        root = dir.path().display()
    ));
}

#[test]
fn test_flatten_scan_strip_prefix() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path());

    assert_script(&format!(
        r#"
        let flat = flatten_scan("{root}", 5, true);
        if !("src/util/deep/leaf.rs" in flat) {{ throw "stripped key"; }}
        if !str_endswith(flat["readme.txt"], "readme.txt") {{ throw "full path value"; }}
        let listed = glob_list("{root}/src/*.rs");
        if listed.len() != 1 {{ throw "glob_list"; }}
        true
        "#,
        root = dir.path().display()
    ));
}

#[test]
fn test_scandir_missing_dir_fails() {
    let err = eval_err(r#"scandir_recursive("/nonexistent/scriptkit-tree")"#);
    assert!(err.contains("/nonexistent/scriptkit-tree"), "{err}");
}

// =============================================================================
// CSV Tests
// =============================================================================

#[test]
fn test_csv2array_from_file_pads_short_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.csv");
    std::fs::write(&path, PEOPLE_CSV).unwrap();

    assert_script(&format!(
        r#"
        let rows = csv2array("{path}");
        if rows.len() != 2 {{ throw "row count"; }}
        if rows[0].name != "Al" || rows[0].age != "30" {{ throw "first row"; }}
        if rows[1].city != "" {{ throw "short row should be padded"; }}
        let raw = csv2array("{path}", false);
        if raw.len() != 3 || raw[0][2] != "city" {{ throw "headerless"; }}
        true
        "#,
        path = path.display()
    ));
}

#[test]
fn test_csv2array_literal_text() {
    assert_script(
        r#"
        let rows = csv2array("a,b\n1,2\n");
        if rows[0].a != "1" || rows[0].b != "2" { throw "literal"; }
        true
        "#,
    );
}

#[test]
fn test_csv_write_with_row_callback() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    let written = eval(&format!(
        r#"csv_write("{path}", [["a"], ["b"]], |row, i| {{ row.push(i); row }})"#,
        path = path.display()
    ));
    assert_eq!(written.as_int().unwrap(), 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,0\nb,1\n");
}

#[test]
fn test_csv_write_maps_writes_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    eval(&format!(
        r#"csv_write("{path}", [#{{ name: "Al", age: 30 }}, #{{ name: "Bo, Jr", age: 41 }}])"#,
        path = path.display()
    ));
    // Script maps iterate in key order.
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "age,name\n30,Al\n41,\"Bo, Jr\"\n"
    );
}

#[test]
fn test_csv_read_then_write_keeps_column_order() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("in.csv");
    let out = dir.path().join("out.csv");
    std::fs::write(&src, "name,age\nAl,30\nBo,41\n").unwrap();

    let written = eval(&format!(
        r#"
        let table = csv_read("{src}");
        if table.headers.len() != 2 || table.headers[0] != "name" {{ throw "headers"; }}
        if table.rows[1].age != "41" {{ throw "rows"; }}
        csv_write("{out}", table)
        "#,
        src = src.display(),
        out = out.display()
    ));
    assert_eq!(written.as_int().unwrap(), 2);
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "name,age\nAl,30\nBo,41\n"
    );
}

#[test]
fn test_csv_write_with_header_list() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.csv");

    eval(&format!(
        r#"csv_write("{out}", csv2array("name,age\nAl,30\n"), ["name", "age"])"#,
        out = out.display()
    ));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "name,age\nAl,30\n");
}

#[test]
fn test_csv_read_without_headers() {
    assert_script(
        r#"
        let table = csv_read("a,b\n", false);
        if type_of(table.headers) != "()" { throw "headers"; }
        if table.rows[0][1] != "b" { throw "rows"; }
        true
        "#,
    );
}

#[test]
fn test_csv_write_unwritable_destination() {
    let err = eval_err(r#"csv_write("/nonexistent/dir/out.csv", [["a"]])"#);
    assert!(err.contains("unwritable"), "{err}");
}

#[test]
fn test_csv_encode_and_markup() {
    assert_script(
        r#"
        if csv_encode([["x", "y z"], ["1", "2"]]) != "x,y z\n1,2\n" { throw "encode"; }
        let html = csv_to_html("name,age\nAl,30\n");
        if !str_startswith(html, "<table class=\"table-csv-data\"><tr><th>name</th>") { throw "html: " + html; }
        if !html.contains("<td>Al</td><td>30</td>") { throw "html row"; }
        let xml = csv_to_xml("first name,age\nAl,30\n");
        if xml != "<XML><row><first_name>Al</first_name><age>30</age></row></XML>" { throw "xml: " + xml; }
        let plain = csv_to_xml("a,b\n", false);
        if !plain.contains("<cell>a</cell>") { throw "cell tags"; }
        true
        "#,
    );
}

// =============================================================================
// XML / JSON Tests
// =============================================================================

#[test]
fn test_xml_encode_tag_names() {
    assert_script(
        r#"
        let xml = xml_encode(#{ "1": "x", "user name": "y" });
        if !xml.contains("<Item_1>x</Item_1>") { throw "numeric key"; }
        if !xml.contains("<user_name>y</user_name>") { throw "spaced key"; }
        if !str_startswith(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?><XML>") { throw "prolog"; }
        let named = xml_encode(#{ a: 1 }, "my-doc");
        if !named.contains("<mydoc><a>1</a></mydoc>") { throw "root tag"; }
        true
        "#,
    );
}

#[test]
fn test_xml_round_trip_keeps_leaves() {
    assert_script(
        r#"
        let m = #{ user: #{ name: "Al", tags: ["a", "b"] }, ok: true };
        let back = xml_decode(xml_encode(m, "root"));
        if back.user.name != "Al" { throw "name"; }
        if back.user.tags.Item_1 != "b" { throw "list item"; }
        if back.ok != "true" { throw "bool leaf"; }
        true
        "#,
    );
}

#[test]
fn test_xml_decode_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.xml");
    std::fs::write(&path, CATALOG_XML).unwrap();

    assert_script(&format!(
        r#"
        let doc = xml_decode("{path}");
        if doc.owner != "Library" {{ throw "owner"; }}
        if doc.book.title != "Rust & You" {{ throw "unescaped text"; }}
        if doc.book.tag.len() != 2 || doc.book.tag[1] != "lang" {{ throw "repeated tags"; }}
        if doc.book["@attributes"].id != "b1" {{ throw "attributes"; }}
        true
        "#,
        path = path.display()
    ));
}

#[test]
fn test_xml_decode_malformed_fails() {
    let err = eval_err(r#"xml_decode("<a><b></a>")"#);
    assert!(err.contains("XML"), "{err}");
}

#[test]
fn test_json_read_file_and_literal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, CONFIG_JSON).unwrap();

    assert_script(&format!(
        r#"
        let cfg = json_read("{path}");
        if array_get(cfg, "server.host") != "localhost" {{ throw "host"; }}
        if array_get(cfg, "server.ports.1") != 443 {{ throw "port"; }}
        if cfg.debug != false {{ throw "debug"; }}
        if json_read("[1, 2, 3]").len() != 3 {{ throw "literal"; }}
        true
        "#,
        path = path.display()
    ));
}

// =============================================================================
// String and Logging Tests
// =============================================================================

#[test]
fn test_string_helpers() {
    assert_script(
        r#"
        if str_alnum("My Root-Tag!") != "MyRootTag" { throw "alnum"; }
        if str_alnum("a_b-c", "_") != "a_bc" { throw "alnum extras"; }
        if !str_startswith("Hello", "he", false) { throw "startswith ci"; }
        if str_startswith("Hello", "he") { throw "startswith cs"; }
        if !str_endswith("Hello", "LO", false) { throw "endswith ci"; }
        if str_between("<b> bold </b>", "<b>", "</b>") != "bold" { throw "between"; }
        let parts = explode_trim(",", " a , b ");
        if parts.len() != 2 || parts[1] != "b" { throw "explode"; }
        if implode_nice(["a", "b", "c"]) != "a, b, and c" { throw "implode"; }
        if implode_nice(["a", "b"], " / ") != "a / b" { throw "implode sep"; }
        true
        "#,
    );
}

#[test]
fn test_log_helpers() {
    assert_script(
        r#"
        log("info line");
        debug("debug line");
        warn("warn line");
        true
        "#,
    );
}
