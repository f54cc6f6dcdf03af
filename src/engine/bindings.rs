//! Script-facing registrations
//!
//! Every helper is a thin wrapper over the typed library function: arguments
//! are converted from Rhai values, library errors become runtime errors, and
//! results are converted back.

use super::convert::{map_to_object, object_to_map, to_dynamic, to_value};
use crate::config::Settings;
use crate::error::{UtilError, script_error};
use crate::helpers::array::{self, KeyPos};
use crate::helpers::csv::{CsvReader, CsvWriter, TableMarkup};
use crate::helpers::dir;
use crate::helpers::dot::Dot;
use crate::helpers::json::JsonReader;
use crate::helpers::source::{Sink, Source};
use crate::helpers::{log, paths, string, xml};
use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, NativeCallContext};
use std::sync::Arc;

type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

const HTML_TABLE_CLASS: &str = "table-csv-data";

fn depth_arg(depth: i64) -> ScriptResult<usize> {
    usize::try_from(depth).map_err(|_| {
        script_error(UtilError::invalid_argument(
            "max_depth",
            format!("must not be negative, got {depth}"),
        ))
    })
}

fn strings(items: &Array) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn string_array(items: Vec<String>) -> Array {
    items.into_iter().map(Dynamic::from).collect()
}

/// Register all helper functions with the Rhai engine
pub fn register_all(engine: &mut Engine, settings: &Arc<Settings>) {
    register_paths(engine, settings);
    register_dirs(engine, settings);
    register_dot(engine, settings);
    register_arrays(engine);
    register_csv(engine, settings);
    register_markup(engine, settings);
    register_strings(engine);

    engine.register_fn("log", log::log);
    let verbose = settings.verbose;
    engine.register_fn("debug", move |msg: &str| log::debug(msg, verbose));
    engine.register_fn("warn", log::warn);
}

fn register_paths(engine: &mut Engine, settings: &Arc<Settings>) {
    engine.register_fn("unslash", paths::unslash);
    engine.register_fn("cleanpath", paths::cleanpath);
    engine.register_fn("rslash", paths::rslash);
    engine.register_fn("lslash", paths::lslash);
    engine.register_fn("basename", paths::basename);
    engine.register_fn("dirname", paths::dirname);
    engine.register_fn("is_abspath", paths::is_abspath);
    engine.register_fn("is_abspath", |path: &str, style: &str| -> ScriptResult<bool> {
        let style = match style {
            "posix" => paths::PathStyle::Posix,
            "windows" => paths::PathStyle::Windows,
            other => {
                return Err(script_error(UtilError::invalid_argument(
                    "style",
                    format!("expected \"posix\" or \"windows\", got \"{other}\""),
                )));
            }
        };
        Ok(paths::is_abspath_in(path, style))
    });

    let sep = settings.path_separator;
    engine.register_fn("joinpath", move |segments: Array| {
        paths::joinpath_with(sep, &strings(&segments))
    });
    engine.register_fn("joinpath", move |a: &str, b: &str| paths::joinpath_with(sep, &[a, b]));
    engine.register_fn("joinpath", move |a: &str, b: &str, c: &str| {
        paths::joinpath_with(sep, &[a, b, c])
    });
}

fn register_dirs(engine: &mut Engine, settings: &Arc<Settings>) {
    let default_depth = settings.max_depth;

    let scan = |dir: &str, depth: usize| -> ScriptResult<Dynamic> {
        let tree = dir::scan_recursive(dir, depth).map_err(script_error)?;
        to_dynamic(&tree)
    };
    engine.register_fn("scandir_recursive", move |dir: &str| scan(dir, default_depth));
    engine.register_fn("scandir_recursive", move |dir: &str, depth: i64| -> ScriptResult<Dynamic> {
        scan(dir, depth_arg(depth)?)
    });

    let glob = |dir: &str, depth: usize| -> ScriptResult<Dynamic> {
        let flat = dir::glob_recursive(dir, depth).map_err(script_error)?;
        to_dynamic(&flat)
    };
    engine.register_fn("glob_recursive", move |dir: &str| glob(dir, default_depth));
    engine.register_fn("glob_recursive", move |dir: &str, depth: i64| -> ScriptResult<Dynamic> {
        glob(dir, depth_arg(depth)?)
    });

    let flatten = |dir: &str, depth: usize, strip: bool| -> ScriptResult<Dynamic> {
        let tree = dir::scan_recursive(dir, depth).map_err(script_error)?;
        let flat = if strip {
            dir::flatten_stripped(&tree, dir)
        } else {
            dir::flatten(&tree)
        };
        to_dynamic(&flat)
    };
    engine.register_fn("flatten_scan", move |dir: &str| flatten(dir, default_depth, false));
    engine.register_fn("flatten_scan", move |dir: &str, depth: i64| -> ScriptResult<Dynamic> {
        flatten(dir, depth_arg(depth)?, false)
    });
    engine.register_fn("flatten_scan", move |dir: &str, depth: i64, strip: bool| -> ScriptResult<Dynamic> {
        flatten(dir, depth_arg(depth)?, strip)
    });

    engine.register_fn("glob_list", |pattern: &str| -> ScriptResult<Array> {
        let paths = dir::glob_list(pattern).map_err(script_error)?;
        Ok(string_array(paths))
    });
}

fn register_dot(engine: &mut Engine, settings: &Arc<Settings>) {
    let dot = Dot::new(settings.key_delimiter);

    let get = move |map: rhai::Map, path: &str, default: Dynamic| -> ScriptResult<Dynamic> {
        let obj = map_to_object(&map)?;
        match dot.get(&obj, path, None) {
            Some(value) => to_dynamic(value),
            None => Ok(default),
        }
    };
    engine.register_fn("array_get", move |map: rhai::Map, path: &str| {
        get(map, path, Dynamic::UNIT)
    });
    engine.register_fn("array_get", get);

    engine.register_fn(
        "array_set",
        move |map: &mut rhai::Map, path: &str, value: Dynamic| -> ScriptResult<()> {
            let mut obj = map_to_object(map)?;
            dot.set(&mut obj, path, to_value(&value)?)
                .map_err(script_error)?;
            *map = object_to_map(obj)?;
            Ok(())
        },
    );

    engine.register_fn(
        "array_unset",
        move |map: &mut rhai::Map, path: &str| -> ScriptResult<()> {
            let mut obj = map_to_object(map)?;
            dot.unset(&mut obj, path);
            *map = object_to_map(obj)?;
            Ok(())
        },
    );

    engine.register_fn("array_has", move |map: rhai::Map, path: &str| -> ScriptResult<bool> {
        Ok(dot.has(&map_to_object(&map)?, path))
    });
}

fn register_arrays(engine: &mut Engine) {
    let key_at = |map: rhai::Map, pos: KeyPos| -> ScriptResult<Dynamic> {
        let obj = map_to_object(&map)?;
        Ok(array::array_key(&obj, pos)
            .map(|key| Dynamic::from(key.to_string()))
            .unwrap_or(Dynamic::UNIT))
    };
    engine.register_fn("array_key", move |map: rhai::Map, pos: &str| -> ScriptResult<Dynamic> {
        key_at(map, pos.parse().map_err(script_error)?)
    });
    engine.register_fn("array_key", move |map: rhai::Map, pos: i64| {
        key_at(map, KeyPos::Index(pos))
    });

    engine.register_fn(
        "array_select_keys",
        |map: rhai::Map, keys: Array| -> ScriptResult<rhai::Map> {
            let obj = map_to_object(&map)?;
            object_to_map(array::array_select_keys(&obj, &strings(&keys)))
        },
    );
}

fn write_rows(
    settings: &Settings,
    dest: &str,
    rows: Array,
    headers: Option<Vec<String>>,
) -> ScriptResult<i64> {
    let data = to_value(&Dynamic::from_array(rows))?;
    let writer = match headers {
        Some(headers) => CsvWriter::from_value_with_headers(settings, &data, headers),
        None => CsvWriter::from_value(settings, &data),
    };
    let written = writer
        .and_then(|w| w.write(Sink::file(dest)))
        .map_err(script_error)?;
    Ok(written as i64)
}

/// Split a `#{headers, rows}` table from `csv_read` into its parts.
fn table_parts(mut table: rhai::Map) -> ScriptResult<(Array, Option<Vec<String>>)> {
    let rows = table
        .remove("rows")
        .and_then(|rows| rows.try_cast::<Array>())
        .ok_or_else(|| {
            script_error(UtilError::invalid_argument("table", "expected a `rows` list"))
        })?;
    let headers = table
        .remove("headers")
        .and_then(|headers| headers.try_cast::<Array>())
        .map(|headers| strings(&headers));
    Ok((rows, headers))
}

fn register_csv(engine: &mut Engine, settings: &Arc<Settings>) {
    let s = Arc::clone(settings);
    let read = move |src: &str, has_headers: bool| -> ScriptResult<Dynamic> {
        let set = CsvReader::new(&s)
            .has_headers(has_headers)
            .read(src)
            .map_err(script_error)?;
        to_dynamic(&set.to_value())
    };
    let read_default = read.clone();
    engine.register_fn("csv2array", move |src: &str| read_default(src, true));
    engine.register_fn("csv2array", read);

    let s = Arc::clone(settings);
    let read_table = move |src: &str, has_headers: bool| -> ScriptResult<rhai::Map> {
        let set = CsvReader::new(&s)
            .has_headers(has_headers)
            .read(src)
            .map_err(script_error)?;
        let headers = match set.headers() {
            Some(headers) => Dynamic::from_array(string_array(headers.to_vec())),
            None => Dynamic::UNIT,
        };
        let mut table = rhai::Map::new();
        table.insert("headers".into(), headers);
        table.insert("rows".into(), to_dynamic(&set.to_value())?);
        Ok(table)
    };
    let read_table_default = read_table.clone();
    engine.register_fn("csv_read", move |src: &str| read_table_default(src, true));
    engine.register_fn("csv_read", read_table);

    let s = Arc::clone(settings);
    engine.register_fn("csv_write", move |dest: &str, rows: Array| {
        write_rows(&s, dest, rows, None)
    });

    let s = Arc::clone(settings);
    engine.register_fn(
        "csv_write",
        move |dest: &str, rows: Array, headers: Array| {
            write_rows(&s, dest, rows, Some(strings(&headers)))
        },
    );

    let s = Arc::clone(settings);
    engine.register_fn(
        "csv_write",
        move |dest: &str, table: rhai::Map| -> ScriptResult<i64> {
            let (rows, headers) = table_parts(table)?;
            write_rows(&s, dest, rows, headers)
        },
    );

    let s = Arc::clone(settings);
    engine.register_fn(
        "csv_write",
        move |ctx: NativeCallContext,
              dest: &str,
              rows: Array,
              callback: FnPtr|
              -> ScriptResult<i64> {
            let mut mapped = Array::with_capacity(rows.len());
            for (index, row) in rows.into_iter().enumerate() {
                let out: Dynamic =
                    callback.call_within_context(&ctx, (row.clone(), index as i64))?;
                mapped.push(if out.is_unit() { row } else { out });
            }
            write_rows(&s, dest, mapped, None)
        },
    );

    let s = Arc::clone(settings);
    engine.register_fn("csv_encode", move |rows: Array| -> ScriptResult<String> {
        let data = to_value(&Dynamic::from_array(rows))?;
        CsvWriter::from_value(&s, &data)
            .and_then(CsvWriter::to_csv_string)
            .map_err(script_error)
    });

    let s = Arc::clone(settings);
    let to_xml = move |src: &str, has_headers: bool| -> ScriptResult<String> {
        CsvReader::new(&s)
            .has_headers(has_headers)
            .read(src)
            .and_then(|set| set.to_xml(&TableMarkup::from(&s.xml)))
            .map_err(script_error)
    };
    let to_xml_default = to_xml.clone();
    engine.register_fn("csv_to_xml", move |src: &str| to_xml_default(src, true));
    engine.register_fn("csv_to_xml", to_xml);

    let s = Arc::clone(settings);
    let to_html = move |src: &str, has_headers: bool| -> ScriptResult<String> {
        CsvReader::new(&s)
            .has_headers(has_headers)
            .read(src)
            .and_then(|set| set.to_html(HTML_TABLE_CLASS))
            .map_err(script_error)
    };
    let to_html_default = to_html.clone();
    engine.register_fn("csv_to_html", move |src: &str| to_html_default(src, true));
    engine.register_fn("csv_to_html", to_html);
}

fn register_markup(engine: &mut Engine, settings: &Arc<Settings>) {
    let s = Arc::clone(settings);
    let encode = move |data: Dynamic, root_tag: Option<&str>| -> ScriptResult<String> {
        let mut options = s.xml.clone();
        if let Some(tag) = root_tag {
            options.root_tag = tag.to_string();
        }
        xml::encode(&to_value(&data)?, &options).map_err(script_error)
    };
    let encode_default = encode.clone();
    engine.register_fn("xml_encode", move |data: Dynamic| encode_default(data, None));
    engine.register_fn("xml_encode", move |data: Dynamic, root_tag: &str| {
        encode(data, Some(root_tag))
    });

    let threshold = settings.spool_threshold;
    engine.register_fn("xml_decode", move |src: &str| -> ScriptResult<Dynamic> {
        let value = Source::sniff(src)
            .read_to_string(threshold)
            .and_then(|text| xml::decode(&text))
            .map_err(script_error)?;
        to_dynamic(&value)
    });

    let reader = JsonReader::new(settings);
    engine.register_fn("json_read", move |src: &str| -> ScriptResult<Dynamic> {
        let value = reader.read(src).map_err(script_error)?;
        to_dynamic(&value)
    });
}

fn register_strings(engine: &mut Engine) {
    engine.register_fn("str_alnum", |s: &str| string::str_alnum(s, ""));
    engine.register_fn("str_alnum", string::str_alnum);
    engine.register_fn("str_startswith", |s: &str, prefix: &str| {
        string::str_startswith(s, prefix, true)
    });
    engine.register_fn("str_startswith", string::str_startswith);
    engine.register_fn("str_endswith", |s: &str, suffix: &str| {
        string::str_endswith(s, suffix, true)
    });
    engine.register_fn("str_endswith", string::str_endswith);
    engine.register_fn("str_between", string::str_between);
    engine.register_fn("explode_trim", |delimiter: &str, s: &str| {
        string_array(string::explode_trim(delimiter, s))
    });
    engine.register_fn("implode_nice", |items: Array| {
        string::implode_nice(&strings(&items), ", ", ", and ")
    });
    engine.register_fn("implode_nice", |items: Array, separator: &str| {
        string::implode_nice(&strings(&items), separator, separator)
    });
    engine.register_fn(
        "implode_nice",
        |items: Array, separator: &str, last_separator: &str| {
            string::implode_nice(&strings(&items), separator, last_separator)
        },
    );
}
