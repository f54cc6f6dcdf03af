//! CSV reading and writing
//!
//! [`CsvReader`] turns a [`Source`] into a [`RecordSet`]; [`CsvWriter`]
//! serializes rows to a [`Sink`]. Parsing and quoting are delegated to the
//! `csv` crate: fields may be quoted, quotes are doubled inside quoted
//! fields, both LF and CRLF line endings are accepted, and LF is written.
//!
//! # Headers
//!
//! When a reader is told the input has headers, the first record becomes the
//! header row and every data row is exposed as a map of header name to field.
//! Short rows are padded with `""`. Fields past the last header keep their
//! positional index as key (`"3"`, `"4"`, ...). When that index is already a
//! header name, `_` is prepended until the key is free, so `a,2` over the row
//! `1,2,3` gives `{"a": "1", "2": "2", "_2": "3"}`.

use crate::config::{CsvDialect, Settings, XmlOptions};
use crate::error::{Result, UtilError};
use crate::helpers::source::{Sink, Source};
use crate::helpers::xml::{self, Element, sanitize_tag};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::io::Write;

/// One data row, as a list or keyed by header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Fields(Vec<String>),
    Named(IndexMap<String, String>),
}

impl Record {
    /// Field by header name, or by index when there are no headers.
    pub fn get(&self, column: &str) -> Option<&str> {
        match self {
            Record::Named(map) => map.get(column).map(String::as_str),
            Record::Fields(fields) => column
                .parse::<usize>()
                .ok()
                .and_then(|i| fields.get(i))
                .map(String::as_str),
        }
    }

    fn to_value(&self, numeric: bool) -> Value {
        let field = |s: &String| {
            if numeric {
                numeric_value(s)
            } else {
                Value::String(s.clone())
            }
        };
        match self {
            Record::Fields(fields) => Value::Array(fields.iter().map(field).collect()),
            Record::Named(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), field(v)))
                    .collect(),
            ),
        }
    }
}

fn numeric_value(s: &str) -> Value {
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(s.to_string()))
}

fn overflow_key(index: usize, taken: &IndexMap<String, String>) -> String {
    let mut key = index.to_string();
    while taken.contains_key(&key) {
        key.insert(0, '_');
    }
    key
}

/// Tag names for [`RecordSet::to_xml`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMarkup {
    pub root_tag: String,
    pub row_tag: String,
    /// Used for every cell when there are no headers.
    pub cell_tag: String,
    pub indent: Option<usize>,
}

impl Default for TableMarkup {
    fn default() -> Self {
        Self {
            root_tag: "XML".to_owned(),
            row_tag: "row".to_owned(),
            cell_tag: "cell".to_owned(),
            indent: None,
        }
    }
}

impl From<&XmlOptions> for TableMarkup {
    fn from(options: &XmlOptions) -> Self {
        Self {
            root_tag: options.root_tag.clone(),
            indent: options.indent,
            ..Self::default()
        }
    }
}

/// Parsed CSV: an optional header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    headers: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl RecordSet {
    pub fn new(headers: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Raw data rows, padded but otherwise as parsed.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Option<Vec<String>>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }

    fn record(&self, row: &[String]) -> Record {
        match &self.headers {
            None => Record::Fields(row.to_vec()),
            Some(headers) => {
                let mut named = IndexMap::with_capacity(row.len());
                for (i, field) in row.iter().enumerate() {
                    let key = match headers.get(i) {
                        Some(header) => header.clone(),
                        None => overflow_key(i, &named),
                    };
                    named.insert(key, field.clone());
                }
                Record::Named(named)
            }
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.rows.iter().map(|row| self.record(row)).collect()
    }

    /// Rows as a list of lists or a list of maps, all fields strings.
    pub fn to_value(&self) -> Value {
        Value::Array(self.records().iter().map(|r| r.to_value(false)).collect())
    }

    /// JSON text of the rows. Numeric-looking fields become JSON numbers.
    pub fn to_json(&self) -> Result<String> {
        let rows = Value::Array(self.records().iter().map(|r| r.to_value(true)).collect());
        Ok(serde_json::to_string(&rows)?)
    }

    /// Index rows by the value of `column`. Rows without it are skipped;
    /// later rows win on duplicate keys.
    pub fn key_by(&self, column: &str) -> Map<String, Value> {
        let mut indexed = Map::new();
        for record in self.records() {
            if let Some(key) = record.get(column) {
                indexed.insert(key.to_string(), record.to_value(false));
            }
        }
        indexed
    }

    /// XML fragment: one `row_tag` element per row. With headers each cell is
    /// named after its (sanitized) header, otherwise `cell_tag`.
    pub fn to_xml(&self, markup: &TableMarkup) -> Result<String> {
        let mut root = Element::new(sanitize_tag(&markup.root_tag));
        let row_tag = sanitize_tag(&markup.row_tag);
        let cell_tag = sanitize_tag(&markup.cell_tag);

        for record in self.records() {
            let mut row = Element::new(row_tag.as_str());
            match record {
                Record::Fields(fields) => {
                    for field in fields {
                        row.push(Element::new(cell_tag.as_str()).with_text(field));
                    }
                }
                Record::Named(map) => {
                    for (key, field) in map {
                        row.push(Element::new(sanitize_tag(&key)).with_text(field));
                    }
                }
            }
            root.push(row);
        }
        xml::render(&root, markup.indent)
    }

    /// HTML table: a header row of `<th>` when headers exist, then one row
    /// of `<td>` per record.
    pub fn to_html(&self, class: &str) -> Result<String> {
        let mut table = Element::new("table").with_attribute("class", class);
        if let Some(headers) = &self.headers {
            let mut tr = Element::new("tr");
            for header in headers {
                tr.push(Element::new("th").with_text(header.as_str()));
            }
            table.push(tr);
        }
        for row in &self.rows {
            let mut tr = Element::new("tr");
            for field in row {
                tr.push(Element::new("td").with_text(field.as_str()));
            }
            table.push(tr);
        }
        xml::render(&table, None)
    }
}

/// CSV reader configured with a dialect and header mode.
#[derive(Debug, Clone)]
pub struct CsvReader {
    dialect: CsvDialect,
    has_headers: bool,
    spool_threshold: usize,
}

impl CsvReader {
    pub fn new(settings: &Settings) -> Self {
        Self {
            dialect: settings.csv,
            has_headers: false,
            spool_threshold: settings.spool_threshold,
        }
    }

    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    pub fn dialect(mut self, dialect: CsvDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn read<'a>(&self, source: impl Into<Source<'a>>) -> Result<RecordSet> {
        let input = source.into().open(self.spool_threshold)?;
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.dialect.delimiter)
            .quote(self.dialect.quote)
            .from_reader(input);

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for record in reader.records() {
            let fields: Vec<String> = record?.iter().map(str::to_owned).collect();
            if self.has_headers && headers.is_none() {
                headers = Some(fields);
                continue;
            }
            rows.push(fields);
        }

        if self.has_headers {
            let headers = headers.get_or_insert_with(Vec::new);
            for row in &mut rows {
                if row.len() < headers.len() {
                    row.resize(headers.len(), String::new());
                }
            }
        }
        Ok(RecordSet { headers, rows })
    }
}

type RowCallback<'a> = Box<dyn FnMut(&mut Vec<String>, usize) + 'a>;

/// CSV writer over rows of string fields.
pub struct CsvWriter<'a> {
    dialect: CsvDialect,
    headers: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    on_row: Option<RowCallback<'a>>,
}

impl<'a> CsvWriter<'a> {
    pub fn new(settings: &Settings, rows: Vec<Vec<String>>) -> Self {
        Self {
            dialect: settings.csv,
            headers: None,
            rows,
            on_row: None,
        }
    }

    /// Writer for a list of lists or a list of maps. For maps the first
    /// row's keys become the header row and later rows are aligned to it.
    pub fn from_value(settings: &Settings, data: &Value) -> Result<Self> {
        let (headers, rows) = rows_from_value(data)?;
        let mut writer = Self::new(settings, rows);
        writer.headers = headers;
        Ok(writer)
    }

    /// Writer for a list of rows with a fixed column order. Map rows are
    /// aligned to `headers`, keys missing from it are appended; list rows are
    /// written as they are.
    pub fn from_value_with_headers(
        settings: &Settings,
        data: &Value,
        headers: Vec<String>,
    ) -> Result<Self> {
        let rows = aligned_rows(data, Some(&headers))?;
        Ok(Self::new(settings, rows).headers(headers))
    }

    pub fn headers(mut self, headers: Vec<String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Called with each data row and its 0-based index before it is written.
    pub fn on_row(mut self, callback: impl FnMut(&mut Vec<String>, usize) + 'a) -> Self {
        self.on_row = Some(Box::new(callback));
        self
    }

    /// Write to `sink`, returning the number of data rows written. A file
    /// sink is closed before returning; a stream sink is only flushed.
    pub fn write(self, sink: Sink<'_>) -> Result<usize> {
        let out = sink.open()?;
        self.write_to(out)
    }

    pub fn to_csv_string(self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| UtilError::invalid_argument("rows", e.to_string()))
    }

    fn write_to<W: Write>(mut self, out: W) -> Result<usize> {
        let mut writer = ::csv::WriterBuilder::new()
            .flexible(true)
            .delimiter(self.dialect.delimiter)
            .quote(self.dialect.quote)
            .from_writer(out);

        if let Some(headers) = &self.headers {
            writer.write_record(headers)?;
        }
        let mut written = 0;
        for (index, mut row) in self.rows.drain(..).enumerate() {
            if let Some(callback) = self.on_row.as_mut() {
                callback(&mut row, index);
            }
            writer.write_record(&row)?;
            written += 1;
        }
        writer.flush().map_err(|e| UtilError::io("<csv>", e))?;
        Ok(written)
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split a list of lists or maps into an optional header row plus rows.
pub fn rows_from_value(data: &Value) -> Result<(Option<Vec<String>>, Vec<Vec<String>>)> {
    let headers: Option<Vec<String>> = match data {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => Some(first.keys().cloned().collect()),
            _ => None,
        },
        _ => None,
    };
    let rows = aligned_rows(data, headers.as_deref())?;
    Ok((headers, rows))
}

/// Rows of `data` as string fields, map rows ordered by `headers`.
pub fn aligned_rows(data: &Value, headers: Option<&[String]>) -> Result<Vec<Vec<String>>> {
    let Value::Array(items) = data else {
        return Err(UtilError::invalid_argument("rows", "expected a list of rows"));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let row = match (item, headers) {
            (Value::Array(fields), _) => fields.iter().map(field_text).collect(),
            (Value::Object(map), Some(headers)) => {
                let mut row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h).map(field_text).unwrap_or_default())
                    .collect();
                row.extend(
                    map.iter()
                        .filter(|(k, _)| !headers.contains(*k))
                        .map(|(_, v)| field_text(v)),
                );
                row
            }
            _ => {
                return Err(UtilError::invalid_argument(
                    "rows",
                    format!("row {i} is not a list or a map"),
                ));
            }
        };
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn reader() -> CsvReader {
        CsvReader::new(&Settings::default())
    }

    #[test]
    fn test_read_with_headers() {
        let set = reader()
            .has_headers(true)
            .read("name,age\nAl,30\nBo,41\n")
            .unwrap();
        assert_eq!(set.headers(), Some(&["name".to_string(), "age".to_string()][..]));
        assert_eq!(set.to_value(), json!([
            {"name": "Al", "age": "30"},
            {"name": "Bo", "age": "41"}
        ]));
    }

    #[test]
    fn test_read_without_headers() {
        let set = reader().read("a,b\r\n1,2\r\n").unwrap();
        assert_eq!(set.headers(), None);
        assert_eq!(set.to_value(), json!([["a", "b"], ["1", "2"]]));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let set = reader().has_headers(true).read("a,b,c\n1\n").unwrap();
        assert_eq!(set.rows()[0], vec!["1", "", ""]);
        assert_eq!(set.to_value(), json!([{"a": "1", "b": "", "c": ""}]));
    }

    #[test]
    fn test_long_rows_keep_positional_keys() {
        let set = reader().has_headers(true).read("a,b\n1,2,3,4\n").unwrap();
        assert_eq!(set.rows()[0].len(), 4);
        assert_eq!(set.to_value(), json!([{"a": "1", "b": "2", "2": "3", "3": "4"}]));
    }

    #[test]
    fn test_overflow_key_never_replaces_a_header() {
        let set = reader().has_headers(true).read("a,2\n1,2,3\n").unwrap();
        assert_eq!(set.to_value(), json!([{"a": "1", "2": "2", "_2": "3"}]));

        let set = reader().has_headers(true).read("2,_2\nx,y,z\n").unwrap();
        assert_eq!(set.to_value(), json!([{"2": "x", "_2": "y", "__2": "z"}]));
    }

    #[test]
    fn test_quoted_fields() {
        let set = reader()
            .read("\"hello, world\",\"say \"\"hi\"\"\"\n")
            .unwrap();
        assert_eq!(set.rows()[0], vec!["hello, world", "say \"hi\""]);
    }

    #[test]
    fn test_custom_dialect() {
        let set = reader()
            .dialect(CsvDialect {
                delimiter: b';',
                quote: b'\'',
            })
            .read("'a;b';c\n")
            .unwrap();
        assert_eq!(set.rows()[0], vec!["a;b", "c"]);
    }

    #[test]
    fn test_read_from_file_and_stream() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "x,y\n1,2\n").unwrap();

        let from_file = reader().has_headers(true).read(path.to_string_lossy().as_ref()).unwrap();
        let bytes: &[u8] = b"x,y\n1,2\n";
        let from_stream = reader().has_headers(true).read(Source::stream(bytes)).unwrap();
        assert_eq!(from_file, from_stream);
    }

    #[test]
    fn test_unreadable_file_names_path() {
        let err = reader()
            .read(Source::File("/nonexistent/data.csv".into()))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/data.csv"));
    }

    #[test]
    fn test_to_json_numeric_check() {
        let set = reader().has_headers(true).read("name,age\nAl,30\n").unwrap();
        assert_eq!(set.to_json().unwrap(), r#"[{"name":"Al","age":30}]"#);
    }

    #[test]
    fn test_key_by_column() {
        let set = reader()
            .has_headers(true)
            .read("id,name\n7,Al\n9,Bo\n")
            .unwrap();
        let indexed = set.key_by("id");
        assert_eq!(indexed["9"], json!({"id": "9", "name": "Bo"}));
        assert!(set.key_by("missing").is_empty());
    }

    #[test]
    fn test_to_xml_uses_header_tags() {
        let set = reader().has_headers(true).read("first name,age\nAl,30\n").unwrap();
        let xml = set.to_xml(&TableMarkup::default()).unwrap();
        assert_eq!(xml, "<XML><row><first_name>Al</first_name><age>30</age></row></XML>");

        let plain = reader().read("a,b\n").unwrap();
        let xml = plain.to_xml(&TableMarkup::default()).unwrap();
        assert_eq!(xml, "<XML><row><cell>a</cell><cell>b</cell></row></XML>");
    }

    #[test]
    fn test_to_html_table_shape() {
        let set = reader().has_headers(true).read("name,age\nAl,30\n").unwrap();
        let html = set.to_html("table-csv-data").unwrap();
        assert_eq!(
            html,
            r#"<table class="table-csv-data"><tr><th>name</th><th>age</th></tr><tr><td>Al</td><td>30</td></tr></table>"#
        );
    }

    #[test]
    fn test_write_round_trip() {
        let settings = Settings::default();
        let data = json!([{"name": "Al", "age": "30"}, {"name": "Bo", "age": "41"}]);
        let text = CsvWriter::from_value(&settings, &data)
            .unwrap()
            .to_csv_string()
            .unwrap();
        assert_eq!(text, "name,age\nAl,30\nBo,41\n");

        let back = CsvReader::new(&settings).has_headers(true).read(text).unwrap();
        assert_eq!(back.to_value(), data);
    }

    #[test]
    fn test_write_with_explicit_column_order() {
        let data = json!([{"age": "30", "name": "Al", "city": "Oslo"}, ["Bo", "41"]]);
        let text = CsvWriter::from_value_with_headers(
            &Settings::default(),
            &data,
            vec!["name".into(), "age".into()],
        )
        .unwrap()
        .to_csv_string()
        .unwrap();
        assert_eq!(text, "name,age\nAl,30,Oslo\nBo,41\n");
    }

    #[test]
    fn test_write_row_callback_sees_index() {
        let rows = vec![vec!["a".to_string()], vec!["b".to_string()]];
        let text = CsvWriter::new(&Settings::default(), rows)
            .on_row(|row, i| row.push(i.to_string()))
            .to_csv_string()
            .unwrap();
        assert_eq!(text, "a,0\nb,1\n");
    }

    #[test]
    fn test_write_to_file_and_stream() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![vec!["x, y".to_string(), "z".to_string()]];

        let n = CsvWriter::new(&Settings::default(), rows.clone())
            .write(Sink::file(&path))
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\"x, y\",z\n");

        let mut buf = Vec::new();
        CsvWriter::new(&Settings::default(), rows)
            .write(Sink::stream(&mut buf))
            .unwrap();
        assert_eq!(buf, b"\"x, y\",z\n");
    }

    #[test]
    fn test_write_unwritable_destination() {
        let err = CsvWriter::new(&Settings::default(), vec![])
            .write(Sink::file("/nonexistent/dir/out.csv"))
            .unwrap_err();
        assert!(matches!(err, UtilError::Unwritable { .. }));
    }

    #[test]
    fn test_rows_from_value_rejects_scalars() {
        assert!(rows_from_value(&json!("nope")).is_err());
        assert!(rows_from_value(&json!([1, 2])).is_err());
    }
}
