//! XML encoding and decoding of nested maps
//!
//! Write side: a [`Value`] map or list becomes a [`Node`] tree, which
//! [`render_document`] serializes with `quick-xml`. Keys are reduced to legal
//! tag names by [`sanitize_tag`], and two reserved keys move into markup
//! syntax:
//!
//! - `@tag` (string) renames the element that holds it
//! - `@attributes` (map of scalars) becomes the element's attributes
//!
//! ```rust
//! use scriptkit::config::XmlOptions;
//! use scriptkit::helpers::xml::encode;
//! use serde_json::json;
//!
//! let xml = encode(&json!({"1": "x", "user name": "y"}), &XmlOptions::default()).unwrap();
//! assert!(xml.contains("<Item_1>x</Item_1>"));
//! assert!(xml.contains("<user_name>y</user_name>"));
//! ```
//!
//! Read side: [`decode`] parses markup back into a [`Value`]. The two are not
//! inverses: synthetic `Item_<n>` names stay, and every scalar comes back as
//! a string.

use crate::config::XmlOptions;
use crate::error::{Result, UtilError};
use crate::helpers::string::str_alnum;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

const TAG_KEY: &str = "@tag";
const ATTRIBUTES_KEY: &str = "@attributes";
const TEXT_KEY: &str = "@text";

/// A node of a markup document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Character data of this element. A leaf keeps its text exactly; next
    /// to child elements, whitespace-only runs are layout and are dropped and
    /// the remaining runs are trimmed.
    fn text(&self) -> String {
        let mixed = self.child_elements().next().is_some();
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) if mixed => Some(text.trim()).filter(|t| !t.is_empty()),
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// Explicit conversion of a Rust value into encodable data.
///
/// Takes precedence over the generic [`Serialize`] path in [`encode_with`].
pub trait XmlSerialize {
    fn xml_serialize(&self) -> Value;
}

/// Reduce an arbitrary key to a legal tag name.
///
/// Keys made only of ASCII letters and digits are kept, except that purely
/// numeric keys become `Item_<n>`. Anything else has markup stripped, spaces,
/// dashes and slashes turned into `_`, and every remaining character outside
/// `[A-Za-z0-9_]` dropped. A result starting with a digit gets an `Item_`
/// prefix; an empty result becomes `Item`.
pub fn sanitize_tag(key: &str) -> String {
    let alnum = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric());
    let tag = if alnum {
        key.to_string()
    } else {
        let replaced: String = strip_markup(key)
            .chars()
            .map(|c| match c {
                ' ' | '-' | '/' | '\\' => '_',
                other => other,
            })
            .collect();
        str_alnum(&replaced, "_")
    };

    if tag.is_empty() {
        return "Item".to_owned();
    }
    if tag.chars().all(|c| c.is_ascii_digit()) {
        let trimmed = tag.trim_start_matches('0');
        return format!("Item_{}", if trimmed.is_empty() { "0" } else { trimmed });
    }
    if tag.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("Item_{tag}");
    }
    tag
}

fn strip_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn attributes_of(value: &Value) -> Vec<(String, String)> {
    let Value::Object(attrs) = value else {
        return Vec::new();
    };
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for (name, value) in attrs {
        let Some(text) = scalar_text(value) else {
            continue;
        };
        if seen.contains(&text) {
            continue;
        }
        seen.push(text.clone());
        out.push((sanitize_tag(name), text));
    }
    out
}

/// Build the element for one `key => value` pair. `null` yields nothing.
fn element_for(key: &str, value: &Value) -> Option<Element> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let name = match map.get(TAG_KEY) {
                Some(Value::String(tag)) => {
                    let tag = str_alnum(tag, "");
                    if tag.is_empty() {
                        sanitize_tag(key)
                    } else {
                        sanitize_tag(&tag)
                    }
                }
                _ => sanitize_tag(key),
            };
            Some(container(name, value))
        }
        Value::Array(_) => Some(container(sanitize_tag(key), value)),
        scalar => {
            let text = scalar_text(scalar).unwrap_or_default();
            Some(Element::new(sanitize_tag(key)).with_text(text))
        }
    }
}

/// Element named `name` holding the entries of a map or list.
fn container(name: String, value: &Value) -> Element {
    let mut el = Element::new(name);
    match value {
        Value::Object(map) => {
            if let Some(attrs) = map.get(ATTRIBUTES_KEY) {
                el.attributes = attributes_of(attrs);
            }
            for (key, child) in map {
                if key == TAG_KEY || key == ATTRIBUTES_KEY {
                    continue;
                }
                if let Some(child) = element_for(key, child) {
                    el.push(child);
                }
            }
        }
        Value::Array(list) => {
            for (index, child) in list.iter().enumerate() {
                if let Some(child) = element_for(&index.to_string(), child) {
                    el.push(child);
                }
            }
        }
        _ => {}
    }
    el
}

/// Build the document tree for `data` under `root_tag`.
pub fn to_tree(data: &Value, root_tag: &str) -> Result<Element> {
    if !matches!(data, Value::Object(_) | Value::Array(_)) {
        return Err(UtilError::invalid_argument(
            "data",
            "expected a map or a list",
        ));
    }
    let root = str_alnum(root_tag, "");
    if root.is_empty() {
        return Err(UtilError::invalid_argument(
            "root_tag",
            format!("'{root_tag}' has no alphanumeric characters"),
        ));
    }
    Ok(container(root, data))
}

/// Encode a map or list as an XML document.
pub fn encode(data: &Value, options: &XmlOptions) -> Result<String> {
    render_document(&to_tree(data, &options.root_tag)?, options)
}

/// Encode any serializable value, enumerating its fields.
pub fn encode_serialize<T: Serialize + ?Sized>(item: &T, options: &XmlOptions) -> Result<String> {
    encode(&serde_json::to_value(item)?, options)
}

/// Encode a value through its [`XmlSerialize`] impl.
pub fn encode_with<T: XmlSerialize + ?Sized>(item: &T, options: &XmlOptions) -> Result<String> {
    encode(&item.xml_serialize(), options)
}

/// Serialize `root` with an XML declaration in front.
pub fn render_document(root: &Element, options: &XmlOptions) -> Result<String> {
    let encoding = options.encoding.to_uppercase();
    let mut writer = new_writer(options.indent);
    writer
        .write_event(Event::Decl(BytesDecl::new(
            &options.version,
            Some(encoding.as_str()),
            None,
        )))
        .map_err(UtilError::xml)?;
    write_element(&mut writer, root)?;
    finish(writer)
}

/// Serialize `root` as a fragment, without a declaration.
pub fn render(root: &Element, indent: Option<usize>) -> Result<String> {
    let mut writer = new_writer(indent);
    write_element(&mut writer, root)?;
    finish(writer)
}

fn new_writer(indent: Option<usize>) -> Writer<Vec<u8>> {
    match indent {
        Some(width) if width > 0 => Writer::new_with_indent(Vec::new(), b' ', width),
        _ => Writer::new(Vec::new()),
    }
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(UtilError::xml)
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Drop characters that may not appear anywhere in an XML 1.0 document.
fn legal_text(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (name, value) in &el.attributes {
        start.push_attribute((name.as_str(), legal_text(value).as_ref()));
    }
    writer
        .write_event(Event::Start(start))
        .map_err(UtilError::xml)?;

    for child in &el.children {
        match child {
            Node::Element(inner) => write_element(writer, inner)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(&legal_text(text))))
                .map_err(UtilError::xml)?,
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(UtilError::xml)
}

/// Parse a document into its root [`Element`].
pub fn parse(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(UtilError::xml)? {
            Event::Start(e) => stack.push(open_element(&e)?),
            Event::Empty(e) => {
                let el = open_element(&e)?;
                close_element(el, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| UtilError::xml("closing tag without an open element"))?;
                close_element(el, &mut stack, &mut root)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(UtilError::xml)?;
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(UtilError::xml(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| UtilError::xml("document has no root element"))
}

fn open_element(e: &BytesStart<'_>) -> Result<Element> {
    let mut el = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(UtilError::xml)?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(UtilError::xml)?.into_owned();
        el.attributes.push((name, value));
    }
    Ok(el)
}

fn close_element(el: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(el),
        None if root.is_none() => *root = Some(el),
        None => return Err(UtilError::xml("document has more than one root element")),
    }
    Ok(())
}

/// Convert a parsed element into a nested value.
///
/// Text-only elements without attributes become strings, whitespace
/// included. Anything else is a map of child name to value, with repeated
/// names collected into a list, attributes under `@attributes`, and text
/// under `@text`.
pub fn element_to_value(el: &Element) -> Value {
    let has_children = el.child_elements().next().is_some();
    let text = el.text();
    if !has_children && el.attributes.is_empty() {
        return Value::String(text);
    }

    let mut map = Map::new();
    if !el.attributes.is_empty() {
        let attrs: Map<String, Value> = el
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        map.insert(ATTRIBUTES_KEY.to_owned(), Value::Object(attrs));
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for child in el.child_elements() {
        *counts.entry(child.name.as_str()).or_default() += 1;
    }
    for child in el.child_elements() {
        let value = element_to_value(child);
        if counts[child.name.as_str()] > 1 {
            let slot = map
                .entry(child.name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = slot {
                list.push(value);
            }
        } else {
            map.insert(child.name.clone(), value);
        }
    }

    if !text.is_empty() {
        map.insert(TEXT_KEY.to_owned(), Value::String(text));
    }
    Value::Object(map)
}

/// Decode an XML document into a nested value. The root element is not
/// wrapped: its contents are returned directly.
pub fn decode(xml: &str) -> Result<Value> {
    Ok(element_to_value(&parse(xml)?))
}

/// Decode the XML file at `path`.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| UtilError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    decode(&text)
}
