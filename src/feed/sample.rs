//! Sample decoding: XML fragments and spreadsheet-row JSON.
//!
//! XML is converted to the same JSON-like tree the feed importer works with:
//!
//! - attributes become `@_name` keys
//! - element text next to attributes or children becomes `#text`
//! - text-only elements become plain strings
//! - repeated sibling elements become arrays
//! - CDATA is text, values are trimmed
//! - XML, numeric and common HTML entities are decoded; unknown ones are kept
//!   verbatim

use crate::domain::SourceType;
use crate::{FeedError, Result};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::{Captures, Regex};
use serde_json::map::Entry;
use serde_json::{Map, Value};

const SYNTHETIC_ROOT: &str = "root";

/// Record fields the transformer reads through a nested element of the same
/// name. A lone element with one of these names is a field, not a wrapper.
const NESTED_FIELDS: &[&str] = &["price", "language", "weight", "features"];

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z][A-Za-z0-9]*);").expect("entity pattern is valid")
});

/// Decodes a pasted sample according to the supplier's feed format.
pub fn parse_sample(source_type: SourceType, sample: &str) -> Result<Value> {
    if sample.trim().is_empty() {
        return Err(FeedError::Parse("sample is empty".into()));
    }
    match source_type {
        SourceType::Xml => parse_xml(sample),
        SourceType::Xlsx => parse_json_row(sample),
    }
}

/// One spreadsheet row as a JSON object.
pub fn parse_json_row(sample: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(sample).map_err(|e| FeedError::Parse(format!("invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(FeedError::Parse("expected a JSON object".into()));
    }
    Ok(value)
}

/// One product fragment, wrapped in a synthetic root before parsing.
///
/// When the root holds a single element that element is the record (the
/// first one if it repeats), unless its name is one of [`NESTED_FIELDS`];
/// otherwise the root itself is.
pub fn parse_xml(fragment: &str) -> Result<Value> {
    let wrapped = format!("<{SYNTHETIC_ROOT}>{fragment}</{SYNTHETIC_ROOT}>");
    let mut reader = Reader::from_str(&wrapped);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Value> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element::open(&e)?),
            Ok(Event::Empty(e)) => {
                let element = Element::open(&e)?;
                close(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| FeedError::Parse("unexpected closing tag".into()))?;
                close(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(&e);
                if let Some(current) = stack.last_mut() { current.text.push_str(&decode_entities(&raw)); }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() { current.text.push_str(&String::from_utf8_lossy(&e)); }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(FeedError::Parse(format!("XML error at position {}: {e}", reader.buffer_position())));
            }
        }
    }
    if !stack.is_empty() {
        return Err(FeedError::Parse("unclosed element".into()));
    }
    let root = root.ok_or_else(|| FeedError::Parse("no XML content".into()))?;
    Ok(select_record(root))
}

struct Element {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| FeedError::Parse(e.to_string()))?;
            let key = format!("@_{}", String::from_utf8_lossy(attr.key.as_ref()));
            let raw = String::from_utf8_lossy(&attr.value);
            attributes.insert(key, Value::String(decode_entities(&raw)));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn into_value(self) -> Value {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::String(text.to_string());
        }
        let mut map = self.attributes;
        map.extend(self.children);
        if !text.is_empty() {
            map.insert("#text".into(), Value::String(text.to_string()));
        }
        Value::Object(map)
    }
}

fn close(stack: &mut [Element], root: &mut Option<Value>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            let name = element.name.clone();
            insert_child(&mut parent.children, name, element.into_value());
        }
        None if root.is_none() => *root = Some(element.into_value()),
        None => return Err(FeedError::Parse("multiple root elements".into())),
    }
    Ok(())
}

fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.entry(name) {
        Entry::Vacant(slot) => { slot.insert(value); }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Value::Array(items) => items.push(value),
            existing => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
}

fn select_record(root: Value) -> Value {
    if let Value::Object(map) = &root {
        if map.len() == 1 && !map.keys().any(|name| NESTED_FIELDS.contains(&name.as_str())) {
            match map.values().next() {
                Some(child @ Value::Object(_)) => return child.clone(),
                Some(Value::Array(items)) if items.first().map_or(false, Value::is_object) => return items[0].clone(),
                _ => {}
            }
        }
    }
    root
}

fn decode_entities(raw: &str) -> String {
    ENTITY
        .replace_all(raw, |caps: &Captures<'_>| {
            let body = &caps[1];
            let decoded = match body.strip_prefix('#') {
                Some(number) => numeric_reference(number).map(String::from),
                None => resolve_entity(body).map(str::to_string),
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn numeric_reference(number: &str) -> Option<char> {
    let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse().ok()?,
    };
    char::from_u32(code)
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    let resolved = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "euro" => "€",
        "pound" => "£",
        "yen" => "¥",
        "cent" => "¢",
        "deg" => "°",
        "plusmn" => "±",
        "times" => "×",
        "micro" => "µ",
        "middot" => "·",
        "bull" => "•",
        "hellip" => "…",
        "ndash" => "–",
        "mdash" => "—",
        "laquo" => "«",
        "raquo" => "»",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "frac12" => "½",
        "frac14" => "¼",
        "sup2" => "²",
        "sup3" => "³",
        "aacute" => "á",
        "Aacute" => "Á",
        "eacute" => "é",
        "Eacute" => "É",
        "iacute" => "í",
        "Iacute" => "Í",
        "oacute" => "ó",
        "Oacute" => "Ó",
        "uacute" => "ú",
        "Uacute" => "Ú",
        "yacute" => "ý",
        "Yacute" => "Ý",
        "agrave" => "à",
        "egrave" => "è",
        "ograve" => "ò",
        "auml" => "ä",
        "Auml" => "Ä",
        "ouml" => "ö",
        "Ouml" => "Ö",
        "uuml" => "ü",
        "Uuml" => "Ü",
        "szlig" => "ß",
        "ccedil" => "ç",
        "ntilde" => "ñ",
        "scaron" => "š",
        "Scaron" => "Š",
        "zcaron" => "ž",
        "Zcaron" => "Ž",
        "ccaron" => "č",
        "Ccaron" => "Č",
        "ecaron" => "ě",
        "Ecaron" => "Ě",
        "rcaron" => "ř",
        "Rcaron" => "Ř",
        "dcaron" => "ď",
        "ncaron" => "ň",
        "tcaron" => "ť",
        "uring" => "ů",
        "Uring" => "Ů",
        _ => return None,
    };
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attributes_and_text() {
        let record = parse_xml(r#"<product><weight unit="kg">1.5</weight><reference>A-1</reference></product>"#).unwrap();
        assert_eq!(record, json!({"weight": {"@_unit": "kg", "#text": "1.5"}, "reference": "A-1"}));
    }

    #[test]
    fn test_repeated_elements_become_arrays() {
        let record = parse_xml(
            "<product><features><f><name>Color</name><value>Red</value></f><f><name>Size</name><value>L</value></f></features></product>",
        )
        .unwrap();
        assert_eq!(record["features"]["f"].as_array().map(Vec::len), Some(2));
        let single = parse_xml("<product><features><f><name>Color</name><value>Red</value></f></features></product>").unwrap();
        assert!(single["features"]["f"].is_object());
    }

    #[test]
    fn test_entities_and_cdata() {
        let record = parse_xml(
            "<product><name>Nuts &amp; bolts&nbsp;&euro;</name><description><![CDATA[<b>Bold</b>]]></description></product>",
        )
        .unwrap();
        assert_eq!(record["name"], "Nuts & bolts\u{a0}€");
        assert_eq!(record["description"], "<b>Bold</b>");
    }

    #[test]
    fn test_unknown_entities_pass_through() {
        let record = parse_xml(r#"<product><name>Kli&scaron;ta &#269;&#x10D; &unknownthing; AT&T</name><image alt="&oacute;&zzz;"/></product>"#).unwrap();
        assert_eq!(record["name"], "Kli\u{161}ta \u{10d}\u{10d} &unknownthing; AT&T");
        assert_eq!(record["image"]["@_alt"], "\u{f3}&zzz;");
    }

    #[test]
    fn test_lone_nested_field_is_not_unwrapped() {
        let price = parse_xml("<price><price>500</price></price>").unwrap();
        assert_eq!(price, json!({"price": {"price": "500"}}));
        let language = parse_xml("<language><lang><name>Chain</name></lang></language>").unwrap();
        assert_eq!(language["language"]["lang"]["name"], "Chain");
        let wrapped = parse_xml("<product><price><price>500</price></price></product>").unwrap();
        assert_eq!(wrapped, json!({"price": {"price": "500"}}));
    }

    #[test]
    fn test_fields_without_wrapper() {
        let record = parse_xml("<sku>1</sku><brand>X</brand>").unwrap();
        assert_eq!(record, json!({"sku": "1", "brand": "X"}));
    }

    #[test]
    fn test_empty_element_is_empty_string() {
        let record = parse_xml("<product><ean/><name> Pads </name></product>").unwrap();
        assert_eq!(record, json!({"ean": "", "name": "Pads"}));
    }

    #[test]
    fn test_unbalanced_xml_is_parse_error() {
        assert!(matches!(parse_xml("<product><name>x</product>"), Err(FeedError::Parse(_))));
        assert!(matches!(parse_xml("<product><name>x</name>"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_json_row() {
        let row = parse_sample(SourceType::Xlsx, r#"{"sku": "R-1", "price": {"price": "10,5"}}"#).unwrap();
        assert_eq!(row["sku"], "R-1");
        assert!(matches!(parse_sample(SourceType::Xlsx, "[1, 2]"), Err(FeedError::Parse(_))));
        assert!(matches!(parse_sample(SourceType::Xlsx, "{oops"), Err(FeedError::Parse(_))));
        assert!(matches!(parse_sample(SourceType::Xml, "  "), Err(FeedError::Parse(_))));
    }
}
