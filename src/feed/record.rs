//! Safe lookups over a raw supplier product.
//!
//! Feed records are arbitrary nested JSON (decoded XML or a spreadsheet row).
//! [`Field`] wraps an optional node so chains like
//! `record.get("language").get("lang").get("name")` never fail; an absent
//! node simply renders as nothing.

use serde_json::Value;

#[derive(Clone, Copy, Debug, Default)]
pub struct Field<'a>(Option<&'a Value>);

impl<'a> Field<'a> {
    pub fn root(value: &'a Value) -> Self { Self(Some(value)) }
    pub fn absent() -> Self { Self(None) }

    /// Child by key; absent for missing keys, non-objects and `null`.
    pub fn get(self, key: &str) -> Field<'a> {
        match self.0 {
            Some(Value::Object(map)) => Field(map.get(key).filter(|v| !v.is_null())),
            _ => Field(None),
        }
    }

    pub fn is_present(self) -> bool { self.0.is_some() }
    pub fn value(self) -> Option<&'a Value> { self.0 }

    /// `self` when present, otherwise `other`.
    pub fn or(self, other: Field<'a>) -> Field<'a> {
        if self.is_present() { self } else { other }
    }

    /// Array-or-single normalisation: an array yields its elements, any other
    /// present value yields itself, absence yields nothing.
    pub fn items(self) -> Vec<Field<'a>> {
        match self.0 {
            Some(Value::Array(items)) => items.iter().map(Field::root).collect(),
            Some(v) => vec![Field::root(v)],
            None => vec![],
        }
    }

    /// Text rendering of the node, `None` when there is nothing to show.
    ///
    /// Objects render through their `#text` node (XML element text next to
    /// attributes); arrays render their elements joined by commas.
    pub fn text(self) -> Option<String> {
        match self.0? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(number_text(n)),
            Value::Array(items) => Some(
                items.iter().map(|v| Field::root(v).text().unwrap_or_default()).collect::<Vec<_>>().join(","),
            ),
            Value::Object(_) => self.get("#text").text(),
        }
    }

    pub fn text_or_empty(self) -> String { self.text().unwrap_or_default() }

    /// First candidate with non-empty text, or empty.
    pub fn first_text(candidates: &[Field<'a>]) -> String {
        candidates.iter().filter_map(|f| f.text()).find(|t| !t.is_empty()).unwrap_or_default()
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() { return i.to_string(); }
    if let Some(u) = n.as_u64() { return u.to_string(); }
    n.as_f64().map(|f| f.to_string()).unwrap_or_default()
}
