//! Description templates.
//!
//! A template is free text with `{identifier}` placeholders. Each placeholder
//! is resolved once, left to right; resolved text is never scanned again.
//! A handful of identifiers have dedicated resolvers, everything else is a
//! top-level field lookup on the record.

use crate::feed::record::Field;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid"));

type Resolver = for<'a> fn(Field<'a>) -> String;

const RESOLVERS: &[(&str, Resolver)] = &[
    ("description", description),
    ("description_short", description_short),
    ("weight", weight),
    ("features", features),
];

/// Renders `template` against one raw record.
pub fn render(template: &str, record: Field<'_>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| resolve(&caps[1], record))
        .into_owned()
}

fn resolve(key: &str, record: Field<'_>) -> String {
    match RESOLVERS.iter().find(|(name, _)| *name == key) {
        Some((_, resolver)) => resolver(record),
        None => record.get(key).text_or_empty(),
    }
}

fn localized(record: Field<'_>) -> Field<'_> {
    record.get("language").get("lang")
}

fn description(record: Field<'_>) -> String {
    let node = localized(record).get("description");
    Field::first_text(&[node.get("p"), node])
}

fn description_short(record: Field<'_>) -> String {
    let node = localized(record).get("description_short");
    Field::first_text(&[node.get("p"), node])
}

fn weight(record: Field<'_>) -> String {
    let weight = record.get("weight");
    if !weight.is_present() { return String::new(); }
    match weight.value() {
        Some(serde_json::Value::Object(_)) => format!(
            "{} {}",
            weight.get("#text").text_or_empty(),
            weight.get("@_unit").text_or_empty()
        ),
        _ => weight.text_or_empty(),
    }
}

fn features(record: Field<'_>) -> String {
    let list = record.get("features").get("f");
    if !list.is_present() { return String::new(); }
    let items: String = list
        .items()
        .into_iter()
        .map(|feature| {
            let name = feature.get("name");
            format!(
                "<li><strong>{}:</strong> {}</li>",
                name.get("#text").or(name).text_or_empty(),
                feature.get("value").text_or_empty()
            )
        })
        .collect();
    format!("<ul>{items}</ul>")
}
