//! Value Objects for supplier feeds

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Upstream feed format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Xml,
    Xlsx,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Xml => write!(f, "xml"), Self::Xlsx => write!(f, "xlsx") }
    }
}

/// Synthetic list key of a pricing tier. Only identifies a row while editing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierKey(String);

impl TierKey {
    /// Base-36 millisecond timestamp followed by a random base-36 suffix.
    pub fn generate() -> Self {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let suffix = rand::random::<u64>();
        Self(format!("{}{}", to_base36(millis), to_base36(suffix)))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 { return "0".to_string(); }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn default_margin() -> f64 { 1.0 }

/// Supplier price range with the margin applied inside it.
///
/// `price_to = None` leaves the range open upwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    #[serde(rename = "_key", default = "TierKey::generate")]
    pub key: TierKey,
    #[serde(default)]
    pub price_from: f64,
    #[serde(default)]
    pub price_to: Option<f64>,
    #[serde(default = "default_margin")]
    pub margin: f64,
}

impl PricingTier {
    pub fn new(price_from: f64, price_to: Option<f64>, margin: f64) -> Self {
        Self { key: TierKey::generate(), price_from, price_to, margin }
    }

    /// Tier every new supplier starts with.
    pub fn seed() -> Self { Self::new(0.0, Some(1000.0), 1.5) }

    /// Half-open range check: `price_from <= price < price_to`.
    pub fn contains(&self, price: f64) -> bool {
        self.price_from <= price && price < self.price_to.unwrap_or(f64::INFINITY)
    }

    pub fn has_valid_bounds(&self) -> bool {
        self.price_to.map_or(true, |to| self.price_from <= to)
    }
}

/// Feed field names / templates per catalog attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub sku: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub brand: String,
}

impl FieldMapping {
    /// Field named by a `{field}` brand mapping, `None` for a literal brand.
    pub fn brand_field(&self) -> Option<&str> {
        let brand = self.brand.as_str();
        if brand.len() >= 2 && brand.starts_with('{') && brand.ends_with('}') {
            Some(&brand[1..brand.len() - 1])
        } else {
            None
        }
    }
}

/// Brand/model keywords used for categorisation.
///
/// Accepts either a comma separated string or a list; entries are trimmed and
/// empty ones dropped. Duplicates are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryKeywords(Vec<String>);

impl CategoryKeywords {
    pub fn parse(text: &str) -> Self { Self::from_list(text.split(',')) }

    pub fn from_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(items.into_iter().map(|s| s.as_ref().trim().to_string()).filter(|s| !s.is_empty()).collect())
    }

    pub fn as_slice(&self) -> &[String] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeywordsInput {
    Text(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for CategoryKeywords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match KeywordsInput::deserialize(deserializer)? {
            KeywordsInput::Text(text) => Self::parse(&text),
            KeywordsInput::List(items) => Self::from_list(items),
        })
    }
}
