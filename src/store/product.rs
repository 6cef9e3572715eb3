use serde::{Deserialize, Serialize};

/// A catalog price as stored: either a bare number or a decorated string
/// like "15 000 Ar". Both forms go through the same digit-stripping
/// coercion before any computation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

impl Default for PriceValue {
    fn default() -> Self {
        PriceValue::Number(0.0)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub price: PriceValue,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Ordered image references; the object store itself lives elsewhere.
    #[serde(default)]
    pub images: Vec<String>,
}
