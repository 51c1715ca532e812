use serde::{Deserialize, Serialize};

/// A catalog entry
///
/// Name and price are optional: a product referenced by order history but
/// absent from the catalog is still representable, and serializes its
/// missing fields as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "product_id")]
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl Product {
    /// Creates a fully described product
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            price: Some(price),
        }
    }

    /// Placeholder for an id the catalog does not know about
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            price: None,
        }
    }
}
