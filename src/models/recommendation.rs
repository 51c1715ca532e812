use serde::{Deserialize, Serialize};

use super::Product;

pub const DEFAULT_TOP_K: usize = 5;

/// Which query produced a recommendation list
///
/// Describes the query type, not the branch taken: a product query that fell
/// back to popularity is still tagged `ProductCoPurchase`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    ProductCoPurchase,
    CustomerHistory,
    Trending,
}

/// A single ranked item, enriched with catalog data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub product_id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub score: u64,
}

impl Recommendation {
    pub fn from_product(product: Product, score: u64) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            price: product.price,
            score,
        }
    }
}

/// Query accepted at the boundary
///
/// Empty ids are treated the same as missing ones.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for RecommendationQuery {
    fn default() -> Self {
        Self {
            product_id: None,
            customer_id: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RecommendationQuery {
    pub fn for_product(product_id: impl Into<String>, top_k: usize) -> Self {
        Self {
            product_id: Some(product_id.into()),
            top_k,
            ..Self::default()
        }
    }

    pub fn for_customer(customer_id: impl Into<String>, top_k: usize) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            top_k,
            ..Self::default()
        }
    }

    pub fn trending(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }

    pub fn product(&self) -> Option<&str> {
        self.product_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn customer(&self) -> Option<&str> {
        self.customer_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Ranked recommendations returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub source: RecommendationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub recommendations: Vec<Recommendation>,
}
