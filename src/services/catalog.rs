use std::collections::HashMap;

use crate::models::Product;

/// Read-only product lookup
///
/// Built once from the loaded product records. When the same id appears more
/// than once the first record wins.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: HashMap<String, Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        let mut by_id = HashMap::with_capacity(products.len());
        let mut duplicates = 0usize;

        for product in products {
            if by_id.contains_key(&product.id) {
                duplicates += 1;
                continue;
            }
            by_id.insert(product.id.clone(), product);
        }

        if duplicates > 0 {
            tracing::warn!(duplicates, "Duplicate product ids in catalog, keeping first");
        }

        Self { products: by_id }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.products.contains_key(product_id)
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Catalog data for `product_id`, or an unknown placeholder with null fields
    pub fn resolve(&self, product_id: &str) -> Product {
        self.get(product_id)
            .cloned()
            .unwrap_or_else(|| Product::unknown(product_id))
    }

    /// All products ordered by id
    pub fn products(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.values().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
