use std::collections::{BTreeSet, HashMap};

use crate::models::OrderLine;

/// Immutable snapshot of every order line, plus the distinct products each
/// customer has bought
#[derive(Debug, Clone, Default)]
pub struct OrderHistory {
    lines: Vec<OrderLine>,
    purchases: HashMap<String, BTreeSet<String>>,
}

impl OrderHistory {
    pub fn new(lines: Vec<OrderLine>) -> Self {
        let mut purchases: HashMap<String, BTreeSet<String>> = HashMap::new();
        for line in &lines {
            purchases
                .entry(line.customer_id.clone())
                .or_default()
                .insert(line.product_id.clone());
        }

        Self { lines, purchases }
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Distinct products bought by `customer_id`, `None` when the customer has no lines
    pub fn purchased_by(&self, customer_id: &str) -> Option<&BTreeSet<String>> {
        self.purchases.get(customer_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn customer_count(&self) -> usize {
        self.purchases.len()
    }
}
