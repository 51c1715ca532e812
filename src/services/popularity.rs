use std::collections::{HashMap, HashSet};

use crate::models::OrderLine;

use super::ranking;

/// Line-item popularity of every product
///
/// A product bought twice within one order counts twice; this is not the
/// number of orders containing it.
#[derive(Debug, Clone, Default)]
pub struct PopularityRanking {
    counts: HashMap<String, u64>,
}

impl PopularityRanking {
    pub fn build(lines: &[OrderLine]) -> Self {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for line in lines {
            *counts.entry(line.product_id.clone()).or_insert(0) += 1;
        }

        Self { counts }
    }

    pub fn count(&self, product_id: &str) -> u64 {
        self.counts.get(product_id).copied().unwrap_or(0)
    }

    /// The `k` most popular products not in `excluding`
    pub fn top_k(&self, k: usize, excluding: &HashSet<&str>) -> Vec<(String, u64)> {
        ranking::top_k(
            self.counts
                .iter()
                .filter(|(id, _)| !excluding.contains(id.as_str()))
                .map(|(id, count)| (id.as_str(), *count)),
            k,
        )
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
