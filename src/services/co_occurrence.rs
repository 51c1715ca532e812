use std::collections::HashMap;

use crate::models::OrderLine;

/// How a product repeated within one order is paired with itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelfPairPolicy {
    /// Repeated occurrences never pair with each other
    #[default]
    Exclude,
    /// Each pair of repeated occurrences counts once under `(p, p)`
    Include,
}

/// Symmetric co-purchase counts
///
/// Every pair is stored as two directed entries. The only writer is
/// [`CoOccurrenceIndex::record_pair`], which updates both directions together,
/// so `count(a, b) == count(b, a)` always holds.
#[derive(Debug, Clone, Default)]
pub struct CoOccurrenceIndex {
    partners: HashMap<String, HashMap<String, u64>>,
}

impl CoOccurrenceIndex {
    pub fn build(lines: &[OrderLine]) -> Self {
        Self::build_with(lines, SelfPairPolicy::default())
    }

    /// Pairs every two positions of each order (combinations without
    /// replacement), so a product bought twice alongside another counts twice.
    pub fn build_with(lines: &[OrderLine], policy: SelfPairPolicy) -> Self {
        let mut baskets: Vec<Vec<&str>> = Vec::new();
        let mut basket_of_order: HashMap<&str, usize> = HashMap::new();

        for line in lines {
            let slot = *basket_of_order
                .entry(line.order_id.as_str())
                .or_insert_with(|| {
                    baskets.push(Vec::new());
                    baskets.len() - 1
                });
            baskets[slot].push(line.product_id.as_str());
        }

        let mut index = Self::default();
        for basket in &baskets {
            for (i, a) in basket.iter().enumerate() {
                for b in &basket[i + 1..] {
                    if a == b && policy == SelfPairPolicy::Exclude {
                        continue;
                    }
                    index.record_pair(a, b);
                }
            }
        }

        tracing::debug!(
            orders = baskets.len(),
            products = index.product_count(),
            pairs = index.pair_count(),
            "Co-occurrence index built"
        );

        index
    }

    fn record_pair(&mut self, a: &str, b: &str) {
        self.bump(a, b);
        if a != b {
            self.bump(b, a);
        }
    }

    fn bump(&mut self, from: &str, to: &str) {
        *self
            .partners
            .entry(from.to_string())
            .or_default()
            .entry(to.to_string())
            .or_insert(0) += 1;
    }

    /// Products co-purchased with `product_id` and their counts; empty when it
    /// has no co-purchase history
    pub fn lookup<'a>(&'a self, product_id: &str) -> impl Iterator<Item = (&'a str, u64)> + 'a {
        self.partners
            .get(product_id)
            .into_iter()
            .flat_map(|partners| partners.iter().map(|(id, count)| (id.as_str(), *count)))
    }

    pub fn count(&self, a: &str, b: &str) -> u64 {
        self.partners
            .get(a)
            .and_then(|partners| partners.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Number of products with at least one partner
    pub fn product_count(&self) -> usize {
        self.partners.len()
    }

    /// Number of distinct unordered pairs
    pub fn pair_count(&self) -> usize {
        self.partners
            .iter()
            .map(|(a, partners)| partners.keys().filter(|b| a.as_str() <= b.as_str()).count())
            .sum()
    }
}
