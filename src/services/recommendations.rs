use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationQuery, RecommendationResponse, RecommendationSource},
};

use super::{
    ranking, Catalog, CoOccurrenceIndex, OrderHistory, PopularityRanking, SelfPairPolicy,
};

/// Size of a built snapshot, reported on start-up and reload
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct EngineStats {
    pub products: usize,
    pub order_lines: usize,
    pub customers: usize,
    pub co_purchase_pairs: usize,
}

/// Answers product, customer and trending queries against an immutable
/// snapshot of catalog and order history
///
/// Nothing here mutates after construction, so one engine can be shared
/// behind an `Arc` and queried from any number of tasks without locking.
#[derive(Debug)]
pub struct RecommendationEngine {
    catalog: Catalog,
    history: OrderHistory,
    index: CoOccurrenceIndex,
    popularity: PopularityRanking,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Catalog,
        history: OrderHistory,
        index: CoOccurrenceIndex,
        popularity: PopularityRanking,
    ) -> Self {
        Self {
            catalog,
            history,
            index,
            popularity,
        }
    }

    /// Derives the co-occurrence index and popularity ranking from `history`
    pub fn build(catalog: Catalog, history: OrderHistory, policy: SelfPairPolicy) -> Self {
        let index = CoOccurrenceIndex::build_with(history.lines(), policy);
        let popularity = PopularityRanking::build(history.lines());
        let engine = Self::new(catalog, history, index, popularity);

        let stats = engine.stats();
        tracing::info!(
            products = stats.products,
            order_lines = stats.order_lines,
            customers = stats.customers,
            co_purchase_pairs = stats.co_purchase_pairs,
            self_pairs = ?policy,
            "Recommendation engine built"
        );

        engine
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &CoOccurrenceIndex {
        &self.index
    }

    pub fn popularity(&self) -> &PopularityRanking {
        &self.popularity
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            products: self.catalog.len(),
            order_lines: self.history.len(),
            customers: self.history.customer_count(),
            co_purchase_pairs: self.index.pair_count(),
        }
    }

    /// Resolves a boundary query
    ///
    /// A product id always wins, even when a customer id is also given. A
    /// customer id is only consulted without a product id. With neither, the
    /// result is trending products.
    pub fn recommend(&self, query: &RecommendationQuery) -> AppResult<RecommendationResponse> {
        if query.top_k < 1 {
            return Err(AppError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }

        if let Some(product_id) = query.product() {
            return self.recommend_for_product(product_id, query.top_k);
        }
        if let Some(customer_id) = query.customer() {
            return self.recommend_for_customer(customer_id, query.top_k);
        }
        Ok(self.trending(query.top_k))
    }

    /// Products most often bought in the same order as `product_id`
    ///
    /// Falls back to overall popularity (minus the product itself) when the
    /// product has no co-purchase partners.
    pub fn recommend_for_product(
        &self,
        product_id: &str,
        top_k: usize,
    ) -> AppResult<RecommendationResponse> {
        if !self.catalog.contains(product_id) {
            return Err(AppError::ProductNotFound(product_id.to_string()));
        }

        let mut partners = self
            .index
            .lookup(product_id)
            .filter(|(id, _)| *id != product_id)
            .peekable();

        let ranked = if partners.peek().is_none() {
            tracing::debug!(product_id, "No co-purchase partners, using popularity");
            let excluding = HashSet::from([product_id]);
            self.popularity.top_k(top_k, &excluding)
        } else {
            ranking::top_k(partners, top_k)
        };

        Ok(RecommendationResponse {
            source: RecommendationSource::ProductCoPurchase,
            product_id: Some(product_id.to_string()),
            customer_id: None,
            recommendations: self.enrich(ranked),
        })
    }

    /// Products co-purchased with anything the customer bought, never
    /// including something they already own
    pub fn recommend_for_customer(
        &self,
        customer_id: &str,
        top_k: usize,
    ) -> AppResult<RecommendationResponse> {
        let purchased = self
            .history
            .purchased_by(customer_id)
            .filter(|purchased| !purchased.is_empty())
            .ok_or_else(|| AppError::CustomerHasNoPurchases(customer_id.to_string()))?;

        let mut aggregate: HashMap<&str, u64> = HashMap::new();
        for owned in purchased {
            for (other, count) in self.index.lookup(owned) {
                *aggregate.entry(other).or_insert(0) += count;
            }
        }
        aggregate.retain(|id, _| !purchased.contains(*id));

        let ranked = if aggregate.is_empty() {
            tracing::debug!(customer_id, "No co-purchase candidates, using popularity");
            let excluding: HashSet<&str> = purchased.iter().map(String::as_str).collect();
            self.popularity.top_k(top_k, &excluding)
        } else {
            ranking::top_k(aggregate, top_k)
        };

        Ok(RecommendationResponse {
            source: RecommendationSource::CustomerHistory,
            product_id: None,
            customer_id: Some(customer_id.to_string()),
            recommendations: self.enrich(ranked),
        })
    }

    /// Most purchased products overall
    pub fn trending(&self, top_k: usize) -> RecommendationResponse {
        let ranked = self.popularity.top_k(top_k, &HashSet::new());

        RecommendationResponse {
            source: RecommendationSource::Trending,
            product_id: None,
            customer_id: None,
            recommendations: self.enrich(ranked),
        }
    }

    fn enrich(&self, ranked: Vec<(String, u64)>) -> Vec<Recommendation> {
        ranked
            .into_iter()
            .map(|(id, score)| Recommendation::from_product(self.catalog.resolve(&id), score))
            .collect()
    }
}
