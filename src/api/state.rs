use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    data::{load_engine, OrderDataSource},
    error::AppResult,
    services::{EngineStats, RecommendationEngine, SelfPairPolicy},
};

/// Shared application state
///
/// The engine itself is immutable. The lock only guards which snapshot is
/// current: readers clone the inner `Arc` and release the lock before
/// querying, and a reload swaps in an engine that is already fully built.
/// Reloads are serialized so an older load can never be published over a
/// newer one.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<RwLock<Arc<RecommendationEngine>>>,
    reload_lock: Arc<Mutex<()>>,
    source: Arc<dyn OrderDataSource>,
    self_pair_policy: SelfPairPolicy,
}

impl AppState {
    pub fn new(
        engine: RecommendationEngine,
        source: Arc<dyn OrderDataSource>,
        self_pair_policy: SelfPairPolicy,
    ) -> Self {
        Self {
            engine: Arc::new(RwLock::new(Arc::new(engine))),
            reload_lock: Arc::new(Mutex::new(())),
            source,
            self_pair_policy,
        }
    }

    /// Current engine snapshot
    pub async fn engine(&self) -> Arc<RecommendationEngine> {
        self.engine.read().await.clone()
    }

    /// Rebuilds the engine from the data source and publishes it
    ///
    /// On failure the previous snapshot stays in service.
    pub async fn reload(&self) -> AppResult<EngineStats> {
        // Held from load through swap.
        let _reload = self.reload_lock.lock().await;

        let engine = load_engine(self.source.as_ref(), self.self_pair_policy).await?;
        let stats = engine.stats();

        *self.engine.write().await = Arc::new(engine);

        tracing::info!(
            source = self.source.name(),
            products = stats.products,
            order_lines = stats.order_lines,
            "Engine snapshot replaced"
        );

        Ok(stats)
    }
}
