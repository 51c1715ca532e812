//! Data sources that supply the catalog and order history at start-up
//!
//! Loading either table is all-or-nothing: any failure surfaces as a
//! [`LoadError`] and no engine is built from partial data.

use crate::{
    error::{AppError, AppResult},
    models::{OrderLine, Product},
    services::{Catalog, OrderHistory, RecommendationEngine, SelfPairPolicy},
};

pub mod csv_source;

pub use csv_source::CsvDataSource;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing required column '{column}'")]
    MissingColumn { path: String, column: &'static str },

    #[error("{path} line {line}: empty '{field}'")]
    MissingField {
        path: String,
        line: usize,
        field: &'static str,
    },

    #[error("{path} line {line}: invalid price '{value}'")]
    InvalidPrice {
        path: String,
        line: usize,
        value: String,
    },
}

/// Supplier of the two immutable tables the engine is built from
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OrderDataSource: Send + Sync {
    /// Load every catalog record
    async fn load_products(&self) -> Result<Vec<Product>, LoadError>;

    /// Load every order line, in source order
    async fn load_order_lines(&self) -> Result<Vec<OrderLine>, LoadError>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Loads a complete snapshot from `source` and builds a fresh engine from it
///
/// Index construction runs on the blocking pool so a reload never stalls the
/// async workers serving queries.
pub async fn load_engine(
    source: &dyn OrderDataSource,
    policy: SelfPairPolicy,
) -> AppResult<RecommendationEngine> {
    tracing::info!(source = source.name(), "Loading catalog and order history");

    let products = source.load_products().await?;
    let lines = source.load_order_lines().await?;

    tracing::info!(
        source = source.name(),
        products = products.len(),
        order_lines = lines.len(),
        "Source data loaded"
    );

    tokio::task::spawn_blocking(move || {
        RecommendationEngine::build(Catalog::new(products), OrderHistory::new(lines), policy)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Engine build task failed: {}", e)))
}
