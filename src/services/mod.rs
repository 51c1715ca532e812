pub mod catalog;
pub mod co_occurrence;
pub mod order_history;
pub mod popularity;
pub mod ranking;
pub mod recommendations;

pub use catalog::Catalog;
pub use co_occurrence::{CoOccurrenceIndex, SelfPairPolicy};
pub use order_history::OrderHistory;
pub use popularity::PopularityRanking;
pub use recommendations::{EngineStats, RecommendationEngine};
