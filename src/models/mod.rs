pub mod order;
pub mod product;
pub mod recommendation;

pub use order::OrderLine;
pub use product::Product;
pub use recommendation::{
    Recommendation, RecommendationQuery, RecommendationResponse, RecommendationSource,
    DEFAULT_TOP_K,
};
