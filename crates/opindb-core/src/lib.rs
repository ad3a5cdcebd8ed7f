pub mod aggregate;
pub mod app_config;
pub mod config;
pub mod opinion;
pub mod query;

pub use aggregate::{analyze, Aggregates};
pub use app_config::{AppConfig, MalformedPolicy};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use opinion::{Opinion, Product, Recommendation};
pub use query::{
    InvalidParam, NumericBounds, OpinionQuery, QueryParams, RecommendationFilter, SortField,
    VerifiedFilter,
};
