pub mod client;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod retry;
pub mod selectors;

pub use client::{PageFetch, ReviewClient};
pub use error::ScrapeError;
pub use extract::{extract_opinion, RawOpinion, RawValue};
pub use normalize::normalize_opinion;
pub use selectors::SelectorTable;
