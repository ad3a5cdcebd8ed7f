pub mod charts;
pub mod error;
pub mod export;
pub mod store;

pub use charts::{chart_data, ChartData};
pub use error::StoreError;
pub use export::{csv_document, jsonl_document, OPINION_HEADERS};
pub use store::{ProductStore, ProductSummary};
