use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid CSS selector {query:?}")]
    Selector { query: String },

    #[error("malformed opinion {opinion_id}: field {field}: {reason}")]
    MalformedOpinion {
        opinion_id: String,
        field: &'static str,
        reason: String,
    },

    #[error("pagination limit reached for product {product_id}: exceeded {max_pages} pages")]
    PaginationLimit {
        product_id: String,
        max_pages: usize,
    },

    #[error("product {product_id} not found on the source site")]
    ProductNotFound { product_id: String },
}
