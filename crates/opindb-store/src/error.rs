use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error for {context}: {source}")]
    Serde {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The product was never extracted. Distinct from any crawl failure.
    #[error("no persisted record for product {product_id}")]
    NotFound { product_id: String },

    /// Product ids are opaque tokens; anything that could traverse the
    /// data directory is rejected outright.
    #[error("invalid product id {product_id:?}")]
    InvalidProductId { product_id: String },
}
