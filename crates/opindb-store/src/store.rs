//! On-disk persistence of extracted products: one pretty-printed JSON file
//! per product under a configurable data directory. The file body is
//! exactly the persisted record shape — aggregates inline next to the
//! opinion list — so the store can be read by anything that speaks JSON.

use std::path::{Path, PathBuf};

use opindb_core::Product;
use serde::Serialize;

use crate::error::StoreError;

/// Per-product summary used by listings; the opinion sequence itself is
/// left on disk.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub product_name: String,
    pub opinions_count: usize,
    pub pros_count: usize,
    pub cons_count: usize,
    pub average_score: Option<f64>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.product_id.clone(),
            product_name: product.product_name.clone(),
            opinions_count: product.opinions_count,
            pros_count: product.pros_count,
            cons_count: product.cons_count,
            average_score: product.average_score,
        }
    }
}

/// JSON-file-backed store of extracted products.
#[derive(Debug, Clone)]
pub struct ProductStore {
    root: PathBuf,
}

impl ProductStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persists a product, creating the data directory on first use and
    /// overwriting any previous record for the same id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidProductId`] for ids that are not plain
    /// tokens, [`StoreError::Serde`] on serialization failure, or
    /// [`StoreError::Io`] on filesystem failure.
    pub async fn save(&self, product: &Product) -> Result<(), StoreError> {
        let path = self.product_path(&product.product_id)?;
        let body = serde_json::to_vec_pretty(product).map_err(|e| StoreError::Serde {
            context: format!("product {}", product.product_id),
            source: e,
        })?;

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, body).await?;
        tracing::debug!(
            product_id = %product.product_id,
            path = %path.display(),
            "product record persisted"
        );
        Ok(())
    }

    /// Loads the persisted record for one product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the product was never
    /// extracted; other variants mirror [`Self::save`].
    pub async fn load(&self, product_id: &str) -> Result<Product, StoreError> {
        let path = self.product_path(product_id)?;
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    product_id: product_id.to_owned(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&body).map_err(|e| StoreError::Serde {
            context: format!("product {product_id}"),
            source: e,
        })
    }

    /// Whether a persisted record exists for the product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidProductId`] for malformed ids.
    pub async fn exists(&self, product_id: &str) -> Result<bool, StoreError> {
        let path = self.product_path(product_id)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Summaries of every persisted product, sorted by product id.
    ///
    /// Unreadable files are skipped with a warning rather than failing the
    /// whole listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the data directory cannot be read
    /// (a missing directory counts as an empty store).
    pub async fn list(&self) -> Result<Vec<ProductSummary>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(product_id) = json_stem(&path) else {
                continue;
            };
            match self.load(product_id).await {
                Ok(product) => summaries.push(ProductSummary::from(&product)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record");
                }
            }
        }

        summaries.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        Ok(summaries)
    }

    fn product_path(&self, product_id: &str) -> Result<PathBuf, StoreError> {
        if product_id.is_empty()
            || !product_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(StoreError::InvalidProductId {
                product_id: product_id.to_owned(),
            });
        }
        Ok(self.root.join(format!("{product_id}.json")))
    }
}

fn json_stem(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}
