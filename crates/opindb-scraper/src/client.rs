//! HTTP client and pagination crawler for the review listing pages.
//!
//! Listing pages are fetched strictly sequentially, page 1 upward with no
//! gaps and no refetches. A redirect or any non-success status is the
//! normal end-of-pagination signal, not an error — the client therefore
//! disables redirect following so a redirect stays observable. Transient
//! network failures are retried with bounded exponential backoff.

use std::time::Duration;

use reqwest::Client;
use scraper::Html;

use opindb_core::{AppConfig, MalformedPolicy, Opinion, Product};

use crate::error::ScrapeError;
use crate::extract::extract_opinion;
use crate::normalize::normalize_opinion;
use crate::retry::retry_with_backoff;
use crate::selectors::SelectorTable;

/// Outcome of fetching one listing page.
#[derive(Debug)]
pub enum PageFetch {
    /// A successful page whose body may hold zero or more review fragments.
    Reviews(String),
    /// The termination signal: redirect or non-success status.
    End,
}

/// Client for crawling a product's review listing on the source site.
pub struct ReviewClient {
    client: Client,
    base_url: String,
    table: SelectorTable,
    max_pages: usize,
    inter_request_delay_ms: u64,
    max_retries: u32,
    backoff_base_secs: u64,
    on_malformed: MalformedPolicy,
}

impl ReviewClient {
    /// Builds a client from the scraper section of the app config.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScrapeError::Selector`] if the static
    /// selector table fails to compile.
    pub fn new(config: &AppConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.scraper_request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.scraper_user_agent)
            // Redirects are a pagination termination signal and must not
            // be followed.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: config.source_base_url.trim_end_matches('/').to_owned(),
            table: SelectorTable::standard()?,
            max_pages: config.scraper_max_pages,
            inter_request_delay_ms: config.scraper_inter_request_delay_ms,
            max_retries: config.scraper_max_retries,
            backoff_base_secs: config.scraper_retry_backoff_base_secs,
            on_malformed: config.scraper_on_malformed,
        })
    }

    /// Full extraction pipeline for one product: display name, all
    /// opinions across all listing pages, aggregates.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::ProductNotFound`] — the id does not resolve to a
    ///   product page with a name (invalid product code).
    /// - Any error propagated from [`Self::extract_opinions`].
    pub async fn extract_product(&self, product_id: &str) -> Result<Product, ScrapeError> {
        let name = self.extract_product_name(product_id).await?.ok_or_else(|| {
            ScrapeError::ProductNotFound {
                product_id: product_id.to_owned(),
            }
        })?;

        let mut product = Product::new(product_id, name);
        product.opinions = self.extract_opinions(product_id).await?;
        product.analyze();

        tracing::info!(
            product_id,
            opinions = product.opinions_count,
            average_score = ?product.average_score,
            "product extraction complete"
        );
        Ok(product)
    }

    /// Fetches the product page and reads the display name.
    ///
    /// `None` means the id did not resolve (non-success response or a page
    /// without the product header) — the caller decides whether that is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] after retries are exhausted on a
    /// network failure.
    pub async fn extract_product_name(
        &self,
        product_id: &str,
    ) -> Result<Option<String>, ScrapeError> {
        match self.fetch_page(&self.product_url(product_id)).await? {
            PageFetch::End => Ok(None),
            PageFetch::Reviews(body) => Ok(self.parse_product_name(&body)),
        }
    }

    /// Crawls listing pages from page 1 until the termination signal,
    /// returning opinions flattened in document order across pages.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::PaginationLimit`] — the configured page bound was
    ///   exceeded before the site signaled end-of-data.
    /// - [`ScrapeError::MalformedOpinion`] — a record failed normalization
    ///   and the policy is [`MalformedPolicy::Abort`].
    /// - [`ScrapeError::Http`] — network failure after retries.
    pub async fn extract_opinions(&self, product_id: &str) -> Result<Vec<Opinion>, ScrapeError> {
        let mut opinions: Vec<Opinion> = Vec::new();
        let mut page_number = 1usize;

        loop {
            if page_number > self.max_pages {
                return Err(ScrapeError::PaginationLimit {
                    product_id: product_id.to_owned(),
                    max_pages: self.max_pages,
                });
            }

            if page_number > 1 && self.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.inter_request_delay_ms)).await;
            }

            let url = self.listing_url(product_id, page_number);
            match self.fetch_page(&url).await? {
                PageFetch::End => {
                    tracing::debug!(product_id, page_number, "end of pagination");
                    break;
                }
                PageFetch::Reviews(body) => {
                    let scanned = self.scan_listing_page(&body, &mut opinions)?;
                    tracing::debug!(product_id, page_number, scanned, "listing page scanned");
                }
            }
            page_number += 1;
        }

        Ok(opinions)
    }

    /// Fetches one URL with retry on transient failures.
    ///
    /// Any non-2xx status (redirects included) maps to [`PageFetch::End`].
    async fn fetch_page(&self, url: &str) -> Result<PageFetch, ScrapeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.to_owned();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if !status.is_success() {
                    tracing::debug!(url, status = status.as_u16(), "non-success page fetch");
                    return Ok(PageFetch::End);
                }

                Ok(PageFetch::Reviews(response.text().await?))
            }
        })
        .await
    }

    /// Extracts and normalizes every fragment of one listing page, in
    /// document order. Parsing stays synchronous so the page DOM never
    /// lives across an await point.
    fn scan_listing_page(
        &self,
        body: &str,
        opinions: &mut Vec<Opinion>,
    ) -> Result<usize, ScrapeError> {
        let page = Html::parse_document(body);
        let mut scanned = 0usize;

        for fragment in self.table.fragments(&page) {
            let raw = extract_opinion(fragment, &self.table);
            match normalize_opinion(&raw) {
                Ok(opinion) => {
                    opinions.push(opinion);
                    scanned += 1;
                }
                Err(err) => match self.on_malformed {
                    MalformedPolicy::Abort => return Err(err),
                    MalformedPolicy::Skip => {
                        tracing::warn!(error = %err, "skipping malformed opinion");
                    }
                },
            }
        }

        Ok(scanned)
    }

    fn parse_product_name(&self, body: &str) -> Option<String> {
        let page = Html::parse_document(body);
        self.table.product_name(&page)
    }

    fn listing_url(&self, product_id: &str, page: usize) -> String {
        format!("{}/{product_id}/opinie-{page}", self.base_url)
    }

    fn product_url(&self, product_id: &str) -> String {
        format!("{}/{product_id}", self.base_url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
