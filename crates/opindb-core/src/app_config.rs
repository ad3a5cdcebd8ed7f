use std::net::SocketAddr;
use std::path::PathBuf;

/// What to do when one opinion fails normalization mid-crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Propagate the first malformed opinion and stop the crawl.
    Abort,
    /// Log the malformed opinion and continue with the rest.
    Skip,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory holding one JSON file per persisted product.
    pub data_dir: PathBuf,
    /// Origin of the review site, overridable for tests against a local server.
    pub source_base_url: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    /// Hard bound on listing pages per crawl; exceeding it is an error,
    /// not a silent stop.
    pub scraper_max_pages: usize,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub scraper_on_malformed: MalformedPolicy,
}
