//! Drive integration and the catalog pipeline

pub mod catalog;
pub mod crawler;
pub mod drive;
pub mod rate_limiter;

pub use catalog::{Catalog, CatalogDiagnostics, CatalogService, build_catalog};
pub use crawler::{CrawlFailure, CrawlReport, CrawlStage, crawl};
pub use drive::{DriveClient, DriveClientConfig, DriveError, StorageListing};
pub use rate_limiter::{RateLimitConfig, RateLimitedClient, RetryConfig, retry_async};
