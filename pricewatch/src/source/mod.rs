//! Product sources.
//!
//! [`SourceGateway`] normalizes a listing URL, tries the authenticated
//! upstream API for known domains and falls back to the scraping endpoint.

mod error;
mod gateway;
mod scraper;
mod types;
mod upstream;
pub mod url;

pub use error::FetchError;
pub use gateway::{ProductSource, SourceGateway};
pub use scraper::{HttpScraperClient, ScraperClient};
pub use types::{FetchResult, FetchStrategy, discount_percent};
pub use upstream::{HttpUpstreamApi, UpstreamApi};
