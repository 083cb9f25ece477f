//! Metadata extraction for artwork source pages.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sauce::{config::Config, extractor::ExtractorRegistry, scrape::HttpFetcher};
//!
//! let config = Config::load()?;
//! let fetcher = Arc::new(HttpFetcher::new(config.scrape.clone())?);
//! let registry = ExtractorRegistry::new(fetcher);
//!
//! let metadata = registry.extract("https://www.youtube.com/post/UgkxWevNfezmf-a7CRIO0haWiaDSjTI8mGsf", None)?;
//! println!("{:?}", metadata.image_urls);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod dtext;
pub mod extractor;
pub mod json;
pub mod logging;
pub mod scrape;
pub mod source_url;
pub mod text;
