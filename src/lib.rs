//! Marketplace app-page scraper: fetch details pages, pull metadata out of
//! JSON-LD and meta tags, normalize it into a fixed schema and export it.

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod input;
pub mod node;
pub mod normalize;
pub mod pipeline;
pub mod record;

pub use error::{AppError, BatchError, ConfigError, ExportError, FetchError, InputError};
pub use record::{AppRecord, InAppPurchases, RawRecord, FIELDS};
