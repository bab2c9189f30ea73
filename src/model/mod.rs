//! Record types produced and consumed by the crawler
//!
//! # Components
//!
//! - `WebsiteNode`: one `<url>` or `<sitemap>` entry, with crawl provenance
//! - `UrlLastUpdate`: one url→timestamp fact of the incremental index
//! - timestamp helpers for `<lastmod>` parsing and index encoding

mod last_update;
mod node;
pub mod timestamp;

// Re-export main types
pub use last_update::UrlLastUpdate;
pub use node::{FieldMap, FieldValue, NodeKind, NodeMeta, ProcessedByType, WebsiteNode};
