//! markscan - offset-annotated markup scanning with live-reload injection
//!
//! Layers:
//! - core: position-based scanner and attribute parser
//! - dom: recursive-descent tree builder, tag registry and queries
//! - inject: live-reload client fragment spliced into `<head>`
//! - cache / reload / site: the glue a live-reload server drives
//! - strategy: many independent documents parsed in parallel
//!
//! ```
//! use markscan::Document;
//!
//! let doc = Document::parse("<!DOCTYPE html><html><head></head><body></body></html>");
//! assert!(doc.success());
//! assert!(doc.is_html());
//! assert_eq!(doc.first("head").map(|h| h.body().start), Some(27));
//! ```

pub mod cache;
pub mod core;
pub mod dom;
pub mod error;
pub mod index;
pub mod inject;
pub mod reload;
pub mod settings;
pub mod site;
pub mod strategy;

pub use cache::{Page, PageCache};
pub use dom::{Document, NamespaceTable, Tag, TagId, TagRef};
pub use error::{ParseError, ParseResult};
pub use index::Offset;
pub use inject::Injector;
pub use reload::{Debouncer, ReloadSignal};
pub use settings::Settings;
pub use site::{Site, SiteError};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
