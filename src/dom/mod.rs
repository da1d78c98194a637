//! DOM Module - offset-annotated tag tree
//!
//! - Tags live in a flat registry in completion order
//! - TagId (u32) indices link parents to children
//! - Every name, attribute and body is a view into the source
//! - Namespace declarations go to a document-wide table

pub mod builder;
pub mod document;
pub mod namespace;
pub mod tag;

pub use builder::{is_void_element, MAX_NESTING_DEPTH, VOID_ELEMENTS};
pub use document::Document;
pub use namespace::NamespaceTable;
pub use tag::{Attributes, Tag, TagId, TagRef};
