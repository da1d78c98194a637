//! Byte range bookkeeping
//!
//! Tags never copy text out of the source. Bodies and whole-tag extents are
//! kept as half-open byte ranges into the original buffer.

pub mod span;

pub use span::Offset;
