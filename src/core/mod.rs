//! Core scanning primitives
//!
//! - Scanner: position-based byte scanning using memchr, with the
//!   high-water mark of every attempt
//! - Attributes: attribute list parsing into an [`attributes::AttributeSink`]

pub mod attributes;
pub mod scanner;
