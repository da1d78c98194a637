//! Parsing Strategy Module
//!
//! A single document is always parsed by one thread. Batches of independent
//! documents (priming a page cache, bulk injection) go through
//! [`parallel`], which spreads them over the Rayon pool.

pub mod parallel;

pub use parallel::{inject_all, parse_all};
