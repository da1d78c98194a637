//! Parallel parsing
//!
//! Uses Rayon to process many independent documents at once. Each document
//! is still parsed by a single thread.

use crate::dom::Document;
use crate::error::ParseError;
use crate::inject::Injector;
use rayon::prelude::*;
use std::borrow::Cow;

/// Parse every source in parallel; results keep the input order
pub fn parse_all<'a, S>(sources: &'a [S]) -> Vec<Document<'a>>
where
    S: AsRef<str> + Sync,
{
    sources
        .par_iter()
        .map(|source| Document::parse(source.as_ref()))
        .collect()
}

/// Inject the fragment into every source in parallel
pub fn inject_all<'a, S>(
    injector: &Injector,
    sources: &'a [S],
) -> Vec<Result<Cow<'a, str>, ParseError>>
where
    S: AsRef<str> + Sync,
{
    sources
        .par_iter()
        .map(|source| injector.inject(source.as_ref()))
        .collect()
}

/// Names of the documents whose parse failed, with the reason
pub fn failures<'d, 'a>(
    names: &[&'d str],
    docs: &[Document<'a>],
) -> Vec<(&'d str, ParseError)> {
    names
        .par_iter()
        .zip(docs.par_iter())
        .filter_map(|(name, doc)| doc.error().map(|err| (*name, err.clone())))
        .collect()
}
