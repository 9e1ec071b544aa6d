//! Pagination module
//!
//! Supports: exhaustive suffix-subdivided enumeration, plain page-number
//! enumeration, and a streaming adapter over the former.
//!
//! # Overview
//!
//! The user search of the management API only ever exposes the first
//! [`DEFAULT_CEILING`] matches of a query. [`ExhaustiveEnumerator`] works
//! around that by splitting any query that reaches the ceiling into narrower
//! identifier-suffix queries until each one fits, visiting every record
//! exactly once. [`PagedEnumerator`] covers small collections that can be
//! read page by page.

mod exhaustive;
mod paged;
mod stream;
mod types;

pub use exhaustive::ExhaustiveEnumerator;
pub use paged::PagedEnumerator;
pub use stream::record_stream;
pub use types::{
    Alphabet, EnumerationStats, EnumeratorConfig, Identified, PageWindow, PagedCollection,
    ResultPage, SearchableCollection, SuffixQuery, DEFAULT_ALPHABET, DEFAULT_CEILING,
    DEFAULT_MAX_DEPTH, MAX_PAGE_SIZE,
};
