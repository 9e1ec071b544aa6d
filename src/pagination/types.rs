//! Pagination types and traits
//!
//! Defines the query, window and page abstractions shared by the
//! enumerators, plus the collection traits remote APIs implement.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;

/// Largest page the management API will serve
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default truncation ceiling of the management API user search
pub const DEFAULT_CEILING: u64 = 1000;

/// Default subdivision depth guard
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Identifier tail symbols produced by the upstream id generator (no `f`)
pub const DEFAULT_ALPHABET: &str = "0123456789abcde";

// ============================================================================
// Alphabet
// ============================================================================

/// Ordered set of symbols an identifier can end with.
///
/// Subdivision prepends each symbol to the current suffix, so the cover is
/// only exact when this matches the alphabet identifiers are generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from a string, dropping repeated symbols
    pub fn new(symbols: &str) -> Result<Self> {
        let mut unique = Vec::with_capacity(symbols.len());
        for c in symbols.chars() {
            if c.is_whitespace() {
                return Err(Error::invalid_value(
                    "alphabet",
                    "whitespace is not a valid identifier symbol",
                ));
            }
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        if unique.is_empty() {
            return Err(Error::invalid_value("alphabet", "must not be empty"));
        }
        Ok(Self { symbols: unique })
    }

    /// Symbols in traversal order
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Branching factor of one subdivision
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; construction rejects empty alphabets
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Query
// ============================================================================

/// "Identifier ends with `suffix`". The empty suffix matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuffixQuery {
    suffix: String,
}

impl SuffixQuery {
    /// Query matching the whole collection
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_root(&self) -> bool {
        self.suffix.is_empty()
    }

    /// Narrow the query by one symbol. The newest constraint is the most
    /// specific one, so it goes in front of the existing suffix.
    pub fn narrow(&self, symbol: char) -> Self {
        let mut suffix = String::with_capacity(self.suffix.len() + symbol.len_utf8());
        suffix.push(symbol);
        suffix.push_str(&self.suffix);
        Self { suffix }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        identifier.ends_with(&self.suffix)
    }

    /// Render as a wildcard search on `field` (`user_id:*0a`).
    ///
    /// Returns `None` for the root query so the search parameter is omitted.
    pub fn to_search(&self, field: &str) -> Option<String> {
        if self.is_root() {
            None
        } else {
            Some(format!("{field}:*{}", self.suffix))
        }
    }
}

impl fmt::Display for SuffixQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*{}", self.suffix)
    }
}

// ============================================================================
// Page window and result page
// ============================================================================

/// Zero-based page index plus page width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: u32,
}

impl PageWindow {
    pub fn first(per_page: u32) -> Self {
        Self { page: 0, per_page }
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            per_page: self.per_page,
        }
    }

    /// Index of the first record this window covers
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.per_page)
    }
}

/// One page of a query's results
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<T> {
    /// Upstream count of all matches, when requested
    pub total: Option<u64>,
    /// The requested slice
    pub items: Vec<T>,
}

impl<T> ResultPage<T> {
    pub fn new(total: Option<u64>, items: Vec<T>) -> Self {
        Self { total, items }
    }

    pub fn returned_count(&self) -> usize {
        self.items.len()
    }
}

// ============================================================================
// Records and collections
// ============================================================================

/// A record addressable by an identifier string
pub trait Identified {
    fn identifier(&self) -> Option<&str>;
}

/// Remote collection searchable by identifier suffix, with totals
#[async_trait]
pub trait SearchableCollection<T>: Send + Sync {
    async fn fetch_page(
        &self,
        query: &SuffixQuery,
        window: PageWindow,
        include_totals: bool,
    ) -> Result<ResultPage<T>>;
}

/// Remote collection that can only be read page by page
#[async_trait]
pub trait PagedCollection<T>: Send + Sync {
    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<T>>;
}

// ============================================================================
// Enumerator configuration
// ============================================================================

/// Settings for [`ExhaustiveEnumerator`](super::ExhaustiveEnumerator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratorConfig {
    /// Deepest subdivision level allowed (root is level 0)
    pub max_depth: u32,
    /// Totals at or above this are untrusted and force a subdivision
    pub ceiling: u64,
    /// Records requested per page
    pub page_size: u32,
    /// Symbols used to subdivide
    pub alphabet: Alphabet,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            ceiling: DEFAULT_CEILING,
            page_size: MAX_PAGE_SIZE,
            alphabet: Alphabet::default(),
        }
    }
}

impl EnumeratorConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_ceiling(mut self, ceiling: u64) -> Self {
        self.ceiling = ceiling;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Reject settings that would loop forever or that the API refuses
    pub fn validate(&self) -> Result<()> {
        // A single record would still hit a ceiling of 1 and subdivide forever
        if self.ceiling <= 1 {
            return Err(Error::InvalidCeiling {
                ceiling: self.ceiling,
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size),
            ));
        }
        if self.alphabet.is_empty() {
            return Err(Error::invalid_value("alphabet", "must not be empty"));
        }
        Ok(())
    }

    /// Largest collection addressable without tripping the depth guard
    pub fn capacity(&self) -> u64 {
        (self.alphabet.len() as u64)
            .saturating_pow(self.max_depth)
            .saturating_mul(self.ceiling)
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Counters collected over one enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationStats {
    /// Records handed to the consumer
    pub records: u64,
    /// Distinct queries issued
    pub queries: u64,
    /// Page requests issued, first pages included
    pub pages: u64,
    /// Queries that were split instead of paginated
    pub subdivisions: u64,
    /// Deepest level a query was issued at
    pub deepest_level: u32,
    /// Total reported by the starting query
    pub root_total: Option<u64>,
}

impl EnumerationStats {
    /// Records the starting query reported but the enumeration never saw.
    ///
    /// Nonzero when identifiers end in a symbol outside the alphabet, or
    /// when the collection changed during the run.
    pub fn shortfall(&self) -> u64 {
        self.root_total
            .map_or(0, |total| total.saturating_sub(self.records))
    }
}
