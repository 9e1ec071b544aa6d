//! Exhaustive enumeration of a truncating collection
//!
//! The management API never exposes more than `ceiling` records for one
//! query, however many match. Whenever a query reports a total at or above
//! the ceiling, it is split into one narrower query per alphabet symbol
//! (identifier ends with `c` + current suffix) and each child is handled the
//! same way. Queries below the ceiling are paginated directly.
//!
//! Traversal is depth-first and left-to-right over the alphabet, driven by an
//! explicit worklist so deep subdivisions do not grow the call stack.

use super::types::{
    EnumerationStats, EnumeratorConfig, Identified, PageWindow, ResultPage,
    SearchableCollection, SuffixQuery,
};
use crate::error::{Error, Result};
use std::future::Future;
use tracing::{debug, trace, warn};

/// Pending query in the worklist
#[derive(Debug)]
struct WorkItem {
    query: SuffixQuery,
    depth: u32,
}

/// Visits every record of a [`SearchableCollection`] exactly once
pub struct ExhaustiveEnumerator<'a, S: ?Sized> {
    source: &'a S,
    config: EnumeratorConfig,
}

impl<'a, S: ?Sized> ExhaustiveEnumerator<'a, S> {
    pub fn new(source: &'a S, config: EnumeratorConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &EnumeratorConfig {
        &self.config
    }

    /// Enumerate the whole collection
    pub async fn enumerate<T, F, Fut>(&self, consumer: F) -> Result<EnumerationStats>
    where
        S: SearchableCollection<T>,
        T: Identified,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.enumerate_from(SuffixQuery::root(), 0, consumer).await
    }

    /// Enumerate the records matching `query`, treating it as sitting at
    /// subdivision level `depth`.
    ///
    /// Each consumer call is awaited before the next record is handed over.
    pub async fn enumerate_from<T, F, Fut>(
        &self,
        query: SuffixQuery,
        depth: u32,
        mut consumer: F,
    ) -> Result<EnumerationStats>
    where
        S: SearchableCollection<T>,
        T: Identified,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.config.validate()?;

        let mut stats = EnumerationStats::default();
        let mut worklist = vec![WorkItem { query, depth }];
        let mut is_start = true;

        while let Some(WorkItem { query, depth }) = worklist.pop() {
            if depth > self.config.max_depth {
                return Err(Error::RecursionDepthExceeded {
                    depth,
                    max_depth: self.config.max_depth,
                    suffix: query.suffix().to_string(),
                });
            }

            let window = PageWindow::first(self.config.page_size);
            let first =
                SearchableCollection::<T>::fetch_page(self.source, &query, window, true).await?;
            stats.queries += 1;
            stats.pages += 1;
            stats.deepest_level = stats.deepest_level.max(depth);

            let total = first.total.ok_or_else(|| Error::MissingTotal {
                query: query.to_string(),
            })?;
            if is_start {
                stats.root_total = Some(total);
                is_start = false;
            }

            if total < self.config.ceiling {
                self.drain(&query, first, total, &mut consumer, &mut stats)
                    .await?;
                continue;
            }

            debug!(
                query = %query,
                depth,
                total,
                ceiling = self.config.ceiling,
                "Query at truncation ceiling, subdividing"
            );
            stats.subdivisions += 1;

            // Reverse push so the first symbol is popped first
            for &symbol in self.config.alphabet.symbols().iter().rev() {
                worklist.push(WorkItem {
                    query: query.narrow(symbol),
                    depth: depth + 1,
                });
            }
        }

        if stats.shortfall() > 0 {
            warn!(
                reported = stats.root_total.unwrap_or_default(),
                visited = stats.records,
                alphabet = %self.config.alphabet,
                "Enumeration visited fewer records than the collection reported"
            );
        }

        Ok(stats)
    }

    /// Paginate a query known to sit below the ceiling
    async fn drain<T, F, Fut>(
        &self,
        query: &SuffixQuery,
        first: ResultPage<T>,
        total: u64,
        consumer: &mut F,
        stats: &mut EnumerationStats,
    ) -> Result<()>
    where
        S: SearchableCollection<T>,
        T: Identified,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut left_to_get = total.saturating_sub(first.returned_count() as u64);
        self.consume(first.items, consumer, stats).await?;

        let mut window = PageWindow::first(self.config.page_size);
        while left_to_get > 0 {
            window = window.next();
            let page =
                SearchableCollection::<T>::fetch_page(self.source, query, window, true).await?;
            stats.pages += 1;

            let returned = page.returned_count() as u64;
            trace!(query = %query, page = window.page, returned, left_to_get, "Fetched page");

            if returned == 0 {
                warn!(
                    query = %query,
                    page = window.page,
                    left_to_get,
                    "Empty page before the reported total was reached"
                );
                break;
            }

            left_to_get = left_to_get.saturating_sub(returned);
            self.consume(page.items, consumer, stats).await?;
        }

        Ok(())
    }

    async fn consume<T, F, Fut>(
        &self,
        items: Vec<T>,
        consumer: &mut F,
        stats: &mut EnumerationStats,
    ) -> Result<()>
    where
        T: Identified,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        for item in items {
            if let Some(last) = item.identifier().and_then(|id| id.chars().last()) {
                if !self.config.alphabet.contains(last) {
                    warn!(
                        identifier = item.identifier().unwrap_or_default(),
                        "Identifier ends outside the subdivision alphabet"
                    );
                }
            }
            consumer(item).await?;
            stats.records += 1;
        }
        Ok(())
    }
}
