//! Page-number enumeration until an empty page
//!
//! For collections that never approach the truncation ceiling (applications
//! in a tenant). No totals are requested.

use super::types::{PageWindow, PagedCollection, MAX_PAGE_SIZE};
use crate::error::{Error, Result};
use std::future::Future;
use tracing::trace;

/// Walks pages 0, 1, 2, ... of a [`PagedCollection`] until one comes back empty
pub struct PagedEnumerator<'a, S: ?Sized> {
    source: &'a S,
    page_size: u32,
}

impl<'a, S: ?Sized> PagedEnumerator<'a, S> {
    pub fn new(source: &'a S, page_size: u32) -> Self {
        Self { source, page_size }
    }

    /// Hand every record to `consumer`, returning how many were seen
    pub async fn enumerate<T, F, Fut>(&self, mut consumer: F) -> Result<u64>
    where
        S: PagedCollection<T>,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size),
            ));
        }

        let mut window = PageWindow::first(self.page_size);
        let mut seen = 0u64;

        loop {
            let items = PagedCollection::<T>::fetch_page(self.source, window).await?;
            trace!(page = window.page, returned = items.len(), "Fetched page");
            if items.is_empty() {
                return Ok(seen);
            }
            for item in items {
                consumer(item).await?;
                seen += 1;
            }
            window = window.next();
        }
    }
}
