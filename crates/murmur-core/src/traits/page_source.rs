//! Paged list source trait.

use async_trait::async_trait;

use crate::Result;
use crate::feed::{Page, PageRequest};

/// A source of successive pages of list data.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch one page.
    ///
    /// A failed fetch must not be fed into any aggregator; callers rely on
    /// the error to leave their model untouched.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>>;
}
