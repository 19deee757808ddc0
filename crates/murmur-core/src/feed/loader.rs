//! Driving a [`PageSource`] into a [`FeedAggregator`].

use std::ops::Range;

use futures_core::Stream;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::traits::PageSource;

use super::{FeedAggregator, Identified, Page, PageRequest};

/// Fetches successive pages from a source and merges them into a feed.
///
/// Changing the search filter or limit restarts from the first page with an
/// empty feed. A failed fetch leaves the feed exactly as it was and marks
/// its status as failed; calling [`load_next`](Self::load_next) again
/// retries the same page.
pub struct FeedLoader<T: Identified, S> {
    source: S,
    request: PageRequest,
    feed: FeedAggregator<T>,
}

impl<T, S> FeedLoader<T, S>
where
    T: Identified + Send,
    S: PageSource<T>,
{
    /// Create a loader. The page number in `request` is ignored; loading
    /// always starts from page 1.
    pub fn new(source: S, request: PageRequest) -> Self {
        Self {
            source,
            request: request.at_page(1),
            feed: FeedAggregator::new(),
        }
    }

    /// The accumulated feed.
    pub fn feed(&self) -> &FeedAggregator<T> {
        &self.feed
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Change the search filter, discarding everything loaded so far.
    pub fn set_search(&mut self, search: Option<String>) {
        self.request = self.request.clone().with_search(search);
        self.feed.reset();
    }

    /// Change the page size, discarding everything loaded so far.
    pub fn set_limit(&mut self, limit: u32) {
        self.request.limit = limit;
        self.feed.reset();
    }

    /// Fetch and append the next page.
    ///
    /// Returns the positions that were added, which is empty once the feed
    /// is exhausted.
    #[instrument(skip(self), fields(next = ?self.feed.next_page()))]
    pub async fn load_next(&mut self) -> Result<Range<usize>> {
        let Some(page) = self.feed.next_page() else {
            let end = self.feed.len();
            return Ok(end..end);
        };

        let request = self.request.at_page(page);
        self.feed.mark_loading();

        match self.source.fetch_page(&request).await {
            Ok(page) => {
                let added = self.feed.append_page(page);
                debug!(added = added.len(), total = self.feed.len(), "Loaded page");
                Ok(added)
            }
            Err(err) => {
                warn!(error = %err, page, "Page fetch failed");
                self.feed.mark_failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Discard the feed and load the first page again.
    pub async fn refresh(&mut self) -> Result<Range<usize>> {
        self.feed.reset();
        self.load_next().await
    }

    /// Keep loading until the source reports no further pages.
    ///
    /// Returns the total number of items in the feed.
    pub async fn load_all(&mut self) -> Result<usize> {
        while self.feed.next_page().is_some() {
            self.load_next().await?;
        }
        Ok(self.feed.len())
    }
}

/// Stream every page of a source, starting at `request.page`, until a page
/// reports that no further pages exist. The stream ends after the first
/// error.
pub fn paginate<'a, T, S>(
    source: &'a S,
    request: PageRequest,
) -> impl Stream<Item = Result<Page<T>>> + Send + 'a
where
    T: Send + 'a,
    S: PageSource<T> + ?Sized,
{
    async_stream::try_stream! {
        let mut request = request;
        loop {
            let page = source.fetch_page(&request).await?;
            let has_more = page.has_more;
            let next = page.page.saturating_add(1);
            yield page;

            if !has_more {
                break;
            }
            request = request.at_page(next);
        }
    }
}
