//! Incremental paginated-feed model.
//!
//! Pages fetched one after another are merged into a single ordered,
//! duplicate-free view. Appending page *k+1* costs O(size of page k+1) and
//! never moves, replaces or removes an entry that was already delivered,
//! so a consumer can keep rendering the prefix it already has.

mod aggregator;
mod loader;
mod page;

pub use aggregator::{FeedAggregator, FetchStatus, Identified};
pub use loader::{FeedLoader, paginate};
pub use page::{DEFAULT_PAGE_LIMIT, Page, PageMeta, PageRequest};
