//! Order-preserving, duplicate-free accumulation of pages.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Range;
use std::sync::Arc;

use tracing::trace;

use super::Page;

/// Items that carry a stable identity key.
pub trait Identified {
    /// The identity key type, usually the resource id.
    type Key: Eq + Hash + Clone + Debug;

    /// Returns this item's identity key.
    fn key(&self) -> Self::Key;
}

/// Fetch lifecycle of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No fetch running; more pages may be available.
    #[default]
    Idle,
    /// A page fetch is in progress.
    Loading,
    /// The last fetch failed; the items are unchanged.
    Failed(String),
    /// The last page has been appended.
    Exhausted,
}

/// Accumulates pages of list results into one stable, ordered collection.
///
/// Items are kept in order of first appearance and unique by
/// [`Identified::key`]. Each item is stored behind an [`Arc`], so the
/// handles returned by [`view`](Self::view) for earlier positions stay the
/// very same allocations after later pages are appended.
pub struct FeedAggregator<T: Identified> {
    items: Vec<Arc<T>>,
    index: HashMap<T::Key, usize>,
    cursor: Option<u32>,
    has_more: bool,
    status: FetchStatus,
}

impl<T: Identified> FeedAggregator<T> {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            cursor: None,
            has_more: true,
            status: FetchStatus::Idle,
        }
    }

    /// Discard every item and return to the initial state.
    pub fn reset(&mut self) {
        self.items.clear();
        self.index.clear();
        self.cursor = None;
        self.has_more = true;
        self.status = FetchStatus::Idle;
    }

    /// Merge a page into the feed.
    ///
    /// Items whose key is new are appended to the tail in arrival order.
    /// Items whose key is already present are dropped; the existing entry
    /// keeps its value and position. Returns the positions that were added.
    pub fn append_page(&mut self, page: Page<T>) -> Range<usize> {
        let start = self.items.len();
        let offered = page.items.len();

        for item in page.items {
            if let Entry::Vacant(slot) = self.index.entry(item.key()) {
                slot.insert(self.items.len());
                self.items.push(Arc::new(item));
            }
        }

        self.cursor = Some(page.page);
        self.has_more = page.has_more;
        self.status = if page.has_more {
            FetchStatus::Idle
        } else {
            FetchStatus::Exhausted
        };

        let added = start..self.items.len();
        trace!(
            page = page.page,
            offered,
            appended = added.len(),
            "appended page to feed"
        );
        added
    }

    /// The current ordered items.
    pub fn view(&self) -> &[Arc<T>] {
        &self.items
    }

    /// Items materialised at or after `start`, e.g. the range returned by
    /// [`append_page`](Self::append_page).
    pub fn view_from(&self, start: usize) -> &[Arc<T>] {
        self.items.get(start..).unwrap_or(&[])
    }

    /// Look up an item by identity key.
    pub fn get(&self, key: &T::Key) -> Option<&Arc<T>> {
        self.index.get(key).map(|&position| &self.items[position])
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The page number of the last appended page.
    pub fn cursor(&self) -> Option<u32> {
        self.cursor
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// The page to request next, or `None` once the list is exhausted.
    pub fn next_page(&self) -> Option<u32> {
        match self.cursor {
            None => Some(1),
            Some(cursor) if self.has_more => Some(cursor.saturating_add(1)),
            Some(_) => None,
        }
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Record that a fetch has started. Items are not touched.
    pub fn mark_loading(&mut self) {
        self.status = FetchStatus::Loading;
    }

    /// Record that a fetch failed. Items are not touched.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = FetchStatus::Failed(reason.into());
    }
}

impl<T: Identified> Default for FeedAggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identified> Debug for FeedAggregator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedAggregator")
            .field("len", &self.items.len())
            .field("cursor", &self.cursor)
            .field("has_more", &self.has_more)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: &'static str,
        rev: u32,
    }

    impl Identified for Item {
        type Key = &'static str;

        fn key(&self) -> &'static str {
            self.id
        }
    }

    fn items(ids: &[&'static str]) -> Vec<Item> {
        ids.iter().map(|&id| Item { id, rev: 0 }).collect()
    }

    fn ids(feed: &FeedAggregator<Item>) -> Vec<&'static str> {
        feed.view().iter().map(|item| item.id).collect()
    }

    #[test]
    fn appends_pages_in_order() {
        let mut feed = FeedAggregator::new();
        feed.append_page(Page::new(items(&["a", "b", "c"]), 1, true));
        feed.append_page(Page::new(items(&["d", "e"]), 2, false));

        assert_eq!(ids(&feed), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(feed.cursor(), Some(2));
        assert!(!feed.has_more());
        assert_eq!(feed.status(), &FetchStatus::Exhausted);
    }

    #[test]
    fn repeated_item_keeps_first_position_and_value() {
        let mut feed = FeedAggregator::new();
        feed.append_page(Page::new(items(&["a", "b", "c"]), 1, true));

        let updated_c = Item { id: "c", rev: 7 };
        let added = feed.append_page(Page::new(
            vec![updated_c, Item { id: "d", rev: 0 }],
            2,
            true,
        ));

        assert_eq!(ids(&feed), vec!["a", "b", "c", "d"]);
        assert_eq!(added, 3..4);
        assert_eq!(feed.get(&"c").unwrap().rev, 0);
    }

    #[test]
    fn duplicates_within_one_page_are_collapsed() {
        let mut feed = FeedAggregator::new();
        feed.append_page(Page::new(items(&["a", "a", "b"]), 1, false));
        assert_eq!(ids(&feed), vec!["a", "b"]);
    }

    #[test]
    fn earlier_entries_are_identity_stable() {
        let mut feed = FeedAggregator::new();
        feed.append_page(Page::new(items(&["a", "b"]), 1, true));
        let before: Vec<Arc<Item>> = feed.view().to_vec();

        feed.append_page(Page::new(items(&["b", "c"]), 2, true));

        for (old, new) in before.iter().zip(feed.view()) {
            assert!(Arc::ptr_eq(old, new));
        }
        assert_eq!(feed.view_from(2).len(), 1);
        assert!(feed.view_from(10).is_empty());
    }

    #[test]
    fn reset_empties_everything() {
        let mut feed = FeedAggregator::new();
        feed.append_page(Page::new(items(&["a", "b"]), 1, false));
        feed.reset();

        assert!(feed.view().is_empty());
        assert!(!feed.contains(&"a"));
        assert_eq!(feed.cursor(), None);
        assert_eq!(feed.next_page(), Some(1));
        assert_eq!(feed.status(), &FetchStatus::Idle);
    }

    #[test]
    fn next_page_follows_cursor() {
        let mut feed: FeedAggregator<Item> = FeedAggregator::new();
        assert_eq!(feed.next_page(), Some(1));

        feed.append_page(Page::new(items(&["a"]), 1, true));
        assert_eq!(feed.next_page(), Some(2));

        feed.append_page(Page::new(items(&["b"]), 2, false));
        assert_eq!(feed.next_page(), None);
    }

    #[test]
    fn status_marks_do_not_touch_items() {
        let mut feed = FeedAggregator::new();
        feed.append_page(Page::new(items(&["a", "b"]), 1, true));
        let before = ids(&feed);

        feed.mark_loading();
        assert_eq!(feed.status(), &FetchStatus::Loading);
        feed.mark_failed("boom");

        assert_eq!(ids(&feed), before);
        assert_eq!(feed.status(), &FetchStatus::Failed("boom".to_string()));
        assert_eq!(feed.next_page(), Some(2));
    }
}
