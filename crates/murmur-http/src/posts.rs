//! Post listings as page sources.

use std::fmt;

use async_trait::async_trait;

use murmur_core::{Page, PageRequest, PageSource, Post, Result, Route};

use crate::endpoints;
use crate::session::Session;

/// The paginated post listings the API offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostListing {
    /// Every post, newest first.
    Posts,
    /// The logged-in user's own posts.
    Feed,
}

impl PostListing {
    pub fn route(self) -> Route {
        match self {
            PostListing::Posts => Route::from_static(endpoints::POSTS),
            PostListing::Feed => Route::from_static(endpoints::FEED),
        }
    }
}

impl fmt::Display for PostListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostListing::Posts => write!(f, "posts"),
            PostListing::Feed => write!(f, "feed"),
        }
    }
}

/// Fetches pages of one listing through a [`Session`].
#[derive(Debug, Clone)]
pub struct PostSource {
    session: Session,
    listing: PostListing,
}

impl PostSource {
    pub fn new(session: Session, listing: PostListing) -> Self {
        Self { session, listing }
    }

    pub fn listing(&self) -> PostListing {
        self.listing
    }
}

#[async_trait]
impl PageSource<Post> for PostSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Post>> {
        self.session.fetch_page(self.listing, request).await
    }
}
