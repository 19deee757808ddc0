//! murmur-core - Core types and traits for the murmur content API client.
//!
//! This crate holds everything that does not touch the network: the error
//! taxonomy, credential and token types, the [`CredentialStore`] seam, the
//! domain models, and the incremental [`FeedAggregator`] that merges pages
//! of list data into one stable, duplicate-free view.

pub mod credentials;
pub mod error;
pub mod feed;
pub mod model;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{Credentials, Registration};
pub use error::{Error, ErrorKind};
pub use feed::{
    FeedAggregator, FeedLoader, FetchStatus, Identified, Page, PageMeta, PageRequest,
};
pub use model::{Creator, Post, User};
pub use store::MemoryCredentialStore;
pub use tokens::AccessToken;
pub use traits::{CredentialStore, PageSource};
pub use types::{ApiUrl, Route};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
