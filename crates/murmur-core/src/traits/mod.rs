//! Core traits for credential storage and paged list sources.

mod credential_store;
mod page_source;

pub use credential_store::CredentialStore;
pub use page_source::PageSource;
