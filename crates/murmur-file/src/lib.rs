//! murmur-file - Filesystem-backed credential store.
//!
//! Provides the persisted credential slot: the current access credential
//! survives process restarts and is restored on the next start.

mod store;

pub use store::{DEFAULT_SLOT, FileCredentialStore};
