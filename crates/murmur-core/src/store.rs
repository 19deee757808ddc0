//! In-memory credential store.

use std::sync::{PoisonError, RwLock};

use tracing::trace;

use crate::AccessToken;
use crate::traits::CredentialStore;

/// A credential store that lives only as long as the process.
///
/// Useful for tests and for embedding applications that persist the
/// credential themselves.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<AccessToken>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a credential.
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            slot: RwLock::new(Some(token)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<AccessToken> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: AccessToken) {
        trace!("storing credential in memory");
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        trace!("clearing in-memory credential");
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("present", &self.is_present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = MemoryCredentialStore::new();
        assert!(store.get().is_none());
        assert!(!store.is_present());
    }

    #[test]
    fn set_get_clear() {
        let store = MemoryCredentialStore::new();
        store.set(AccessToken::new("first"));
        assert_eq!(store.get(), Some(AccessToken::new("first")));

        store.set(AccessToken::new("second"));
        assert_eq!(store.get(), Some(AccessToken::new("second")));

        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn debug_does_not_leak_token() {
        let store = MemoryCredentialStore::with_token(AccessToken::new("secret-token"));
        let debug = format!("{:?}", store);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("present: true"));
    }
}
