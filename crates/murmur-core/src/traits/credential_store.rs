//! Credential store trait.

use std::sync::Arc;

use crate::AccessToken;

/// Durable holder of the current access credential.
///
/// A missing credential is a normal state, not a failure, so none of the
/// operations return errors. Implementations that persist to disk log and
/// swallow I/O failures instead of surfacing them.
///
/// The store is only mutated by the refresh coordinator (on renewal success
/// or failure) and by the login/logout collaborators.
pub trait CredentialStore: Send + Sync {
    /// Returns the current credential, if any.
    fn get(&self) -> Option<AccessToken>;

    /// Replace the current credential.
    fn set(&self, token: AccessToken);

    /// Remove the current credential.
    fn clear(&self);

    /// Returns true if a credential is present.
    fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn get(&self) -> Option<AccessToken> {
        (**self).get()
    }

    fn set(&self, token: AccessToken) {
        (**self).set(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}
