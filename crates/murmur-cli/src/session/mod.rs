//! Persisted CLI session.

pub mod storage;

use murmur_core::Error;

/// Convert a client error, pointing the user at `auth login` when the
/// session has ended.
pub fn describe(err: Error) -> anyhow::Error {
    if err.is_session_ended() {
        anyhow::Error::new(err).context("Session expired. Run 'murmur auth login' again.")
    } else {
        err.into()
    }
}
