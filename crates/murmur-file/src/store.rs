//! Filesystem storage for the persisted credential slot.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use murmur_core::error::{Error, StorageError};
use murmur_core::traits::CredentialStore;
use murmur_core::{AccessToken, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Slot name used when none is given.
pub const DEFAULT_SLOT: &str = "access_token";

fn map_io(path: &Path, source: std::io::Error) -> Error {
    Error::Storage(StorageError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn corrupt(path: &Path, message: impl ToString) -> Error {
    Error::Storage(StorageError::Corrupt {
        path: path.display().to_string(),
        message: message.to_string(),
    })
}

/// On-disk document: named slots, each holding one credential.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    slots: BTreeMap<String, StoredCredential>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    /// RFC 3339 timestamp of the last write.
    stored_at: String,
}

/// A credential store persisted to a JSON file.
///
/// The current credential is cached in memory, so [`get`](CredentialStore::get)
/// never touches the disk. Writes take an exclusive lock on a sibling
/// `.lock` file, re-read the document, update only this store's slot and
/// replace the file atomically, so several processes (or several slots) can
/// share one file.
pub struct FileCredentialStore {
    path: PathBuf,
    slot: String,
    cached: RwLock<Option<AccessToken>>,
}

impl FileCredentialStore {
    /// Open the default slot in the file at `path`, creating nothing until
    /// the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_slot(path, DEFAULT_SLOT)
    }

    /// Open a named slot in the file at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open_slot(path: impl AsRef<Path>, slot: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let slot = slot.into();
        let token = read_file(&path)?
            .slots
            .remove(&slot)
            .map(|stored| AccessToken::new(stored.token));

        debug!(slot = %slot, restored = token.is_some(), "Opened credential store");

        Ok(Self {
            path,
            slot,
            cached: RwLock::new(token),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the slot this store reads and writes.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Re-read the slot from disk, picking up writes from other processes.
    pub fn reload(&self) -> Result<()> {
        let token = read_file(&self.path)?
            .slots
            .remove(&self.slot)
            .map(|stored| AccessToken::new(stored.token));
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = token;
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Write `token` (or remove the slot when `None`) under the file lock.
    fn persist(&self, token: Option<&AccessToken>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io(parent, e))?;
        }

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| map_io(&lock_path, e))?;

        lock_file
            .lock_exclusive()
            .map_err(|e| map_io(&lock_path, e))?;

        let result = self.write_slot(token);

        if let Err(e) = lock_file.unlock() {
            warn!(error = %e, "Failed to release credential file lock");
        }

        result
    }

    fn write_slot(&self, token: Option<&AccessToken>) -> Result<()> {
        let mut document = read_file(&self.path)?;

        match token {
            Some(token) => {
                document.slots.insert(
                    self.slot.clone(),
                    StoredCredential {
                        token: token.as_str().to_string(),
                        stored_at: Utc::now().to_rfc3339(),
                    },
                );
            }
            None => {
                document.slots.remove(&self.slot);
            }
        }

        let content = serde_json::to_string_pretty(&document).map_err(|e| corrupt(&self.path, e))?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(|e| map_io(&temp_path, e))?;

        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&temp_path)
                .map_err(|e| map_io(&temp_path, e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms).map_err(|e| map_io(&temp_path, e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| map_io(&self.path, e))?;

        debug!(slot = %self.slot, present = token.is_some(), "Persisted credential slot");
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<CredentialFile> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(CredentialFile::default()),
        Ok(content) => serde_json::from_str(&content).map_err(|e| corrupt(path, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(CredentialFile::default()),
        Err(e) => Err(map_io(path, e)),
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<AccessToken> {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: AccessToken) {
        if let Err(e) = self.persist(Some(&token)) {
            warn!(error = %e, "Failed to persist credential; keeping it in memory only");
        }
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        if let Err(e) = self.persist(None) {
            warn!(error = %e, "Failed to remove persisted credential");
        }
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl std::fmt::Debug for FileCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCredentialStore")
            .field("path", &self.path)
            .field("slot", &self.slot)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("state").join("credentials.json")
    }

    #[test]
    fn missing_file_means_no_credential() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::open(store_path(&dir)).unwrap();
        assert!(store.get().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn credential_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let store = FileCredentialStore::open(&path).unwrap();
        store.set(AccessToken::new("persisted-token"));
        drop(store);

        let reopened = FileCredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get(), Some(AccessToken::new("persisted-token")));
    }

    #[test]
    fn clear_removes_the_slot_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let store = FileCredentialStore::open(&path).unwrap();
        store.set(AccessToken::new("short-lived"));
        store.clear();
        assert!(store.get().is_none());

        let reopened = FileCredentialStore::open(&path).unwrap();
        assert!(reopened.get().is_none());
    }

    #[test]
    fn slots_are_independent() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let work = FileCredentialStore::open_slot(&path, "work").unwrap();
        let home = FileCredentialStore::open_slot(&path, "home").unwrap();
        work.set(AccessToken::new("work-token"));
        home.set(AccessToken::new("home-token"));
        work.clear();

        let home_again = FileCredentialStore::open_slot(&path, "home").unwrap();
        assert_eq!(home_again.get(), Some(AccessToken::new("home-token")));
        let work_again = FileCredentialStore::open_slot(&path, "work").unwrap();
        assert!(work_again.get().is_none());
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let reader = FileCredentialStore::open(&path).unwrap();
        let writer = FileCredentialStore::open(&path).unwrap();
        writer.set(AccessToken::new("from-elsewhere"));

        assert!(reader.get().is_none());
        reader.reload().unwrap();
        assert_eq!(reader.get(), Some(AccessToken::new("from-elsewhere")));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let err = FileCredentialStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private_to_owner() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let store = FileCredentialStore::open(&path).unwrap();
        store.set(AccessToken::new("secret"));

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn debug_redacts_token() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::open(store_path(&dir)).unwrap();
        store.set(AccessToken::new("do-not-print"));
        assert!(!format!("{:?}", store).contains("do-not-print"));
    }
}
