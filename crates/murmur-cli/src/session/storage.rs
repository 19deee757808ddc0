//! Session storage for persisting login state.
//!
//! Two files live in the platform data directory: `credentials.json`, the
//! access token managed by [`FileCredentialStore`], and `session.json`, the
//! API URL and the refresh cookie.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use murmur_core::ApiUrl;
use murmur_file::FileCredentialStore;
use murmur_http::{ClientConfig, Session};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    api_url: Option<String>,
    cookies: Option<String>,
}

/// Get the data directory, creating it if needed.
fn data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "murmur").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.to_path_buf())
}

fn session_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("session.json"))
}

fn credentials_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("credentials.json"))
}

fn load_stored() -> Result<StoredSession> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(StoredSession::default());
    }

    let json = fs::read_to_string(&path).context("Failed to read session file")?;
    serde_json::from_str(&json).context("Invalid session file")
}

fn write_stored(stored: &StoredSession) -> Result<()> {
    let path = session_path()?;
    let json = serde_json::to_string_pretty(stored)?;

    fs::write(&path, &json).context("Failed to write session file")?;

    // Set restrictive permissions (Unix only)
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Open a session against `api_url`, or the URL saved by a previous login.
pub fn open_session(api_url: Option<&str>) -> Result<Session> {
    let stored = load_stored()?;

    let url = api_url
        .map(str::to_string)
        .or(stored.api_url)
        .context("No API URL. Pass --api-url or set MURMUR_API_URL.")?;
    let url = ApiUrl::new(&url).context("Invalid API URL")?;

    let store = FileCredentialStore::open(credentials_path()?)
        .context("Failed to open credential store")?;
    let session = Session::new(ClientConfig::new(url), Arc::new(store))
        .context("Failed to create HTTP client")?;

    if let Some(cookies) = &stored.cookies {
        session.restore_cookies(cookies);
    }

    debug!(authenticated = session.is_authenticated(), "Opened session");
    Ok(session)
}

/// Save the API URL and refresh cookie of a session.
pub fn save_session(session: &Session) -> Result<()> {
    write_stored(&StoredSession {
        api_url: Some(session.config().base_url.to_string()),
        cookies: session.cookie_header(),
    })
}

/// Forget the refresh cookie, keeping the API URL.
pub fn clear_cookies() -> Result<()> {
    let mut stored = load_stored()?;
    stored.cookies = None;
    write_stored(&stored)
}
