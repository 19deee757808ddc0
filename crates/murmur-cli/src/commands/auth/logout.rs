//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;

    if !session.is_authenticated() {
        output::success("Not logged in");
        return Ok(());
    }

    // The local session ends either way.
    if let Err(e) = session.logout().await {
        output::warning(&format!("Server logout failed: {}", e));
        session.forget();
    }
    storage::clear_cookies()?;

    output::success("Logged out");
    Ok(())
}
