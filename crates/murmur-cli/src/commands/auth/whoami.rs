//! Whoami command implementation.

use anyhow::{Result, bail};
use clap::Args;

use crate::output;
use crate::session::{describe, storage};

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;

    if !session.is_authenticated() {
        bail!("Not logged in. Run 'murmur auth login' first.");
    }

    let user = session.current_user().await.map_err(describe)?;
    storage::save_session(&session)?;

    output::field("Name", &user.name);
    output::field("Email", &user.email);
    output::field("ID", &user.id);
    output::field("API", session.config().base_url.as_str());

    Ok(())
}
