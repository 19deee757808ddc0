//! Like post command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::{describe, storage};

#[derive(Args, Debug)]
pub struct LikeArgs {
    /// Post id
    pub id: String,
}

pub async fn run(args: LikeArgs, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;

    let message = session
        .toggle_like(&args.id)
        .await
        .map_err(describe)
        .with_context(|| format!("Failed to like post {}", args.id))?;

    storage::save_session(&session)?;
    output::success(message.as_deref().unwrap_or("Like toggled"));
    Ok(())
}
