//! Delete post command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::{describe, storage};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Post id
    pub id: String,
}

pub async fn run(args: DeleteArgs, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;

    session
        .delete_post(&args.id)
        .await
        .map_err(describe)
        .with_context(|| format!("Failed to delete post {}", args.id))?;

    storage::save_session(&session)?;
    output::success(&format!("Deleted post {}", args.id));
    Ok(())
}
