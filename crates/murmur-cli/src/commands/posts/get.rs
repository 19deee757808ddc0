//! Get post command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::{describe, storage};

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Post id
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: GetArgs, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;

    let post = session
        .get_post(&args.id)
        .await
        .map_err(describe)
        .with_context(|| format!("Failed to fetch post {}", args.id))?;

    storage::save_session(&session)?;
    output::post(&post, args.pretty)
}
