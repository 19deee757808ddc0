//! Refresh command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::{describe, storage};

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;

    session.refresh().await.map_err(describe)?;
    storage::save_session(&session)?;

    output::success("Access token renewed");
    Ok(())
}
