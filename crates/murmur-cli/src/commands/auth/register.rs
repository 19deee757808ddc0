//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;

use murmur_core::Registration;

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "MURMUR_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: RegisterArgs, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;
    let registration = Registration::new(&args.name, &args.email, &args.password);

    let message = session
        .register(&registration)
        .await
        .context("Failed to register")?;

    storage::save_session(&session).context("Failed to save session")?;

    output::success(message.as_deref().unwrap_or("Account created"));
    println!("Run 'murmur auth login --email {}' to log in.", args.email);

    Ok(())
}
