//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use murmur_core::Credentials;

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "MURMUR_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let login = session
        .login(&credentials)
        .await
        .context("Failed to login")?;

    storage::save_session(&session).context("Failed to save session")?;

    output::success("Logged in successfully");
    println!();
    if let Some(user) = &login.user {
        output::field("Name", &user.name);
        output::field("Email", &user.email);
    }
    output::field("API", session.config().base_url.as_str());

    Ok(())
}
