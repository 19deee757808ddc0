//! Auth subcommand implementations.

mod login;
mod logout;
mod refresh;
mod register;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Log in and save the session
    Login(login::LoginArgs),

    /// Create a new account
    Register(register::RegisterArgs),

    /// End the session on the server and locally
    Logout(logout::LogoutArgs),

    /// Display the logged-in user
    Whoami(whoami::WhoamiArgs),

    /// Renew the access token now
    Refresh(refresh::RefreshArgs),
}

pub async fn handle(cmd: AuthCommand, api_url: Option<&str>) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(args, api_url).await,
        AuthSubcommand::Register(args) => register::run(args, api_url).await,
        AuthSubcommand::Logout(args) => logout::run(args, api_url).await,
        AuthSubcommand::Whoami(args) => whoami::run(args, api_url).await,
        AuthSubcommand::Refresh(args) => refresh::run(args, api_url).await,
    }
}
