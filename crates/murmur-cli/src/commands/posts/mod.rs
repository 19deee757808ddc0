//! Posts subcommand implementations.

mod delete;
mod get;
mod like;
mod list;

use anyhow::Result;
use clap::{Args, Subcommand};

use murmur_http::PostListing;

#[derive(Args, Debug)]
pub struct PostsCommand {
    #[command(subcommand)]
    pub command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PostsSubcommand {
    /// List all posts
    List(list::ListArgs),

    /// List your own posts
    Feed(list::ListArgs),

    /// Fetch a single post
    Get(get::GetArgs),

    /// Delete one of your posts
    Delete(delete::DeleteArgs),

    /// Like or unlike a post
    Like(like::LikeArgs),
}

pub async fn handle(cmd: PostsCommand, api_url: Option<&str>) -> Result<()> {
    match cmd.command {
        PostsSubcommand::List(args) => list::run(args, PostListing::Posts, api_url).await,
        PostsSubcommand::Feed(args) => list::run(args, PostListing::Feed, api_url).await,
        PostsSubcommand::Get(args) => get::run(args, api_url).await,
        PostsSubcommand::Delete(args) => delete::run(args, api_url).await,
        PostsSubcommand::Like(args) => like::run(args, api_url).await,
    }
}
