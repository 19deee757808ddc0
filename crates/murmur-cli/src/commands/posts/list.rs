//! List posts command implementation.

use std::pin::pin;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use futures_util::TryStreamExt;

use murmur_core::feed::paginate;
use murmur_core::{FeedAggregator, PageRequest, Post};
use murmur_http::{PostListing, Session};

use crate::output;
use crate::session::{describe, storage};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only posts matching this text
    #[arg(long)]
    pub search: Option<String>,

    /// Posts per page
    #[arg(long)]
    pub limit: Option<u32>,

    /// Page to fetch
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Fetch every page from --page on
    #[arg(long)]
    pub all: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ListArgs, listing: PostListing, api_url: Option<&str>) -> Result<()> {
    let session = storage::open_session(api_url)?;

    let limit = args.limit.unwrap_or(session.config().page_limit).max(1);
    let request = PageRequest::first(limit)
        .with_search(args.search.clone())
        .at_page(args.page.max(1));

    let printed = if args.all {
        print_all(&session, listing, request, args.pretty).await?
    } else {
        print_page(&session, listing, &request, args.pretty).await?
    };

    storage::save_session(&session)?;

    if printed == 0 {
        eprintln!("{}", "No posts found.".dimmed());
    }
    Ok(())
}

async fn print_page(
    session: &Session,
    listing: PostListing,
    request: &PageRequest,
    pretty: bool,
) -> Result<usize> {
    let page = session
        .fetch_page(listing, request)
        .await
        .map_err(describe)?;

    for post in &page.items {
        output::post(post, pretty)?;
    }

    if page.has_more {
        eprintln!();
        eprintln!("{}: {}", "Next page".dimmed(), page.page + 1);
    }

    Ok(page.len())
}

/// Stream pages, printing each post the first time it appears.
async fn print_all(
    session: &Session,
    listing: PostListing,
    request: PageRequest,
    pretty: bool,
) -> Result<usize> {
    let source = session.post_source(listing);
    let mut pages = pin!(paginate::<Post, _>(&source, request));
    let mut feed: FeedAggregator<Post> = FeedAggregator::new();

    while let Some(page) = pages.try_next().await.map_err(describe)? {
        let added = feed.append_page(page);
        for post in feed.view_from(added.start) {
            output::post(post, pretty)?;
        }
    }

    Ok(feed.len())
}
