//! Paginated views: timeline, replies and profile carrots.

use std::sync::Arc;

use nijitter_client::{
    ApiError, Feed, PageSource, RepliesSource, TimelineFeed, TimelineKind, UserCarrotsSource,
};
use nijitter_core::{CarrotId, Handle};

use super::Context;
use crate::render::{FeedPrinter, format_carrot, format_profile, line, status};

/// Load up to `pages` pages into `feed`, printing new carrots as they arrive.
async fn drain<S: PageSource>(
    feed: &Feed<S>,
    printer: Arc<FeedPrinter>,
    pages: u32,
) -> Result<(), ApiError> {
    let subscription = feed.subscribe(move |state| printer.render(state));

    let result: Result<(), ApiError> = async {
        feed.load().await?;
        for _ in 1..pages.max(1) {
            if !feed.load_more().await? {
                break;
            }
        }
        Ok(())
    }
    .await;

    feed.unsubscribe(subscription);
    result?;

    let state = feed.state();
    if state.carrots.is_empty() {
        status("Nothing here yet.");
    } else if state.has_more {
        status("More available; use --pages to load further.");
    }
    Ok(())
}

fn printer(ctx: &Context) -> Arc<FeedPrinter> {
    Arc::new(FeedPrinter::new(ctx.config.image_url.clone()))
}

/// Show the latest or following timeline.
///
/// # Errors
///
/// Returns an error if a page cannot be fetched.
pub async fn timeline(
    ctx: &Context,
    following: bool,
    pages: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = if following {
        TimelineKind::Following
    } else {
        TimelineKind::Latest
    };
    let feed = TimelineFeed::timeline(ctx.api.clone(), kind);
    drain(&feed, printer(ctx), pages).await?;
    Ok(())
}

/// Show a carrot followed by its replies.
///
/// # Errors
///
/// Returns an error if the carrot or a page of replies cannot be fetched.
pub async fn carrot(ctx: &Context, id: CarrotId, pages: u32) -> Result<(), Box<dyn std::error::Error>> {
    let carrot = ctx.api.get_carrot(id).await?;
    line(&format_carrot(&carrot, ctx.image_base()));
    line("--- replies ---");

    let feed = Feed::new(RepliesSource::new(ctx.api.clone(), id));
    drain(&feed, printer(ctx), pages).await?;
    Ok(())
}

/// Show a profile followed by the user's carrots.
///
/// # Errors
///
/// Returns an error if the profile or a page of carrots cannot be fetched.
pub async fn user(ctx: &Context, handle: Handle, pages: u32) -> Result<(), Box<dyn std::error::Error>> {
    let profile = ctx.api.get_user(&handle, None).await?;
    line(&format_profile(&profile.user));
    match ctx.api.is_own_profile(&handle).await {
        Ok(true) => line("  (this is you; `nijitter profile` edits it)"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "Could not check whether this is your profile"),
    }
    line("---");

    let feed = Feed::new(UserCarrotsSource::new(ctx.api.clone(), handle));
    drain(&feed, printer(ctx), pages).await?;
    Ok(())
}
