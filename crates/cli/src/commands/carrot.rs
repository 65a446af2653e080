//! Posting, deleting, liking and sharing carrots.

use std::path::PathBuf;

use nijitter_client::{Composer, share_link};
use nijitter_core::CarrotId;

use super::{Context, read_uploads};
use crate::render::{format_carrot, line};

/// Post a carrot, or a reply when `reply_to` is set.
///
/// # Errors
///
/// Returns an error if the draft is invalid, an image cannot be read, or a
/// request fails.
pub async fn post(
    ctx: &Context,
    reply_to: Option<CarrotId>,
    content: &str,
    images: Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let composer = match reply_to {
        Some(parent) => Composer::reply(ctx.api.clone(), parent),
        None => Composer::new(ctx.api.clone()),
    };

    let uploads = read_uploads(images).await?;
    let carrot = composer.submit(content, uploads).await?;
    line(&format_carrot(&carrot, ctx.image_base()));
    Ok(())
}

/// Delete a carrot.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn delete(ctx: &Context, id: CarrotId) -> Result<(), Box<dyn std::error::Error>> {
    ctx.api.delete_carrot(id).await?;
    line(&format!("Deleted #{id}"));
    Ok(())
}

/// Like (`liked = true`) or unlike a carrot.
///
/// The carrot is fetched first so the toggle reflects its current state.
///
/// # Errors
///
/// Returns an error if a request fails.
pub async fn set_like(ctx: &Context, id: CarrotId, liked: bool) -> Result<(), Box<dyn std::error::Error>> {
    let carrot = ctx.api.get_carrot(id).await?;
    if carrot.is_liked == liked {
        line(if liked { "Already liked" } else { "Not liked" });
        return Ok(());
    }

    let now_liked = ctx.api.toggle_like(&carrot).await?;
    line(if now_liked { "♥ Liked" } else { "Like removed" });
    Ok(())
}

/// Print the public link of a carrot.
///
/// # Errors
///
/// Returns an error if the carrot does not exist or no link can be built.
pub async fn share(ctx: &Context, id: CarrotId) -> Result<(), Box<dyn std::error::Error>> {
    let carrot = ctx.api.get_carrot(id).await?;
    line(share_link(&ctx.config.api_url, &carrot)?.as_str());
    Ok(())
}
